//! Static asset responses.
//!
//! The opened file is streamed in chunks rather than buffered, with
//! `Last-Modified`, the conditional-request checks from [`conditional`] and
//! single byte ranges from [`range`].
//!
//! [`conditional`]: super::conditional
//! [`range`]: super::range

use std::io::{self, SeekFrom};

use axum::body::{Body, Bytes};
use axum::http::{header, HeaderMap, HeaderValue, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use futures::stream::Stream;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncSeekExt};

use super::conditional::{self, Precondition};
use super::mime::guess_mime_type;
use super::range::{evaluate_range, RangeOutcome};
use crate::error::AppError;
use crate::fs::OpenedFile;

/// Content type for assets with an unknown extension
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

const STREAM_CHUNK_SIZE: usize = 16 * 1024;

fn read_chunks<R>(mut reader: R) -> impl Stream<Item = io::Result<Bytes>> + Send
where
    R: AsyncRead + Send + Unpin + 'static,
{
    async_stream::try_stream! {
        let mut buf = vec![0u8; STREAM_CHUNK_SIZE];
        loop {
            let n = reader.read(&mut buf).await?;
            if n == 0 {
                break;
            }
            yield Bytes::copy_from_slice(&buf[..n]);
        }
    }
}

/// Build the response for a static asset found at `path`.
pub async fn serve_static(method: &Method, headers: &HeaderMap, path: &str, file: OpenedFile) -> Response {
    let OpenedFile { meta, mut reader } = file;
    let last_modified = meta
        .modified
        .map(conditional::format_http_date)
        .and_then(|date| HeaderValue::from_str(&date).ok());

    match conditional::evaluate(method, headers, meta.modified) {
        Precondition::Failed => {
            tracing::debug!(path = %path, "Static precondition failed");
            return StatusCode::PRECONDITION_FAILED.into_response();
        }
        Precondition::NotModified => {
            let mut response = StatusCode::NOT_MODIFIED.into_response();
            if let Some(value) = last_modified {
                response.headers_mut().insert(header::LAST_MODIFIED, value);
            }
            return response;
        }
        Precondition::Proceed => {}
    }

    let (status, length, content_range) = match evaluate_range(headers, meta.len, meta.modified) {
        RangeOutcome::Full => (StatusCode::OK, meta.len, None),
        RangeOutcome::Partial(range) => {
            if let Err(e) = reader.seek(SeekFrom::Start(range.start)).await {
                return AppError::upstream("internal error", e).into_response();
            }
            (
                StatusCode::PARTIAL_CONTENT,
                range.length(),
                Some(range.content_range(meta.len)),
            )
        }
        RangeOutcome::NotSatisfiable => {
            tracing::debug!(path = %path, size = meta.len, "Range not satisfiable");
            let mut response = StatusCode::RANGE_NOT_SATISFIABLE.into_response();
            if let Ok(value) = HeaderValue::from_str(&format!("bytes */{}", meta.len)) {
                response.headers_mut().insert(header::CONTENT_RANGE, value);
            }
            return response;
        }
    };

    let content_type = guess_mime_type(path).unwrap_or(DEFAULT_CONTENT_TYPE);

    let body = if method == Method::HEAD {
        Body::empty()
    } else {
        Body::from_stream(read_chunks(reader.take(length)))
    };

    let mut response = Response::new(body);
    *response.status_mut() = status;
    let response_headers = response.headers_mut();
    response_headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(content_type));
    response_headers.insert(header::CONTENT_LENGTH, HeaderValue::from(length));
    response_headers.insert(header::ACCEPT_RANGES, HeaderValue::from_static("bytes"));
    if let Some(value) = content_range.and_then(|v| HeaderValue::from_str(&v).ok()) {
        response_headers.insert(header::CONTENT_RANGE, value);
    }
    if let Some(value) = last_modified {
        response_headers.insert(header::LAST_MODIFIED, value);
    }

    tracing::trace!(path = %path, content_type, len = length, status = %status, "Serving static asset");
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::{FileSystem, MemoryFileSystem};
    use http_body_util::BodyExt;
    use std::time::{Duration, UNIX_EPOCH};

    async fn open(fs: &MemoryFileSystem, path: &str) -> OpenedFile {
        fs.open(path).await.unwrap()
    }

    fn assets() -> MemoryFileSystem {
        MemoryFileSystem::new()
            .with_file_modified(
                "/css/site.css",
                "body{}",
                UNIX_EPOCH + Duration::from_secs(784_111_777),
            )
            .with_file("/blob.bin", vec![0u8, 1, 2, 3])
    }

    #[tokio::test]
    async fn test_serves_body_with_headers() {
        let fs = assets();
        let response = serve_static(&Method::GET, &HeaderMap::new(), "/css/site.css", open(&fs, "/css/site.css").await).await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "text/css");
        assert_eq!(response.headers()[header::CONTENT_LENGTH], "6");
        assert_eq!(
            response.headers()[header::LAST_MODIFIED],
            "Sun, 06 Nov 1994 08:49:37 GMT"
        );

        let body = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&body[..], b"body{}");
    }

    #[tokio::test]
    async fn test_unknown_extension_is_octet_stream() {
        let fs = assets();
        let response = serve_static(&Method::GET, &HeaderMap::new(), "/blob.bin", open(&fs, "/blob.bin").await).await;
        assert_eq!(response.headers()[header::CONTENT_TYPE], DEFAULT_CONTENT_TYPE);
    }

    #[tokio::test]
    async fn test_head_has_no_body() {
        let fs = assets();
        let response = serve_static(&Method::HEAD, &HeaderMap::new(), "/css/site.css", open(&fs, "/css/site.css").await).await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_LENGTH], "6");
        let body = response.into_body().collect().await.unwrap().to_bytes();
        assert!(body.is_empty());
    }

    #[tokio::test]
    async fn test_not_modified() {
        let fs = assets();
        let mut headers = HeaderMap::new();
        headers.insert(
            header::IF_MODIFIED_SINCE,
            HeaderValue::from_static("Sun, 06 Nov 1994 08:49:37 GMT"),
        );

        let response = serve_static(&Method::GET, &headers, "/css/site.css", open(&fs, "/css/site.css").await).await;
        assert_eq!(response.status(), StatusCode::NOT_MODIFIED);
        assert!(response.headers().contains_key(header::LAST_MODIFIED));
    }

    #[tokio::test]
    async fn test_precondition_failed() {
        let fs = assets();
        let mut headers = HeaderMap::new();
        headers.insert(
            header::IF_UNMODIFIED_SINCE,
            HeaderValue::from_static("Sat, 05 Nov 1994 08:49:37 GMT"),
        );

        let response = serve_static(&Method::GET, &headers, "/css/site.css", open(&fs, "/css/site.css").await).await;
        assert_eq!(response.status(), StatusCode::PRECONDITION_FAILED);
    }

    fn with_range(value: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::RANGE, HeaderValue::from_static(value));
        headers
    }

    #[tokio::test]
    async fn test_range_is_partial_content() {
        let fs = assets();
        let headers = with_range("bytes=1-3");
        let response = serve_static(&Method::GET, &headers, "/css/site.css", open(&fs, "/css/site.css").await).await;

        assert_eq!(response.status(), StatusCode::PARTIAL_CONTENT);
        assert_eq!(response.headers()[header::CONTENT_RANGE], "bytes 1-3/6");
        assert_eq!(response.headers()[header::CONTENT_LENGTH], "3");
        assert_eq!(response.headers()[header::ACCEPT_RANGES], "bytes");
        let body = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&body[..], b"ody");
    }

    #[tokio::test]
    async fn test_suffix_range() {
        let fs = assets();
        let headers = with_range("bytes=-2");
        let response = serve_static(&Method::GET, &headers, "/blob.bin", open(&fs, "/blob.bin").await).await;

        assert_eq!(response.status(), StatusCode::PARTIAL_CONTENT);
        assert_eq!(response.headers()[header::CONTENT_RANGE], "bytes 2-3/4");
        let body = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&body[..], &[2u8, 3]);
    }

    #[tokio::test]
    async fn test_range_not_satisfiable() {
        let fs = assets();
        let headers = with_range("bytes=10-");
        let response = serve_static(&Method::GET, &headers, "/css/site.css", open(&fs, "/css/site.css").await).await;

        assert_eq!(response.status(), StatusCode::RANGE_NOT_SATISFIABLE);
        assert_eq!(response.headers()[header::CONTENT_RANGE], "bytes */6");
    }

    #[tokio::test]
    async fn test_malformed_range_serves_everything() {
        let fs = assets();
        let headers = with_range("bytes=oops");
        let response = serve_static(&Method::GET, &headers, "/css/site.css", open(&fs, "/css/site.css").await).await;

        assert_eq!(response.status(), StatusCode::OK);
        assert!(!response.headers().contains_key(header::CONTENT_RANGE));
        assert_eq!(response.headers()[header::ACCEPT_RANGES], "bytes");
        let body = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&body[..], b"body{}");
    }
}

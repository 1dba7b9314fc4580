//! Content-type resolution by path extension.
//!
//! A handful of extensions are pinned first because platform MIME tables
//! disagree about them; everything else goes through the general table.

/// Extensions whose type is fixed regardless of the general table
fn override_type(ext: &str) -> Option<&'static str> {
    match ext {
        "css" => Some("text/css"),
        "js" => Some("application/javascript"),
        "html" => Some("text/html"),
        _ => None,
    }
}

fn extension_type(ext: &str) -> Option<&'static str> {
    let content_type = match ext {
        // Text
        "htm" => "text/html; charset=utf-8",
        "txt" | "md" => "text/plain; charset=utf-8",
        "csv" => "text/csv; charset=utf-8",
        "xml" => "text/xml; charset=utf-8",

        // JavaScript/WASM
        "mjs" => "text/javascript; charset=utf-8",
        "json" => "application/json",
        "map" => "application/json",
        "wasm" => "application/wasm",

        // Images
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "svg" => "image/svg+xml",
        "ico" => "image/x-icon",
        "webp" => "image/webp",
        "avif" => "image/avif",

        // Fonts
        "woff" => "font/woff",
        "woff2" => "font/woff2",
        "ttf" => "font/ttf",
        "otf" => "font/otf",
        "eot" => "application/vnd.ms-fontobject",

        // Media
        "mp4" => "video/mp4",
        "webm" => "video/webm",
        "mp3" => "audio/mpeg",
        "wav" => "audio/wav",

        // Documents
        "pdf" => "application/pdf",
        "zip" => "application/zip",
        "gz" => "application/gzip",
        "webmanifest" => "application/manifest+json",

        _ => return None,
    };
    Some(content_type)
}

/// Content type for `path`, or `None` when the extension is unknown
pub fn guess_mime_type(path: &str) -> Option<&'static str> {
    let file_name = path.rsplit('/').next().unwrap_or(path);
    let (_, ext) = file_name.rsplit_once('.')?;
    let ext = ext.to_ascii_lowercase();

    override_type(&ext).or_else(|| extension_type(&ext))
}

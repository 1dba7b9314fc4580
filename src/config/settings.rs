use std::env;
use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

/// Directories searched, in order, when `paths.base_dir` is not configured.
/// The first one containing a `views` directory wins.
pub const BASE_DIR_CANDIDATES: &[&str] = &[".", "/usr/local/notepad-site"];

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerConfig,
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub notes: NotesConfig,
    #[serde(default)]
    pub log: LogConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PathsConfig {
    /// Directory holding `views`, `includes`, `static` and `var`.
    /// Auto-detected when unset.
    pub base_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NotesConfig {
    /// `file` or `memory`
    #[serde(default = "default_notes_backend")]
    pub backend: String,
    /// Note directory; relative paths are taken from the base dir.
    /// Defaults to `var/data`.
    pub dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    /// `pretty` or `json`
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8880
}

fn default_notes_backend() -> String {
    "file".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        // Load .env file if exists
        let _ = dotenvy::dotenv();

        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let builder = Config::builder()
            .set_default("server.host", default_host())?
            .set_default("server.port", i64::from(default_port()))?
            .set_default("notes.backend", default_notes_backend())?
            .set_default("log.format", default_log_format())?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // APP__SERVER__PORT, APP__PATHS__BASE_DIR, APP__NOTES__BACKEND, ...
            .add_source(
                Environment::with_prefix("APP")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            );

        builder.build()?.try_deserialize()
    }

    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// Resolve the absolute base directory, probing the candidates when it is
    /// not configured.
    pub fn base_dir(&self) -> Result<PathBuf, ConfigError> {
        match &self.paths.base_dir {
            Some(dir) => absolutize(dir),
            None => detect_base_dir(BASE_DIR_CANDIDATES).ok_or_else(|| {
                ConfigError::Message(
                    "unable to detect base dir, please set paths.base_dir".to_string(),
                )
            }),
        }
    }

    /// Where notes are stored for the given base directory
    pub fn notes_dir(&self, base_dir: &Path) -> PathBuf {
        match &self.notes.dir {
            Some(dir) if dir.is_absolute() => dir.clone(),
            Some(dir) => base_dir.join(dir),
            None => base_dir.join("var").join("data"),
        }
    }
}

fn absolutize(dir: &Path) -> Result<PathBuf, ConfigError> {
    if dir.is_absolute() {
        return Ok(dir.to_path_buf());
    }
    let cwd = env::current_dir().map_err(|e| ConfigError::Foreign(Box::new(e)))?;
    Ok(cwd.join(dir))
}

/// First candidate (made absolute) that contains a `views` directory
pub fn detect_base_dir<P: AsRef<Path>>(candidates: &[P]) -> Option<PathBuf> {
    candidates.iter().find_map(|candidate| {
        let dir = absolutize(candidate.as_ref()).ok()?;
        dir.join("views").is_dir().then_some(dir)
    })
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for NotesConfig {
    fn default() -> Self {
        Self {
            backend: default_notes_backend(),
            dir: None,
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            format: default_log_format(),
        }
    }
}

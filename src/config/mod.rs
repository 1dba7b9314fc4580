mod settings;

pub use settings::{
    detect_base_dir, LogConfig, NotesConfig, PathsConfig, ServerConfig, Settings,
    BASE_DIR_CANDIDATES,
};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum FerryError {
    #[error("action not found: {0}")]
    ActionNotFound(String),

    #[error("cannot rename an action to its own name")]
    SameName,

    #[error("invalid action name: {0:?}")]
    InvalidName(String),

    #[error("service '{service}' could not be started: {reason}")]
    ServiceUnavailable { service: String, reason: String },

    #[error("cannot read directory {path}: {source}")]
    DirRead {
        path: String,
        source: std::io::Error,
    },

    #[error("transfer failed: {0}")]
    Network(String),

    #[error("editor failed: {0}")]
    EditorFailed(String),

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    TomlParse(#[from] toml::de::Error),

    #[error(transparent)]
    TomlSerialize(#[from] toml::ser::Error),
}

pub type Result<T> = std::result::Result<T, FerryError>;

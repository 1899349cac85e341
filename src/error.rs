use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("malformed bounding box: {0}")]
    MalformedInput(String),

    #[error("no region of interest given: provide literal boundaries or a geometry file")]
    MissingBoundaryInput,

    #[error("geometry file not found: {0}")]
    GeometryFileNotFound(PathBuf),

    #[error("unreadable geometry in {path}: {reason}")]
    UnreadableGeometry { path: PathBuf, reason: String },

    #[error("request template error: {0}")]
    Template(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("retrieval failed: {0}")]
    Retrieval(String),

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("yaml error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("url parse error: {0}")]
    Url(#[from] url::ParseError),
}

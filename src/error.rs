
use thiserror::Error;

#[derive(Error, Debug)]
pub enum NormalizeError {
    #[error("Schema not found: {type_name}")]
    SchemaNotFound { type_name: String },
    #[error("Missing transform for attribute '{attribute}' of type '{declared_type}'")]
    MissingTransform { attribute: String, declared_type: String },
    #[error("Malformed payload: {0}")]
    MalformedPayload(String),
    #[error("Transform '{declared_type}' rejected attribute '{attribute}': {message}")]
    TransformFailed { attribute: String, declared_type: String, message: String },
    #[error("Config error: {0}")]
    Config(String),
    #[error("JSON error: {0}")]
    Json(String),
    #[error("I/O error: {0}")]
    Io(String),
}

pub type Result<T> = std::result::Result<T, NormalizeError>;

// Helper conversions
impl From<config::ConfigError> for NormalizeError {
    fn from(e: config::ConfigError) -> Self { Self::Config(e.to_string()) }
}
impl From<serde_json::Error> for NormalizeError {
    fn from(e: serde_json::Error) -> Self { Self::Json(e.to_string()) }
}
impl From<std::io::Error> for NormalizeError {
    fn from(e: std::io::Error) -> Self { Self::Io(e.to_string()) }
}

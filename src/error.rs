use thiserror::Error;

#[derive(Error, Debug)]
pub enum SalesError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Missing column in {file}: {column}")]
    MissingColumn { file: String, column: String },

    #[error("Invalid {param}: '{value}' (expected {expected})")]
    InvalidParameter {
        param: &'static str,
        value: String,
        expected: String,
    },

    #[error("Settings error: {0}")]
    Settings(String),

    #[error("{0}")]
    Other(String),
}

impl SalesError {
    pub(crate) fn invalid(param: &'static str, value: impl Into<String>, expected: impl Into<String>) -> Self {
        Self::InvalidParameter {
            param,
            value: value.into(),
            expected: expected.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, SalesError>;

pub type SvgformResult<T> = Result<T, SvgformError>;

#[derive(thiserror::Error, Debug)]
pub enum SvgformError {
    #[error("document error: {0}")]
    Document(String),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("serialization error: {0}")]
    Serde(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl SvgformError {
    pub fn document(msg: impl Into<String>) -> Self {
        Self::Document(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

impl From<serde_json::Error> for SvgformError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serde(e.to_string())
    }
}

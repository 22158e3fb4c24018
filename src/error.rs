use thiserror::Error;

#[derive(Debug, Error)]
pub enum QuoteDocError {
    #[error("no item {index} on page {page}")]
    ItemOutOfRange { page: u32, index: usize },
    #[error("invalid document: {0}")]
    InvalidDocument(String),
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
    #[error("layout error: {0}")]
    Layout(String),
    #[error("raster error: {0}")]
    Raster(String),
    #[error("pdf assembly error: {0}")]
    Pdf(String),
    #[error("persistence error: {0}")]
    Persist(String),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<lopdf::Error> for QuoteDocError {
    fn from(value: lopdf::Error) -> Self {
        QuoteDocError::Pdf(value.to_string())
    }
}

pub type Result<T> = std::result::Result<T, QuoteDocError>;

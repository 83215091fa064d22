use thiserror::Error;

/// Errors surfaced by the I/O collaborators (decoding, persistence, uploads,
/// report rendering).
///
/// The merge core never produces one of these: extraction, filtering,
/// splitting, merging and reordering degrade to empty values instead.
#[derive(Debug, Error)]
pub enum OrderError {
    /// A single uploaded file could not be read or is not tabular.
    #[error("Error processing file {file}: {reason}")]
    Decode { file: String, reason: String },

    /// A save was attempted without the data it needs.
    #[error("{0}")]
    Validation(String),

    #[error("{0} not found")]
    NotFound(String),

    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("Template error: {0}")]
    Template(String),

    #[error("Image error: {0}")]
    Image(String),

    /// There is no merged table to export.
    #[error("No data available to export.")]
    EmptyReport,

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Codec(#[from] bincode::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),
}

impl OrderError {
    pub fn decode(file: &str, reason: impl ToString) -> Self {
        OrderError::Decode {
            file: file.to_string(),
            reason: reason.to_string(),
        }
    }
}

impl From<handlebars::RenderError> for OrderError {
    fn from(e: handlebars::RenderError) -> Self {
        OrderError::Template(e.to_string())
    }
}

impl From<handlebars::TemplateError> for OrderError {
    fn from(e: handlebars::TemplateError) -> Self {
        OrderError::Template(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, OrderError>;

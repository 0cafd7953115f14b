use thiserror::Error;

pub type Result<T> = std::result::Result<T, ClassifyError>;

#[derive(Error, Debug)]
pub enum ClassifyError {
    #[error("Missing column: {0}")]
    MissingColumn(String),

    #[error("No location information: expected a '{0}' column or one-hot columns prefixed '{1}'")]
    NoLocation(String, String),

    #[error("InvalidData: {0}")]
    InvalidData(String),

    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

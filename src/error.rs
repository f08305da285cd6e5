use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Debug, Diagnostic)]
pub enum PayRateError {
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Bad data: {0}")]
    #[diagnostic(code(payrates::bad_data))]
    BadData(String),
    #[error("Pay band {pay_band} is allocated to {}", offenders.join(", "))]
    #[diagnostic(
        code(payrates::in_use),
        help("change the pay band of these allocations before removing it")
    )]
    InUse {
        pay_band: String,
        offenders: Vec<String>,
    },
    #[error("Not found: {0}")]
    #[diagnostic(code(payrates::not_found))]
    NotFound(String),
    #[error("Validation error: {0}")]
    ValidationError(String),
    #[error("Internal error: {0}")]
    InternalError(Box<dyn std::error::Error + Send + Sync>),
}

#[cfg(feature = "storage-rocksdb")]
impl From<rocksdb::Error> for PayRateError {
    fn from(err: rocksdb::Error) -> Self {
        PayRateError::InternalError(Box::new(err))
    }
}

impl From<serde_json::Error> for PayRateError {
    fn from(err: serde_json::Error) -> Self {
        PayRateError::InternalError(Box::new(err))
    }
}

pub type Result<T> = std::result::Result<T, PayRateError>;

use thiserror::Error;

pub type RfResult<T> = Result<T, RfError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RfError {
    #[error("Non-finite numeric value for {what}: {value}")]
    NonFinite { what: &'static str, value: f64 },

    #[error("Sample ordinal must be 1-based, got {ordinal}")]
    ZeroOrdinal { ordinal: usize },
}

//! rf-operators: precomputed reduced operators for the online stage.
//!
//! The offline Galerkin projection is an external collaborator; this crate
//! only holds its output (matrices and the convective tensor), checks that the
//! shapes agree with the mode counts, and reads/writes the on-disk format.

pub mod modes;
pub mod operators;
pub mod persist;
pub mod tensor;

pub use modes::ModeCounts;
pub use operators::{PenaltyOperators, ReducedOperatorSet};
pub use persist::{FORMAT_VERSION, MatrixDef, OperatorFile, TensorDef, load_json, save_json};
pub use tensor::ConvectiveTensor;

pub type OperatorResult<T> = Result<T, OperatorError>;

#[derive(thiserror::Error, Debug)]
pub enum OperatorError {
    #[error("Dimension mismatch for {what}: expected {expected}, found {found}")]
    DimensionMismatch {
        what: String,
        expected: String,
        found: String,
    },

    #[error("Cannot truncate {what}: requested {requested} modes, only {available} available")]
    Truncation {
        what: &'static str,
        requested: usize,
        available: usize,
    },

    #[error("Unsupported operator file version: {version}")]
    UnsupportedVersion { version: u32 },

    #[error("Numeric error: {0}")]
    Numeric(#[from] rf_core::RfError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl OperatorError {
    pub(crate) fn shape(
        what: impl Into<String>,
        expected: (usize, usize),
        found: (usize, usize),
    ) -> Self {
        OperatorError::DimensionMismatch {
            what: what.into(),
            expected: format!("{}x{}", expected.0, expected.1),
            found: format!("{}x{}", found.0, found.1),
        }
    }
}

//! rf-results: online solution log, matrix export and run storage.

pub mod export;
pub mod hash;
pub mod log;
pub mod store;
pub mod types;

pub use export::{ExportFormat, export_log, render};
pub use hash::{compute_run_id, digest_bytes, digest_json_dir};
pub use log::{LogRow, OnlineSolutionLog};
pub use store::{RunStore, timestamp_now};
pub use types::*;

pub type ResultsResult<T> = Result<T, ResultsError>;

#[derive(thiserror::Error, Debug)]
pub enum ResultsError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Run not found: {run_id}")]
    RunNotFound { run_id: String },

    #[error("Row for sample {sample} has {found} coefficients, log holds {expected}")]
    RowWidth {
        sample: rf_core::SampleId,
        expected: usize,
        found: usize,
    },

    #[error("Sample {sample} already logged")]
    DuplicateSample { sample: rf_core::SampleId },

    #[error("Invalid export name '{name}'")]
    InvalidName { name: String },
}

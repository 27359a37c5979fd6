//! Error types for the rf-app service layer.

use std::path::PathBuf;

/// Application error type that wraps errors from the backend crates and
/// gives the CLI one error interface.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Config error: {0}")]
    Config(String),

    #[error("Failed to read config file: {path}")]
    ConfigFileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to write config file: {path}")]
    ConfigFileWrite {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Config validation failed: {0}")]
    Validation(String),

    #[error("Parameter file {path}, line {line}: {message}")]
    Parameters {
        path: PathBuf,
        line: usize,
        message: String,
    },

    #[error("Operator error: {0}")]
    Operators(String),

    #[error("Solver error: {0}")]
    Solver(String),

    #[error("Field error: {0}")]
    Fields(String),

    #[error("Results error: {0}")]
    Results(String),

    #[error("Run not found: {0}")]
    RunNotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for rf-app operations.
pub type AppResult<T> = Result<T, AppError>;

impl From<rf_operators::OperatorError> for AppError {
    fn from(err: rf_operators::OperatorError) -> Self {
        AppError::Operators(err.to_string())
    }
}

impl From<rf_solver::SolverError> for AppError {
    fn from(err: rf_solver::SolverError) -> Self {
        AppError::Solver(err.to_string())
    }
}

impl From<rf_fields::FieldError> for AppError {
    fn from(err: rf_fields::FieldError) -> Self {
        AppError::Fields(err.to_string())
    }
}

impl From<rf_results::ResultsError> for AppError {
    fn from(err: rf_results::ResultsError) -> Self {
        match err {
            rf_results::ResultsError::RunNotFound { run_id } => AppError::RunNotFound(run_id),
            other => AppError::Results(other.to_string()),
        }
    }
}

//! Error types for online solves.

use nalgebra::DVector;
use rf_operators::OperatorError;
use thiserror::Error;

/// Errors that can occur during an online reduced solve.
#[derive(Error, Debug, Clone)]
pub enum SolverError {
    /// Operator and coefficient shapes disagree: the offline and online
    /// stages are mis-paired. Not recoverable for any parameter point.
    #[error("Dimension mismatch for {what}: expected {expected}, found {found}")]
    DimensionMismatch {
        what: String,
        expected: usize,
        found: usize,
    },

    #[error("Singular Jacobian at Newton iteration {iteration}")]
    SingularJacobian { iteration: usize },

    /// The iteration cap was reached. `best` is the last iterate.
    #[error("Newton did not converge after {iterations} iterations (residual = {residual_norm:e})")]
    NonConvergence {
        iterations: usize,
        residual_norm: f64,
        best: DVector<f64>,
    },

    #[error("Missing operator: {what}")]
    MissingOperator { what: &'static str },

    #[error("Invalid parameter {what}: {value}")]
    InvalidParameter { what: &'static str, value: f64 },

    #[error("Numeric error: {what}")]
    Numeric { what: String },

    /// Rendered [`OperatorError`]; kept as text so `SolverError` stays `Clone`.
    #[error("Operator error: {0}")]
    Operators(String),
}

impl SolverError {
    pub(crate) fn dimension(what: impl Into<String>, expected: usize, found: usize) -> Self {
        SolverError::DimensionMismatch {
            what: what.into(),
            expected,
            found,
        }
    }

    /// Best available iterate of a failed solve, if the failure kept one.
    pub fn best_iterate(&self) -> Option<&DVector<f64>> {
        match self {
            SolverError::NonConvergence { best, .. } => Some(best),
            _ => None,
        }
    }

    /// Whether the failure belongs to one parameter point only, so an outer
    /// sweep may continue with the next point.
    pub fn is_point_local(&self) -> bool {
        matches!(
            self,
            SolverError::SingularJacobian { .. }
                | SolverError::NonConvergence { .. }
                | SolverError::Numeric { .. }
                | SolverError::InvalidParameter { .. }
        )
    }
}

impl From<OperatorError> for SolverError {
    fn from(e: OperatorError) -> Self {
        SolverError::Operators(e.to_string())
    }
}

pub type SolverResult<T> = Result<T, SolverError>;

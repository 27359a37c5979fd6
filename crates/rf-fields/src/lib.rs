//! rf-fields: full-order fields, mode bases and reconstruction.
//!
//! A field is a flat cell-wise array with a fixed number of components per
//! cell. Reduced coefficients map back to a field through a [`ModeBasis`]
//! and an optional lifting field carrying the inhomogeneous inlet data.

pub mod basis;
pub mod field;
pub mod reconstruct;
pub mod store;

pub use basis::ModeBasis;
pub use field::Field;
pub use reconstruct::{Reconstruction, project, reconstruct, reconstruct_state, scaled_lifting};
pub use store::{FieldStore, load_basis, read_field, read_fields_in, write_field};

use std::path::PathBuf;

pub type FieldResult<T> = Result<T, FieldError>;

#[derive(thiserror::Error, Debug)]
pub enum FieldError {
    #[error("Length mismatch for {what}: expected {expected}, found {found}")]
    LengthMismatch {
        what: String,
        expected: usize,
        found: usize,
    },

    #[error("Field '{name}' has {len} values, not a multiple of {components} components")]
    Layout {
        name: String,
        len: usize,
        components: usize,
    },

    #[error("Empty basis: {what}")]
    EmptyBasis { what: &'static str },

    #[error("Singular Gram matrix while projecting '{name}'")]
    SingularGram { name: String },

    #[error("Field not found: {path}")]
    NotFound { path: PathBuf },

    #[error("Numeric error: {0}")]
    Numeric(#[from] rf_core::RfError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl FieldError {
    pub(crate) fn length(what: impl Into<String>, expected: usize, found: usize) -> Self {
        FieldError::LengthMismatch {
            what: what.into(),
            expected,
            found,
        }
    }
}

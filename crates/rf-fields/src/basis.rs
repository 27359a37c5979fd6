//! Ordered sets of mode fields.

use crate::field::Field;
use crate::{FieldError, FieldResult};
use nalgebra::{DMatrix, DVector};

/// Mode fields sharing one layout. Mode `i` pairs with reduced coefficient `i`.
#[derive(Debug, Clone, PartialEq)]
pub struct ModeBasis {
    modes: Vec<Field>,
}

impl ModeBasis {
    pub fn new(modes: Vec<Field>) -> FieldResult<Self> {
        if let Some(first) = modes.first() {
            first.check_layout()?;
            for mode in &modes[1..] {
                mode.check_layout()?;
                if !first.compatible(mode) {
                    return Err(FieldError::length(
                        format!("mode '{}'", mode.name),
                        first.len(),
                        mode.len(),
                    ));
                }
            }
        }
        Ok(Self { modes })
    }

    pub fn len(&self) -> usize {
        self.modes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modes.is_empty()
    }

    pub fn modes(&self) -> &[Field] {
        &self.modes
    }

    pub fn mode(&self, i: usize) -> Option<&Field> {
        self.modes.get(i)
    }

    /// Values per mode, or `None` for an empty basis.
    pub fn field_len(&self) -> Option<usize> {
        self.modes.first().map(Field::len)
    }

    pub fn components(&self) -> Option<usize> {
        self.modes.first().map(|m| m.components)
    }

    /// Keep the first `n` modes.
    pub fn truncated(&self, n: usize) -> FieldResult<Self> {
        if n > self.modes.len() {
            return Err(FieldError::length("basis truncation", self.modes.len(), n));
        }
        Ok(Self {
            modes: self.modes[..n].to_vec(),
        })
    }

    /// Velocity block basis: `self` followed by the supremizer modes.
    pub fn chain(&self, other: &ModeBasis) -> FieldResult<Self> {
        let mut modes = self.modes.clone();
        modes.extend(other.modes.iter().cloned());
        Self::new(modes)
    }

    /// Snapshot matrix with one column per mode.
    pub fn to_matrix(&self) -> DMatrix<f64> {
        let rows = self.field_len().unwrap_or(0);
        let mut m = DMatrix::zeros(rows, self.modes.len());
        for (j, mode) in self.modes.iter().enumerate() {
            m.set_column(j, &DVector::from_column_slice(&mode.values));
        }
        m
    }

    /// Euclidean Gram matrix `M^T M`.
    pub fn gram(&self) -> DMatrix<f64> {
        let m = self.to_matrix();
        m.tr_mul(&m)
    }
}

//! Cell-wise discrete fields.

use crate::{FieldError, FieldResult};
use serde::{Deserialize, Serialize};

/// A discrete field: `components` values per cell, cell-major.
///
/// A velocity field on a 2D mesh has `components = 2` and stores
/// `[u0x, u0y, u1x, u1y, ...]`; a pressure field has `components = 1`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    pub components: usize,
    pub values: Vec<f64>,
}

impl Field {
    pub fn new(name: impl Into<String>, components: usize, values: Vec<f64>) -> FieldResult<Self> {
        let field = Self {
            name: name.into(),
            components,
            values,
        };
        field.check_layout()?;
        Ok(field)
    }

    pub fn zeros(name: impl Into<String>, components: usize, cells: usize) -> Self {
        Self {
            name: name.into(),
            components,
            values: vec![0.0; components * cells],
        }
    }

    /// Reject zero components, ragged lengths and non-finite values.
    pub fn check_layout(&self) -> FieldResult<()> {
        if self.components == 0 || self.values.len() % self.components != 0 {
            return Err(FieldError::Layout {
                name: self.name.clone(),
                len: self.values.len(),
                components: self.components,
            });
        }
        rf_core::ensure_all_finite(&self.values, "field value")?;
        Ok(())
    }

    pub fn n_cells(&self) -> usize {
        self.values.len() / self.components.max(1)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn renamed(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Whether `other` can be combined with `self` entry by entry.
    pub fn compatible(&self, other: &Field) -> bool {
        self.components == other.components && self.values.len() == other.values.len()
    }

    fn ensure_compatible(&self, other: &Field) -> FieldResult<()> {
        if self.components != other.components {
            return Err(FieldError::length(
                format!("components of '{}'", other.name),
                self.components,
                other.components,
            ));
        }
        if self.values.len() != other.values.len() {
            return Err(FieldError::length(
                format!("values of '{}'", other.name),
                self.values.len(),
                other.values.len(),
            ));
        }
        Ok(())
    }

    /// `self += alpha * other`.
    pub fn axpy(&mut self, alpha: f64, other: &Field) -> FieldResult<()> {
        self.ensure_compatible(other)?;
        for (a, b) in self.values.iter_mut().zip(&other.values) {
            *a += alpha * b;
        }
        Ok(())
    }

    pub fn dot(&self, other: &Field) -> FieldResult<f64> {
        self.ensure_compatible(other)?;
        Ok(self.values.iter().zip(&other.values).map(|(a, b)| a * b).sum())
    }

    pub fn l2_norm(&self) -> f64 {
        self.values.iter().map(|v| v * v).sum::<f64>().sqrt()
    }

    /// `||self - reference|| / ||reference||`, or the absolute error when the
    /// reference is zero.
    pub fn relative_error(&self, reference: &Field) -> FieldResult<f64> {
        let mut diff = self.clone();
        diff.axpy(-1.0, reference)?;
        let norm = reference.l2_norm();
        Ok(if norm > 0.0 {
            diff.l2_norm() / norm
        } else {
            diff.l2_norm()
        })
    }
}

//! On-disk operator format.
//!
//! One JSON document per operator set. Matrices are stored row-major with
//! explicit shapes so a mis-paired offline/online stage is caught on load,
//! before any Newton solve.

use crate::modes::ModeCounts;
use crate::operators::{PenaltyOperators, ReducedOperatorSet};
use crate::tensor::ConvectiveTensor;
use crate::{OperatorError, OperatorResult};
use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const FORMAT_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatrixDef {
    pub rows: usize,
    pub cols: usize,
    /// Row-major entries.
    pub data: Vec<f64>,
}

impl MatrixDef {
    pub fn from_matrix(m: &DMatrix<f64>) -> Self {
        // nalgebra is column-major; the transpose's storage is our row-major order.
        Self {
            rows: m.nrows(),
            cols: m.ncols(),
            data: m.transpose().as_slice().to_vec(),
        }
    }

    pub fn to_matrix(&self, what: &str) -> OperatorResult<DMatrix<f64>> {
        let Some(expected) = self.rows.checked_mul(self.cols) else {
            return Err(OperatorError::DimensionMismatch {
                what: what.to_string(),
                expected: "rows * cols that fits in usize".to_string(),
                found: format!("{}x{}", self.rows, self.cols),
            });
        };
        if self.data.len() != expected {
            return Err(OperatorError::DimensionMismatch {
                what: what.to_string(),
                expected: format!("{expected} entries"),
                found: format!("{} entries", self.data.len()),
            });
        }
        Ok(DMatrix::from_row_slice(self.rows, self.cols, &self.data))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TensorDef {
    pub n: usize,
    /// Entries in `(i, j, k)` row-major order.
    pub data: Vec<f64>,
}

/// Serialized form of a [`ReducedOperatorSet`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperatorFile {
    pub version: u32,
    pub modes: ModeCounts,
    pub n_bc: usize,
    pub b: MatrixDef,
    pub k: MatrixDef,
    pub p: MatrixDef,
    pub c: TensorDef,
    pub bc1: MatrixDef,
    pub bc2: MatrixDef,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bc3: Option<MatrixDef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bc4: Option<MatrixDef>,
}

impl OperatorFile {
    pub fn from_operators(ops: &ReducedOperatorSet) -> Self {
        Self {
            version: FORMAT_VERSION,
            modes: ops.modes(),
            n_bc: ops.n_bc(),
            b: MatrixDef::from_matrix(ops.b()),
            k: MatrixDef::from_matrix(ops.k()),
            p: MatrixDef::from_matrix(ops.p()),
            c: TensorDef {
                n: ops.c().dim(),
                data: ops.c().as_slice().to_vec(),
            },
            bc1: MatrixDef::from_matrix(ops.bc1()),
            bc2: MatrixDef::from_matrix(ops.bc2()),
            bc3: ops.penalty().map(|pen| MatrixDef::from_matrix(&pen.bc3)),
            bc4: ops.penalty().map(|pen| MatrixDef::from_matrix(&pen.bc4)),
        }
    }

    pub fn into_operators(self) -> OperatorResult<ReducedOperatorSet> {
        if self.version > FORMAT_VERSION {
            return Err(OperatorError::UnsupportedVersion {
                version: self.version,
            });
        }

        let ops = ReducedOperatorSet::new(
            self.modes,
            self.n_bc,
            self.b.to_matrix("B")?,
            self.k.to_matrix("K")?,
            self.p.to_matrix("P")?,
            ConvectiveTensor::new(self.c.n, self.c.data)?,
            self.bc1.to_matrix("BC1")?,
            self.bc2.to_matrix("BC2")?,
        )?;

        match (self.bc3, self.bc4) {
            (Some(bc3), Some(bc4)) => ops.with_penalty(PenaltyOperators {
                bc3: bc3.to_matrix("BC3")?,
                bc4: bc4.to_matrix("BC4")?,
            }),
            (None, None) => Ok(ops),
            (bc3, _) => Err(OperatorError::DimensionMismatch {
                what: "penalty operators".to_string(),
                expected: "both BC3 and BC4".to_string(),
                found: if bc3.is_some() {
                    "BC3 only".to_string()
                } else {
                    "BC4 only".to_string()
                },
            }),
        }
    }
}

pub fn load_json(path: &Path) -> OperatorResult<ReducedOperatorSet> {
    let content = std::fs::read_to_string(path)?;
    let file: OperatorFile = serde_json::from_str(&content)?;
    let ops = file.into_operators()?;
    tracing::info!(
        path = %path.display(),
        modes = %ops.modes(),
        n_bc = ops.n_bc(),
        "loaded reduced operators"
    );
    Ok(ops)
}

pub fn save_json(path: &Path, ops: &ReducedOperatorSet) -> OperatorResult<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }
    let content = serde_json::to_string_pretty(&OperatorFile::from_operators(ops))?;
    std::fs::write(path, content)?;
    Ok(())
}

//! Append-only record of online solutions.

use crate::{ResultsError, ResultsResult};
use nalgebra::DMatrix;
use rf_core::SampleId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogRow {
    pub sample: SampleId,
    pub coefficients: Vec<f64>,
    pub converged: bool,
}

/// Reduced coefficients of every solved sample, in insertion order.
///
/// All rows share one coefficient count, fixed by the first row.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OnlineSolutionLog {
    rows: Vec<LogRow>,
}

impl OnlineSolutionLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(
        &mut self,
        sample: SampleId,
        coefficients: &[f64],
        converged: bool,
    ) -> ResultsResult<()> {
        self.push_row(LogRow {
            sample,
            coefficients: coefficients.to_vec(),
            converged,
        })
    }

    pub fn push_row(&mut self, row: LogRow) -> ResultsResult<()> {
        if let Some(expected) = self.width()
            && row.coefficients.len() != expected
        {
            return Err(ResultsError::RowWidth {
                sample: row.sample,
                expected,
                found: row.coefficients.len(),
            });
        }
        if self.rows.iter().any(|r| r.sample == row.sample) {
            return Err(ResultsError::DuplicateSample { sample: row.sample });
        }
        self.rows.push(row);
        Ok(())
    }

    /// Coefficients per row, `None` while empty.
    pub fn width(&self) -> Option<usize> {
        self.rows.first().map(|r| r.coefficients.len())
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[LogRow] {
        &self.rows
    }

    pub fn get(&self, sample: SampleId) -> Option<&LogRow> {
        self.rows.iter().find(|r| r.sample == sample)
    }

    pub fn converged_count(&self) -> usize {
        self.rows.iter().filter(|r| r.converged).count()
    }

    pub fn sort_by_sample(&mut self) {
        self.rows.sort_by_key(|r| r.sample);
    }

    /// Table with the 1-based sample index in column 0 and the coefficients
    /// after it.
    pub fn to_matrix(&self) -> DMatrix<f64> {
        let width = self.width().unwrap_or(0);
        DMatrix::from_fn(self.rows.len(), width + 1, |i, j| {
            let row = &self.rows[i];
            if j == 0 {
                f64::from(row.sample.ordinal())
            } else {
                row.coefficients[j - 1]
            }
        })
    }
}

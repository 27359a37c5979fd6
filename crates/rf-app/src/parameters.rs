//! Parameter matrix files: one sample per row, viscosity in column 0.

use std::path::Path;

use crate::error::{AppError, AppResult};

#[derive(Debug, Clone, PartialEq)]
pub struct ParameterMatrix {
    rows: Vec<Vec<f64>>,
}

impl ParameterMatrix {
    pub fn new(rows: Vec<Vec<f64>>) -> AppResult<Self> {
        if let Some(first) = rows.first() {
            if first.is_empty() {
                return Err(AppError::InvalidInput(
                    "parameter rows need at least one column".to_string(),
                ));
            }
            if let Some((i, row)) = rows.iter().enumerate().find(|(_, r)| r.len() != first.len()) {
                return Err(AppError::InvalidInput(format!(
                    "parameter row {} has {} columns, expected {}",
                    i + 1,
                    row.len(),
                    first.len()
                )));
            }
        }
        Ok(Self { rows })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn columns(&self) -> usize {
        self.rows.first().map_or(0, Vec::len)
    }

    pub fn rows(&self) -> &[Vec<f64>] {
        &self.rows
    }

    /// Viscosity of the sample at 0-based `row`.
    pub fn viscosity(&self, row: usize) -> Option<f64> {
        self.rows.get(row).and_then(|r| r.first().copied())
    }

    pub fn viscosities(&self) -> impl Iterator<Item = f64> + '_ {
        self.rows.iter().map(|r| r[0])
    }
}

/// Parse whitespace-separated numbers. `#` starts a comment; blank lines are
/// skipped. `path` is only used in error messages.
pub fn parse_parameter_matrix(content: &str, path: &Path) -> AppResult<ParameterMatrix> {
    let mut rows: Vec<Vec<f64>> = Vec::new();
    for (idx, raw) in content.lines().enumerate() {
        let line = raw.split('#').next().unwrap_or("").trim();
        if line.is_empty() {
            continue;
        }
        let err = |message: String| AppError::Parameters {
            path: path.to_path_buf(),
            line: idx + 1,
            message,
        };

        let mut row = Vec::new();
        for token in line.split(|c: char| c.is_whitespace() || c == ',').filter(|t| !t.is_empty()) {
            let value: f64 = token
                .parse()
                .map_err(|_| err(format!("'{token}' is not a number")))?;
            if !value.is_finite() {
                return Err(err(format!("non-finite value '{token}'")));
            }
            row.push(value);
        }
        if let Some(first) = rows.first()
            && first.len() != row.len()
        {
            return Err(err(format!(
                "{} columns, expected {}",
                row.len(),
                first.len()
            )));
        }
        rows.push(row);
    }
    ParameterMatrix::new(rows)
}

pub fn read_parameter_matrix(path: &Path) -> AppResult<ParameterMatrix> {
    let content = std::fs::read_to_string(path).map_err(|e| AppError::Parameters {
        path: path.to_path_buf(),
        line: 0,
        message: e.to_string(),
    })?;
    let matrix = parse_parameter_matrix(&content, path)?;
    tracing::info!(path = %path.display(), samples = matrix.len(), "read parameter matrix");
    Ok(matrix)
}

//! Plain-text matrix export readable by numpy, MATLAB/Octave and Eigen.

use crate::log::OnlineSolutionLog;
use crate::{ResultsError, ResultsResult};
use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    /// `<name>_mat.py`: `import numpy as np` and `<name> = np.array([...])`
    Python,
    /// `<name>_mat.m`: `<name> = [ ... ];`
    Matlab,
    /// `<name>_mat.txt`: whitespace-separated rows
    Eigen,
}

impl ExportFormat {
    pub const ALL: [ExportFormat; 3] = [ExportFormat::Python, ExportFormat::Matlab, ExportFormat::Eigen];

    pub fn as_str(&self) -> &'static str {
        match self {
            ExportFormat::Python => "python",
            ExportFormat::Matlab => "matlab",
            ExportFormat::Eigen => "eigen",
        }
    }

    pub fn file_name(&self, name: &str) -> String {
        let ext = match self {
            ExportFormat::Python => "py",
            ExportFormat::Matlab => "m",
            ExportFormat::Eigen => "txt",
        };
        format!("{name}_mat.{ext}")
    }
}

impl std::str::FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "python" => Ok(ExportFormat::Python),
            "matlab" => Ok(ExportFormat::Matlab),
            "eigen" => Ok(ExportFormat::Eigen),
            other => Err(format!("unknown export format '{other}'")),
        }
    }
}

fn check_name(name: &str) -> ResultsResult<()> {
    let mut chars = name.chars();
    let valid = chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_');
    if valid {
        Ok(())
    } else {
        Err(ResultsError::InvalidName {
            name: name.to_string(),
        })
    }
}

fn format_value(v: f64, format: ExportFormat) -> String {
    if v.is_nan() {
        return match format {
            ExportFormat::Python => "np.nan".into(),
            ExportFormat::Matlab => "NaN".into(),
            ExportFormat::Eigen => "nan".into(),
        };
    }
    if v.is_infinite() {
        let inf = match format {
            ExportFormat::Python => "np.inf",
            ExportFormat::Matlab => "Inf",
            ExportFormat::Eigen => "inf",
        };
        return if v < 0.0 { format!("-{inf}") } else { inf.into() };
    }
    if v.fract() == 0.0 && v.abs() < 1e15 {
        format!("{v}")
    } else {
        format!("{v:e}")
    }
}

fn row_values(m: &DMatrix<f64>, i: usize, format: ExportFormat) -> Vec<String> {
    m.row(i).iter().map(|&v| format_value(v, format)).collect()
}

/// Render `m` as the file contents for `format`, bound to variable `name`.
pub fn render(m: &DMatrix<f64>, name: &str, format: ExportFormat) -> ResultsResult<String> {
    check_name(name)?;
    let rows = 0..m.nrows();
    let out = match format {
        ExportFormat::Python => {
            let body = rows
                .map(|i| format!("[{}]", row_values(m, i, format).join(", ")))
                .collect::<Vec<_>>()
                .join(",\n    ");
            format!("import numpy as np\n{name} = np.array([\n    {body}\n])\n")
        }
        ExportFormat::Matlab => {
            let body = rows
                .map(|i| row_values(m, i, format).join(" "))
                .collect::<Vec<_>>()
                .join(";\n");
            format!("{name} = [\n{body}\n];\n")
        }
        ExportFormat::Eigen => {
            let mut body = String::new();
            for i in rows {
                body.push_str(&row_values(m, i, format).join(" "));
                body.push('\n');
            }
            body
        }
    };
    Ok(out)
}

/// Write the log table in each of `formats` under `dir`.
pub fn export_log(
    log: &OnlineSolutionLog,
    dir: &Path,
    name: &str,
    formats: &[ExportFormat],
) -> ResultsResult<Vec<PathBuf>> {
    check_name(name)?;
    fs::create_dir_all(dir)?;
    let m = log.to_matrix();
    let mut written = Vec::with_capacity(formats.len());
    for &format in formats {
        let path = dir.join(format.file_name(name));
        fs::write(&path, render(&m, name, format)?)?;
        tracing::info!(path = %path.display(), format = format.as_str(), rows = m.nrows(), "exported solution log");
        written.push(path);
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> DMatrix<f64> {
        DMatrix::from_row_slice(2, 3, &[1.0, 0.5, -0.25, 2.0, 1e-20, 3.0])
    }

    #[test]
    fn python_rendering() {
        let text = render(&table(), "red_coeff", ExportFormat::Python).unwrap();
        assert!(text.starts_with("import numpy as np\nred_coeff = np.array(["));
        assert!(text.contains("[1, 5e-1, -2.5e-1]"));
        assert!(text.contains("[2, 1e-20, 3]"));
    }

    #[test]
    fn matlab_rendering() {
        let text = render(&table(), "red_coeff", ExportFormat::Matlab).unwrap();
        assert_eq!(text, "red_coeff = [\n1 5e-1 -2.5e-1;\n2 1e-20 3\n];\n");
    }

    #[test]
    fn eigen_rendering_has_one_line_per_row() {
        let text = render(&table(), "red_coeff", ExportFormat::Eigen).unwrap();
        assert_eq!(text.lines().count(), 2);
        let parsed: Vec<f64> = text
            .split_whitespace()
            .map(|t| t.parse().unwrap())
            .collect();
        assert_eq!(parsed, table().transpose().as_slice().to_vec());
    }

    #[test]
    fn non_finite_values_spelled_per_format() {
        let m = DMatrix::from_row_slice(1, 2, &[f64::NAN, f64::NEG_INFINITY]);
        assert!(render(&m, "x", ExportFormat::Python).unwrap().contains("[np.nan, -np.inf]"));
        assert!(render(&m, "x", ExportFormat::Matlab).unwrap().contains("NaN -Inf"));
    }

    #[test]
    fn names_must_be_identifiers() {
        assert!(render(&table(), "1abc", ExportFormat::Eigen).is_err());
        assert!(render(&table(), "red-coeff", ExportFormat::Eigen).is_err());
        assert_eq!(ExportFormat::Matlab.file_name("red_coeff"), "red_coeff_mat.m");
        assert_eq!("Python".parse::<ExportFormat>().unwrap(), ExportFormat::Python);
    }
}

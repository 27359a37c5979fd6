//! Query helpers for operator files and stored logs.

use std::path::Path;

use rf_operators::ModeCounts;
use rf_results::OnlineSolutionLog;

use crate::error::{AppError, AppResult};

/// Shape summary of an operator file.
#[derive(Debug, Clone)]
pub struct OperatorSummary {
    pub modes: ModeCounts,
    pub n_bc: usize,
    pub size: usize,
    pub has_penalty: bool,
    /// Whether the convective tensor vanishes (Stokes-like operators).
    pub linear: bool,
}

pub fn inspect_operators(path: &Path) -> AppResult<OperatorSummary> {
    let ops = rf_operators::load_json(path)?;
    Ok(OperatorSummary {
        modes: ops.modes(),
        n_bc: ops.n_bc(),
        size: ops.size(),
        has_penalty: ops.penalty().is_some(),
        linear: ops.c().is_zero(),
    })
}

/// Summary of a solution log.
#[derive(Debug, Clone)]
pub struct LogSummary {
    pub rows: usize,
    pub converged: usize,
    pub coefficients: usize,
    /// Largest absolute coefficient over all rows.
    pub max_abs_coefficient: f64,
}

pub fn get_log_summary(log: &OnlineSolutionLog) -> AppResult<LogSummary> {
    let coefficients = log
        .width()
        .ok_or_else(|| AppError::InvalidInput("No rows in log".to_string()))?;
    let max_abs_coefficient = log
        .rows()
        .iter()
        .flat_map(|r| r.coefficients.iter())
        .fold(0.0_f64, |m, v| m.max(v.abs()));
    Ok(LogSummary {
        rows: log.len(),
        converged: log.converged_count(),
        coefficients,
        max_abs_coefficient,
    })
}

/// Coefficient `index` across all rows, as `(sample ordinal, value)` pairs.
pub fn extract_coefficient_series(
    log: &OnlineSolutionLog,
    index: usize,
) -> AppResult<Vec<(u32, f64)>> {
    let width = log.width().unwrap_or(0);
    if index >= width {
        return Err(AppError::InvalidInput(format!(
            "coefficient {index} out of range (log has {width})"
        )));
    }
    Ok(log
        .rows()
        .iter()
        .map(|r| (r.sample.ordinal(), r.coefficients[index]))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rf_core::SampleId;

    fn log() -> OnlineSolutionLog {
        let mut log = OnlineSolutionLog::new();
        log.push(SampleId::from_row(0), &[0.5, -2.0], true).unwrap();
        log.push(SampleId::from_row(1), &[1.0, 0.25], false).unwrap();
        log
    }

    #[test]
    fn summary_counts_rows() {
        let summary = get_log_summary(&log()).unwrap();
        assert_eq!(summary.rows, 2);
        assert_eq!(summary.converged, 1);
        assert_eq!(summary.coefficients, 2);
        assert_eq!(summary.max_abs_coefficient, 2.0);
        assert!(get_log_summary(&OnlineSolutionLog::new()).is_err());
    }

    #[test]
    fn coefficient_series_by_sample() {
        let series = extract_coefficient_series(&log(), 1).unwrap();
        assert_eq!(series, vec![(1, -2.0), (2, 0.25)]);
        assert!(extract_coefficient_series(&log(), 2).is_err());
    }
}

//! Result data types.

use rf_core::SampleId;
use rf_core::timing::SweepTimings;
use rf_operators::ModeCounts;
use serde::{Deserialize, Serialize};

pub type RunId = String;

/// Summary of one parameter sweep, written next to its exports.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepManifest {
    pub run_id: RunId,
    /// RFC 3339 creation time
    pub timestamp: String,
    pub solver_version: String,
    pub physics: String,
    pub boundary: String,
    pub modes: ModeCounts,
    pub n_samples: usize,
    pub n_converged: usize,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<PointFailure>,
    #[serde(default)]
    pub timings: SweepTimings,
    /// Export file names relative to the run directory
    #[serde(default)]
    pub exports: Vec<String>,
}

/// A sample that did not produce a log row, or produced an unconverged one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointFailure {
    pub sample: SampleId,
    pub nu: f64,
    pub kind: FailureKind,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    SingularJacobian,
    NonConvergence,
    Numeric,
    InvalidParameter,
}

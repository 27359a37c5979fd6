use std::fs;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use rf_core::SampleId;
use rf_core::timing::SweepTimings;
use rf_operators::ModeCounts;
use rf_results::{
    ExportFormat, FailureKind, OnlineSolutionLog, PointFailure, ResultsError, RunStore,
    SweepManifest, export_log, timestamp_now,
};

fn unique_temp_dir(prefix: &str) -> PathBuf {
    let mut dir = std::env::temp_dir();
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    dir.push(format!("{}_{}", prefix, nanos));
    dir
}

fn twenty_sample_log() -> OnlineSolutionLog {
    let mut log = OnlineSolutionLog::new();
    for k in 0..20 {
        let coefficients: Vec<f64> = (0..15).map(|i| (k * 15 + i) as f64 * 1e-3).collect();
        log.push(SampleId::from_row(k), &coefficients, k != 7)
            .unwrap();
    }
    log
}

fn manifest(run_id: &str) -> SweepManifest {
    SweepManifest {
        run_id: run_id.to_string(),
        timestamp: timestamp_now(),
        solver_version: "0.1.0".to_string(),
        physics: "steady_ns".to_string(),
        boundary: "lifting".to_string(),
        modes: ModeCounts::new(5, 5, 5),
        n_samples: 20,
        n_converged: 19,
        failures: vec![PointFailure {
            sample: SampleId::from_row(7),
            nu: 0.045,
            kind: FailureKind::NonConvergence,
            message: "kept best iterate".to_string(),
        }],
        timings: SweepTimings::default(),
        exports: Vec::new(),
    }
}

#[test]
fn save_list_load_roundtrip() {
    let root = unique_temp_dir("rf_results_store");
    let store = RunStore::new(root.clone()).expect("failed to create run store");

    let log = twenty_sample_log();
    let mut manifest = manifest("run-123");
    let written = export_log(
        &log,
        &store.run_dir("run-123"),
        "red_coeff",
        &ExportFormat::ALL,
    )
    .expect("failed to export log");
    manifest.exports = written
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(
        manifest.exports,
        vec!["red_coeff_mat.py", "red_coeff_mat.m", "red_coeff_mat.txt"]
    );

    let run_dir = store
        .save_run(&manifest, &log)
        .expect("failed to save run");
    assert!(store.has_run("run-123"));

    let runs = store.list_runs().expect("failed to list runs");
    assert_eq!(runs.len(), 1);
    assert_eq!(runs[0].failures.len(), 1);

    let loaded = store.load_log("run-123").expect("failed to load log");
    assert_eq!(loaded, log);
    assert!(!loaded.get(SampleId::from_row(7)).unwrap().converged);

    // 20 rows of 1 + 15 columns, sample index first.
    let eigen = fs::read_to_string(run_dir.join("red_coeff_mat.txt")).unwrap();
    let rows: Vec<Vec<f64>> = eigen
        .lines()
        .map(|l| l.split_whitespace().map(|t| t.parse().unwrap()).collect())
        .collect();
    assert_eq!(rows.len(), 20);
    for (k, row) in rows.iter().enumerate() {
        assert_eq!(row.len(), 16);
        assert_eq!(row[0], (k + 1) as f64);
    }

    let python = fs::read_to_string(run_dir.join("red_coeff_mat.py")).unwrap();
    assert!(python.starts_with("import numpy as np\nred_coeff = np.array(["));
    let matlab = fs::read_to_string(run_dir.join("red_coeff_mat.m")).unwrap();
    assert!(matlab.trim_end().ends_with("];"));
    assert_eq!(matlab.matches(';').count(), 20);

    store.delete_run("run-123").unwrap();
    assert!(matches!(
        store.load_manifest("run-123"),
        Err(ResultsError::RunNotFound { .. })
    ));
    fs::remove_dir_all(root).ok();
}

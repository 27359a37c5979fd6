//! Temporary sweep cases on disk.
#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use nalgebra::DMatrix;
use rf_fields::{Field, write_field};
use rf_operators::{ConvectiveTensor, ModeCounts, ReducedOperatorSet, save_json};

pub fn unique_temp_dir(prefix: &str) -> PathBuf {
    let mut dir = std::env::temp_dir();
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    dir.push(format!("{}_{}", prefix, nanos));
    fs::create_dir_all(&dir).expect("failed to create temp dir");
    dir
}

/// Five velocity, five supremizer, five pressure modes; two inlet
/// coefficients; mildly nonlinear with `P = K^T`.
pub fn operators(c_scale: f64) -> ReducedOperatorSet {
    let modes = ModeCounts::new(5, 5, 5);
    let n_u = modes.n_u();
    let n_p = modes.n_p();
    let b = DMatrix::from_fn(n_u, n_u, |i, j| {
        if i == j {
            1.0
        } else {
            0.05 / (1.0 + i.abs_diff(j) as f64)
        }
    });
    let k = DMatrix::from_fn(n_u, n_p, |i, j| if i == j + 2 { 1.0 } else { 0.0 });
    let c = ConvectiveTensor::from_fn(n_u, |i, j, k| {
        c_scale * (((i + 2 * j + 3 * k) % 7) as f64 - 3.0)
    });
    let bc1 = DMatrix::from_fn(n_u, 2, |i, j| {
        1e-3 * ((i % 3) as f64 + 1.0) * if j == 0 { 1.0 } else { 0.5 }
    });
    let bc2 = DMatrix::from_fn(n_u, 2, |i, j| 1e-3 * (((i + j) % 4) as f64 + 1.0));
    ReducedOperatorSet::new(modes, 2, b, k.clone(), k.transpose(), c, bc1, bc2)
        .expect("fixture operators are consistent")
}

pub fn singular_operators() -> ReducedOperatorSet {
    let modes = ModeCounts::new(5, 5, 5);
    let bc2 = DMatrix::from_element(10, 2, 1e-3);
    ReducedOperatorSet::new(
        modes,
        2,
        DMatrix::zeros(10, 10),
        DMatrix::zeros(10, 5),
        DMatrix::zeros(5, 10),
        ConvectiveTensor::zeros(10),
        DMatrix::zeros(10, 2),
        bc2,
    )
    .expect("fixture operators are consistent")
}

/// Twenty viscosities, one per line, with a header comment.
pub fn par_text() -> String {
    let mut text = String::from("# nu\n");
    for k in 0..20 {
        text.push_str(&format!("{}\n", 0.01 + 0.005 * k as f64));
    }
    text
}

/// Write `operators.json`, `par` and `sweep.yaml` (with `extra` appended)
/// into a fresh directory and return the config path.
pub fn write_case(prefix: &str, ops: &ReducedOperatorSet, extra: &str) -> PathBuf {
    let dir = unique_temp_dir(prefix);
    save_json(&dir.join("Matrices").join("operators.json"), ops).expect("failed to save operators");
    fs::write(dir.join("par"), par_text()).expect("failed to write par");
    let config = format!(
        "operators: Matrices/operators.json\nparameters: par\noutput: {{ dir: ITHACAoutput }}\n{extra}"
    );
    let path = dir.join("sweep.yaml");
    fs::write(&path, config).expect("failed to write config");
    path
}

/// Mode fields on `cells` scalar cells: mode `i` of a set is the unit
/// vector at cell `offset + i`.
pub fn write_modes(dir: &Path, prefix: &str, count: usize, offset: usize, cells: usize) {
    for i in 0..count {
        let mut field = Field::zeros(format!("{prefix}{i}"), 1, cells);
        field.values[offset + i] = 1.0;
        write_field(&dir.join(format!("{prefix}_{i:03}.json")), &field).expect("failed to write mode");
    }
}

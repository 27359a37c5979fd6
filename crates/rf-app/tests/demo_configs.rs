//! The shipped demo cases must stay loadable.

use std::path::PathBuf;

use rf_app::{BoundaryDef, inspect_operators, load_config, read_parameter_matrix, validate_config};

fn demo_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../demos/steady_ns")
}

#[test]
fn demo_configs_validate() {
    let dir = demo_dir();
    if !dir.exists() {
        eprintln!("skipping: {} not found", dir.display());
        return;
    }

    for name in ["sweep.yaml", "sweep_penalty.yaml"] {
        let config = load_config(&dir.join(name)).unwrap();
        validate_config(&config).unwrap();
        let params = read_parameter_matrix(&config.parameters).unwrap();
        assert_eq!(params.len(), 20);
        assert_eq!(config.inlet_velocity, vec![1.0, 0.0]);
    }

    let penalty = load_config(&dir.join("sweep_penalty.yaml")).unwrap();
    assert_eq!(penalty.boundary, BoundaryDef::Penalty { tau: 10.0 });
}

#[test]
fn demo_operators_carry_penalty_terms() {
    let path = demo_dir().join("Matrices/operators.json");
    if !path.exists() {
        eprintln!("skipping: {} not found", path.display());
        return;
    }

    let summary = inspect_operators(&path).unwrap();
    assert_eq!(summary.size, 15);
    assert_eq!(summary.n_bc, 2);
    assert!(summary.has_penalty);
    assert!(!summary.linear);
}

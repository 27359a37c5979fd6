//! Content-based hashing for run IDs.

use std::path::Path;

use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::ResultsResult;

/// Hex sha256 of raw bytes.
pub fn digest_bytes(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}

/// Digest of every `.json` file directly inside `dir`, by name and content.
///
/// Files are visited in name order so the digest does not depend on the
/// directory listing order.
pub fn digest_json_dir(dir: &Path) -> ResultsResult<String> {
    let mut paths: Vec<_> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.is_file() && p.extension().is_some_and(|ext| ext == "json"))
        .collect();
    paths.sort();

    let mut hasher = Sha256::new();
    for path in paths {
        if let Some(name) = path.file_name() {
            hasher.update(name.to_string_lossy().as_bytes());
        }
        hasher.update(b"\0");
        hasher.update(std::fs::read(&path)?);
        hasher.update(b"\0");
    }
    Ok(format!("{:x}", hasher.finalize()))
}

/// Hash of the sweep definition, the digests of the files it points to, the
/// parameter matrix and the solver version.
///
/// Identical inputs map to the same run directory. The config only names its
/// input files, so `input_digests` must carry their contents for a rewritten
/// operator file or basis to yield a new run.
pub fn compute_run_id<C: Serialize>(
    config: &C,
    input_digests: &[String],
    parameters: &[Vec<f64>],
    solver_version: &str,
) -> String {
    let mut hasher = Sha256::new();

    let config_json = serde_json::to_string(config).unwrap_or_default();
    hasher.update(config_json.as_bytes());

    for digest in input_digests {
        hasher.update(digest.as_bytes());
        hasher.update(b"\n");
    }

    for row in parameters {
        for v in row {
            hasher.update(v.to_le_bytes());
        }
        hasher.update(b"\n");
    }

    hasher.update(solver_version.as_bytes());

    let result = hasher.finalize();
    format!("{:x}", result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize)]
    struct Def {
        physics: &'static str,
        tolerance: f64,
    }

    #[test]
    fn hash_stability() {
        let def = Def {
            physics: "steady_ns",
            tolerance: 1e-6,
        };
        let params = vec![vec![0.01], vec![0.02]];
        assert_eq!(
            compute_run_id(&def, &[], &params, "v1"),
            compute_run_id(&def, &[], &params, "v1")
        );
        assert_eq!(compute_run_id(&def, &[], &params, "v1").len(), 64);
    }

    #[test]
    fn hash_differs_for_different_inputs() {
        let def = Def {
            physics: "steady_ns",
            tolerance: 1e-6,
        };
        let other = Def {
            physics: "steady_stokes",
            tolerance: 1e-6,
        };
        let params = vec![vec![0.01]];
        let base = compute_run_id(&def, &[], &params, "v1");
        assert_ne!(base, compute_run_id(&other, &[], &params, "v1"));
        assert_ne!(base, compute_run_id(&def, &[], &[vec![0.02]], "v1"));
        assert_ne!(base, compute_run_id(&def, &[], &params, "v2"));
    }

    #[test]
    fn input_contents_change_the_id() {
        let def = Def {
            physics: "steady_ns",
            tolerance: 1e-6,
        };
        let params = vec![vec![0.01]];
        let old = vec![digest_bytes(b"operators v1")];
        let new = vec![digest_bytes(b"operators v2")];
        assert_ne!(
            compute_run_id(&def, &old, &params, "v1"),
            compute_run_id(&def, &new, &params, "v1")
        );
    }

    #[test]
    fn json_dir_digest_tracks_contents() {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos();
        let dir = std::env::temp_dir().join(format!("rf_results_digest_{nanos}"));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("U_000.json"), "[1.0]").unwrap();
        std::fs::write(dir.join("notes.txt"), "ignored").unwrap();
        let first = digest_json_dir(&dir).unwrap();

        std::fs::write(dir.join("notes.txt"), "still ignored").unwrap();
        assert_eq!(digest_json_dir(&dir).unwrap(), first);

        std::fs::write(dir.join("U_000.json"), "[2.0]").unwrap();
        assert_ne!(digest_json_dir(&dir).unwrap(), first);

        let _ = std::fs::remove_dir_all(dir);
    }
}

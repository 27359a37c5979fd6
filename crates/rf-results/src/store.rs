//! Run storage API.

use crate::log::OnlineSolutionLog;
use crate::types::SweepManifest;
use crate::{ResultsError, ResultsResult};
use std::fs;
use std::path::{Path, PathBuf};

/// Sweep runs under `<root>/<run_id>/`: `manifest.json`, `log.json` and the
/// exported matrices.
#[derive(Debug, Clone)]
pub struct RunStore {
    root_dir: PathBuf,
}

impl RunStore {
    pub fn new(root_dir: PathBuf) -> ResultsResult<Self> {
        if !root_dir.exists() {
            fs::create_dir_all(&root_dir)?;
        }
        Ok(Self { root_dir })
    }

    pub fn root(&self) -> &Path {
        &self.root_dir
    }

    pub fn run_dir(&self, run_id: &str) -> PathBuf {
        self.root_dir.join(run_id)
    }

    pub fn has_run(&self, run_id: &str) -> bool {
        self.run_dir(run_id).join("manifest.json").exists()
    }

    /// Persist the manifest and the log. Exports are written separately with
    /// [`crate::export_log`] into [`Self::run_dir`].
    pub fn save_run(
        &self,
        manifest: &SweepManifest,
        log: &OnlineSolutionLog,
    ) -> ResultsResult<PathBuf> {
        let run_dir = self.run_dir(&manifest.run_id);
        fs::create_dir_all(&run_dir)?;

        fs::write(run_dir.join("log.json"), serde_json::to_string_pretty(log)?)?;
        fs::write(
            run_dir.join("manifest.json"),
            serde_json::to_string_pretty(manifest)?,
        )?;
        tracing::info!(run_id = %manifest.run_id, dir = %run_dir.display(), "saved sweep run");
        Ok(run_dir)
    }

    pub fn load_manifest(&self, run_id: &str) -> ResultsResult<SweepManifest> {
        let manifest_path = self.run_dir(run_id).join("manifest.json");

        if !manifest_path.exists() {
            return Err(ResultsError::RunNotFound {
                run_id: run_id.to_string(),
            });
        }

        let content = fs::read_to_string(manifest_path)?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn load_log(&self, run_id: &str) -> ResultsResult<OnlineSolutionLog> {
        let log_path = self.run_dir(run_id).join("log.json");

        if !log_path.exists() {
            return Err(ResultsError::RunNotFound {
                run_id: run_id.to_string(),
            });
        }

        let content = fs::read_to_string(log_path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Manifests of every stored run, newest first.
    pub fn list_runs(&self) -> ResultsResult<Vec<SweepManifest>> {
        let mut runs = Vec::new();

        for entry in fs::read_dir(&self.root_dir)? {
            let entry = entry?;
            if entry.path().is_dir() {
                let run_id = entry.file_name().to_string_lossy().to_string();
                if let Ok(manifest) = self.load_manifest(&run_id) {
                    runs.push(manifest);
                }
            }
        }

        runs.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Ok(runs)
    }

    pub fn delete_run(&self, run_id: &str) -> ResultsResult<()> {
        let run_dir = self.run_dir(run_id);
        if run_dir.exists() {
            fs::remove_dir_all(run_dir)?;
        }
        Ok(())
    }
}

/// Current time in RFC 3339, for manifests.
pub fn timestamp_now() -> String {
    chrono::Utc::now().to_rfc3339()
}

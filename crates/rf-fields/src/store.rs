//! On-disk field storage.

use crate::basis::ModeBasis;
use crate::field::Field;
use crate::{FieldError, FieldResult};
use rf_core::SampleId;
use std::fs;
use std::path::{Path, PathBuf};

/// JSON field files under `<root>/<sample>/<name>.json`.
#[derive(Debug, Clone)]
pub struct FieldStore {
    root_dir: PathBuf,
}

impl FieldStore {
    pub fn new(root_dir: PathBuf) -> FieldResult<Self> {
        if !root_dir.exists() {
            fs::create_dir_all(&root_dir)?;
        }
        Ok(Self { root_dir })
    }

    pub fn root(&self) -> &Path {
        &self.root_dir
    }

    pub fn sample_dir(&self, sample: SampleId) -> PathBuf {
        self.root_dir.join(sample.to_string())
    }

    pub fn write(&self, sample: SampleId, field: &Field) -> FieldResult<PathBuf> {
        let dir = self.sample_dir(sample);
        fs::create_dir_all(&dir)?;
        let path = dir.join(format!("{}.json", field.name));
        write_field(&path, field)?;
        Ok(path)
    }

    pub fn read(&self, sample: SampleId, name: &str) -> FieldResult<Field> {
        read_field(&self.sample_dir(sample).join(format!("{name}.json")))
    }

    /// Samples with at least one stored field, in ascending order.
    pub fn list_samples(&self) -> FieldResult<Vec<SampleId>> {
        let mut samples = Vec::new();
        for entry in fs::read_dir(&self.root_dir)? {
            let entry = entry?;
            if entry.path().is_dir()
                && let Some(sample) = entry
                    .file_name()
                    .to_str()
                    .and_then(|s| s.parse::<usize>().ok())
                    .and_then(|n| SampleId::from_ordinal(n).ok())
            {
                samples.push(sample);
            }
        }
        samples.sort();
        Ok(samples)
    }
}

pub fn write_field(path: &Path, field: &Field) -> FieldResult<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, serde_json::to_string(field)?)?;
    Ok(())
}

pub fn read_field(path: &Path) -> FieldResult<Field> {
    if !path.exists() {
        return Err(FieldError::NotFound {
            path: path.to_path_buf(),
        });
    }
    let content = fs::read_to_string(path)?;
    let field: Field = serde_json::from_str(&content)?;
    field.check_layout()?;
    Ok(field)
}

/// Sort key splitting a file stem into its text prefix and trailing number,
/// so `mode_2` orders before `mode_10`.
fn stem_order_key(path: &Path) -> (String, Option<u64>, PathBuf) {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let prefix = stem.trim_end_matches(|c: char| c.is_ascii_digit());
    let number = stem[prefix.len()..].parse::<u64>().ok();
    (prefix.to_string(), number, path.to_path_buf())
}

/// Every `*.json` field in `dir`, ordered by file stem with trailing numbers
/// compared numerically.
pub fn read_fields_in(dir: &Path) -> FieldResult<Vec<Field>> {
    if !dir.is_dir() {
        return Err(FieldError::NotFound {
            path: dir.to_path_buf(),
        });
    }
    let mut paths: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.extension().is_some_and(|ext| ext == "json"))
        .collect();
    paths.sort_by_cached_key(|p| stem_order_key(p));
    paths.iter().map(|p| read_field(p)).collect()
}

/// Mode basis from a directory of mode files, keeping the first `count`.
pub fn load_basis(dir: &Path, count: usize) -> FieldResult<ModeBasis> {
    let fields = read_fields_in(dir)?;
    tracing::info!(dir = %dir.display(), available = fields.len(), count, "loading mode basis");
    ModeBasis::new(fields)?.truncated(count)
}

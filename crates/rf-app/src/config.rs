//! Sweep configuration: loading, saving, validation and conversion into
//! solver settings.

use std::path::{Path, PathBuf};

use rf_operators::ModeCounts;
use rf_results::ExportFormat;
use rf_solver::{BoundaryTreatment, Damping, InitialGuess, NewtonConfig, PhysicsKind};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

/// One online parameter sweep.
///
/// Relative paths are resolved against the directory of the config file by
/// [`load_config`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepConfig {
    pub operators: PathBuf,
    #[serde(default = "default_parameters")]
    pub parameters: PathBuf,
    #[serde(default)]
    pub physics: PhysicsDef,
    /// Truncate the operator set to these counts before solving.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modes: Option<ModeCounts>,
    #[serde(default)]
    pub boundary: BoundaryDef,
    #[serde(default = "default_inlet_velocity")]
    pub inlet_velocity: Vec<f64>,
    #[serde(default)]
    pub initial_guess: InitialGuessDef,
    #[serde(default)]
    pub newton: NewtonDef,
    #[serde(default)]
    pub parallel: bool,
    #[serde(default = "default_true")]
    pub keep_unconverged: bool,
    #[serde(default)]
    pub output: OutputDef,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reconstruction: Option<ReconstructionDef>,
}

fn default_parameters() -> PathBuf {
    PathBuf::from("par")
}

fn default_inlet_velocity() -> Vec<f64> {
    vec![1.0, 0.0]
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhysicsDef {
    #[default]
    SteadyNs,
    SteadyStokes,
}

impl From<PhysicsDef> for PhysicsKind {
    fn from(def: PhysicsDef) -> Self {
        match def {
            PhysicsDef::SteadyNs => PhysicsKind::SteadyNs,
            PhysicsDef::SteadyStokes => PhysicsKind::SteadyStokes,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BoundaryDef {
    #[default]
    Lifting,
    Patched,
    Penalty {
        tau: f64,
    },
}

impl From<BoundaryDef> for BoundaryTreatment {
    fn from(def: BoundaryDef) -> Self {
        match def {
            BoundaryDef::Lifting => BoundaryTreatment::Lifting,
            BoundaryDef::Patched => BoundaryTreatment::Patched,
            BoundaryDef::Penalty { tau } => BoundaryTreatment::Penalty { tau },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InitialGuessDef {
    #[default]
    Zero,
    WarmStart,
}

impl From<InitialGuessDef> for InitialGuess {
    fn from(def: InitialGuessDef) -> Self {
        match def {
            InitialGuessDef::Zero => InitialGuess::Zero,
            InitialGuessDef::WarmStart => InitialGuess::WarmStart,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DampingDef {
    #[default]
    None,
    Relaxation {
        omega: f64,
    },
    Backtracking {
        #[serde(default = "default_beta")]
        beta: f64,
        #[serde(default = "default_max_backtracks")]
        max_backtracks: usize,
    },
}

fn default_beta() -> f64 {
    0.5
}

fn default_max_backtracks() -> usize {
    10
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewtonDef {
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,
    #[serde(default = "default_max_iterations")]
    pub max_iterations: usize,
    #[serde(default)]
    pub damping: DampingDef,
    #[serde(default = "default_singular_tol")]
    pub singular_tol: f64,
}

fn default_tolerance() -> f64 {
    1e-6
}

fn default_max_iterations() -> usize {
    20
}

fn default_singular_tol() -> f64 {
    1e-13
}

impl Default for NewtonDef {
    fn default() -> Self {
        Self {
            tolerance: default_tolerance(),
            max_iterations: default_max_iterations(),
            damping: DampingDef::default(),
            singular_tol: default_singular_tol(),
        }
    }
}

impl From<&NewtonDef> for NewtonConfig {
    fn from(def: &NewtonDef) -> Self {
        let damping = match def.damping {
            DampingDef::None => Damping::None,
            DampingDef::Relaxation { omega } => Damping::Relaxation(omega),
            DampingDef::Backtracking {
                beta,
                max_backtracks,
            } => Damping::Backtracking {
                beta,
                max_backtracks,
            },
        };
        NewtonConfig {
            tolerance: def.tolerance,
            max_iterations: def.max_iterations,
            damping,
            singular_tol: def.singular_tol,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputDef {
    #[serde(default = "default_output_dir")]
    pub dir: PathBuf,
    #[serde(default = "default_output_name")]
    pub name: String,
    #[serde(default = "default_formats")]
    pub formats: Vec<ExportFormat>,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("output")
}

fn default_output_name() -> String {
    "red_coeff".to_string()
}

fn default_formats() -> Vec<ExportFormat> {
    ExportFormat::ALL.to_vec()
}

impl Default for OutputDef {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
            name: default_output_name(),
            formats: default_formats(),
        }
    }
}

/// Where to find the mode fields for reconstructing each solved sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReconstructionDef {
    pub velocity_modes: PathBuf,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supremizer_modes: Option<PathBuf>,
    pub pressure_modes: PathBuf,
    /// Unit-inlet lifting fields, one per inlet coefficient.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub liftings: Option<PathBuf>,
    /// 1-based samples to reconstruct; all logged samples when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub samples: Option<Vec<usize>>,
}

impl SweepConfig {
    pub fn physics(&self) -> PhysicsKind {
        self.physics.into()
    }

    pub fn boundary(&self) -> BoundaryTreatment {
        self.boundary.into()
    }

    pub fn initial_guess(&self) -> InitialGuess {
        self.initial_guess.into()
    }

    pub fn newton_config(&self) -> NewtonConfig {
        NewtonConfig::from(&self.newton)
    }

    /// Make every relative path absolute with respect to `base_dir`.
    pub fn resolve_paths(&mut self, base_dir: &Path) {
        let resolve = |p: &mut PathBuf| {
            if p.is_relative() {
                *p = base_dir.join(&*p);
            }
        };
        resolve(&mut self.operators);
        resolve(&mut self.parameters);
        resolve(&mut self.output.dir);
        if let Some(rec) = self.reconstruction.as_mut() {
            resolve(&mut rec.velocity_modes);
            resolve(&mut rec.pressure_modes);
            if let Some(p) = rec.supremizer_modes.as_mut() {
                resolve(p);
            }
            if let Some(p) = rec.liftings.as_mut() {
                resolve(p);
            }
        }
    }
}

fn is_json(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "json")
}

/// Parse config text; JSON when `path` ends in `.json`, YAML otherwise.
pub fn parse_config(content: &str, path: &Path) -> AppResult<SweepConfig> {
    if is_json(path) {
        serde_json::from_str(content)
            .map_err(|e| AppError::Config(format!("Failed to parse config JSON: {}", e)))
    } else {
        serde_yaml::from_str(content)
            .map_err(|e| AppError::Config(format!("Failed to parse config YAML: {}", e)))
    }
}

/// Load a sweep config and resolve its paths against the file's directory.
pub fn load_config(path: &Path) -> AppResult<SweepConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| AppError::ConfigFileRead {
        path: path.to_path_buf(),
        source: e,
    })?;

    let mut config = parse_config(&content, path)?;
    let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
    config.resolve_paths(base_dir);
    Ok(config)
}

pub fn save_config(path: &Path, config: &SweepConfig) -> AppResult<()> {
    let content = if is_json(path) {
        serde_json::to_string_pretty(config)
            .map_err(|e| AppError::Config(format!("Failed to serialize config: {}", e)))?
    } else {
        serde_yaml::to_string(config)
            .map_err(|e| AppError::Config(format!("Failed to serialize config: {}", e)))?
    };

    std::fs::write(path, content).map_err(|e| AppError::ConfigFileWrite {
        path: path.to_path_buf(),
        source: e,
    })?;

    Ok(())
}

/// Reject values no sweep can run with.
pub fn validate_config(config: &SweepConfig) -> AppResult<()> {
    let newton = &config.newton;
    if !(newton.tolerance.is_finite() && newton.tolerance > 0.0) {
        return Err(AppError::Validation(format!(
            "newton.tolerance must be positive, got {}",
            newton.tolerance
        )));
    }
    if !(newton.singular_tol.is_finite() && newton.singular_tol >= 0.0) {
        return Err(AppError::Validation(format!(
            "newton.singular_tol must be non-negative, got {}",
            newton.singular_tol
        )));
    }
    match newton.damping {
        DampingDef::None => {}
        DampingDef::Relaxation { omega } => {
            if !(omega > 0.0 && omega <= 1.0) {
                return Err(AppError::Validation(format!(
                    "relaxation factor must lie in (0, 1], got {omega}"
                )));
            }
        }
        DampingDef::Backtracking { beta, .. } => {
            if !(beta > 0.0 && beta < 1.0) {
                return Err(AppError::Validation(format!(
                    "backtracking beta must lie in (0, 1), got {beta}"
                )));
            }
        }
    }

    if let BoundaryDef::Penalty { tau } = config.boundary
        && !(tau.is_finite() && tau > 0.0)
    {
        return Err(AppError::Validation(format!(
            "penalty tau must be positive, got {tau}"
        )));
    }

    if config.inlet_velocity.iter().any(|v| !v.is_finite()) {
        return Err(AppError::Validation(
            "inlet_velocity must be finite".to_string(),
        ));
    }

    if let Some(modes) = config.modes
        && modes.velocity == 0
    {
        return Err(AppError::Validation(
            "modes.velocity must be at least 1".to_string(),
        ));
    }

    if config.output.formats.is_empty() {
        return Err(AppError::Validation(
            "output.formats must name at least one format".to_string(),
        ));
    }
    if config.output.name.trim().is_empty() {
        return Err(AppError::Validation(
            "output.name must not be empty".to_string(),
        ));
    }

    if let Some(rec) = &config.reconstruction
        && let Some(samples) = &rec.samples
        && samples.contains(&0)
    {
        return Err(AppError::Validation(
            "reconstruction.samples are 1-based".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = "operators: Matrices/operators.json\n";

    #[test]
    fn defaults_follow_reference_run() {
        let config = parse_config(MINIMAL, Path::new("sweep.yaml")).unwrap();
        assert_eq!(config.parameters, PathBuf::from("par"));
        assert_eq!(config.physics(), PhysicsKind::SteadyNs);
        assert_eq!(config.boundary(), BoundaryTreatment::Lifting);
        assert_eq!(config.inlet_velocity, vec![1.0, 0.0]);
        assert_eq!(config.newton_config(), NewtonConfig::default());
        assert_eq!(config.output.name, "red_coeff");
        assert_eq!(config.output.formats.len(), 3);
        assert!(config.keep_unconverged);
        assert!(!config.parallel);
        validate_config(&config).unwrap();
    }

    #[test]
    fn tagged_sections_parse() {
        let text = "\
operators: ops.json
physics: steady_stokes
boundary: { type: penalty, tau: 100.0 }
initial_guess: warm_start
newton:
  tolerance: 1.0e-8
  damping: { type: backtracking }
output: { formats: [eigen] }
";
        let config = parse_config(text, Path::new("sweep.yml")).unwrap();
        assert_eq!(config.physics(), PhysicsKind::SteadyStokes);
        assert_eq!(config.boundary(), BoundaryTreatment::Penalty { tau: 100.0 });
        assert_eq!(config.initial_guess(), InitialGuess::WarmStart);
        assert_eq!(
            config.newton_config().damping,
            Damping::Backtracking {
                beta: 0.5,
                max_backtracks: 10
            }
        );
        assert_eq!(config.newton.max_iterations, 20);
        assert_eq!(config.output.formats, vec![ExportFormat::Eigen]);
    }

    #[test]
    fn json_configs_accepted() {
        let text = r#"{ "operators": "ops.json", "parallel": true }"#;
        let config = parse_config(text, Path::new("sweep.json")).unwrap();
        assert!(config.parallel);
    }

    #[test]
    fn relative_paths_resolve_against_base() {
        let mut config = parse_config(MINIMAL, Path::new("sweep.yaml")).unwrap();
        config.resolve_paths(Path::new("/data/case"));
        assert_eq!(
            config.operators,
            PathBuf::from("/data/case/Matrices/operators.json")
        );
        assert_eq!(config.parameters, PathBuf::from("/data/case/par"));
        assert_eq!(config.output.dir, PathBuf::from("/data/case/output"));
    }

    #[test]
    fn zero_iteration_cap_is_valid() {
        let mut c = parse_config(MINIMAL, Path::new("sweep.yaml")).unwrap();
        c.newton.max_iterations = 0;
        validate_config(&c).unwrap();
        assert_eq!(c.newton_config().max_iterations, 0);
    }

    #[test]
    fn nonsensical_values_rejected() {
        let base = parse_config(MINIMAL, Path::new("sweep.yaml")).unwrap();

        let mut c = base.clone();
        c.newton.tolerance = 0.0;
        assert!(matches!(validate_config(&c), Err(AppError::Validation(_))));

        let mut c = base.clone();
        c.output.formats.clear();
        assert!(validate_config(&c).is_err());

        let mut c = base.clone();
        c.boundary = BoundaryDef::Penalty { tau: -1.0 };
        assert!(validate_config(&c).is_err());

        let mut c = base;
        c.newton.damping = DampingDef::Relaxation { omega: 1.5 };
        assert!(validate_config(&c).is_err());
    }

    #[test]
    fn unknown_physics_is_config_error() {
        let err = parse_config("operators: a\nphysics: unsteady\n", Path::new("s.yaml"));
        assert!(matches!(err, Err(AppError::Config(_))));
    }
}

//! Parameter sweep execution and caching service.

use std::path::{Path, PathBuf};

use nalgebra::DVector;
use rayon::prelude::*;
use rf_core::SampleId;
use rf_core::timing::{AccumulatingTimer, SweepTimings, Timer};
use rf_operators::ReducedOperatorSet;
use rf_results::{
    FailureKind, LogRow, OnlineSolutionLog, PointFailure, RunStore, SweepManifest, export_log,
};
use rf_solver::{
    BoundaryTreatment, InitialGuess, NewtonConfig, NewtonResult, PhysicsKind, ReducedProblem,
    SolverError,
};

use crate::config::{self, SweepConfig};
use crate::error::{AppError, AppResult};
use crate::parameters::{self, ParameterMatrix};
use crate::progress::{PointProgress, SweepProgressEvent, SweepStage};
use crate::reconstruction;

/// Solver-facing settings of a sweep, independent of file locations.
#[derive(Debug, Clone)]
pub struct SweepSettings {
    pub physics: PhysicsKind,
    pub boundary: BoundaryTreatment,
    pub inlet_velocity: DVector<f64>,
    pub initial_guess: InitialGuess,
    pub newton: NewtonConfig,
    pub parallel: bool,
    pub keep_unconverged: bool,
}

impl SweepSettings {
    pub fn from_config(config: &SweepConfig) -> Self {
        Self {
            physics: config.physics(),
            boundary: config.boundary(),
            inlet_velocity: DVector::from_vec(config.inlet_velocity.clone()),
            initial_guess: config.initial_guess(),
            newton: config.newton_config(),
            parallel: config.parallel,
            keep_unconverged: config.keep_unconverged,
        }
    }
}

/// Log and failures of one sweep.
#[derive(Debug, Clone, Default)]
pub struct SweepOutcome {
    pub log: OnlineSolutionLog,
    pub failures: Vec<PointFailure>,
    pub solve_time_s: f64,
    pub mean_point_time_s: f64,
}

/// Options for running sweeps.
#[derive(Debug, Clone)]
pub struct SweepOptions {
    pub use_cache: bool,
    pub solver_version: String,
}

impl Default for SweepOptions {
    fn default() -> Self {
        Self {
            use_cache: true,
            solver_version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Request to execute a sweep.
pub struct SweepRequest<'a> {
    pub config_path: &'a Path,
    pub options: SweepOptions,
}

/// Response from a sweep execution.
#[derive(Debug, Clone)]
pub struct SweepResponse {
    pub run_id: String,
    pub run_dir: PathBuf,
    pub manifest: SweepManifest,
    pub log: OnlineSolutionLog,
    pub loaded_from_cache: bool,
    pub timing: SweepTimings,
}

type ProgressCallback<'a> = Option<&'a mut dyn FnMut(SweepProgressEvent)>;

fn emit_progress(
    progress_cb: &mut ProgressCallback<'_>,
    stage: SweepStage,
    started: &Timer,
    message: Option<String>,
    point: Option<PointProgress>,
) {
    if let Some(cb) = progress_cb.as_deref_mut() {
        cb(SweepProgressEvent {
            stage,
            elapsed_wall_s: started.elapsed_s(),
            message,
            point,
        });
    }
}

struct PointOutcome {
    sample: SampleId,
    row: Option<LogRow>,
    failure: Option<PointFailure>,
    iterations: Option<usize>,
    residual_norm: Option<f64>,
}

impl PointOutcome {
    fn progress(&self, completed: usize, total: usize) -> PointProgress {
        PointProgress {
            sample: self.sample,
            completed,
            total,
            iterations: self.iterations,
            residual_norm: self.residual_norm,
            converged: self.failure.is_none(),
        }
    }
}

fn failure_kind(err: &SolverError) -> FailureKind {
    match err {
        SolverError::SingularJacobian { .. } => FailureKind::SingularJacobian,
        SolverError::NonConvergence { .. } => FailureKind::NonConvergence,
        SolverError::InvalidParameter { .. } => FailureKind::InvalidParameter,
        _ => FailureKind::Numeric,
    }
}

fn converged_point(sample: SampleId, nu: f64, result: NewtonResult) -> PointOutcome {
    tracing::info!(
        sample = %sample,
        nu,
        iterations = result.iterations,
        residual_norm = result.residual_norm,
        "sample solved"
    );
    PointOutcome {
        sample,
        row: Some(LogRow {
            sample,
            coefficients: result.y.as_slice().to_vec(),
            converged: true,
        }),
        failure: None,
        iterations: Some(result.iterations),
        residual_norm: Some(result.residual_norm),
    }
}

/// Apply the sweep policy to a failed sample: point-local failures are
/// recorded, anything else aborts the sweep.
fn failed_point(
    err: SolverError,
    sample: SampleId,
    nu: f64,
    settings: &SweepSettings,
) -> AppResult<PointOutcome> {
    if !err.is_point_local() {
        return Err(AppError::Solver(format!("sample {sample}: {err}")));
    }
    tracing::warn!(sample = %sample, nu, error = %err, "sample failed");

    let (row, iterations, residual_norm) = match &err {
        SolverError::NonConvergence {
            iterations,
            residual_norm,
            best,
        } => {
            let row = settings.keep_unconverged.then(|| LogRow {
                sample,
                coefficients: best.as_slice().to_vec(),
                converged: false,
            });
            (row, Some(*iterations), Some(*residual_norm))
        }
        _ => (None, None, None),
    };

    Ok(PointOutcome {
        sample,
        row,
        failure: Some(PointFailure {
            sample,
            nu,
            kind: failure_kind(&err),
            message: err.to_string(),
        }),
        iterations,
        residual_norm,
    })
}

fn build_problem<'a>(
    ops: &'a ReducedOperatorSet,
    settings: &SweepSettings,
    nu: f64,
    initial_guess: InitialGuess,
) -> Result<ReducedProblem<'a>, SolverError> {
    let mut problem = ReducedProblem::new(settings.physics, ops, nu)?;
    problem.set_boundary(settings.boundary)?;
    problem.set_velocity(settings.inlet_velocity.clone())?;
    problem.set_initial_guess_policy(initial_guess);
    Ok(problem)
}

fn solve_point(
    problem: &mut ReducedProblem<'_>,
    sample: SampleId,
    nu: f64,
    settings: &SweepSettings,
) -> AppResult<PointOutcome> {
    let solved = problem
        .set_nu(nu)
        .and_then(|()| problem.solve_online(&settings.newton));
    match solved {
        Ok(result) => Ok(converged_point(sample, nu, result)),
        Err(e) => failed_point(e, sample, nu, settings),
    }
}

/// Solve every parameter sample against `ops`.
pub fn run_sweep(
    ops: &ReducedOperatorSet,
    params: &ParameterMatrix,
    settings: &SweepSettings,
) -> AppResult<SweepOutcome> {
    run_sweep_with_progress(ops, params, settings, None)
}

/// Solve every parameter sample and stream per-sample progress events.
///
/// Sequential sweeps reuse one model and honour warm starts. Parallel sweeps
/// build one model per sample over the shared operators and always start
/// from the zero guess. The log is ordered by sample in both cases.
pub fn run_sweep_with_progress(
    ops: &ReducedOperatorSet,
    params: &ParameterMatrix,
    settings: &SweepSettings,
    mut progress_cb: ProgressCallback<'_>,
) -> AppResult<SweepOutcome> {
    sweep_points(ops, params, settings, &mut progress_cb)
}

fn sweep_points(
    ops: &ReducedOperatorSet,
    params: &ParameterMatrix,
    settings: &SweepSettings,
    progress_cb: &mut ProgressCallback<'_>,
) -> AppResult<SweepOutcome> {
    if settings.inlet_velocity.len() != ops.n_bc() {
        return Err(AppError::InvalidInput(format!(
            "inlet_velocity has {} entries, operators expect {}",
            settings.inlet_velocity.len(),
            ops.n_bc()
        )));
    }
    settings.boundary.validate(ops)?;

    let total = params.len();
    let timer = Timer::start("sweep solve");
    let point_timer = AccumulatingTimer::new();

    let outcomes: Vec<PointOutcome> = if settings.parallel {
        if settings.initial_guess.carries_state() {
            tracing::warn!("warm start ignored for parallel sweeps");
        }
        let results: Vec<AppResult<PointOutcome>> = params
            .rows()
            .par_iter()
            .enumerate()
            .map(|(row, values)| {
                point_timer.time(|| {
                    let sample = SampleId::from_row(row);
                    let nu = values[0];
                    match build_problem(ops, settings, nu, InitialGuess::Zero) {
                        Ok(mut problem) => solve_point(&mut problem, sample, nu, settings),
                        Err(e) => failed_point(e, sample, nu, settings),
                    }
                })
            })
            .collect();
        let mut outcomes = results.into_iter().collect::<AppResult<Vec<_>>>()?;
        outcomes.sort_by_key(|o| o.sample);
        for (i, outcome) in outcomes.iter().enumerate() {
            emit_progress(
                progress_cb,
                SweepStage::Solving,
                &timer,
                None,
                Some(outcome.progress(i + 1, total)),
            );
        }
        outcomes
    } else {
        let mut problem: Option<ReducedProblem<'_>> = None;
        let mut outcomes = Vec::with_capacity(total);
        for (row, values) in params.rows().iter().enumerate() {
            let sample = SampleId::from_row(row);
            let nu = values[0];
            let outcome = point_timer.time(|| {
                let built = match problem.take() {
                    Some(p) => Ok(p),
                    None => build_problem(ops, settings, nu, settings.initial_guess),
                };
                match built {
                    Ok(mut p) => {
                        let outcome = solve_point(&mut p, sample, nu, settings);
                        problem = Some(p);
                        outcome
                    }
                    Err(e) => failed_point(e, sample, nu, settings),
                }
            })?;
            emit_progress(
                progress_cb,
                SweepStage::Solving,
                &timer,
                None,
                Some(outcome.progress(row + 1, total)),
            );
            outcomes.push(outcome);
        }
        outcomes
    };

    let mut log = OnlineSolutionLog::new();
    let mut failures = Vec::new();
    for outcome in outcomes {
        if let Some(row) = outcome.row {
            log.push_row(row)?;
        }
        failures.extend(outcome.failure);
    }

    Ok(SweepOutcome {
        log,
        failures,
        solve_time_s: timer.stop(),
        mean_point_time_s: point_timer.average_seconds(),
    })
}

/// Content digests of the files a config points to: the operator file and,
/// when reconstruction is configured, every mode and lifting directory.
fn input_digests(config: &SweepConfig) -> AppResult<Vec<String>> {
    let operators = std::fs::read(&config.operators).map_err(|e| {
        AppError::Operators(format!(
            "cannot read {}: {e}",
            config.operators.display()
        ))
    })?;
    let mut digests = vec![rf_results::digest_bytes(&operators)];

    if let Some(rec) = &config.reconstruction {
        let dirs = [
            Some(&rec.velocity_modes),
            rec.supremizer_modes.as_ref(),
            Some(&rec.pressure_modes),
            rec.liftings.as_ref(),
        ];
        for dir in dirs.into_iter().flatten() {
            let digest = rf_results::digest_json_dir(dir).map_err(|e| {
                AppError::Fields(format!("cannot read {}: {e}", dir.display()))
            })?;
            digests.push(digest);
        }
    }
    Ok(digests)
}

/// Execute or load a sweep described by a config file.
pub fn ensure_sweep(request: &SweepRequest) -> AppResult<SweepResponse> {
    ensure_sweep_with_progress(request, None)
}

/// Execute or load a sweep and stream progress events.
pub fn ensure_sweep_with_progress(
    request: &SweepRequest,
    mut progress_cb: ProgressCallback<'_>,
) -> AppResult<SweepResponse> {
    let started = Timer::start("sweep");
    let mut timing = SweepTimings::default();

    emit_progress(
        &mut progress_cb,
        SweepStage::LoadingConfig,
        &started,
        Some("Loading sweep config".to_string()),
        None,
    );

    let load_timer = Timer::start("load");
    let config = config::load_config(request.config_path)?;
    config::validate_config(&config)?;
    let params = parameters::read_parameter_matrix(&config.parameters)?;
    if params.is_empty() {
        return Err(AppError::InvalidInput(format!(
            "parameter file {} has no samples",
            config.parameters.display()
        )));
    }

    emit_progress(
        &mut progress_cb,
        SweepStage::CheckingCache,
        &started,
        Some("Checking run cache".to_string()),
        None,
    );

    let digests = input_digests(&config)?;
    let run_id = rf_results::compute_run_id(
        &config,
        &digests,
        params.rows(),
        &request.options.solver_version,
    );
    let store = RunStore::new(config.output.dir.clone())?;
    let run_dir = store.run_dir(&run_id);

    if request.options.use_cache && store.has_run(&run_id) {
        emit_progress(
            &mut progress_cb,
            SweepStage::LoadingCachedRun,
            &started,
            Some("Loading cached run".to_string()),
            None,
        );

        let manifest = store.load_manifest(&run_id)?;
        let log = store.load_log(&run_id)?;
        timing.load_time_s = load_timer.stop();
        timing.total_time_s = started.elapsed_s();

        emit_progress(
            &mut progress_cb,
            SweepStage::Completed,
            &started,
            Some("Loaded cached run".to_string()),
            None,
        );

        return Ok(SweepResponse {
            run_id,
            run_dir,
            manifest,
            log,
            loaded_from_cache: true,
            timing,
        });
    }

    emit_progress(
        &mut progress_cb,
        SweepStage::LoadingOperators,
        &started,
        Some("Loading reduced operators".to_string()),
        None,
    );

    let mut ops = rf_operators::load_json(&config.operators)?;
    if let Some(target) = config.modes
        && target != ops.modes()
    {
        tracing::info!(from = %ops.modes(), to = %target, "truncating operators");
        ops = ops.truncate(target)?;
    }
    timing.load_time_s = load_timer.stop();

    emit_progress(
        &mut progress_cb,
        SweepStage::Solving,
        &started,
        Some(format!("Solving {} samples", params.len())),
        None,
    );

    let settings = SweepSettings::from_config(&config);
    let outcome = sweep_points(&ops, &params, &settings, &mut progress_cb)?;
    timing.solve_time_s = outcome.solve_time_s;
    timing.mean_point_time_s = outcome.mean_point_time_s;
    tracing::info!(
        samples = params.len(),
        logged = outcome.log.len(),
        failures = outcome.failures.len(),
        solve_time_s = timing.solve_time_s,
        "sweep solved"
    );

    if let Some(def) = &config.reconstruction {
        emit_progress(
            &mut progress_cb,
            SweepStage::Reconstructing,
            &started,
            Some("Reconstructing fields".to_string()),
            None,
        );
        let rec_timer = Timer::start("reconstruct");
        let inputs = reconstruction::load_inputs(def, ops.modes())?;
        reconstruction::reconstruct_log(
            &outcome.log,
            &inputs,
            &config.inlet_velocity,
            def.samples.as_deref(),
            &run_dir.join("fields"),
        )?;
        timing.reconstruct_time_s = rec_timer.stop();
    }

    emit_progress(
        &mut progress_cb,
        SweepStage::SavingResults,
        &started,
        Some("Saving run output".to_string()),
        None,
    );

    let export_timer = Timer::start("export");
    let written = export_log(
        &outcome.log,
        &run_dir,
        &config.output.name,
        &config.output.formats,
    )?;
    timing.export_time_s = export_timer.stop();
    timing.total_time_s = started.elapsed_s();

    let manifest = SweepManifest {
        run_id: run_id.clone(),
        timestamp: rf_results::timestamp_now(),
        solver_version: request.options.solver_version.clone(),
        physics: settings.physics.as_str().to_string(),
        boundary: settings.boundary.as_str().to_string(),
        modes: ops.modes(),
        n_samples: params.len(),
        n_converged: outcome.log.converged_count(),
        failures: outcome.failures,
        timings: timing,
        exports: written
            .iter()
            .filter_map(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
            .collect(),
    };
    store.save_run(&manifest, &outcome.log)?;

    emit_progress(
        &mut progress_cb,
        SweepStage::Completed,
        &started,
        Some("Sweep completed".to_string()),
        None,
    );

    Ok(SweepResponse {
        run_id,
        run_dir,
        manifest,
        log: outcome.log,
        loaded_from_cache: false,
        timing,
    })
}

/// Manifests of every run stored under `output_dir`, newest first.
pub fn list_runs(output_dir: &Path) -> AppResult<Vec<SweepManifest>> {
    let store = RunStore::new(output_dir.to_path_buf())?;
    Ok(store.list_runs()?)
}

/// Load a stored run's manifest and log.
pub fn load_run(output_dir: &Path, run_id: &str) -> AppResult<(SweepManifest, OnlineSolutionLog)> {
    let store = RunStore::new(output_dir.to_path_buf())?;
    let manifest = store.load_manifest(run_id)?;
    let log = store.load_log(run_id)?;
    Ok((manifest, log))
}

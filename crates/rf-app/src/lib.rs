//! Shared application service layer for romflow.
//!
//! Drives the online stage end to end for the CLI: reads the sweep config
//! and the parameter matrix, loads the reduced operators, solves every
//! sample, reconstructs fields and stores the run.

pub mod config;
pub mod error;
pub mod parameters;
pub mod progress;
pub mod query;
pub mod reconstruction;
pub mod sweep_service;

pub use config::{
    BoundaryDef, DampingDef, InitialGuessDef, NewtonDef, OutputDef, PhysicsDef, ReconstructionDef,
    SweepConfig, load_config, parse_config, save_config, validate_config,
};
pub use error::{AppError, AppResult};
pub use parameters::{ParameterMatrix, parse_parameter_matrix, read_parameter_matrix};
pub use progress::{PointProgress, SweepProgressEvent, SweepStage};
pub use query::{LogSummary, OperatorSummary, get_log_summary, inspect_operators};
pub use reconstruction::{ReconstructionInputs, load_inputs, reconstruct_log};
pub use sweep_service::{
    SweepOptions, SweepOutcome, SweepRequest, SweepResponse, SweepSettings, ensure_sweep,
    ensure_sweep_with_progress, list_runs, load_run, run_sweep, run_sweep_with_progress,
};

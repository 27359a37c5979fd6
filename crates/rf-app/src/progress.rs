use rf_core::SampleId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SweepStage {
    LoadingConfig,
    CheckingCache,
    LoadingCachedRun,
    LoadingOperators,
    Solving,
    Reconstructing,
    SavingResults,
    Completed,
}

impl SweepStage {
    pub fn label(&self) -> &'static str {
        match self {
            SweepStage::LoadingConfig => "Loading config",
            SweepStage::CheckingCache => "Checking cache",
            SweepStage::LoadingCachedRun => "Loading cached run",
            SweepStage::LoadingOperators => "Loading operators",
            SweepStage::Solving => "Solving",
            SweepStage::Reconstructing => "Reconstructing",
            SweepStage::SavingResults => "Saving results",
            SweepStage::Completed => "Completed",
        }
    }
}

/// Outcome of one sample as reported while the sweep runs.
#[derive(Debug, Clone)]
pub struct PointProgress {
    pub sample: SampleId,
    pub completed: usize,
    pub total: usize,
    pub iterations: Option<usize>,
    pub residual_norm: Option<f64>,
    pub converged: bool,
}

#[derive(Debug, Clone)]
pub struct SweepProgressEvent {
    pub stage: SweepStage,
    pub elapsed_wall_s: f64,
    pub message: Option<String>,
    pub point: Option<PointProgress>,
}

impl SweepProgressEvent {
    pub fn stage(stage: SweepStage, elapsed_wall_s: f64, message: Option<String>) -> Self {
        Self {
            stage,
            elapsed_wall_s,
            message,
            point: None,
        }
    }
}

//! Per-query parameters and coefficient state of a reduced model.

use crate::assembly::BoundaryTreatment;
use crate::error::{SolverError, SolverResult};
use crate::initialization::InitialGuess;
use crate::newton::NewtonResult;
use nalgebra::DVector;
use rf_operators::ReducedOperatorSet;

/// Parameters of the current online query plus the latest coefficients.
#[derive(Debug, Clone)]
pub struct OnlineState {
    nu: f64,
    velocity_now: DVector<f64>,
    boundary: BoundaryTreatment,
    initial_guess: InitialGuess,
    pending_guess: Option<DVector<f64>>,
    y: DVector<f64>,
    converged: bool,
}

fn check_nu(nu: f64) -> SolverResult<f64> {
    if nu.is_finite() && nu > 0.0 {
        Ok(nu)
    } else {
        Err(SolverError::InvalidParameter {
            what: "viscosity nu",
            value: nu,
        })
    }
}

impl OnlineState {
    pub(crate) fn new(ops: &ReducedOperatorSet, nu: f64) -> SolverResult<Self> {
        Ok(Self {
            nu: check_nu(nu)?,
            velocity_now: DVector::zeros(ops.n_bc()),
            boundary: BoundaryTreatment::default(),
            initial_guess: InitialGuess::default(),
            pending_guess: None,
            y: DVector::zeros(ops.size()),
            converged: false,
        })
    }

    pub fn nu(&self) -> f64 {
        self.nu
    }

    pub fn velocity_now(&self) -> &DVector<f64> {
        &self.velocity_now
    }

    pub fn boundary(&self) -> BoundaryTreatment {
        self.boundary
    }

    pub fn initial_guess(&self) -> InitialGuess {
        self.initial_guess
    }

    /// Latest coefficients: the converged solution, or the best iterate of a
    /// non-converged solve.
    pub fn coefficients(&self) -> &DVector<f64> {
        &self.y
    }

    /// Whether [`Self::coefficients`] come from a converged solve.
    pub fn converged(&self) -> bool {
        self.converged
    }

    pub(crate) fn set_nu(&mut self, nu: f64) -> SolverResult<()> {
        self.nu = check_nu(nu)?;
        Ok(())
    }

    pub(crate) fn set_velocity(&mut self, velocity: DVector<f64>) -> SolverResult<()> {
        if velocity.len() != self.velocity_now.len() {
            return Err(SolverError::dimension(
                "inlet velocity coefficients",
                self.velocity_now.len(),
                velocity.len(),
            ));
        }
        if let Some(&value) = velocity.iter().find(|v| !v.is_finite()) {
            return Err(SolverError::InvalidParameter {
                what: "inlet velocity coefficient",
                value,
            });
        }
        self.velocity_now = velocity;
        Ok(())
    }

    pub(crate) fn set_boundary(
        &mut self,
        ops: &ReducedOperatorSet,
        boundary: BoundaryTreatment,
    ) -> SolverResult<()> {
        boundary.validate(ops)?;
        self.boundary = boundary;
        Ok(())
    }

    pub(crate) fn set_initial_guess_policy(&mut self, policy: InitialGuess) {
        self.initial_guess = policy;
    }

    pub(crate) fn set_initial_guess(&mut self, guess: DVector<f64>) -> SolverResult<()> {
        if guess.len() != self.y.len() {
            return Err(SolverError::dimension(
                "initial guess",
                self.y.len(),
                guess.len(),
            ));
        }
        self.pending_guess = Some(guess);
        Ok(())
    }

    /// Seed for the next solve. An explicit guess is used once.
    pub(crate) fn take_starting_point(&mut self) -> DVector<f64> {
        if let Some(guess) = self.pending_guess.take() {
            return guess;
        }
        match self.initial_guess {
            InitialGuess::Zero => DVector::zeros(self.y.len()),
            InitialGuess::WarmStart => self.y.clone(),
        }
    }

    /// Store the outcome of a solve. A non-converged solve keeps its best
    /// iterate so callers can inspect it.
    pub(crate) fn record(&mut self, outcome: &SolverResult<NewtonResult>) {
        match outcome {
            Ok(result) => {
                self.y.copy_from(&result.y);
                self.converged = true;
            }
            Err(SolverError::NonConvergence { best, .. }) => {
                self.y.copy_from(best);
                self.converged = false;
            }
            Err(_) => {
                self.converged = false;
            }
        }
    }
}

//! Closed set of reduced problems with a common online interface.

use crate::assembly::BoundaryTreatment;
use crate::error::SolverResult;
use crate::initialization::InitialGuess;
use crate::newton::{NewtonConfig, NewtonResult};
use crate::online::OnlineState;
use crate::steady_ns::SteadyNsModel;
use crate::stokes::SteadyStokesModel;
use nalgebra::DVector;
use rf_operators::ReducedOperatorSet;

/// Physics of a reduced problem, chosen at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PhysicsKind {
    #[default]
    SteadyNs,
    SteadyStokes,
}

impl PhysicsKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PhysicsKind::SteadyNs => "steady_ns",
            PhysicsKind::SteadyStokes => "steady_stokes",
        }
    }
}

/// A reduced problem ready for online queries.
///
/// Every variant holds the shared viscosity `nu` and inlet coefficients and
/// answers [`ReducedProblem::solve_online`]; the physics is fixed per variant.
#[derive(Debug, Clone)]
pub enum ReducedProblem<'a> {
    SteadyNs(SteadyNsModel<'a>),
    SteadyStokes(SteadyStokesModel<'a>),
}

impl<'a> ReducedProblem<'a> {
    pub fn new(kind: PhysicsKind, operators: &'a ReducedOperatorSet, nu: f64) -> SolverResult<Self> {
        Ok(match kind {
            PhysicsKind::SteadyNs => ReducedProblem::SteadyNs(SteadyNsModel::new(operators, nu)?),
            PhysicsKind::SteadyStokes => {
                ReducedProblem::SteadyStokes(SteadyStokesModel::new(operators, nu)?)
            }
        })
    }

    pub fn kind(&self) -> PhysicsKind {
        match self {
            ReducedProblem::SteadyNs(_) => PhysicsKind::SteadyNs,
            ReducedProblem::SteadyStokes(_) => PhysicsKind::SteadyStokes,
        }
    }

    pub fn operators(&self) -> &'a ReducedOperatorSet {
        match self {
            ReducedProblem::SteadyNs(m) => m.operators(),
            ReducedProblem::SteadyStokes(m) => m.operators(),
        }
    }

    pub fn state(&self) -> &OnlineState {
        match self {
            ReducedProblem::SteadyNs(m) => m.state(),
            ReducedProblem::SteadyStokes(m) => m.state(),
        }
    }

    pub fn nu(&self) -> f64 {
        self.state().nu()
    }

    pub fn set_nu(&mut self, nu: f64) -> SolverResult<()> {
        match self {
            ReducedProblem::SteadyNs(m) => m.set_nu(nu),
            ReducedProblem::SteadyStokes(m) => m.set_nu(nu),
        }
    }

    pub fn set_velocity(&mut self, velocity: DVector<f64>) -> SolverResult<()> {
        match self {
            ReducedProblem::SteadyNs(m) => m.set_velocity(velocity),
            ReducedProblem::SteadyStokes(m) => m.set_velocity(velocity),
        }
    }

    pub fn set_boundary(&mut self, boundary: BoundaryTreatment) -> SolverResult<()> {
        match self {
            ReducedProblem::SteadyNs(m) => m.set_boundary(boundary),
            ReducedProblem::SteadyStokes(m) => m.set_boundary(boundary),
        }
    }

    pub fn set_initial_guess_policy(&mut self, policy: InitialGuess) {
        match self {
            ReducedProblem::SteadyNs(m) => m.set_initial_guess_policy(policy),
            ReducedProblem::SteadyStokes(m) => m.set_initial_guess_policy(policy),
        }
    }

    pub fn set_initial_guess(&mut self, guess: DVector<f64>) -> SolverResult<()> {
        match self {
            ReducedProblem::SteadyNs(m) => m.set_initial_guess(guess),
            ReducedProblem::SteadyStokes(m) => m.set_initial_guess(guess),
        }
    }

    pub fn coefficients(&self) -> &DVector<f64> {
        self.state().coefficients()
    }

    /// Solve for the current parameters and store the result in the model.
    pub fn solve_online(&mut self, config: &NewtonConfig) -> SolverResult<NewtonResult> {
        match self {
            ReducedProblem::SteadyNs(m) => m.solve_online(config),
            ReducedProblem::SteadyStokes(m) => m.solve_online(config),
        }
    }
}

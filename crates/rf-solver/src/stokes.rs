//! Reduced steady Stokes model: the Navier-Stokes system without convection.

use crate::assembly::{
    BoundaryTreatment, apply_boundary_jacobian, apply_boundary_residual, check_coefficients,
    linear_jacobian, linear_residual,
};
use crate::error::SolverResult;
use crate::initialization::InitialGuess;
use crate::newton::{NewtonArgument, NewtonConfig, NewtonResult, newton_solve};
use crate::online::OnlineState;
use nalgebra::{DMatrix, DVector};
use rf_operators::ReducedOperatorSet;

/// Linear saddle-point system over the same operators as
/// [`crate::SteadyNsModel`]; the convective tensor is ignored.
///
/// Solved through the generic Newton solver, which takes exactly one step.
#[derive(Debug, Clone)]
pub struct SteadyStokesModel<'a> {
    operators: &'a ReducedOperatorSet,
    state: OnlineState,
}

impl<'a> SteadyStokesModel<'a> {
    pub fn new(operators: &'a ReducedOperatorSet, nu: f64) -> SolverResult<Self> {
        Ok(Self {
            operators,
            state: OnlineState::new(operators, nu)?,
        })
    }

    pub fn with_boundary(mut self, boundary: BoundaryTreatment) -> SolverResult<Self> {
        self.state.set_boundary(self.operators, boundary)?;
        Ok(self)
    }

    pub fn operators(&self) -> &'a ReducedOperatorSet {
        self.operators
    }

    pub fn state(&self) -> &OnlineState {
        &self.state
    }

    pub fn set_nu(&mut self, nu: f64) -> SolverResult<()> {
        self.state.set_nu(nu)
    }

    pub fn set_velocity(&mut self, velocity: DVector<f64>) -> SolverResult<()> {
        self.state.set_velocity(velocity)
    }

    pub fn set_boundary(&mut self, boundary: BoundaryTreatment) -> SolverResult<()> {
        self.state.set_boundary(self.operators, boundary)
    }

    pub fn set_initial_guess_policy(&mut self, policy: InitialGuess) {
        self.state.set_initial_guess_policy(policy);
    }

    pub fn set_initial_guess(&mut self, guess: DVector<f64>) -> SolverResult<()> {
        self.state.set_initial_guess(guess)
    }

    pub fn coefficients(&self) -> &DVector<f64> {
        self.state.coefficients()
    }

    pub fn solve_online(&mut self, config: &NewtonConfig) -> SolverResult<NewtonResult> {
        let guess = self.state.take_starting_point();
        let outcome = newton_solve(&*self, guess, config);
        self.state.record(&outcome);
        outcome
    }
}

impl NewtonArgument for SteadyStokesModel<'_> {
    fn size(&self) -> usize {
        self.operators.size()
    }

    fn residual(&self, y: &DVector<f64>) -> SolverResult<DVector<f64>> {
        let ops = self.operators;
        let velocity = self.state.velocity_now();
        let mut r = linear_residual(ops, self.state.nu(), velocity, y)?;
        apply_boundary_residual(self.state.boundary(), ops, velocity, y, &mut r)?;
        Ok(r)
    }

    fn jacobian(&self, y: &DVector<f64>) -> SolverResult<DMatrix<f64>> {
        check_coefficients(self.operators, y)?;
        let mut jac = linear_jacobian(self.operators, self.state.nu());
        apply_boundary_jacobian(self.state.boundary(), self.operators, &mut jac)?;
        Ok(jac)
    }
}

//! Reduced steady incompressible Navier-Stokes model.

use crate::assembly::{
    BoundaryTreatment, apply_boundary_jacobian, apply_boundary_residual, check_coefficients,
    linear_jacobian, linear_residual,
};
use crate::error::SolverResult;
use crate::initialization::InitialGuess;
use crate::newton::{NewtonArgument, NewtonConfig, NewtonResult, newton_solve};
use crate::online::OnlineState;
use nalgebra::{DMatrix, DVector, DVectorView};
use rf_operators::ReducedOperatorSet;

/// Galerkin-reduced steady Navier-Stokes system over a borrowed operator set.
///
/// ```text
/// r_u = nu B y_u + C(y_u, y_u) + K y_p - (nu BC1 + BC2) u_bc
/// r_p = P y_u
/// ```
///
/// The convective contraction makes the system quadratic in `y_u`, which is
/// why the online stage needs Newton iterations instead of one linear solve.
#[derive(Debug, Clone)]
pub struct SteadyNsModel<'a> {
    operators: &'a ReducedOperatorSet,
    state: OnlineState,
}

impl<'a> SteadyNsModel<'a> {
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

    pub fn with_initial_guess(mut self, policy: InitialGuess) -> Self {
        self.state.set_initial_guess_policy(policy);
        self
    }

    pub fn operators(&self) -> &'a ReducedOperatorSet {
        self.operators
    }

    pub fn state(&self) -> &OnlineState {
        &self.state
    }

    pub fn nu(&self) -> f64 {
        self.state.nu()
    }

    pub fn set_nu(&mut self, nu: f64) -> SolverResult<()> {
        self.state.set_nu(nu)
    }

    /// Prescribed inlet velocity coefficients (length `n_bc`).
    pub fn set_velocity(&mut self, velocity: DVector<f64>) -> SolverResult<()> {
        self.state.set_velocity(velocity)
    }

    pub fn set_boundary(&mut self, boundary: BoundaryTreatment) -> SolverResult<()> {
        self.state.set_boundary(self.operators, boundary)
    }

    pub fn set_initial_guess_policy(&mut self, policy: InitialGuess) {
        self.state.set_initial_guess_policy(policy);
    }

    /// Seed the next solve with `guess`, overriding the policy once.
    pub fn set_initial_guess(&mut self, guess: DVector<f64>) -> SolverResult<()> {
        self.state.set_initial_guess(guess)
    }

    pub fn coefficients(&self) -> &DVector<f64> {
        self.state.coefficients()
    }

    /// Velocity block `y_u` (velocity then supremizer modes).
    pub fn velocity_coefficients(&self) -> DVectorView<'_, f64> {
        self.state.coefficients().rows(0, self.operators.n_u())
    }

    pub fn pressure_coefficients(&self) -> DVectorView<'_, f64> {
        self.state
            .coefficients()
            .rows(self.operators.n_u(), self.operators.n_p())
    }

    /// Run the online Newton solve for the current parameters.
    ///
    /// The coefficients are stored in the model in every case where an
    /// iterate exists: the solution on success, the best iterate on
    /// `NonConvergence`.
    pub fn solve_online(&mut self, config: &NewtonConfig) -> SolverResult<NewtonResult> {
        let guess = self.state.take_starting_point();
        let outcome = newton_solve(&*self, guess, config);
        self.state.record(&outcome);
        match &outcome {
            Ok(result) => tracing::debug!(
                nu = self.state.nu(),
                iterations = result.iterations,
                residual_norm = result.residual_norm,
                "steady NS online solve converged"
            ),
            Err(e) => tracing::debug!(nu = self.state.nu(), error = %e, "steady NS online solve failed"),
        }
        outcome
    }
}

impl NewtonArgument for SteadyNsModel<'_> {
    fn size(&self) -> usize {
        self.operators.size()
    }

    fn residual(&self, y: &DVector<f64>) -> SolverResult<DVector<f64>> {
        let ops = self.operators;
        let n_u = ops.n_u();
        let mut r = linear_residual(ops, self.state.nu(), self.state.velocity_now(), y)?;
        ops.c()
            .add_contraction(&y.as_slice()[..n_u], &mut r.as_mut_slice()[..n_u]);
        apply_boundary_residual(
            self.state.boundary(),
            ops,
            self.state.velocity_now(),
            y,
            &mut r,
        )?;
        Ok(r)
    }

    fn jacobian(&self, y: &DVector<f64>) -> SolverResult<DMatrix<f64>> {
        let ops = self.operators;
        check_coefficients(ops, y)?;
        let mut jac = linear_jacobian(ops, self.state.nu());
        ops.c().add_jacobian(&y.as_slice()[..ops.n_u()], &mut jac);
        apply_boundary_jacobian(self.state.boundary(), ops, &mut jac)?;
        Ok(jac)
    }
}

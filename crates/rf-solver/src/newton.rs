//! Generic Newton-Raphson solver.

use crate::error::{SolverError, SolverResult};
use crate::jacobian::{DEFAULT_FD_STEP, finite_difference_jacobian};
use nalgebra::{DMatrix, DVector};

/// A square nonlinear system `r(y) = 0` with its Jacobian.
///
/// Implementations must be pure: the result depends only on `y` and the
/// implementor's fixed parameters.
pub trait NewtonArgument {
    /// Dimension of `y` and of `r(y)`.
    fn size(&self) -> usize;

    fn residual(&self, y: &DVector<f64>) -> SolverResult<DVector<f64>>;

    /// Jacobian of [`Self::residual`] at `y`. Defaults to forward differences.
    fn jacobian(&self, y: &DVector<f64>) -> SolverResult<DMatrix<f64>> {
        finite_difference_jacobian(y, |x| self.residual(x), DEFAULT_FD_STEP)
    }
}

/// [`NewtonArgument`] built from a residual closure and a Jacobian closure.
pub struct FnArgument<F, J> {
    size: usize,
    residual: F,
    jacobian: J,
}

impl<F, J> FnArgument<F, J>
where
    F: Fn(&DVector<f64>) -> DVector<f64>,
    J: Fn(&DVector<f64>) -> DMatrix<f64>,
{
    pub fn new(size: usize, residual: F, jacobian: J) -> Self {
        Self {
            size,
            residual,
            jacobian,
        }
    }
}

impl<F, J> NewtonArgument for FnArgument<F, J>
where
    F: Fn(&DVector<f64>) -> DVector<f64>,
    J: Fn(&DVector<f64>) -> DMatrix<f64>,
{
    fn size(&self) -> usize {
        self.size
    }

    fn residual(&self, y: &DVector<f64>) -> SolverResult<DVector<f64>> {
        Ok((self.residual)(y))
    }

    fn jacobian(&self, y: &DVector<f64>) -> SolverResult<DMatrix<f64>> {
        Ok((self.jacobian)(y))
    }
}

/// Step-scaling applied to each Newton update.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Damping {
    /// Full Newton step.
    #[default]
    None,
    /// Fixed relaxation factor in `(0, 1]`.
    Relaxation(f64),
    /// Halve (times `beta`) the step until the residual norm decreases.
    Backtracking { beta: f64, max_backtracks: usize },
}

/// Newton solver configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct NewtonConfig {
    /// Absolute tolerance on the residual 2-norm
    pub tolerance: f64,
    /// Maximum iterations; 0 returns the initial guess as non-converged
    pub max_iterations: usize,
    pub damping: Damping,
    /// Relative pivot threshold below which the Jacobian counts as singular
    pub singular_tol: f64,
}

impl Default for NewtonConfig {
    fn default() -> Self {
        Self {
            tolerance: 1e-6,
            max_iterations: 20,
            damping: Damping::None,
            singular_tol: 1e-13,
        }
    }
}

impl NewtonConfig {
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn with_damping(mut self, damping: Damping) -> Self {
        self.damping = damping;
        self
    }
}

/// Converged Newton iterate.
#[derive(Debug, Clone, PartialEq)]
pub struct NewtonResult {
    /// Solution vector
    pub y: DVector<f64>,
    /// Final residual norm
    pub residual_norm: f64,
    /// Number of Newton updates performed
    pub iterations: usize,
}

fn checked_norm(r: &DVector<f64>, iteration: usize) -> SolverResult<f64> {
    let norm = r.norm();
    if norm.is_finite() {
        Ok(norm)
    } else {
        Err(SolverError::Numeric {
            what: format!("non-finite residual at Newton iteration {iteration}"),
        })
    }
}

/// Solve `J * dy = -r`, rejecting (numerically) singular Jacobians.
fn newton_step(
    jac: DMatrix<f64>,
    r: &DVector<f64>,
    singular_tol: f64,
    iteration: usize,
) -> SolverResult<DVector<f64>> {
    let lu = jac.lu();

    let pivots = lu.u().diagonal().map(f64::abs);
    let max_pivot = pivots.max();
    let min_pivot = pivots.min();
    if pivots.is_empty() || max_pivot <= 0.0 || min_pivot <= singular_tol * max_pivot {
        return Err(SolverError::SingularJacobian { iteration });
    }

    lu.solve(&(-r))
        .ok_or(SolverError::SingularJacobian { iteration })
}

/// Newton-Raphson iteration from `initial_guess`.
///
/// Convergence is declared when the residual 2-norm drops below
/// `config.tolerance`, either at the initial guess (0 iterations) or after an
/// update. A linear system therefore converges in exactly one iteration.
pub fn newton_solve<A>(
    argument: &A,
    initial_guess: DVector<f64>,
    config: &NewtonConfig,
) -> SolverResult<NewtonResult>
where
    A: NewtonArgument + ?Sized,
{
    let n = argument.size();
    if initial_guess.len() != n {
        return Err(SolverError::dimension(
            "initial guess",
            n,
            initial_guess.len(),
        ));
    }

    if config.max_iterations == 0 {
        return Err(SolverError::NonConvergence {
            iterations: 0,
            residual_norm: f64::NAN,
            best: initial_guess,
        });
    }

    let mut y = initial_guess;
    let mut r = argument.residual(&y)?;
    if r.len() != n {
        return Err(SolverError::dimension("residual", n, r.len()));
    }
    let mut r_norm = checked_norm(&r, 0)?;

    if r_norm < config.tolerance {
        return Ok(NewtonResult {
            y,
            residual_norm: r_norm,
            iterations: 0,
        });
    }

    for iter in 1..=config.max_iterations {
        let jac = argument.jacobian(&y)?;
        if jac.nrows() != n {
            return Err(SolverError::dimension("Jacobian rows", n, jac.nrows()));
        }
        if jac.ncols() != n {
            return Err(SolverError::dimension("Jacobian columns", n, jac.ncols()));
        }
        let dy = newton_step(jac, &r, config.singular_tol, iter)?;

        let (y_new, r_new, alpha) = match config.damping {
            Damping::None => {
                let y_new = &y + &dy;
                let r_new = argument.residual(&y_new)?;
                (y_new, r_new, 1.0)
            }
            Damping::Relaxation(omega) => {
                let y_new = &y + omega * &dy;
                let r_new = argument.residual(&y_new)?;
                (y_new, r_new, omega)
            }
            Damping::Backtracking {
                beta,
                max_backtracks,
            } => {
                let mut alpha = 1.0;
                let mut y_new = &y + &dy;
                let mut r_new = argument.residual(&y_new)?;
                for _ in 0..max_backtracks {
                    if r_new.norm() < r_norm {
                        break;
                    }
                    alpha *= beta;
                    y_new = &y + alpha * &dy;
                    r_new = argument.residual(&y_new)?;
                }
                (y_new, r_new, alpha)
            }
        };

        y = y_new;
        r = r_new;
        r_norm = checked_norm(&r, iter)?;

        tracing::debug!(
            iteration = iter,
            residual_norm = r_norm,
            step_norm = dy.norm(),
            alpha,
            "newton step"
        );

        if r_norm < config.tolerance {
            return Ok(NewtonResult {
                y,
                residual_norm: r_norm,
                iterations: iter,
            });
        }
    }

    Err(SolverError::NonConvergence {
        iterations: config.max_iterations,
        residual_norm: r_norm,
        best: y,
    })
}

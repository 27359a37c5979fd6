//! Finite difference Jacobians.
//!
//! Used as the default [`crate::NewtonArgument::jacobian`] and to check the
//! closed-form Jacobians of the reduced models.

use crate::error::SolverResult;
use nalgebra::{DMatrix, DVector};

/// Default relative step for [`finite_difference_jacobian`].
pub const DEFAULT_FD_STEP: f64 = 1e-7;

/// Compute Jacobian using forward finite differences.
///
/// For each column j, perturbs x[j] by epsilon and computes (f(x+e) - f(x))/epsilon.
pub fn finite_difference_jacobian<F>(
    x: &DVector<f64>,
    f: F,
    epsilon: f64,
) -> SolverResult<DMatrix<f64>>
where
    F: Fn(&DVector<f64>) -> SolverResult<DVector<f64>>,
{
    let n = x.len();
    let f_x = f(x)?;
    let mut jac = DMatrix::zeros(f_x.len(), n);
    let mut x_perturbed = x.clone();

    for j in 0..n {
        let dx = epsilon * x[j].abs().max(1.0);
        x_perturbed[j] = x[j] + dx;
        let f_perturbed = f(&x_perturbed)?;
        x_perturbed[j] = x[j];

        jac.set_column(j, &((f_perturbed - &f_x) / dx));
    }

    Ok(jac)
}

/// Compute Jacobian using central finite differences (more accurate but 2x cost).
///
/// Exact up to rounding for quadratic residuals such as the reduced
/// Navier-Stokes system.
pub fn central_difference_jacobian<F>(
    x: &DVector<f64>,
    f: F,
    epsilon: f64,
) -> SolverResult<DMatrix<f64>>
where
    F: Fn(&DVector<f64>) -> SolverResult<DVector<f64>>,
{
    let n = x.len();
    let mut jac: Option<DMatrix<f64>> = None;
    let mut x_shift = x.clone();

    for j in 0..n {
        let dx = epsilon * x[j].abs().max(1.0);

        x_shift[j] = x[j] + dx;
        let f_plus = f(&x_shift)?;
        x_shift[j] = x[j] - dx;
        let f_minus = f(&x_shift)?;
        x_shift[j] = x[j];

        let jac = jac.get_or_insert_with(|| DMatrix::zeros(f_plus.len(), n));
        jac.set_column(j, &((f_plus - f_minus) / (2.0 * dx)));
    }

    match jac {
        Some(jac) => Ok(jac),
        None => Ok(DMatrix::zeros(f(x)?.len(), 0)),
    }
}

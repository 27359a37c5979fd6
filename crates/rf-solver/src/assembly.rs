//! Residual and Jacobian assembly shared by the steady reduced models.
//!
//! Coefficient layout: `y = [y_u, y_p]` with `y_u` of length `n_u`
//! (velocity then supremizer modes) and `y_p` of length `n_p`.
//!
//! ```text
//! r_u = nu B y_u + C(y_u, y_u) + K y_p - (nu BC1 + BC2) u_bc
//! r_p = P y_u
//! ```

use crate::error::{SolverError, SolverResult};
use nalgebra::{DMatrix, DVector};
use rf_operators::ReducedOperatorSet;

/// How the prescribed inlet velocity enters the reduced system.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum BoundaryTreatment {
    /// Forcing term from the lifting matrices only.
    #[default]
    Lifting,

    /// Lifting forcing, plus the first `n_bc` momentum equations replaced by
    /// `y_j = u_bc_j`. For bases whose leading velocity modes are the
    /// normalized lifting functions.
    Patched,

    /// Lifting forcing plus `tau (BC3 y_u - BC4 u_bc)` on the momentum rows.
    Penalty { tau: f64 },
}

impl BoundaryTreatment {
    pub fn as_str(&self) -> &'static str {
        match self {
            BoundaryTreatment::Lifting => "lifting",
            BoundaryTreatment::Patched => "patched",
            BoundaryTreatment::Penalty { .. } => "penalty",
        }
    }

    /// Check that `ops` carries what this treatment needs.
    pub fn validate(&self, ops: &ReducedOperatorSet) -> SolverResult<()> {
        match *self {
            BoundaryTreatment::Lifting => Ok(()),
            BoundaryTreatment::Patched => {
                if ops.n_bc() > ops.n_u() {
                    return Err(SolverError::dimension(
                        "patched boundary rows (n_bc <= n_u)",
                        ops.n_u(),
                        ops.n_bc(),
                    ));
                }
                Ok(())
            }
            BoundaryTreatment::Penalty { tau } => {
                if !(tau.is_finite() && tau > 0.0) {
                    return Err(SolverError::InvalidParameter {
                        what: "penalty factor tau",
                        value: tau,
                    });
                }
                if ops.penalty().is_none() {
                    return Err(SolverError::MissingOperator {
                        what: "penalty operators BC3/BC4",
                    });
                }
                Ok(())
            }
        }
    }
}

pub(crate) fn check_coefficients(ops: &ReducedOperatorSet, y: &DVector<f64>) -> SolverResult<()> {
    if y.len() != ops.size() {
        return Err(SolverError::dimension(
            "reduced coefficient vector",
            ops.size(),
            y.len(),
        ));
    }
    Ok(())
}

/// Linear (Stokes) part of the residual, including the lifting forcing.
pub(crate) fn linear_residual(
    ops: &ReducedOperatorSet,
    nu: f64,
    velocity: &DVector<f64>,
    y: &DVector<f64>,
) -> SolverResult<DVector<f64>> {
    check_coefficients(ops, y)?;
    let n_u = ops.n_u();
    let n_p = ops.n_p();
    let y_u = y.rows(0, n_u);
    let y_p = y.rows(n_u, n_p);
    let forcing = ops.boundary_forcing(nu, velocity)?;

    let mut r = DVector::zeros(n_u + n_p);
    {
        let mut r_u = r.rows_mut(0, n_u);
        r_u.gemv(nu, ops.b(), &y_u, 0.0);
        r_u.gemv(1.0, ops.k(), &y_p, 1.0);
        r_u -= &forcing;
    }
    r.rows_mut(n_u, n_p).gemv(1.0, ops.p(), &y_u, 0.0);
    Ok(r)
}

/// Saddle-point Jacobian `[[nu B, K], [P, 0]]` of [`linear_residual`].
pub(crate) fn linear_jacobian(ops: &ReducedOperatorSet, nu: f64) -> DMatrix<f64> {
    let n_u = ops.n_u();
    let n_p = ops.n_p();
    let mut jac = DMatrix::zeros(n_u + n_p, n_u + n_p);
    jac.view_mut((0, 0), (n_u, n_u)).copy_from(&(ops.b() * nu));
    jac.view_mut((0, n_u), (n_u, n_p)).copy_from(ops.k());
    jac.view_mut((n_u, 0), (n_p, n_u)).copy_from(ops.p());
    jac
}

/// Apply the boundary treatment to an assembled residual. Must run last:
/// patched rows overwrite everything else in those rows.
pub(crate) fn apply_boundary_residual(
    treatment: BoundaryTreatment,
    ops: &ReducedOperatorSet,
    velocity: &DVector<f64>,
    y: &DVector<f64>,
    r: &mut DVector<f64>,
) -> SolverResult<()> {
    match treatment {
        BoundaryTreatment::Lifting => {}
        BoundaryTreatment::Patched => {
            for j in 0..ops.n_bc() {
                r[j] = y[j] - velocity[j];
            }
        }
        BoundaryTreatment::Penalty { tau } => {
            let pen = ops.penalty().ok_or(SolverError::MissingOperator {
                what: "penalty operators BC3/BC4",
            })?;
            let n_u = ops.n_u();
            let y_u = y.rows(0, n_u);
            let mut r_u = r.rows_mut(0, n_u);
            r_u.gemv(tau, &pen.bc3, &y_u, 1.0);
            r_u.gemv(-tau, &pen.bc4, velocity, 1.0);
        }
    }
    Ok(())
}

/// Jacobian counterpart of [`apply_boundary_residual`].
pub(crate) fn apply_boundary_jacobian(
    treatment: BoundaryTreatment,
    ops: &ReducedOperatorSet,
    jac: &mut DMatrix<f64>,
) -> SolverResult<()> {
    match treatment {
        BoundaryTreatment::Lifting => {}
        BoundaryTreatment::Patched => {
            for j in 0..ops.n_bc() {
                jac.row_mut(j).fill(0.0);
                jac[(j, j)] = 1.0;
            }
        }
        BoundaryTreatment::Penalty { tau } => {
            let pen = ops.penalty().ok_or(SolverError::MissingOperator {
                what: "penalty operators BC3/BC4",
            })?;
            let n_u = ops.n_u();
            let mut block = jac.view_mut((0, 0), (n_u, n_u));
            block += &pen.bc3 * tau;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rf_operators::{ConvectiveTensor, ModeCounts, PenaltyOperators};

    fn ops() -> ReducedOperatorSet {
        let modes = ModeCounts::new(2, 0, 1);
        ReducedOperatorSet::new(
            modes,
            1,
            DMatrix::from_row_slice(2, 2, &[2.0, 0.0, 0.0, 3.0]),
            DMatrix::from_row_slice(2, 1, &[1.0, -1.0]),
            DMatrix::from_row_slice(1, 2, &[1.0, -1.0]),
            ConvectiveTensor::zeros(2),
            DMatrix::from_row_slice(2, 1, &[1.0, 0.0]),
            DMatrix::from_row_slice(2, 1, &[0.0, 4.0]),
        )
        .unwrap()
    }

    #[test]
    fn linear_residual_blocks() {
        let ops = ops();
        let y = DVector::from_vec(vec![1.0, 2.0, 0.5]);
        let u = DVector::from_vec(vec![1.0]);
        let r = linear_residual(&ops, 0.5, &u, &y).unwrap();
        // r_u = 0.5 * [2, 6] + 0.5 * [1, -1] - [0.5, 4]
        assert!((r[0] - 1.0).abs() < 1e-14);
        assert!((r[1] - (-1.5)).abs() < 1e-14);
        // r_p = 1 - 2
        assert!((r[2] - (-1.0)).abs() < 1e-14);
    }

    #[test]
    fn wrong_length_is_dimension_mismatch() {
        let ops = ops();
        let u = DVector::from_vec(vec![1.0]);
        let err = linear_residual(&ops, 0.5, &u, &DVector::zeros(4)).unwrap_err();
        assert!(matches!(
            err,
            SolverError::DimensionMismatch {
                expected: 3,
                found: 4,
                ..
            }
        ));
    }

    #[test]
    fn patched_rows_pin_coefficients() {
        let ops = ops();
        let y = DVector::from_vec(vec![0.25, 2.0, 0.5]);
        let u = DVector::from_vec(vec![1.0]);
        let mut r = linear_residual(&ops, 0.5, &u, &y).unwrap();
        apply_boundary_residual(BoundaryTreatment::Patched, &ops, &u, &y, &mut r).unwrap();
        assert_eq!(r[0], -0.75);

        let mut jac = linear_jacobian(&ops, 0.5);
        apply_boundary_jacobian(BoundaryTreatment::Patched, &ops, &mut jac).unwrap();
        assert_eq!(jac.row(0).iter().copied().collect::<Vec<_>>(), vec![1.0, 0.0, 0.0]);
    }

    #[test]
    fn penalty_requires_operators() {
        let ops = ops();
        let treatment = BoundaryTreatment::Penalty { tau: 10.0 };
        assert!(matches!(
            treatment.validate(&ops),
            Err(SolverError::MissingOperator { .. })
        ));

        let ops = ops
            .with_penalty(PenaltyOperators {
                bc3: DMatrix::identity(2, 2),
                bc4: DMatrix::from_element(2, 1, 1.0),
            })
            .unwrap();
        assert!(treatment.validate(&ops).is_ok());
        assert!(
            BoundaryTreatment::Penalty { tau: -1.0 }
                .validate(&ops)
                .is_err()
        );

        let mut jac = linear_jacobian(&ops, 0.5);
        apply_boundary_jacobian(treatment, &ops, &mut jac).unwrap();
        assert!((jac[(0, 0)] - 11.0).abs() < 1e-14);
        assert!((jac[(1, 1)] - 11.5).abs() < 1e-14);
    }
}

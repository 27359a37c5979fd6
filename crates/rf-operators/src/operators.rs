//! The immutable operator set consumed by the online solver.

use crate::modes::ModeCounts;
use crate::tensor::ConvectiveTensor;
use crate::{OperatorError, OperatorResult};
use nalgebra::{DMatrix, DVector};

/// Boundary operators for penalty enforcement of the inlet data.
///
/// Momentum rows gain `tau * (bc3 * y_u - bc4 * u_bc)`.
#[derive(Debug, Clone, PartialEq)]
pub struct PenaltyOperators {
    /// `n_u x n_u` boundary mass matrix of the velocity modes.
    pub bc3: DMatrix<f64>,
    /// `n_u x n_bc` projection of the inlet data onto the velocity modes.
    pub bc4: DMatrix<f64>,
}

/// Reduced matrices and tensor produced by the offline Galerkin projection.
///
/// Shapes (with `n_u = velocity + supremizer`, `n_p = pressure`):
/// - `b`: `n_u x n_u`, `k`: `n_u x n_p`, `p`: `n_p x n_u`
/// - `c`: `n_u x n_u x n_u`
/// - `bc1`, `bc2`: `n_u x n_bc`
///
/// Fields are private; the set is validated once in [`ReducedOperatorSet::new`]
/// and never changes afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct ReducedOperatorSet {
    modes: ModeCounts,
    n_bc: usize,
    b: DMatrix<f64>,
    k: DMatrix<f64>,
    p: DMatrix<f64>,
    c: ConvectiveTensor,
    bc1: DMatrix<f64>,
    bc2: DMatrix<f64>,
    penalty: Option<PenaltyOperators>,
}

fn check_shape(what: &str, m: &DMatrix<f64>, expected: (usize, usize)) -> OperatorResult<()> {
    if m.shape() != expected {
        return Err(OperatorError::shape(what, expected, m.shape()));
    }
    if let Some(&value) = m.iter().find(|v| !v.is_finite()) {
        return Err(rf_core::RfError::NonFinite {
            what: "reduced operator entry",
            value,
        }
        .into());
    }
    Ok(())
}

impl ReducedOperatorSet {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        modes: ModeCounts,
        n_bc: usize,
        b: DMatrix<f64>,
        k: DMatrix<f64>,
        p: DMatrix<f64>,
        c: ConvectiveTensor,
        bc1: DMatrix<f64>,
        bc2: DMatrix<f64>,
    ) -> OperatorResult<Self> {
        if modes.checked_total().is_none() {
            return Err(OperatorError::DimensionMismatch {
                what: "mode counts".to_string(),
                expected: "a total that fits in usize".to_string(),
                found: modes.to_string(),
            });
        }
        let n_u = modes.n_u();
        let n_p = modes.n_p();

        check_shape("B", &b, (n_u, n_u))?;
        check_shape("K", &k, (n_u, n_p))?;
        check_shape("P", &p, (n_p, n_u))?;
        check_shape("BC1", &bc1, (n_u, n_bc))?;
        check_shape("BC2", &bc2, (n_u, n_bc))?;
        if c.dim() != n_u {
            return Err(OperatorError::DimensionMismatch {
                what: "C".to_string(),
                expected: format!("{n_u}x{n_u}x{n_u}"),
                found: format!("{0}x{0}x{0}", c.dim()),
            });
        }
        rf_core::ensure_all_finite(c.as_slice(), "convective tensor entry")?;

        Ok(Self {
            modes,
            n_bc,
            b,
            k,
            p,
            c,
            bc1,
            bc2,
            penalty: None,
        })
    }

    /// Attach penalty boundary operators.
    pub fn with_penalty(mut self, penalty: PenaltyOperators) -> OperatorResult<Self> {
        let n_u = self.modes.n_u();
        check_shape("BC3", &penalty.bc3, (n_u, n_u))?;
        check_shape("BC4", &penalty.bc4, (n_u, self.n_bc))?;
        self.penalty = Some(penalty);
        Ok(self)
    }

    pub fn modes(&self) -> ModeCounts {
        self.modes
    }

    /// Number of prescribed inlet coefficients.
    pub fn n_bc(&self) -> usize {
        self.n_bc
    }

    pub fn n_u(&self) -> usize {
        self.modes.n_u()
    }

    pub fn n_p(&self) -> usize {
        self.modes.n_p()
    }

    /// Length of the reduced coefficient vector.
    pub fn size(&self) -> usize {
        self.modes.total()
    }

    pub fn b(&self) -> &DMatrix<f64> {
        &self.b
    }

    pub fn k(&self) -> &DMatrix<f64> {
        &self.k
    }

    pub fn p(&self) -> &DMatrix<f64> {
        &self.p
    }

    pub fn c(&self) -> &ConvectiveTensor {
        &self.c
    }

    pub fn bc1(&self) -> &DMatrix<f64> {
        &self.bc1
    }

    pub fn bc2(&self) -> &DMatrix<f64> {
        &self.bc2
    }

    pub fn penalty(&self) -> Option<&PenaltyOperators> {
        self.penalty.as_ref()
    }

    /// Lifting forcing `nu * BC1 * u_bc + BC2 * u_bc` over the velocity block.
    pub fn boundary_forcing(&self, nu: f64, velocity: &DVector<f64>) -> OperatorResult<DVector<f64>> {
        if velocity.len() != self.n_bc {
            return Err(OperatorError::shape(
                "inlet velocity coefficients",
                (self.n_bc, 1),
                (velocity.len(), 1),
            ));
        }
        let mut forcing = &self.bc2 * velocity;
        forcing.gemv(nu, &self.bc1, velocity, 1.0);
        Ok(forcing)
    }

    /// Restrict every operator to the leading modes of `target`.
    ///
    /// Supremizer modes are selected independently of the velocity modes, so
    /// truncating `U=10 SUP=10` to `U=5 SUP=5` keeps velocity indices `0..5`
    /// and `10..15`.
    pub fn truncate(&self, target: ModeCounts) -> OperatorResult<Self> {
        if target == self.modes {
            return Ok(self.clone());
        }
        for (what, requested, available) in [
            ("velocity modes", target.velocity, self.modes.velocity),
            ("supremizer modes", target.supremizer, self.modes.supremizer),
            ("pressure modes", target.pressure, self.modes.pressure),
        ] {
            if requested > available {
                return Err(OperatorError::Truncation {
                    what,
                    requested,
                    available,
                });
            }
        }

        let vel = self.modes.velocity_indices(&target);
        let pres = self.modes.pressure_indices(&target);

        let penalty = self.penalty.as_ref().map(|pen| PenaltyOperators {
            bc3: pen.bc3.select_rows(vel.iter()).select_columns(vel.iter()),
            bc4: pen.bc4.select_rows(vel.iter()),
        });

        Ok(Self {
            modes: target,
            n_bc: self.n_bc,
            b: self.b.select_rows(vel.iter()).select_columns(vel.iter()),
            k: self.k.select_rows(vel.iter()).select_columns(pres.iter()),
            p: self.p.select_rows(pres.iter()).select_columns(vel.iter()),
            c: self.c.select(&vel)?,
            bc1: self.bc1.select_rows(vel.iter()),
            bc2: self.bc2.select_rows(vel.iter()),
            penalty,
        })
    }
}

//! Shared operator fixtures for the solver integration tests.
#![allow(dead_code)]

use nalgebra::{DMatrix, DVector};
use rf_operators::{ConvectiveTensor, ModeCounts, PenaltyOperators, ReducedOperatorSet};

/// Five velocity, five supremizer and five pressure modes, two inlet
/// coefficients.
pub const MODES: ModeCounts = ModeCounts {
    velocity: 5,
    supremizer: 5,
    pressure: 5,
};

pub const N_BC: usize = 2;

/// Symmetric, diagonally dominant velocity mass/diffusion matrix.
fn diffusion(n: usize) -> DMatrix<f64> {
    DMatrix::from_fn(n, n, |i, j| {
        if i == j {
            1.0
        } else {
            0.05 / (1.0 + i.abs_diff(j) as f64)
        }
    })
}

/// Pressure gradient coupling modes 2..7 to the five pressure modes.
/// Modes 0 and 1 stay free of the continuity constraint.
fn gradient(n_u: usize, n_p: usize) -> DMatrix<f64> {
    DMatrix::from_fn(n_u, n_p, |i, j| if i == j + 2 { 1.0 } else { 0.0 })
}

fn convection(n: usize, scale: f64) -> ConvectiveTensor {
    ConvectiveTensor::from_fn(n, |i, j, k| scale * (((i + 2 * j + 3 * k) % 7) as f64 - 3.0))
}

fn lifting_matrices(n_u: usize) -> (DMatrix<f64>, DMatrix<f64>) {
    let bc1 = DMatrix::from_fn(n_u, N_BC, |i, j| {
        1e-3 * ((i % 3) as f64 + 1.0) * if j == 0 { 1.0 } else { 0.5 }
    });
    let bc2 = DMatrix::from_fn(n_u, N_BC, |i, j| 1e-3 * (((i + j) % 4) as f64 + 1.0));
    (bc1, bc2)
}

/// Mildly nonlinear saddle-point operator set (`P = K^T`).
pub fn scenario_ops() -> ReducedOperatorSet {
    build(5e-5)
}

/// Same operators with the convective tensor zeroed.
pub fn linear_ops() -> ReducedOperatorSet {
    build(0.0)
}

fn build(c_scale: f64) -> ReducedOperatorSet {
    let n_u = MODES.n_u();
    let n_p = MODES.n_p();
    let k = gradient(n_u, n_p);
    let (bc1, bc2) = lifting_matrices(n_u);
    ReducedOperatorSet::new(
        MODES,
        N_BC,
        diffusion(n_u),
        k.clone(),
        k.transpose(),
        convection(n_u, c_scale),
        bc1,
        bc2,
    )
    .expect("fixture operators are consistent")
}

pub fn with_penalty(ops: ReducedOperatorSet) -> ReducedOperatorSet {
    let n_u = ops.n_u();
    let bc4 = DMatrix::from_fn(n_u, N_BC, |i, j| if i == j { 1.0 } else { 0.0 });
    ops.with_penalty(PenaltyOperators {
        bc3: DMatrix::from_fn(n_u, n_u, |i, j| if i == j && i < N_BC { 1.0 } else { 0.0 }),
        bc4,
    })
    .expect("fixture penalty operators are consistent")
}

/// Every operator zero except the lifting forcing.
pub fn zero_ops_with_forcing() -> ReducedOperatorSet {
    let n_u = MODES.n_u();
    let n_p = MODES.n_p();
    let (bc1, bc2) = lifting_matrices(n_u);
    ReducedOperatorSet::new(
        MODES,
        N_BC,
        DMatrix::zeros(n_u, n_u),
        DMatrix::zeros(n_u, n_p),
        DMatrix::zeros(n_p, n_u),
        ConvectiveTensor::zeros(n_u),
        bc1,
        bc2,
    )
    .expect("fixture operators are consistent")
}

/// Unit inlet velocity in the first boundary component.
pub fn inlet() -> DVector<f64> {
    DVector::from_vec(vec![1.0, 0.0])
}

/// Viscosity column of a 20-sample parameter sweep.
pub fn viscosities() -> Vec<f64> {
    (0..20).map(|k| 0.01 + 0.005 * k as f64).collect()
}

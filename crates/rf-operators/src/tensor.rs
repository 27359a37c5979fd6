//! Flat storage for the projected convective term.

use crate::{OperatorError, OperatorResult};
use nalgebra::{DMatrix, DVector};

/// Cubic tensor `C[i, j, k]` over the velocity block, stored row-major in one
/// contiguous buffer: `(i, j, k) -> i * n * n + j * n + k`.
///
/// Slice `i` (all `j`, `k`) is the matrix of the quadratic form that gives
/// momentum row `i`.
#[derive(Debug, Clone, PartialEq)]
pub struct ConvectiveTensor {
    n: usize,
    data: Vec<f64>,
}

impl ConvectiveTensor {
    pub fn new(n: usize, data: Vec<f64>) -> OperatorResult<Self> {
        let Some(expected) = n.checked_mul(n).and_then(|nn| nn.checked_mul(n)) else {
            return Err(OperatorError::DimensionMismatch {
                what: "convective tensor C".to_string(),
                expected: "a size whose cube fits in usize".to_string(),
                found: format!("n = {n}"),
            });
        };
        if data.len() != expected {
            return Err(OperatorError::DimensionMismatch {
                what: "convective tensor C".to_string(),
                expected: format!("{n}x{n}x{n} ({expected} entries)"),
                found: format!("{} entries", data.len()),
            });
        }
        Ok(Self { n, data })
    }

    pub fn zeros(n: usize) -> Self {
        Self {
            n,
            data: vec![0.0; n * n * n],
        }
    }

    pub fn from_fn(n: usize, mut f: impl FnMut(usize, usize, usize) -> f64) -> Self {
        let mut data = Vec::with_capacity(n * n * n);
        for i in 0..n {
            for j in 0..n {
                for k in 0..n {
                    data.push(f(i, j, k));
                }
            }
        }
        Self { n, data }
    }

    /// Number of modes along each index.
    pub fn dim(&self) -> usize {
        self.n
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    #[inline]
    fn offset(&self, i: usize, j: usize, k: usize) -> usize {
        (i * self.n + j) * self.n + k
    }

    #[inline]
    pub fn get(&self, i: usize, j: usize, k: usize) -> f64 {
        self.data[self.offset(i, j, k)]
    }

    /// Contiguous `n x n` slice for momentum row `i`, row-major in `(j, k)`.
    #[inline]
    pub fn slice(&self, i: usize) -> &[f64] {
        let len = self.n * self.n;
        &self.data[i * len..(i + 1) * len]
    }

    pub fn is_zero(&self) -> bool {
        self.data.iter().all(|&c| c == 0.0)
    }

    /// `out[i] += sum_j sum_k C[i, j, k] * a[j] * a[k]`.
    ///
    /// `a` and `out` must both have length `n`; no allocation.
    pub fn add_contraction(&self, a: &[f64], out: &mut [f64]) {
        debug_assert_eq!(a.len(), self.n);
        debug_assert_eq!(out.len(), self.n);
        let n = self.n;
        for (i, out_i) in out.iter_mut().enumerate() {
            let slice = self.slice(i);
            let mut acc = 0.0;
            for j in 0..n {
                let row = &slice[j * n..(j + 1) * n];
                let inner: f64 = row.iter().zip(a).map(|(c, ak)| c * ak).sum();
                acc += a[j] * inner;
            }
            *out_i += acc;
        }
    }

    /// Allocating convenience wrapper over [`Self::add_contraction`].
    pub fn contract(&self, a: &DVector<f64>) -> DVector<f64> {
        let mut out = DVector::zeros(self.n);
        self.add_contraction(a.as_slice(), out.as_mut_slice());
        out
    }

    /// `jac[(i, j)] += sum_k (C[i, j, k] + C[i, k, j]) * a[k]` for the leading
    /// `n x n` block of `jac`.
    pub fn add_jacobian(&self, a: &[f64], jac: &mut DMatrix<f64>) {
        debug_assert_eq!(a.len(), self.n);
        debug_assert!(jac.nrows() >= self.n && jac.ncols() >= self.n);
        let n = self.n;
        for i in 0..n {
            let slice = self.slice(i);
            for j in 0..n {
                let mut acc = 0.0;
                for k in 0..n {
                    acc += (slice[j * n + k] + slice[k * n + j]) * a[k];
                }
                jac[(i, j)] += acc;
            }
        }
    }

    /// Keep only the modes listed in `indices` along all three axes.
    pub fn select(&self, indices: &[usize]) -> OperatorResult<Self> {
        if let Some(&bad) = indices.iter().find(|&&idx| idx >= self.n) {
            return Err(OperatorError::Truncation {
                what: "convective tensor C",
                requested: bad + 1,
                available: self.n,
            });
        }
        Ok(Self::from_fn(indices.len(), |i, j, k| {
            self.get(indices[i], indices[j], indices[k])
        }))
    }
}

//! Initial guess policy for online solves.
//!
//! The reduced Navier-Stokes system is quadratic, so it can have spurious
//! roots. A poor seed may converge to one of them; the policy only chooses
//! the seed and never tries to correct a converged result.

/// Where the Newton iteration of an online query starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InitialGuess {
    /// Start every query from `y = 0`.
    #[default]
    Zero,

    /// Start from the previous query's coefficients (zero for the first
    /// query). Only meaningful when queries run sequentially over nearby
    /// parameter values.
    WarmStart,
}

impl InitialGuess {
    /// Human-readable name for logs and manifests.
    pub fn as_str(&self) -> &'static str {
        match self {
            InitialGuess::Zero => "zero",
            InitialGuess::WarmStart => "warm_start",
        }
    }

    /// Whether the seed depends on earlier queries.
    pub fn carries_state(&self) -> bool {
        matches!(self, InitialGuess::WarmStart)
    }
}

//! Mode counts and the velocity-block index layout.

use serde::{Deserialize, Serialize};

/// Number of modes per reduced field.
///
/// The velocity block of the coefficient vector holds the `velocity` POD
/// modes first, followed by the `supremizer` modes. The pressure block holds
/// `pressure` modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct ModeCounts {
    pub velocity: usize,
    #[serde(default)]
    pub supremizer: usize,
    pub pressure: usize,
}

impl ModeCounts {
    pub fn new(velocity: usize, supremizer: usize, pressure: usize) -> Self {
        Self {
            velocity,
            supremizer,
            pressure,
        }
    }

    /// Size of the velocity block `y_u` (velocity + supremizer modes).
    pub fn n_u(&self) -> usize {
        self.velocity.saturating_add(self.supremizer)
    }

    /// Size of the pressure block `y_p`.
    pub fn n_p(&self) -> usize {
        self.pressure
    }

    /// Length of the full reduced coefficient vector.
    pub fn total(&self) -> usize {
        self.n_u().saturating_add(self.n_p())
    }

    /// [`Self::total`], or `None` when the counts do not fit in `usize`.
    pub fn checked_total(&self) -> Option<usize> {
        self.velocity
            .checked_add(self.supremizer)?
            .checked_add(self.pressure)
    }

    /// Whether `other` fits inside `self` block by block.
    pub fn contains(&self, other: &ModeCounts) -> bool {
        other.velocity <= self.velocity
            && other.supremizer <= self.supremizer
            && other.pressure <= self.pressure
    }

    /// Indices into this layout's velocity block that select the leading
    /// modes of `target` (velocity modes, then supremizer modes).
    pub fn velocity_indices(&self, target: &ModeCounts) -> Vec<usize> {
        (0..target.velocity)
            .chain((0..target.supremizer).map(|s| self.velocity + s))
            .collect()
    }

    /// Indices into this layout's pressure block that select `target`'s modes.
    pub fn pressure_indices(&self, target: &ModeCounts) -> Vec<usize> {
        (0..target.pressure).collect()
    }
}

impl std::fmt::Display for ModeCounts {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "U={} SUP={} P={}",
            self.velocity, self.supremizer, self.pressure
        )
    }
}

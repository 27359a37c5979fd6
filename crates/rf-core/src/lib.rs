//! rf-core: shared foundation for romflow.
//!
//! Contains:
//! - numeric (finite-value checks)
//! - ids (1-based parameter sample identifiers)
//! - timing (wall-clock timers for solves and sweeps)
//! - error (shared error types)

pub mod error;
pub mod ids;
pub mod numeric;
pub mod timing;

pub use error::{RfError, RfResult};
pub use ids::*;
pub use numeric::*;

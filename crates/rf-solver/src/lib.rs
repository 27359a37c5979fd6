//! Online solver for reduced steady incompressible flow models.
//!
//! Given a precomputed [`rf_operators::ReducedOperatorSet`], the models in this
//! crate assemble the reduced residual and Jacobian and solve for the reduced
//! coefficients with a generic Newton iteration.

pub mod assembly;
pub mod error;
pub mod initialization;
pub mod jacobian;
pub mod newton;
pub mod online;
pub mod problem;
pub mod steady_ns;
pub mod stokes;

pub use assembly::BoundaryTreatment;
pub use error::{SolverError, SolverResult};
pub use initialization::InitialGuess;
pub use jacobian::{central_difference_jacobian, finite_difference_jacobian};
pub use newton::{Damping, FnArgument, NewtonArgument, NewtonConfig, NewtonResult, newton_solve};
pub use online::OnlineState;
pub use problem::{PhysicsKind, ReducedProblem};
pub use steady_ns::SteadyNsModel;
pub use stokes::SteadyStokesModel;

pub mod trajectory;
pub mod trajectory_plotting;

mod error;
mod parameters;
mod butcher;
mod propensity;
mod projection;
mod g_values;
mod registry;
mod bound;
mod reaction_bound;
mod species_bound;
mod tau_estimator;
mod classifier;
mod firing;
mod controller;
mod simulation;

pub use error::*;
pub use parameters::*;
pub use butcher::*;
pub use propensity::*;
pub use projection::*;
pub use g_values::*;
pub use registry::*;
pub use bound::*;
pub use reaction_bound::*;
pub use species_bound::*;
pub use tau_estimator::*;
pub use classifier::*;
pub use firing::*;
pub use controller::*;
pub use simulation::*;

mod error;
mod reaction;
mod network;

pub use error::*;
pub use reaction::*;
pub use network::*;

/// Index of a species in a `ReactionNetwork`. Species are never removed, so
/// an index stays valid for the lifetime of the network.
pub type SpeciesIdx = usize;

/// Index of a reaction in a `ReactionNetwork` (append-only, like species).
pub type ReactionIdx = usize;

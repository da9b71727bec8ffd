//! # tauleap
//!
//! Adaptive tau-leaping for chemical reaction networks.
//!
//! This crate re-exports the network model and the leap controller, and
//! provides the input parsers and argument groups of `tl-simulate`.

pub mod network_parsers;
pub mod leap_parsers;

pub mod network {
    pub use ::tl_network::*;
}

pub mod kinetics {
    pub use ::tl_kinetics::*;
}

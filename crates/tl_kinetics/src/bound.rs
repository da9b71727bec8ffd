use tl_network::ReactionNetwork;

use crate::LeapError;
use crate::ProjectedChange;

/// Which side of a leap a bound check is looking at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeapPhase {
    /// Validate a proposed leap: candidates are the projected populations.
    PreLeap,
    /// Judge a leap that was just taken: candidates are the live populations.
    PostLeap,
}

/// Bounds how far populations may drift during one leap.
///
/// Implementations own a registry of baseline values (the state at the last
/// committed leap) which must be reconciled with the network before it is
/// used. The bound arithmetic is the same in both `LeapPhase`s; `scale`
/// tightens the tolerance (`scale = w < 1` for the substantial acceptance
/// check, `scale = 1` otherwise).
pub trait LeapBoundChecker {
    /// Short label used in log messages.
    fn name(&self) -> &'static str;

    /// Relative tolerance of the bound.
    fn eps(&self) -> f64;

    /// Number of tracked entities (reactions or species).
    fn tracked(&self) -> usize;

    /// Catch up with entities appended to the network. Returns the number
    /// of new entries; a second call without network growth returns 0 and
    /// changes nothing.
    fn reconcile(&mut self, network: &ReactionNetwork) -> Result<usize, LeapError>;

    /// Store `baseline + mean + sdev` as the projected value of every
    /// tracked quantity. `changes` holds one entry per species.
    fn project(&mut self, changes: &[ProjectedChange]);

    fn check(&self, scale: f64, network: &ReactionNetwork, phase: LeapPhase) -> bool;

    /// Take the live network state as the new baseline.
    fn commit(&mut self, network: &ReactionNetwork) -> Result<(), LeapError>;
}

/// `|x - x0| <= max(scale eps |x0| / g, 1)`.
///
/// The one-molecule floor keeps the condition satisfiable for species at
/// or near zero population.
pub fn within_bound(x0: f64, x: f64, eps: f64, scale: f64, g: f64) -> bool {
    let allowed = (scale * eps * x0.abs() / g).max(1.0);
    (x - x0).abs() <= allowed
}

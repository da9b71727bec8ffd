use log::trace;
use tl_network::ReactionNetwork;

use crate::bound::within_bound;
use crate::LeapBoundChecker;
use crate::LeapError;
use crate::LeapPhase;
use crate::ProjectedChange;
use crate::ReactionRegistry;

/// Reaction-based leap bound: every rate-law species of every reaction
/// must stay within `eps` of the population it had when the reaction's
/// baseline was last committed.
#[derive(Debug, Clone)]
pub struct ReactionBound {
    eps: f64,
    registry: ReactionRegistry,
}

impl ReactionBound {
    pub fn new(eps: f64) -> Self {
        Self {
            eps,
            registry: ReactionRegistry::default(),
        }
    }

    pub fn registry(&self) -> &ReactionRegistry {
        &self.registry
    }
}

impl LeapBoundChecker for ReactionBound {
    fn name(&self) -> &'static str {
        "reaction-bound"
    }

    fn eps(&self) -> f64 {
        self.eps
    }

    fn tracked(&self) -> usize {
        self.registry.len()
    }

    fn reconcile(&mut self, network: &ReactionNetwork) -> Result<usize, LeapError> {
        self.registry.reconcile(network)
    }

    fn project(&mut self, changes: &[ProjectedChange]) {
        self.registry.project(changes);
    }

    fn check(&self, scale: f64, network: &ReactionNetwork, phase: LeapPhase) -> bool {
        for v in 0..self.registry.len() {
            let species = self.registry.rate_species(v);
            let baseline = self.registry.baseline(v);
            let projected = self.registry.projected(v);
            for (k, &s) in species.iter().enumerate() {
                let x = match phase {
                    LeapPhase::PreLeap => projected[k],
                    LeapPhase::PostLeap => network.population(s),
                };
                if !within_bound(baseline[k], x, self.eps, scale, 1.0) {
                    trace!("{}: reaction {} species {} moved {} -> {} (scale {})",
                        self.name(), v, s, baseline[k], x, scale);
                    return false;
                }
            }
        }
        true
    }

    fn commit(&mut self, network: &ReactionNetwork) -> Result<(), LeapError> {
        self.registry.commit(network)
    }
}

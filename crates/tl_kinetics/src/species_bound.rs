use log::trace;
use tl_network::ReactionNetwork;

use crate::bound::within_bound;
use crate::GValueEstimator;
use crate::HighestOrderG;
use crate::LeapBoundChecker;
use crate::LeapError;
use crate::LeapPhase;
use crate::ProjectedChange;
use crate::SpeciesRegistry;

/// Species-based leap bound: every species must stay within `eps / g_j` of
/// its committed population, where `g_j` comes from a `GValueEstimator` and
/// is refreshed on every commit.
#[derive(Debug, Clone)]
pub struct SpeciesBound<G: GValueEstimator = HighestOrderG> {
    eps: f64,
    estimator: G,
    registry: SpeciesRegistry,
}

impl<G: GValueEstimator> SpeciesBound<G> {
    pub fn new(eps: f64, estimator: G) -> Self {
        Self {
            eps,
            estimator,
            registry: SpeciesRegistry::default(),
        }
    }

    pub fn registry(&self) -> &SpeciesRegistry {
        &self.registry
    }

    pub fn estimator(&self) -> &G {
        &self.estimator
    }
}

impl<G: GValueEstimator> LeapBoundChecker for SpeciesBound<G> {
    fn name(&self) -> &'static str {
        "species-bound"
    }

    fn eps(&self) -> f64 {
        self.eps
    }

    fn tracked(&self) -> usize {
        self.registry.len()
    }

    fn reconcile(&mut self, network: &ReactionNetwork) -> Result<usize, LeapError> {
        self.registry.reconcile(network, &self.estimator)
    }

    fn project(&mut self, changes: &[ProjectedChange]) {
        self.registry.project(changes);
    }

    fn check(&self, scale: f64, network: &ReactionNetwork, phase: LeapPhase) -> bool {
        let baseline = self.registry.baseline();
        let g = self.registry.g();
        for j in 0..baseline.len() {
            let x = match phase {
                LeapPhase::PreLeap => self.registry.projected()[j],
                LeapPhase::PostLeap => network.population(j),
            };
            if !within_bound(baseline[j], x, self.eps, scale, g[j]) {
                trace!("{}: species {} moved {} -> {} (g {}, scale {})",
                    self.name(), j, baseline[j], x, g[j], scale);
                return false;
            }
        }
        true
    }

    fn commit(&mut self, network: &ReactionNetwork) -> Result<(), LeapError> {
        self.registry.commit(network, &self.estimator)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tl_network::Reaction;

    struct ConstG(f64);

    impl GValueEstimator for ConstG {
        fn g(&self, _network: &ReactionNetwork, _species: usize) -> f64 {
            self.0
        }
    }

    fn network() -> ReactionNetwork {
        let mut net = ReactionNetwork::new();
        let a = net.add_species("A", 100.0).unwrap();
        let b = net.add_species("B", 40.0).unwrap();
        net.add_reaction(Reaction::new("a-to-b", 1.0, &[a], &[b]).unwrap()).unwrap();
        net
    }

    #[test]
    fn test_g_tightens_bound() {
        let net = network();
        let changes = [
            ProjectedChange { mean: -6.0, sdev: -1.0 },
            ProjectedChange { mean: 3.0, sdev: 0.5 },
        ];

        let mut sb = SpeciesBound::new(0.1, ConstG(1.0));
        sb.reconcile(&net).unwrap();
        sb.project(&changes);
        assert_eq!(sb.registry().projected(), &[93.0, 43.5]);
        assert!(sb.check(1.0, &net, LeapPhase::PreLeap));

        // With g = 2 A may only move by 5 and B by 2.
        let mut sb = SpeciesBound::new(0.1, ConstG(2.0));
        sb.reconcile(&net).unwrap();
        sb.project(&changes);
        assert!(!sb.check(1.0, &net, LeapPhase::PreLeap));
    }

    #[test]
    fn test_post_leap_and_commit() {
        let mut net = network();
        let mut sb = SpeciesBound::new(0.1, HighestOrderG);
        assert_eq!(sb.reconcile(&net).unwrap(), 2);
        assert_eq!(sb.registry().g(), &[1.0, 1.0]);

        // B (40) tolerates 4, A (100) tolerates 10.
        net.fire(0, 5.0);
        assert!(!sb.check(1.0, &net, LeapPhase::PostLeap));
        sb.commit(&net).unwrap();
        assert_eq!(sb.registry().baseline(), &[95.0, 45.0]);
        assert!(sb.check(0.1, &net, LeapPhase::PostLeap));
    }

    #[test]
    fn test_new_species_are_tracked() {
        let mut net = network();
        let mut sb = SpeciesBound::new(0.1, HighestOrderG);
        sb.reconcile(&net).unwrap();

        let c = net.add_species("C", 0.0).unwrap();
        net.add_reaction(Reaction::new("dimer", 0.01, &[0, 0], &[c]).unwrap()).unwrap();
        assert_eq!(sb.tracked(), 2);
        assert_eq!(sb.reconcile(&net).unwrap(), 1);
        assert_eq!(sb.tracked(), 3);
        // g of A is refreshed on commit, not on reconcile.
        assert_eq!(sb.registry().g()[0], 1.0);
        sb.commit(&net).unwrap();
        assert!((sb.registry().g()[0] - (2.0 + 1.0 / 99.0)).abs() < 1e-12);
    }
}

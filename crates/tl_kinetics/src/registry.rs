//! Per-entity bookkeeping of the bound checkers.
//!
//! Reactions and species may be appended to a `ReactionNetwork` after a
//! checker was built. Each registry therefore catches up lazily:
//! `reconcile` appends one entry per entity it has not seen yet,
//! initialising the baseline from the live network and the projected slot
//! with zero. All parallel arrays of a registry must have the same length;
//! anything else is reported as `LeapError::RegistryMismatch`.

use tl_network::ReactionNetwork;

use crate::GValueEstimator;
use crate::LeapError;
use crate::ProjectedChange;

/// Baseline and projected populations of the rate-law species of every
/// reaction: `baseline[v][k]` belongs to the `k`-th rate species of `v`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReactionRegistry {
    rate_species: Vec<Vec<usize>>,
    baseline: Vec<Vec<f64>>,
    projected: Vec<Vec<f64>>,
}

impl ReactionRegistry {
    pub fn len(&self) -> usize {
        self.baseline.len()
    }

    pub fn is_empty(&self) -> bool {
        self.baseline.is_empty()
    }

    pub fn rate_species(&self, v: usize) -> &[usize] {
        &self.rate_species[v]
    }

    pub fn baseline(&self, v: usize) -> &[f64] {
        &self.baseline[v]
    }

    pub fn projected(&self, v: usize) -> &[f64] {
        &self.projected[v]
    }

    /// `projected[v][k] = baseline[v][k] + mean + sdev` of the species.
    pub(crate) fn project(&mut self, changes: &[ProjectedChange]) {
        let rows = self.rate_species.iter().zip(&self.baseline).zip(self.projected.iter_mut());
        for ((species, baseline), projected) in rows {
            for ((p, &b), &s) in projected.iter_mut().zip(baseline).zip(species) {
                *p = b + changes[s].extreme();
            }
        }
    }

    fn mismatch(&self, expected: usize) -> LeapError {
        LeapError::RegistryMismatch {
            registry: "reaction",
            lengths: vec![self.rate_species.len(), self.baseline.len(), self.projected.len()],
            expected,
        }
    }

    fn consistent(&self) -> bool {
        self.rate_species.len() == self.baseline.len()
            && self.baseline.len() == self.projected.len()
    }

    /// Append entries until every reaction of the network is tracked.
    /// Returns the number of entries added.
    pub fn reconcile(&mut self, network: &ReactionNetwork) -> Result<usize, LeapError> {
        let live = network.num_reactions();
        if !self.consistent() || self.len() > live {
            return Err(self.mismatch(live));
        }
        let added = live - self.len();
        while self.len() < live {
            let v = self.len();
            let species = network.reaction(v).rate_species();
            let baseline = species.iter().map(|&s| network.population(s)).collect();
            self.projected.push(vec![0.0; species.len()]);
            self.baseline.push(baseline);
            self.rate_species.push(species);
        }
        Ok(added)
    }

    /// Copy the live populations into the baseline.
    pub fn commit(&mut self, network: &ReactionNetwork) -> Result<(), LeapError> {
        if !self.consistent() || self.len() != network.num_reactions() {
            return Err(self.mismatch(network.num_reactions()));
        }
        for (species, baseline) in self.rate_species.iter().zip(self.baseline.iter_mut()) {
            for (b, &s) in baseline.iter_mut().zip(species) {
                *b = network.population(s);
            }
        }
        Ok(())
    }

    #[cfg(test)]
    pub(crate) fn corrupt(&mut self) {
        self.baseline.pop();
    }
}

/// Baseline population, committed g value and projected population of
/// every species.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpeciesRegistry {
    baseline: Vec<f64>,
    g: Vec<f64>,
    projected: Vec<f64>,
}

impl SpeciesRegistry {
    pub fn len(&self) -> usize {
        self.baseline.len()
    }

    pub fn is_empty(&self) -> bool {
        self.baseline.is_empty()
    }

    pub fn baseline(&self) -> &[f64] {
        &self.baseline
    }

    pub fn g(&self) -> &[f64] {
        &self.g
    }

    pub fn projected(&self) -> &[f64] {
        &self.projected
    }

    pub(crate) fn project(&mut self, changes: &[ProjectedChange]) {
        for ((p, &b), change) in self.projected.iter_mut().zip(&self.baseline).zip(changes) {
            *p = b + change.extreme();
        }
    }

    fn mismatch(&self, expected: usize) -> LeapError {
        LeapError::RegistryMismatch {
            registry: "species",
            lengths: vec![self.baseline.len(), self.g.len(), self.projected.len()],
            expected,
        }
    }

    fn consistent(&self) -> bool {
        self.baseline.len() == self.g.len() && self.baseline.len() == self.projected.len()
    }

    pub fn reconcile<G: GValueEstimator>(
        &mut self,
        network: &ReactionNetwork,
        estimator: &G,
    ) -> Result<usize, LeapError> {
        let live = network.num_species();
        if !self.consistent() || self.len() > live {
            return Err(self.mismatch(live));
        }
        let added = live - self.len();
        while self.len() < live {
            let j = self.len();
            self.baseline.push(network.population(j));
            self.g.push(estimator.g(network, j));
            self.projected.push(0.0);
        }
        Ok(added)
    }

    /// Copy the live populations into the baseline and recompute g.
    pub fn commit<G: GValueEstimator>(
        &mut self,
        network: &ReactionNetwork,
        estimator: &G,
    ) -> Result<(), LeapError> {
        if !self.consistent() || self.len() != network.num_species() {
            return Err(self.mismatch(network.num_species()));
        }
        for j in 0..self.baseline.len() {
            self.baseline[j] = network.population(j);
            self.g[j] = estimator.g(network, j);
        }
        Ok(())
    }

    #[cfg(test)]
    pub(crate) fn corrupt(&mut self) {
        self.projected.pop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::HighestOrderG;
    use tl_network::Reaction;

    fn network() -> ReactionNetwork {
        let mut net = ReactionNetwork::new();
        let a = net.add_species("A", 50.0).unwrap();
        let b = net.add_species("B", 7.0).unwrap();
        net.add_reaction(Reaction::new("bind", 1.0, &[a, b], &[]).unwrap()).unwrap();
        net
    }

    #[test]
    fn test_reaction_registry_reconcile_idempotent() {
        let net = network();
        let mut reg = ReactionRegistry::default();
        assert_eq!(reg.reconcile(&net).unwrap(), 1);
        assert_eq!(reg.baseline(0), &[50.0, 7.0]);
        assert_eq!(reg.projected(0), &[0.0, 0.0]);
        assert_eq!(reg.rate_species(0), &[0, 1]);

        let before = reg.clone();
        assert_eq!(reg.reconcile(&net).unwrap(), 0);
        assert_eq!(reg, before);
    }

    #[test]
    fn test_reaction_registry_growth_and_commit() {
        let mut net = network();
        let mut reg = ReactionRegistry::default();
        reg.reconcile(&net).unwrap();

        net.fire(0, 2.0);
        let c = net.add_species("C", 3.0).unwrap();
        net.add_reaction(Reaction::new("c-decay", 1.0, &[c], &[]).unwrap()).unwrap();

        // Out of sync: commit must refuse.
        assert!(matches!(reg.commit(&net), Err(LeapError::RegistryMismatch { .. })));

        assert_eq!(reg.reconcile(&net).unwrap(), 1);
        assert_eq!(reg.len(), 2);
        // Old entries keep their baseline until committed.
        assert_eq!(reg.baseline(0), &[50.0, 7.0]);
        assert_eq!(reg.baseline(1), &[3.0]);

        reg.commit(&net).unwrap();
        assert_eq!(reg.baseline(0), &[48.0, 5.0]);
    }

    #[test]
    fn test_reaction_registry_corruption_is_fatal() {
        let net = network();
        let mut reg = ReactionRegistry::default();
        reg.reconcile(&net).unwrap();
        reg.corrupt();
        match reg.reconcile(&net) {
            Err(LeapError::RegistryMismatch { registry, lengths, expected }) => {
                assert_eq!(registry, "reaction");
                assert_eq!(lengths, vec![1, 0, 1]);
                assert_eq!(expected, 1);
            }
            other => panic!("expected a registry mismatch, got {:?}", other),
        }
        assert!(matches!(reg.commit(&net), Err(LeapError::RegistryMismatch { .. })));
    }

    #[test]
    fn test_species_registry() {
        let mut net = network();
        let g = HighestOrderG;
        let mut reg = SpeciesRegistry::default();
        assert_eq!(reg.reconcile(&net, &g).unwrap(), 2);
        assert_eq!(reg.baseline(), &[50.0, 7.0]);
        assert_eq!(reg.g(), &[2.0, 2.0]);

        let before = reg.clone();
        assert_eq!(reg.reconcile(&net, &g).unwrap(), 0);
        assert_eq!(reg, before);

        net.add_species("C", 1.0).unwrap();
        assert!(reg.commit(&net, &g).is_err());
        reg.reconcile(&net, &g).unwrap();
        assert_eq!(reg.g(), &[2.0, 2.0, 1.0]);
        assert_eq!(reg.projected().len(), 3);
    }

    #[test]
    fn test_species_registry_corruption_is_fatal() {
        let net = network();
        let g = HighestOrderG;
        let mut reg = SpeciesRegistry::default();
        reg.reconcile(&net, &g).unwrap();
        reg.corrupt();
        match reg.reconcile(&net, &g) {
            Err(LeapError::RegistryMismatch { registry, lengths, expected }) => {
                assert_eq!(registry, "species");
                assert_eq!(lengths, vec![2, 2, 1]);
                assert_eq!(expected, 2);
            }
            other => panic!("expected a registry mismatch, got {:?}", other),
        }
    }
}

use tl_network::ReactionNetwork;

use crate::GValueEstimator;
use crate::HighestOrderG;

/// Supplies the step size of the very first leap of a controller.
pub trait InitialTauEstimator {
    fn initial_tau(&mut self, network: &ReactionNetwork) -> f64;
}

/// Always starts from the same step size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedTau(pub f64);

impl InitialTauEstimator for FixedTau {
    fn initial_tau(&mut self, _network: &ReactionNetwork) -> f64 {
        self.0
    }
}

/// Species-based step size selection: the largest tau for which the
/// expected drift and the standard deviation of every species stay within
/// `max(eps x_j / g_j, 1)`.
///
/// ```text
/// tau = min_j { max(eps x_j/g_j, 1) / |μ_j| , max(eps x_j/g_j, 1)² / σ²_j }
/// μ_j = Σ_v z_jv a_v,  σ²_j = Σ_v z_jv² a_v
/// ```
///
/// Returns `f64::INFINITY` when no species can change.
#[derive(Debug, Clone, Copy)]
pub struct SpeciesTau<G: GValueEstimator = HighestOrderG> {
    eps: f64,
    estimator: G,
}

impl<G: GValueEstimator> SpeciesTau<G> {
    pub fn new(eps: f64, estimator: G) -> Self {
        Self { eps, estimator }
    }
}

impl<G: GValueEstimator> InitialTauEstimator for SpeciesTau<G> {
    fn initial_tau(&mut self, network: &ReactionNetwork) -> f64 {
        let mut a = Vec::new();
        network.propensities(&mut a);

        let mut tau = f64::INFINITY;
        for j in 0..network.num_species() {
            let mut mu = 0.0;
            let mut sigma2 = 0.0;
            for &(v, z) in network.stoichiometry(j) {
                let z = z as f64;
                mu += z * a[v];
                sigma2 += z * z * a[v];
            }
            let bound = (self.eps * network.population(j) / self.estimator.g(network, j)).max(1.0);
            if mu != 0.0 {
                tau = tau.min(bound / mu.abs());
            }
            if sigma2 > 0.0 {
                tau = tau.min(bound * bound / sigma2);
            }
        }
        tau
    }
}

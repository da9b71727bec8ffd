use std::f64::consts::PI;
use rand::Rng;
use tl_network::ReactionNetwork;

use crate::RxnClass;

/// Below this mean Poisson deviates are drawn exactly.
const POISSON_EXACT_LIMIT: f64 = 500.0;

/// Standard normal deviate (Box–Muller).
pub fn sample_normal<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    // 1 - u lies in (0, 1], so the logarithm is finite.
    let u1 = 1.0 - rng.random::<f64>();
    let u2 = rng.random::<f64>();
    (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos()
}

/// Poisson deviate with the given mean: multiplication method below
/// `POISSON_EXACT_LIMIT`, rounded normal approximation above.
pub fn sample_poisson<R: Rng + ?Sized>(rng: &mut R, mean: f64) -> f64 {
    if mean <= 0.0 {
        return 0.0;
    }
    if mean < POISSON_EXACT_LIMIT {
        let limit = (-mean).exp();
        let mut k = 0.0;
        let mut prod = rng.random::<f64>();
        while prod > limit {
            k += 1.0;
            prod *= rng.random::<f64>();
        }
        k
    } else {
        (mean + mean.sqrt() * sample_normal(rng)).round().max(0.0)
    }
}

/// Fires every reaction according to its class, given effective
/// propensities that were computed for the step size `tau`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FiringGenerator {
    /// Round Langevin and deterministic firing counts to integers.
    pub round: bool,
}

impl FiringGenerator {
    pub fn new(round: bool) -> Self {
        Self { round }
    }

    /// Number of firings of one reaction with `expected = a_eff tau`.
    pub fn firings<R: Rng + ?Sized>(&self, rng: &mut R, class: RxnClass, expected: f64) -> f64 {
        let k = match class {
            RxnClass::ExactStochastic | RxnClass::Poisson => return sample_poisson(rng, expected),
            RxnClass::Langevin => (expected + expected.sqrt() * sample_normal(rng)).max(0.0),
            RxnClass::Deterministic => expected,
        };
        if self.round { k.round() } else { k }
    }

    /// Apply one leap to the network. Returns the number of firings per
    /// reaction.
    pub fn fire<R: Rng + ?Sized>(
        &self,
        network: &mut ReactionNetwork,
        a_eff: &[f64],
        classes: &[RxnClass],
        tau: f64,
        rng: &mut R,
    ) -> Vec<f64> {
        debug_assert_eq!(a_eff.len(), classes.len());
        let mut counts = Vec::with_capacity(a_eff.len());
        for (v, (&a, &class)) in a_eff.iter().zip(classes).enumerate() {
            let k = self.firings(rng, class, a * tau);
            network.fire(v, k);
            counts.push(k);
        }
        counts
    }
}

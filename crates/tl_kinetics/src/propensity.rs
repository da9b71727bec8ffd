use tl_network::ReactionNetwork;

use crate::ButcherTableau;

/// Computes effective propensities over a proposed leap.
///
/// After `project(network, tau)`, `a_eff()` holds one effective propensity
/// per reaction of the network as it was at the time of the call.
pub trait PropensityProjector {
    fn project(&mut self, network: &ReactionNetwork, tau: f64);
    fn a_eff(&self) -> &[f64];
}

/// Effective propensities from an explicit Runge–Kutta scheme applied to
/// the deterministic drift `dX/dt = S a(X)`.
///
/// Stage `i` evaluates propensities at `X_i = X_0 + tau Σ_k a_ik S K_k`;
/// the effective propensity is `Σ_i b_i K_i`. Stage populations are clamped
/// at zero before evaluating propensities.
#[derive(Debug, Clone)]
pub struct RungeKuttaProjector {
    tableau: ButcherTableau,
    a_eff: Vec<f64>,
    stage_k: Vec<Vec<f64>>,
}

impl From<ButcherTableau> for RungeKuttaProjector {
    fn from(tableau: ButcherTableau) -> Self {
        let stage_k = vec![Vec::new(); tableau.stages()];
        Self {
            tableau,
            a_eff: Vec::new(),
            stage_k,
        }
    }
}

impl Default for RungeKuttaProjector {
    fn default() -> Self {
        Self::from(ButcherTableau::euler())
    }
}

impl RungeKuttaProjector {
    pub fn tableau(&self) -> &ButcherTableau {
        &self.tableau
    }
}

impl PropensityProjector for RungeKuttaProjector {
    fn project(&mut self, network: &ReactionNetwork, tau: f64) {
        let x0 = network.populations();
        self.a_eff.clear();
        self.a_eff.resize(network.num_reactions(), 0.0);

        let mut clamped = vec![0.0; x0.len()];
        for i in 0..self.tableau.stages() {
            let mut xi = x0.clone();
            for k in 0..i {
                let aik = self.tableau.a(i, k);
                if aik == 0.0 {
                    continue;
                }
                for (v, &kv) in self.stage_k[k].iter().enumerate() {
                    if kv == 0.0 {
                        continue;
                    }
                    for &(s, z) in network.reaction(v).stoichiometry() {
                        xi[s] += tau * aik * z as f64 * kv;
                    }
                }
            }
            for (c, &x) in clamped.iter_mut().zip(&xi) {
                *c = x.max(0.0);
            }

            let mut ki = std::mem::take(&mut self.stage_k[i]);
            network.propensities_at(&clamped, &mut ki);
            let bi = self.tableau.b(i);
            for (ae, &k) in self.a_eff.iter_mut().zip(&ki) {
                *ae += bi * k;
            }
            self.stage_k[i] = ki;
        }
    }

    fn a_eff(&self) -> &[f64] {
        &self.a_eff
    }
}

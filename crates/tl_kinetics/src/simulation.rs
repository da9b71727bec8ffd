use log::{debug, info, trace};
use rand::Rng;
use serde::Serialize;
use tl_network::ReactionNetwork;

use crate::FiringGenerator;
use crate::InitialTauEstimator;
use crate::LeapBoundChecker;
use crate::LeapController;
use crate::LeapError;
use crate::LeapStats;
use crate::PropensityProjector;
use crate::ReactionClassifier;
use crate::RxnClass;
use crate::ThresholdClassifier;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct SimulationSummary {
    /// Simulated time reached (may overshoot the requested end time by
    /// the last step).
    pub time: f64,
    pub leaps: usize,
    pub exact_steps: usize,
    pub rollbacks: usize,
    /// No reaction could fire any more.
    pub exhausted: bool,
    pub stats: LeapStats,
}

/// Runs adaptive tau-leaping on a network it owns.
///
/// Every iteration proposes a step size, classifies the reactions and
/// either takes a leap or, if no active reaction qualifies for leaping, a
/// single exact stochastic step. Leaps that drive a population negative
/// or fail the post-leap check are rolled back.
pub struct LeapSimulator<C, P, T, K = ThresholdClassifier> {
    network: ReactionNetwork,
    controller: LeapController<C, P, T>,
    classifier: K,
    firing: FiringGenerator,
    time: f64,
    classes: Vec<RxnClass>,
    propensities: Vec<f64>,
}

impl<C, P, T, K> LeapSimulator<C, P, T, K>
where
    C: LeapBoundChecker,
    P: PropensityProjector,
    T: InitialTauEstimator,
    K: ReactionClassifier,
{
    pub fn new(
        network: ReactionNetwork,
        controller: LeapController<C, P, T>,
        classifier: K,
        firing: FiringGenerator,
    ) -> Self {
        Self {
            network,
            controller,
            classifier,
            firing,
            time: 0.0,
            classes: Vec::new(),
            propensities: Vec::new(),
        }
    }

    pub fn network(&self) -> &ReactionNetwork {
        &self.network
    }

    /// Access to the network between calls to `simulate`, e.g. to append
    /// species and reactions.
    pub fn network_mut(&mut self) -> &mut ReactionNetwork {
        &mut self.network
    }

    pub fn controller(&self) -> &LeapController<C, P, T> {
        &self.controller
    }

    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn into_network(self) -> ReactionNetwork {
        self.network
    }

    /// One Gillespie step. Returns the waiting time and the reaction, or
    /// `None` if nothing can fire.
    fn exact_step<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Option<(f64, usize)> {
        self.network.propensities(&mut self.propensities);
        let total: f64 = self.propensities.iter().sum();
        if total <= 0.0 {
            return None;
        }
        let tinc = -(1.0 - rng.random::<f64>()).ln() / total;
        let thresh = rng.random::<f64>() * total;
        let mut acc = 0.0;
        let mut last = None;
        for (v, &a) in self.propensities.iter().enumerate() {
            if a <= 0.0 {
                continue;
            }
            acc += a;
            last = Some(v);
            if acc > thresh {
                break;
            }
        }
        last.map(|v| (tinc, v))
    }

    /// Simulate until `t_end`.
    ///
    /// `callback(t, tinc, populations)` is called once per accepted step
    /// with the state that holds during `[t, t + tinc)`. If the network
    /// runs out of activity, the last call has `tinc = f64::INFINITY`.
    pub fn simulate<R, F>(
        &mut self,
        rng: &mut R,
        t_end: f64,
        mut callback: F,
    ) -> Result<SimulationSummary, LeapError>
    where
        R: Rng + ?Sized,
        F: FnMut(f64, f64, &[f64]),
    {
        let mut summary = SimulationSummary::default();

        while self.time < t_end {
            if self.network.total_propensity() <= 0.0 {
                debug!("No active reactions left at t = {}", self.time);
                callback(self.time, f64::INFINITY, &self.network.populations());
                summary.exhausted = true;
                break;
            }

            let tau = self.controller.propose_tau(&self.network)?;
            let a_eff = self.controller.effective_propensities();
            self.classifier.classify(a_eff, tau, &mut self.classes);
            let leap = self.classes.iter().zip(a_eff)
                .any(|(&c, &a)| c != RxnClass::ExactStochastic && a > 0.0);

            if !leap {
                if let Some((tinc, v)) = self.exact_step(rng) {
                    callback(self.time, tinc, &self.network.populations());
                    self.network.fire(v, 1.0);
                    self.time += tinc;
                    self.controller.commit_exact(&self.network)?;
                    summary.exact_steps += 1;
                }
                continue;
            }

            let snapshot = self.network.populations();
            let counts = self.controller.fire_reactions(
                &mut self.network, &self.firing, &self.classes, tau, rng);
            if self.network.has_negative_population() {
                trace!("Negative population after leap of {:e}, rolling back", tau);
                self.network.restore(&snapshot)?;
                self.controller.reject();
                summary.rollbacks += 1;
                continue;
            }
            if !self.controller.classify(&self.network)?.is_accepted() {
                trace!("Leap of {:e} rejected, rolling back", tau);
                self.network.restore(&snapshot)?;
                summary.rollbacks += 1;
                continue;
            }
            trace!("t = {} tau = {:e} firings = {:?}", self.time, tau, counts);

            callback(self.time, tau, &snapshot);
            self.controller.commit(&self.network)?;
            self.time += tau;
            summary.leaps += 1;
        }

        summary.time = self.time;
        summary.stats = *self.controller.stats();
        info!("Simulation summary: {:?}", summary);
        Ok(summary)
    }
}

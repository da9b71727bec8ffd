use log::{debug, trace};
use rand::Rng;
use serde::Serialize;
use tl_network::ReactionNetwork;

use crate::project_changes;
use crate::FiringGenerator;
use crate::FixedTau;
use crate::GValueEstimator;
use crate::InitialTauEstimator;
use crate::LeapBoundChecker;
use crate::LeapError;
use crate::LeapParameters;
use crate::LeapPhase;
use crate::ProjectedChange;
use crate::PropensityProjector;
use crate::ReactionBound;
use crate::RungeKuttaProjector;
use crate::RxnClass;
use crate::SpeciesBound;

/// Outcome of the post-leap acceptance check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LeapVerdict {
    /// Within `w` times the bound: grow the next step by `q`.
    Substantial,
    /// Within the bound but not the tighter one: shrink by `pp`.
    Barely,
    /// Out of bounds: roll back and shrink by `p`.
    Rejected,
}

impl LeapVerdict {
    pub fn is_accepted(&self) -> bool {
        !matches!(self, LeapVerdict::Rejected)
    }
}

/// Counters collected over the lifetime of a controller.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LeapStats {
    pub proposals: usize,
    pub shrinks: usize,
    pub substantial: usize,
    pub barely: usize,
    pub rejected: usize,
    pub commits: usize,
}

/// Adaptive leap-size control.
///
/// One leap is driven as
///
/// 1. `propose_tau`: choose a step size that passes the pre-leap check,
/// 2. fire reactions (e.g. `fire_reactions`),
/// 3. `classify`: judge the leap against the committed baseline,
/// 4. `commit` if accepted, otherwise restore the network and `reject`.
///
/// The verdict of step 3 determines the starting point of the next
/// `propose_tau`: `tau q` after a substantial leap, `tau pp` after a barely
/// accepted leap and `tau p` after a rejection. A single exact stochastic
/// event taken in place of a leap goes through `commit_exact`, which judges
/// and commits it in one go. The very first proposal comes from the
/// `InitialTauEstimator`.
pub struct LeapController<C, P = RungeKuttaProjector, T = FixedTau> {
    params: LeapParameters,
    checker: C,
    projector: P,
    initial: T,
    tau: Option<f64>,
    verdict: Option<LeapVerdict>,
    changes: Vec<ProjectedChange>,
    stats: LeapStats,
}

impl<P, T> LeapController<ReactionBound, P, T>
where
    P: PropensityProjector,
    T: InitialTauEstimator,
{
    /// A controller that bounds the propensities of every reaction.
    pub fn reaction_bound(params: LeapParameters, projector: P, initial: T) -> Self {
        Self::assemble(params, ReactionBound::new(params.eps()), projector, initial)
    }
}

impl<G, P, T> LeapController<SpeciesBound<G>, P, T>
where
    G: GValueEstimator,
    P: PropensityProjector,
    T: InitialTauEstimator,
{
    /// A controller that bounds every species population.
    pub fn species_bound(params: LeapParameters, estimator: G, projector: P, initial: T) -> Self {
        Self::assemble(params, SpeciesBound::new(params.eps(), estimator), projector, initial)
    }
}

impl<C, P, T> LeapController<C, P, T>
where
    C: LeapBoundChecker,
    P: PropensityProjector,
    T: InitialTauEstimator,
{
    /// Combine a custom checker with the controller parameters. The
    /// checker's `eps` must equal `params.eps()`; the constructors
    /// `reaction_bound` and `species_bound` build the checker from `params`.
    pub fn new(params: LeapParameters, checker: C, projector: P, initial: T) -> Result<Self, LeapError> {
        if checker.eps() != params.eps() {
            return Err(LeapError::InvalidParameter {
                name: "eps",
                value: checker.eps(),
                reason: "equal for the controller and its bound checker",
            });
        }
        Ok(Self::assemble(params, checker, projector, initial))
    }

    fn assemble(params: LeapParameters, checker: C, projector: P, initial: T) -> Self {
        Self {
            params,
            checker,
            projector,
            initial,
            tau: None,
            verdict: None,
            changes: Vec::new(),
            stats: LeapStats::default(),
        }
    }

    pub fn params(&self) -> &LeapParameters {
        &self.params
    }

    pub fn checker(&self) -> &C {
        &self.checker
    }

    pub fn projector(&self) -> &P {
        &self.projector
    }

    pub fn stats(&self) -> &LeapStats {
        &self.stats
    }

    /// The last proposed step size.
    pub fn last_tau(&self) -> Option<f64> {
        self.tau
    }

    /// The verdict that will steer the next proposal, if any.
    pub fn pending_verdict(&self) -> Option<LeapVerdict> {
        self.verdict
    }

    /// Effective propensities for the last proposed step size.
    pub fn effective_propensities(&self) -> &[f64] {
        self.projector.a_eff()
    }

    pub fn projected_changes(&self) -> &[ProjectedChange] {
        &self.changes
    }

    fn next_trial_tau(&mut self, network: &ReactionNetwork) -> f64 {
        match (self.tau, self.verdict.take()) {
            (None, _) => self.initial.initial_tau(network),
            (Some(tau), Some(LeapVerdict::Substantial)) => tau * self.params.q(),
            (Some(tau), Some(LeapVerdict::Barely)) => tau * self.params.pp(),
            (Some(tau), Some(LeapVerdict::Rejected)) => tau * self.params.p(),
            // Committed without a verdict: not known to be substantial.
            (Some(tau), None) => tau * self.params.pp(),
        }
    }

    /// Find the step size of the next leap.
    ///
    /// Starting from the hysteresis-adjusted previous step size, the trial
    /// value is multiplied by `p` until the projected state passes the
    /// bound check. On success the effective propensities and projected
    /// changes for the returned tau are available through the accessors.
    pub fn propose_tau(&mut self, network: &ReactionNetwork) -> Result<f64, LeapError> {
        let added = self.checker.reconcile(network)?;
        if added > 0 {
            debug!("{}: tracking {} new entries ({} total)",
                self.checker.name(), added, self.checker.tracked());
        }

        let mut tau = self.next_trial_tau(network);
        if !(tau.is_finite() && tau > 0.0) {
            return Err(LeapError::InvalidTau(tau));
        }
        self.stats.proposals += 1;

        let mut shrinks = 0;
        loop {
            self.projector.project(network, tau);
            project_changes(network, self.projector.a_eff(), tau, &mut self.changes);
            self.checker.project(&self.changes);
            if self.checker.check(1.0, network, LeapPhase::PreLeap) {
                break;
            }
            shrinks += 1;
            self.stats.shrinks += 1;
            if shrinks >= self.params.max_shrinks() {
                return Err(LeapError::ShrinkLimit { tau, shrinks });
            }
            tau *= self.params.p();
            if tau <= 0.0 {
                return Err(LeapError::InvalidTau(tau));
            }
            trace!("{}: shrinking to tau = {:e}", self.checker.name(), tau);
        }

        debug!("{}: tau = {:e} after {} shrinks", self.checker.name(), tau, shrinks);
        self.tau = Some(tau);
        Ok(tau)
    }

    /// Judge the leap that was just applied to `network`.
    ///
    /// The live state is compared to the committed baseline, first with the
    /// tolerance scaled by `w` and then with the plain tolerance. The
    /// verdict steers the next `propose_tau`; it does not commit anything.
    pub fn classify(&mut self, network: &ReactionNetwork) -> Result<LeapVerdict, LeapError> {
        self.checker.reconcile(network)?;
        let verdict = self.judge(network);
        self.remember(verdict);
        Ok(verdict)
    }

    /// Judge and commit a single exact stochastic event that was taken in
    /// place of a leap. The event cannot be undone: if it leaves the bound
    /// it counts as barely accepted.
    pub fn commit_exact(&mut self, network: &ReactionNetwork) -> Result<LeapVerdict, LeapError> {
        self.checker.reconcile(network)?;
        let verdict = match self.judge(network) {
            LeapVerdict::Rejected => LeapVerdict::Barely,
            verdict => verdict,
        };
        self.remember(verdict);
        self.commit(network)?;
        Ok(verdict)
    }

    fn judge(&self, network: &ReactionNetwork) -> LeapVerdict {
        if self.checker.check(self.params.w(), network, LeapPhase::PostLeap) {
            LeapVerdict::Substantial
        } else if self.checker.check(1.0, network, LeapPhase::PostLeap) {
            LeapVerdict::Barely
        } else {
            LeapVerdict::Rejected
        }
    }

    fn remember(&mut self, verdict: LeapVerdict) {
        match verdict {
            LeapVerdict::Substantial => self.stats.substantial += 1,
            LeapVerdict::Barely => self.stats.barely += 1,
            LeapVerdict::Rejected => self.stats.rejected += 1,
        }
        debug!("{}: leap {:?}", self.checker.name(), verdict);
        self.verdict = Some(verdict);
    }

    /// Reject the last leap without classifying it, e.g. because it drove
    /// a population negative. The next proposal shrinks by `p`.
    pub fn reject(&mut self) {
        self.stats.rejected += 1;
        self.verdict = Some(LeapVerdict::Rejected);
    }

    /// Take the live network state as the new baseline.
    pub fn commit(&mut self, network: &ReactionNetwork) -> Result<(), LeapError> {
        if self.verdict == Some(LeapVerdict::Rejected) {
            return Err(LeapError::RejectedLeapCommit);
        }
        self.checker.commit(network)?;
        self.stats.commits += 1;
        Ok(())
    }

    /// Fire all reactions with the effective propensities of the last
    /// proposal.
    pub fn fire_reactions<R: Rng + ?Sized>(
        &self,
        network: &mut ReactionNetwork,
        firing: &FiringGenerator,
        classes: &[RxnClass],
        tau: f64,
        rng: &mut R,
    ) -> Vec<f64> {
        firing.fire(network, self.projector.a_eff(), classes, tau, rng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tl_network::Reaction;
    use crate::HighestOrderG;
    use crate::SpeciesTau;

    /// Effective propensities that do not depend on the state.
    struct ConstantPropensities {
        a: Vec<f64>,
    }

    impl ConstantPropensities {
        fn new(a: &[f64]) -> Self {
            Self { a: a.to_vec() }
        }
    }

    impl PropensityProjector for ConstantPropensities {
        fn project(&mut self, network: &ReactionNetwork, _tau: f64) {
            self.a.resize(network.num_reactions(), 0.0);
        }
        fn a_eff(&self) -> &[f64] {
            &self.a
        }
    }

    /// X -> 2 X: one species with net stoichiometry +1 that also
    /// determines the rate of the only reaction.
    fn autocatalytic(x: f64) -> ReactionNetwork {
        let mut net = ReactionNetwork::new();
        let s = net.add_species("X", x).unwrap();
        net.add_reaction(Reaction::new("grow", 0.1, &[s], &[s, s]).unwrap()).unwrap();
        net
    }

    fn trace_params() -> LeapParameters {
        LeapParameters::new(0.1, 0.5, 0.9, 1.5, 0.01).unwrap()
    }

    fn trace_controller() -> LeapController<ReactionBound, ConstantPropensities, FixedTau> {
        LeapController::reaction_bound(trace_params(),
            ConstantPropensities::new(&[10.0]), FixedTau(1.0))
    }

    #[test]
    fn test_single_shrink_trace() {
        // tau = 1:   100 + 10 + sqrt(10) = 113.16 > 100 + 10
        // tau = 0.5: 100 + 5 + 0.5 sqrt(10) = 106.58
        let net = autocatalytic(100.0);
        let mut lc = trace_controller();
        let tau = lc.propose_tau(&net).unwrap();
        assert_eq!(tau, 0.5);
        assert_eq!(lc.stats().shrinks, 1);
        assert_eq!(lc.stats().proposals, 1);
        let projected = lc.checker().registry().projected(0)[0];
        assert!((projected - 106.5811).abs() < 1e-4);
        assert_eq!(lc.projected_changes()[0].mean, 5.0);
    }

    #[test]
    fn test_single_shrink_trace_species_bound() {
        let net = autocatalytic(100.0);
        let mut lc = LeapController::species_bound(trace_params(), HighestOrderG,
            ConstantPropensities::new(&[10.0]), FixedTau(1.0));
        assert_eq!(lc.propose_tau(&net).unwrap(), 0.5);
        assert_eq!(lc.stats().shrinks, 1);
        assert!((lc.checker().registry().projected()[0] - 106.5811).abs() < 1e-4);
    }

    #[test]
    fn test_substantial_grows_by_q() {
        let net = autocatalytic(100.0);
        let mut lc = trace_controller();
        let tau = lc.propose_tau(&net).unwrap();
        // Nothing fired: the leap is trivially substantial.
        assert_eq!(lc.classify(&net).unwrap(), LeapVerdict::Substantial);
        lc.commit(&net).unwrap();
        // 100 + 7.5 + 0.75 sqrt(10) = 109.87 passes immediately.
        assert_eq!(lc.propose_tau(&net).unwrap(), tau * 1.5);
        assert_eq!(lc.stats().shrinks, 1);
    }

    #[test]
    fn test_barely_shrinks_by_pp() {
        let mut net = autocatalytic(100.0);
        let mut lc = trace_controller();
        let tau = lc.propose_tau(&net).unwrap();
        net.fire(0, 5.0);
        // |105 - 100| = 5 exceeds the w-scaled bound (1) but not 10.
        assert_eq!(lc.classify(&net).unwrap(), LeapVerdict::Barely);
        lc.commit(&net).unwrap();
        assert_eq!(lc.checker().registry().baseline(0), &[105.0]);
        assert_eq!(lc.propose_tau(&net).unwrap(), tau * 0.9);
    }

    #[test]
    fn test_rejected_shrinks_by_p() {
        let mut net = autocatalytic(100.0);
        let mut lc = trace_controller();
        let tau = lc.propose_tau(&net).unwrap();
        net.fire(0, 15.0);
        let verdict = lc.classify(&net).unwrap();
        assert_eq!(verdict, LeapVerdict::Rejected);
        assert!(!verdict.is_accepted());
        assert!(matches!(lc.commit(&net), Err(LeapError::RejectedLeapCommit)));

        net.restore(&[100.0]).unwrap();
        assert_eq!(lc.propose_tau(&net).unwrap(), tau * 0.5);
        assert_eq!(lc.checker().registry().baseline(0), &[100.0]);
        assert_eq!(lc.stats().rejected, 1);
        assert_eq!(lc.stats().commits, 0);
    }

    #[test]
    fn test_forced_rejection() {
        let net = autocatalytic(100.0);
        let mut lc = trace_controller();
        let tau = lc.propose_tau(&net).unwrap();
        lc.reject();
        assert_eq!(lc.pending_verdict(), Some(LeapVerdict::Rejected));
        assert_eq!(lc.propose_tau(&net).unwrap(), tau * 0.5);
        assert_eq!(lc.pending_verdict(), None);
    }

    #[test]
    fn test_unjudged_commit_shrinks_by_pp() {
        let net = autocatalytic(100.0);
        let mut lc = trace_controller();
        let tau = lc.propose_tau(&net).unwrap();
        lc.commit(&net).unwrap();
        assert_eq!(lc.propose_tau(&net).unwrap(), tau * 0.9);
    }

    #[test]
    fn test_exact_event_grows_tau() {
        let mut net = autocatalytic(100.0);
        let mut lc = trace_controller();
        let tau = lc.propose_tau(&net).unwrap();
        // One molecule is always within the floor of the tight bound.
        net.fire(0, 1.0);
        assert_eq!(lc.commit_exact(&net).unwrap(), LeapVerdict::Substantial);
        assert_eq!(lc.checker().registry().baseline(0), &[101.0]);
        // 101 + 7.5 + 0.75 sqrt(10) = 110.87 <= 111.1
        assert_eq!(lc.propose_tau(&net).unwrap(), tau * 1.5);
        assert_eq!(lc.stats().commits, 1);
    }

    #[test]
    fn test_exact_event_out_of_bound_is_still_committed() {
        let mut net = autocatalytic(100.0);
        let mut lc = trace_controller();
        let tau = lc.propose_tau(&net).unwrap();
        net.fire(0, 15.0);
        assert_eq!(lc.commit_exact(&net).unwrap(), LeapVerdict::Barely);
        assert_eq!(lc.checker().registry().baseline(0), &[115.0]);
        assert_eq!(lc.stats().rejected, 0);
        assert_eq!(lc.stats().barely, 1);
        assert_eq!(lc.propose_tau(&net).unwrap(), tau * 0.9);
    }

    #[test]
    fn test_checker_eps_must_match() {
        let params = trace_params();
        let lc = LeapController::new(params, ReactionBound::new(0.05),
            ConstantPropensities::new(&[10.0]), FixedTau(1.0));
        assert!(matches!(lc, Err(LeapError::InvalidParameter { name: "eps", .. })));

        let mut lc = LeapController::new(params, ReactionBound::new(params.eps()),
            ConstantPropensities::new(&[10.0]), FixedTau(1.0)).unwrap();
        assert_eq!(lc.propose_tau(&autocatalytic(100.0)).unwrap(), 0.5);
    }

    #[test]
    fn test_decreasing_species_projects_downwards() {
        // X -> 0 with constant a = 10: 100 - 10 - sqrt(10) = 86.84 fails.
        let mut net = ReactionNetwork::new();
        let s = net.add_species("X", 100.0).unwrap();
        net.add_reaction(Reaction::new("decay", 0.1, &[s], &[]).unwrap()).unwrap();
        let mut lc = LeapController::reaction_bound(trace_params(),
            ConstantPropensities::new(&[10.0]), FixedTau(1.0));
        assert_eq!(lc.propose_tau(&net).unwrap(), 0.5);
        let projected = lc.checker().registry().projected(0)[0];
        assert!((projected - 93.4189).abs() < 1e-4);
    }

    #[test]
    fn test_retry_loop_terminates() {
        let net = autocatalytic(1e4);
        for &(a, tau0) in &[(1.0, 1e6), (1e3, 10.0), (1e8, 1.0), (5.0, 1e-3)] {
            let mut lc = LeapController::reaction_bound(
                LeapParameters::new(0.01, 0.5, 0.8, 1.5, 0.75).unwrap(),
                ConstantPropensities::new(&[a]), FixedTau(tau0));
            let tau = lc.propose_tau(&net).unwrap();
            assert!(tau > 0.0 && tau <= tau0);
            // 100 molecules of allowed drift.
            let change = lc.projected_changes()[0].extreme();
            assert!(change <= 100.0, "a = {} tau0 = {}: change {}", a, tau0, change);
            if tau < tau0 {
                // The previous trial must have failed.
                let prev = tau / 0.5;
                assert!(a * prev + prev * a.sqrt() > 100.0);
            }
        }
    }

    #[test]
    fn test_shrink_limit() {
        let net = autocatalytic(100.0);
        let params = LeapParameters::with_max_shrinks(0.1, 0.5, 0.9, 1.5, 0.5, 3).unwrap();
        let mut lc = LeapController::reaction_bound(params,
            ConstantPropensities::new(&[1e9]), FixedTau(1.0));
        match lc.propose_tau(&net) {
            Err(LeapError::ShrinkLimit { tau, shrinks }) => {
                assert_eq!(shrinks, 3);
                assert_eq!(tau, 0.25);
            }
            other => panic!("expected ShrinkLimit, got {:?}", other),
        }
        assert_eq!(lc.last_tau(), None);
    }

    #[test]
    fn test_invalid_initial_tau() {
        let net = autocatalytic(100.0);
        for tau0 in [0.0, -1.0, f64::INFINITY, f64::NAN] {
            let mut lc = LeapController::reaction_bound(trace_params(),
                ConstantPropensities::new(&[10.0]), FixedTau(tau0));
            assert!(matches!(lc.propose_tau(&net), Err(LeapError::InvalidTau(_))));
            assert_eq!(lc.stats().proposals, 0);
        }
    }

    #[test]
    fn test_registry_catches_up_with_network() {
        let mut net = autocatalytic(100.0);
        let mut lc = trace_controller();
        lc.propose_tau(&net).unwrap();
        assert_eq!(lc.checker().tracked(), 1);

        let y = net.add_species("Y", 50.0).unwrap();
        net.add_reaction(Reaction::new("y-decay", 0.1, &[y], &[]).unwrap()).unwrap();
        // New entries are taken at their live values and pass trivially.
        assert_eq!(lc.classify(&net).unwrap(), LeapVerdict::Substantial);
        assert_eq!(lc.checker().tracked(), 2);
        lc.commit(&net).unwrap();

        lc.propose_tau(&net).unwrap();
        assert_eq!(lc.effective_propensities().len(), 2);
        assert_eq!(lc.projected_changes().len(), 2);
    }

    #[test]
    fn test_runge_kutta_species_bound() {
        let mut net = ReactionNetwork::new();
        let a = net.add_species("A", 1000.0).unwrap();
        let b = net.add_species("B", 0.0).unwrap();
        net.add_reaction(Reaction::new("a-to-b", 0.1, &[a], &[b]).unwrap()).unwrap();

        let params = LeapParameters::default();
        let mut lc = LeapController::species_bound(params, HighestOrderG,
            RungeKuttaProjector::default(), SpeciesTau::new(params.eps(), HighestOrderG));
        let tau = lc.propose_tau(&net).unwrap();
        assert!(tau > 0.0 && tau <= 0.3);
        assert!((lc.effective_propensities()[0] - 100.0).abs() < 1e-9);
        assert!(lc.checker().check(1.0, &net, LeapPhase::PreLeap));
    }
}

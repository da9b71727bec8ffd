use clap::Args;
use clap::ValueEnum;
use anyhow::Result;
use anyhow::bail;
use log::debug;

use tl_kinetics::ButcherTableau;
use tl_kinetics::FiringGenerator;
use tl_kinetics::LeapParameters;
use tl_kinetics::RxnClass;
use tl_kinetics::ThresholdClassifier;
use tl_kinetics::DEFAULT_MAX_SHRINKS;

/// Which quantities the leap condition bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum BoundVariant {
    /// Rate-law species of every reaction (reaction-bound).
    Rb,
    /// Every species, tightened by its g value (species-bound).
    Sb,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Integrator {
    Euler,
    Midpoint,
    Heun,
    Rk4,
}

impl Integrator {
    pub fn tableau(&self) -> ButcherTableau {
        match self {
            Integrator::Euler => ButcherTableau::euler(),
            Integrator::Midpoint => ButcherTableau::midpoint(),
            Integrator::Heun => ButcherTableau::heun(),
            Integrator::Rk4 => ButcherTableau::rk4(),
        }
    }
}

/// Leap size control parameters.
#[derive(Debug, Args)]
pub struct LeapArguments {
    /// Leap condition variant.
    #[arg(long, value_enum, default_value_t = BoundVariant::Sb)]
    pub variant: BoundVariant,

    /// Runge-Kutta scheme for the effective propensities.
    #[arg(long, value_enum, default_value_t = Integrator::Euler)]
    pub integrator: Integrator,

    /// Relative change tolerated during one leap (0 < eps).
    #[arg(long, default_value_t = 0.03)]
    pub eps: f64,

    /// Shrink factor after a rejected leap (0 < p < 1).
    #[arg(long, default_value_t = 0.5)]
    pub p: f64,

    /// Shrink factor after a barely accepted leap (p <= pp <= 1).
    #[arg(long, default_value_t = 0.8)]
    pub pp: f64,

    /// Growth factor after a substantially accepted leap (q >= 1).
    #[arg(long, default_value_t = 1.5)]
    pub q: f64,

    /// Strictness of the substantial acceptance check (0 < w < 1).
    #[arg(long, default_value_t = 0.75)]
    pub w: f64,

    /// Consecutive pre-leap rejections before giving up.
    #[arg(long, default_value_t = DEFAULT_MAX_SHRINKS)]
    pub max_shrinks: usize,

    /// Fixed initial step size (default: species-based estimate).
    #[arg(long)]
    pub tau0: Option<f64>,
}

impl LeapArguments {
    pub fn build_parameters(&self) -> Result<LeapParameters> {
        if let Some(tau0) = self.tau0 {
            if !(tau0.is_finite() && tau0 > 0.0) {
                bail!("tau0 must be positive and finite (got tau0={})", tau0);
            }
        }
        let params = LeapParameters::with_max_shrinks(
            self.eps, self.p, self.pp, self.q, self.w, self.max_shrinks)?;
        debug!("Leap parameters: {:?}", params);
        Ok(params)
    }
}

/// Reaction classification thresholds on the expected number of firings.
#[derive(Debug, Args)]
pub struct ClassifierArguments {
    /// Below this many expected firings a reaction is simulated exactly.
    #[arg(long, default_value_t = 3.0)]
    pub poisson: f64,

    /// Below this many expected firings a reaction fires a Poisson count.
    #[arg(long, default_value_t = 100.0)]
    pub langevin: f64,

    /// From this many expected firings on a reaction fires deterministically.
    #[arg(long, default_value_t = f64::INFINITY)]
    pub deterministic: f64,

    /// Use one class for every reaction (exact, poisson, langevin, deterministic).
    #[arg(long, value_parser = clap::value_parser!(RxnClass))]
    pub force: Option<RxnClass>,

    /// Round Langevin and deterministic firing counts.
    #[arg(long)]
    pub round: bool,
}

impl ClassifierArguments {
    pub fn validate(&self) -> Result<()> {
        if !(0.0 <= self.poisson && self.poisson <= self.langevin && self.langevin <= self.deterministic) {
            bail!("Require 0 <= poisson <= langevin <= deterministic (got {}, {}, {})",
                self.poisson, self.langevin, self.deterministic);
        }
        Ok(())
    }

    pub fn build_classifier(&self) -> Result<ThresholdClassifier> {
        self.validate()?;
        Ok(ThresholdClassifier {
            poisson: self.poisson,
            langevin: self.langevin,
            deterministic: self.deterministic,
            force: self.force,
        })
    }

    pub fn build_firing(&self) -> FiringGenerator {
        FiringGenerator::new(self.round)
    }
}

#[derive(Debug, Args)]
pub struct OutputParameters {
    /// Simulation stop time.
    #[arg(long, default_value_t = 10.0)]
    pub t_end: f64,

    /// Number of equally spaced output intervals in [0..t-end].
    #[arg(long, default_value_t = 20)]
    pub n_out: usize,

    /// Seed for the random number generator.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Write the sampled trajectory as JSON.
    #[arg(long, value_name = "FILE")]
    pub trajectory: Option<String>,

    /// Plot the sampled trajectory as SVG.
    #[arg(long, value_name = "FILE")]
    pub plot: Option<String>,
}

impl OutputParameters {
    pub fn validate(&self) -> Result<()> {
        if !(self.t_end.is_finite() && self.t_end > 0.0) {
            bail!("t_end must be positive and finite (got t_end={})", self.t_end);
        }
        if self.n_out == 0 {
            bail!("n_out must be > 0");
        }
        Ok(())
    }

    pub fn get_output_times(&self) -> Vec<f64> {
        let step = self.t_end / self.n_out as f64;
        let mut times: Vec<f64> = (0..self.n_out).map(|i| i as f64 * step).collect();
        times.push(self.t_end);
        times
    }
}

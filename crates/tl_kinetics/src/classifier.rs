use std::fmt;
use std::str::FromStr;

/// Numerical treatment of a reaction channel during one leap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RxnClass {
    /// Too few expected firings for a leap; simulate event by event.
    ExactStochastic,
    Poisson,
    Langevin,
    Deterministic,
}

impl fmt::Display for RxnClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RxnClass::ExactStochastic => "exact",
            RxnClass::Poisson => "poisson",
            RxnClass::Langevin => "langevin",
            RxnClass::Deterministic => "deterministic",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for RxnClass {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "exact" | "ssa" => Ok(RxnClass::ExactStochastic),
            "poisson" => Ok(RxnClass::Poisson),
            "langevin" => Ok(RxnClass::Langevin),
            "deterministic" | "ode" => Ok(RxnClass::Deterministic),
            other => Err(format!("unknown reaction class '{}'", other)),
        }
    }
}

/// Decides, per reaction, how it is fired during a leap of size `tau`.
pub trait ReactionClassifier {
    fn classify(&mut self, a_eff: &[f64], tau: f64, classes: &mut Vec<RxnClass>);
}

/// Classification by the expected number of firings `n = a_eff tau`:
///
/// - `n <  poisson`       → `ExactStochastic`
/// - `n <  langevin`      → `Poisson`
/// - `n <  deterministic` → `Langevin`
/// - otherwise            → `Deterministic`
///
/// `force` assigns one class to every reaction regardless of `n`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThresholdClassifier {
    pub poisson: f64,
    pub langevin: f64,
    pub deterministic: f64,
    pub force: Option<RxnClass>,
}

impl Default for ThresholdClassifier {
    fn default() -> Self {
        Self {
            poisson: 3.0,
            langevin: 100.0,
            deterministic: f64::INFINITY,
            force: None,
        }
    }
}

impl ThresholdClassifier {
    pub fn forced(class: RxnClass) -> Self {
        Self {
            force: Some(class),
            ..Self::default()
        }
    }

    pub fn class_of(&self, expected_firings: f64) -> RxnClass {
        if let Some(class) = self.force {
            return class;
        }
        if expected_firings < self.poisson {
            RxnClass::ExactStochastic
        } else if expected_firings < self.langevin {
            RxnClass::Poisson
        } else if expected_firings < self.deterministic {
            RxnClass::Langevin
        } else {
            RxnClass::Deterministic
        }
    }
}

impl ReactionClassifier for ThresholdClassifier {
    fn classify(&mut self, a_eff: &[f64], tau: f64, classes: &mut Vec<RxnClass>) {
        classes.clear();
        classes.extend(a_eff.iter().map(|&a| self.class_of(a * tau)));
    }
}

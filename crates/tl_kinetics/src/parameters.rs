use serde::Serialize;

use crate::LeapError;

/// Tolerance parameters of the leap-size controller.
///
/// - `eps`: relative change tolerated during a leap,
/// - `p`: shrink factor after a rejection,
/// - `pp`: shrink factor after a barely accepted leap (`p <= pp <= 1`),
/// - `q`: growth factor after a substantially accepted leap (`q >= 1`),
/// - `w`: strictness of the substantial acceptance check (`0 < w < 1`),
/// - `max_shrinks`: consecutive pre-leap rejections before giving up.
///
/// The fields are private: a `LeapParameters` value always satisfies the
/// constraints above.
///
/// # Example
/// ```rust
/// use tl_kinetics::LeapParameters;
///
/// let params = LeapParameters::new(0.03, 0.5, 0.8, 1.5, 0.75).unwrap();
/// assert_eq!(params.q(), 1.5);
/// assert!(LeapParameters::new(0.03, 0.5, 0.4, 1.5, 0.75).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LeapParameters {
    eps: f64,
    p: f64,
    pp: f64,
    q: f64,
    w: f64,
    max_shrinks: usize,
}

pub const DEFAULT_MAX_SHRINKS: usize = 1000;

impl Default for LeapParameters {
    fn default() -> Self {
        Self {
            eps: 0.03,
            p: 0.5,
            pp: 0.8,
            q: 1.5,
            w: 0.75,
            max_shrinks: DEFAULT_MAX_SHRINKS,
        }
    }
}

impl LeapParameters {
    pub fn new(eps: f64, p: f64, pp: f64, q: f64, w: f64) -> Result<Self, LeapError> {
        Self::with_max_shrinks(eps, p, pp, q, w, DEFAULT_MAX_SHRINKS)
    }

    pub fn with_max_shrinks(
        eps: f64,
        p: f64,
        pp: f64,
        q: f64,
        w: f64,
        max_shrinks: usize,
    ) -> Result<Self, LeapError> {
        let invalid = |name, value, reason| Err(LeapError::InvalidParameter { name, value, reason });

        // NaN fails every comparison, so each test is written to reject it.
        if !(eps > 0.0 && eps.is_finite()) {
            return invalid("eps", eps, "> 0");
        }
        if !(p > 0.0 && p < 1.0) {
            return invalid("p", p, "> 0 and < 1");
        }
        if !(pp >= p) {
            return invalid("pp", pp, ">= p");
        }
        if !(pp <= 1.0) {
            return invalid("pp", pp, "<= 1");
        }
        if !(q >= 1.0 && q.is_finite()) {
            return invalid("q", q, ">= 1.0");
        }
        if !(w > 0.0 && w < 1.0) {
            return invalid("w", w, "> 0 and < 1");
        }
        if max_shrinks == 0 {
            return invalid("max_shrinks", 0.0, "> 0");
        }
        Ok(Self { eps, p, pp, q, w, max_shrinks })
    }

    pub fn eps(&self) -> f64 {
        self.eps
    }

    pub fn p(&self) -> f64 {
        self.p
    }

    pub fn pp(&self) -> f64 {
        self.pp
    }

    pub fn q(&self) -> f64 {
        self.q
    }

    pub fn w(&self) -> f64 {
        self.w
    }

    pub fn max_shrinks(&self) -> usize {
        self.max_shrinks
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rejected_name(result: Result<LeapParameters, LeapError>) -> &'static str {
        match result {
            Err(LeapError::InvalidParameter { name, .. }) => name,
            other => panic!("expected a parameter error, got {:?}", other),
        }
    }

    #[test]
    fn test_valid_parameters() {
        let params = LeapParameters::new(0.1, 0.5, 0.5, 1.0, 0.01).unwrap();
        assert_eq!(params.eps(), 0.1);
        assert_eq!(params.pp(), 0.5);
        assert_eq!(params.max_shrinks(), DEFAULT_MAX_SHRINKS);

        let d = LeapParameters::default();
        assert_eq!(LeapParameters::new(d.eps(), d.p(), d.pp(), d.q(), d.w()).unwrap(), d);
    }

    #[test]
    fn test_invalid_parameters() {
        assert_eq!(rejected_name(LeapParameters::new(0.1, 0.5, 0.4, 1.5, 0.5)), "pp");
        assert_eq!(rejected_name(LeapParameters::new(0.1, 0.5, 1.1, 1.5, 0.5)), "pp");
        assert_eq!(rejected_name(LeapParameters::new(0.1, 0.5, 0.8, 0.99, 0.5)), "q");
        assert_eq!(rejected_name(LeapParameters::new(0.1, 0.5, 0.8, 1.5, 0.0)), "w");
        assert_eq!(rejected_name(LeapParameters::new(0.1, 0.5, 0.8, 1.5, 1.0)), "w");
        assert_eq!(rejected_name(LeapParameters::new(0.1, 0.5, 0.8, 1.5, -0.2)), "w");
        assert_eq!(rejected_name(LeapParameters::new(0.0, 0.5, 0.8, 1.5, 0.5)), "eps");
        assert_eq!(rejected_name(LeapParameters::new(0.1, 1.0, 1.0, 1.5, 0.5)), "p");
        assert_eq!(rejected_name(LeapParameters::new(0.1, f64::NAN, 0.8, 1.5, 0.5)), "p");
        assert_eq!(rejected_name(
            LeapParameters::with_max_shrinks(0.1, 0.5, 0.8, 1.5, 0.5, 0)), "max_shrinks");
    }

    #[test]
    fn test_error_message() {
        let err = LeapParameters::new(0.1, 0.5, 0.4, 1.5, 0.5).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid leap parameter: pp must be >= p; got pp = 0.4"
        );
    }
}

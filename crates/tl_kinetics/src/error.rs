use std::fmt;
use std::error::Error;
use tl_network::NetworkError;

#[derive(Debug)]
pub enum LeapError {
    /// A tolerance parameter violates its admissible range.
    InvalidParameter { name: &'static str, value: f64, reason: &'static str },
    /// Registry arrays out of step with each other or with the network.
    RegistryMismatch { registry: &'static str, lengths: Vec<usize>, expected: usize },
    /// The pre-leap loop kept rejecting; tau is the last trial value.
    ShrinkLimit { tau: f64, shrinks: usize },
    /// A step size that is not a positive finite number.
    InvalidTau(f64),
    /// `commit` after the last leap was classified as rejected.
    RejectedLeapCommit,
    Tableau(String),
    Network(NetworkError),
    Io(std::io::Error),
    Json(serde_json::Error),
}

impl fmt::Display for LeapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidParameter { name, value, reason } =>
                write!(f, "Invalid leap parameter: {name} must be {reason}; got {name} = {value}"),
            Self::RegistryMismatch { registry, lengths, expected } =>
                write!(f, "Inconsistent {registry} registry: array lengths {lengths:?}, network has {expected}"),
            Self::ShrinkLimit { tau, shrinks } =>
                write!(f, "Pre-leap check still failing after {shrinks} reductions (tau = {tau:e})"),
            Self::InvalidTau(tau) =>
                write!(f, "Step size must be positive and finite, got {tau}"),
            Self::RejectedLeapCommit =>
                write!(f, "Cannot commit a rejected leap; roll the network back instead"),
            Self::Tableau(msg) => write!(f, "Invalid Butcher tableau: {msg}"),
            Self::Network(e) => write!(f, "Network error: {e}"),
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::Json(e) => write!(f, "JSON error: {e}"),
        }
    }
}

impl Error for LeapError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Network(e) => Some(e),
            Self::Io(e) => Some(e),
            Self::Json(e) => Some(e),
            _ => None,
        }
    }
}

impl From<NetworkError> for LeapError {
    fn from(e: NetworkError) -> Self { Self::Network(e) }
}

impl From<std::io::Error> for LeapError {
    fn from(e: std::io::Error) -> Self { Self::Io(e) }
}

impl From<serde_json::Error> for LeapError {
    fn from(e: serde_json::Error) -> Self { Self::Json(e) }
}

use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum NetworkError {
    UnknownSpecies(usize),                // index beyond the species list
    DuplicateSpecies(String),             // a species with that name exists
    InvalidRateConstant(String, f64),     // reaction name, offending value
    InvalidPopulation(String, f64),       // species name, offending value
    NoEffect(String),                     // reaction changes nothing
    PopulationLength { found: usize, expected: usize },
}

impl fmt::Display for NetworkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NetworkError::UnknownSpecies(j) => {
                write!(f, "Unknown species index {}", j)
            }
            NetworkError::DuplicateSpecies(name) => {
                write!(f, "Species '{}' is already defined", name)
            }
            NetworkError::InvalidRateConstant(name, k) => {
                write!(f, "Invalid rate constant {} for reaction '{}'", k, name)
            }
            NetworkError::InvalidPopulation(name, x) => {
                write!(f, "Invalid population {} for species '{}'", x, name)
            }
            NetworkError::NoEffect(name) => {
                write!(f, "Reaction '{}' has no net stoichiometric effect", name)
            }
            NetworkError::PopulationLength { found, expected } => {
                write!(f, "Population vector has {} entries, expected {}", found, expected)
            }
        }
    }
}

impl std::error::Error for NetworkError {}

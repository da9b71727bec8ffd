use crate::NetworkError;
use crate::SpeciesIdx;

/// A chemical species with its current (live) population.
///
/// Populations are stored as `f64`: Poisson and exact-stochastic firing keep
/// them integral, but Langevin and deterministic firing may not.
#[derive(Debug, Clone, PartialEq)]
pub struct Species {
    name: String,
    population: f64,
}

impl Species {
    pub fn new(name: &str, population: f64) -> Result<Self, NetworkError> {
        if !population.is_finite() || population < 0.0 {
            return Err(NetworkError::InvalidPopulation(name.to_owned(), population));
        }
        Ok(Species {
            name: name.to_owned(),
            population,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn population(&self) -> f64 {
        self.population
    }

    pub(crate) fn set_population(&mut self, population: f64) {
        self.population = population;
    }
}

/// A mass-action reaction channel.
///
/// The propensity is `k * Π ff(x_s, m_s)` over the rate-law species `s`
/// with multiplicity `m_s`, where `ff` is the falling factorial. The
/// stoichiometry holds the *net* change per firing; species that appear on
/// both sides with the same multiplicity (catalysts) are not listed.
///
/// # Example
/// ```rust
/// use tl_network::Reaction;
///
/// // 2A -> B
/// let rxn = Reaction::new("dimerize", 0.5, &[0, 0], &[1]).unwrap();
/// assert_eq!(rxn.order(), 2);
/// assert_eq!(rxn.rate_species(), vec![0]);
/// assert_eq!(rxn.propensity(&[10.0, 0.0]), 0.5 * 10.0 * 9.0);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Reaction {
    name: String,
    rate_constant: f64,
    reactants: Vec<(SpeciesIdx, u32)>,
    stoichiometry: Vec<(SpeciesIdx, i32)>,
}

impl Reaction {
    /// Build a reaction from reactant and product lists. Repeated indices
    /// express multiplicity, e.g. `&[0, 0]` for `2 X0`.
    pub fn new(
        name: &str,
        rate_constant: f64,
        reactants: &[SpeciesIdx],
        products: &[SpeciesIdx],
    ) -> Result<Self, NetworkError> {
        if !rate_constant.is_finite() || rate_constant < 0.0 {
            return Err(NetworkError::InvalidRateConstant(name.to_owned(), rate_constant));
        }

        let mut counted: Vec<(SpeciesIdx, u32)> = Vec::new();
        for &s in reactants {
            match counted.iter_mut().find(|(c, _)| *c == s) {
                Some((_, m)) => *m += 1,
                None => counted.push((s, 1)),
            }
        }

        let mut stoichiometry: Vec<(SpeciesIdx, i32)> = counted
            .iter()
            .map(|&(s, m)| (s, -(m as i32)))
            .collect();
        for &s in products {
            match stoichiometry.iter_mut().find(|(c, _)| *c == s) {
                Some((_, z)) => *z += 1,
                None => stoichiometry.push((s, 1)),
            }
        }
        stoichiometry.retain(|&(_, z)| z != 0);

        if stoichiometry.is_empty() {
            return Err(NetworkError::NoEffect(name.to_owned()));
        }

        Ok(Reaction {
            name: name.to_owned(),
            rate_constant,
            reactants: counted,
            stoichiometry,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn rate_constant(&self) -> f64 {
        self.rate_constant
    }

    /// Rate-law species with their multiplicities.
    pub fn reactants(&self) -> &[(SpeciesIdx, u32)] {
        &self.reactants
    }

    /// Distinct species whose populations determine the propensity.
    pub fn rate_species(&self) -> Vec<SpeciesIdx> {
        self.reactants.iter().map(|&(s, _)| s).collect()
    }

    /// Net population change per firing.
    pub fn stoichiometry(&self) -> &[(SpeciesIdx, i32)] {
        &self.stoichiometry
    }

    /// Molecularity of the rate law.
    pub fn order(&self) -> u32 {
        self.reactants.iter().map(|&(_, m)| m).sum()
    }

    pub fn multiplicity(&self, species: SpeciesIdx) -> u32 {
        self.reactants
            .iter()
            .find(|&&(s, _)| s == species)
            .map_or(0, |&(_, m)| m)
    }

    /// Mass-action propensity at the given population vector.
    pub fn propensity(&self, populations: &[f64]) -> f64 {
        let mut a = self.rate_constant;
        for &(s, m) in &self.reactants {
            a *= falling_factorial(populations[s], m);
            if a == 0.0 {
                break;
            }
        }
        a
    }
}

/// x (x-1) ... (x-m+1), zero as soon as a factor drops to zero or below.
fn falling_factorial(x: f64, m: u32) -> f64 {
    let mut acc = 1.0;
    for i in 0..m {
        let term = x - i as f64;
        if term <= 0.0 {
            return 0.0;
        }
        acc *= term;
    }
    acc
}

use std::fmt;

use crate::NetworkError;
use crate::Reaction;
use crate::ReactionIdx;
use crate::Species;
use crate::SpeciesIdx;

/// An append-only reaction network: the canonical, live simulation state.
///
/// Besides species and reactions, the network keeps a per-species view of
/// the stoichiometry, i.e. for every species `j` the list of reactions `v`
/// that change it together with the net change `z[j][v]`. The view is
/// updated whenever a reaction is appended, so anything that was sized for
/// an earlier version of the network can catch up by comparing counts.
#[derive(Debug, Clone, Default)]
pub struct ReactionNetwork {
    species: Vec<Species>,
    reactions: Vec<Reaction>,
    species_in_rxn: Vec<Vec<(ReactionIdx, i32)>>,
}

impl ReactionNetwork {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_species(&mut self, name: &str, population: f64) -> Result<SpeciesIdx, NetworkError> {
        if self.species_index(name).is_some() {
            return Err(NetworkError::DuplicateSpecies(name.to_owned()));
        }
        self.species.push(Species::new(name, population)?);
        self.species_in_rxn.push(Vec::new());
        Ok(self.species.len() - 1)
    }

    pub fn add_reaction(&mut self, reaction: Reaction) -> Result<ReactionIdx, NetworkError> {
        let n = self.species.len();
        let unknown = reaction.reactants().iter().map(|&(s, _)| s)
            .chain(reaction.stoichiometry().iter().map(|&(s, _)| s))
            .find(|&s| s >= n);
        if let Some(s) = unknown {
            return Err(NetworkError::UnknownSpecies(s));
        }

        let v = self.reactions.len();
        for &(s, z) in reaction.stoichiometry() {
            self.species_in_rxn[s].push((v, z));
        }
        self.reactions.push(reaction);
        Ok(v)
    }

    pub fn num_species(&self) -> usize {
        self.species.len()
    }

    pub fn num_reactions(&self) -> usize {
        self.reactions.len()
    }

    pub fn species(&self, j: SpeciesIdx) -> &Species {
        &self.species[j]
    }

    pub fn reaction(&self, v: ReactionIdx) -> &Reaction {
        &self.reactions[v]
    }

    pub fn iter_species(&self) -> impl Iterator<Item = (SpeciesIdx, &Species)> {
        self.species.iter().enumerate()
    }

    pub fn iter_reactions(&self) -> impl Iterator<Item = (ReactionIdx, &Reaction)> {
        self.reactions.iter().enumerate()
    }

    pub fn species_index(&self, name: &str) -> Option<SpeciesIdx> {
        self.species.iter().position(|s| s.name() == name)
    }

    pub fn population(&self, j: SpeciesIdx) -> f64 {
        self.species[j].population()
    }

    pub fn populations(&self) -> Vec<f64> {
        self.species.iter().map(|s| s.population()).collect()
    }

    /// Overwrite all populations, e.g. to roll back a rejected leap.
    pub fn restore(&mut self, populations: &[f64]) -> Result<(), NetworkError> {
        if populations.len() != self.species.len() {
            return Err(NetworkError::PopulationLength {
                found: populations.len(),
                expected: self.species.len(),
            });
        }
        for (sp, &x) in self.species.iter_mut().zip(populations) {
            sp.set_population(x);
        }
        Ok(())
    }

    /// Reactions changing species `j` and the net change per firing.
    pub fn stoichiometry(&self, j: SpeciesIdx) -> &[(ReactionIdx, i32)] {
        &self.species_in_rxn[j]
    }

    /// Propensities at the live state, written into `out`.
    pub fn propensities(&self, out: &mut Vec<f64>) {
        let populations = self.populations();
        self.propensities_at(&populations, out);
    }

    /// Propensities at an arbitrary population vector.
    pub fn propensities_at(&self, populations: &[f64], out: &mut Vec<f64>) {
        out.clear();
        out.extend(self.reactions.iter().map(|r| r.propensity(populations)));
    }

    pub fn total_propensity(&self) -> f64 {
        let populations = self.populations();
        self.reactions.iter().map(|r| r.propensity(&populations)).sum()
    }

    /// Apply `count` firings of reaction `v` to the live populations.
    pub fn fire(&mut self, v: ReactionIdx, count: f64) {
        if count == 0.0 {
            return;
        }
        for &(s, z) in self.reactions[v].stoichiometry() {
            let x = self.species[s].population();
            self.species[s].set_population(x + z as f64 * count);
        }
    }

    pub fn has_negative_population(&self) -> bool {
        self.species.iter().any(|s| s.population() < 0.0)
    }
}

impl fmt::Display for ReactionNetwork {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let side = |list: &[(SpeciesIdx, u32)]| -> String {
            if list.is_empty() {
                return "0".to_string();
            }
            list.iter()
                .map(|&(s, m)| {
                    let name = self.species[s].name();
                    if m > 1 { format!("{} {}", m, name) } else { name.to_string() }
                })
                .collect::<Vec<_>>()
                .join(" + ")
        };
        for (j, sp) in self.iter_species() {
            writeln!(f, "{:>5} {:>20} {:>14.2}", j, sp.name(), sp.population())?;
        }
        for (v, rxn) in self.iter_reactions() {
            // Reconstruct the product side from reactants and net change.
            let mut products: Vec<(SpeciesIdx, u32)> = rxn.reactants().to_vec();
            for &(s, z) in rxn.stoichiometry() {
                match products.iter_mut().find(|(p, _)| *p == s) {
                    Some((_, m)) => *m = (*m as i32 + z) as u32,
                    None => products.push((s, z as u32)),
                }
            }
            products.retain(|&(_, m)| m > 0);
            writeln!(f, "{:>5} {:>20} {:>12.4e}   {} -> {}",
                v, rxn.name(), rxn.rate_constant(), side(rxn.reactants()), side(&products))?;
        }
        Ok(())
    }
}

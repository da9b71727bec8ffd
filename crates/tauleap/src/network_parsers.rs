use std::fs::File;
use std::io::{stdin, BufRead, BufReader, Cursor};
use std::path::Path;

use ahash::AHashMap;
use anyhow::{anyhow, Result};
use log::debug;
use paste::paste;
use serde::Deserialize;
use tl_network::Reaction;
use tl_network::ReactionNetwork;
use tl_network::SpeciesIdx;

// ============================================================
//  JSON network description
// ============================================================

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SpeciesEntry {
    name: String,
    population: f64,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ReactionEntry {
    name: String,
    rate: f64,
    #[serde(default)]
    reactants: Vec<String>,
    #[serde(default)]
    products: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct NetworkEntry {
    species: Vec<SpeciesEntry>,
    #[serde(default)]
    reactions: Vec<ReactionEntry>,
}

fn lookup(index: &AHashMap<String, SpeciesIdx>, reaction: &str, names: &[String]) -> Result<Vec<SpeciesIdx>> {
    names.iter()
        .map(|name| index.get(name).copied()
            .ok_or_else(|| anyhow!("Reaction '{}' refers to unknown species '{}'", reaction, name)))
        .collect()
}

/// Parse a network description:
///
/// ```json
/// { "species":   [ { "name": "A", "population": 100 } ],
///   "reactions": [ { "name": "decay", "rate": 0.1,
///                    "reactants": ["A"], "products": [] } ] }
/// ```
///
/// Repeated species names in `reactants` or `products` express
/// stoichiometric multiplicity.
pub fn read_network<R: BufRead>(reader: R) -> Result<ReactionNetwork> {
    let entry: NetworkEntry = serde_json::from_reader(reader)?;

    let mut network = ReactionNetwork::new();
    let mut index = AHashMap::with_capacity(entry.species.len());
    for s in entry.species {
        let j = network.add_species(&s.name, s.population)?;
        index.insert(s.name, j);
    }
    for r in entry.reactions {
        let reactants = lookup(&index, &r.name, &r.reactants)?;
        let products = lookup(&index, &r.name, &r.products)?;
        network.add_reaction(Reaction::new(&r.name, r.rate, &reactants, &products)?)?;
    }
    debug!("Read network with {} species and {} reactions",
        network.num_species(), network.num_reactions());
    Ok(network)
}

// ============================================================
//  Input adapters: string, file, stdin and "-"-or-file
// ============================================================

macro_rules! define_input_variants {
    ($base:ident, $ret:ty) => {
        paste! {
            /// Read from a string buffer.
            pub fn [<$base _string>](s: &str) -> $ret {
                $base(Cursor::new(s))
            }

            /// Read from a file path.
            pub fn [<$base _file>]<P: AsRef<Path>>(path: P) -> $ret {
                let reader = BufReader::new(File::open(path)?);
                $base(reader)
            }

            /// Read from stdin.
            pub fn [<$base _stdin>]() -> $ret {
                let reader = BufReader::new(stdin());
                $base(reader)
            }

            /// Read either from stdin ("-") or a file path.
            pub fn [<$base _input>](s: &str) -> $ret {
                if s == "-" {
                    [<$base _stdin>]()
                } else {
                    [<$base _file>](s)
                }
            }
        }
    };
}

define_input_variants!(read_network, Result<ReactionNetwork>);

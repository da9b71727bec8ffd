use std::fs;
use std::fmt;
use std::path::Path;
use serde::Serialize;
use tl_network::ReactionNetwork;

use crate::LeapError;

/// Species populations sampled at fixed output times.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Trajectory {
    species: Vec<String>,
    times: Vec<f64>,
    /// One row of populations per output time; rows are filled in order.
    points: Vec<Vec<f64>>,
}

impl Trajectory {
    pub fn new(times: &[f64], network: &ReactionNetwork) -> Self {
        Self {
            species: network.iter_species().map(|(_, s)| s.name().to_string()).collect(),
            times: times.to_vec(),
            points: Vec::with_capacity(times.len()),
        }
    }

    /// Record the state that holds until `t + tinc`: every pending output
    /// time before that gets a copy of `populations`.
    pub fn record(&mut self, t: f64, tinc: f64, populations: &[f64]) {
        while let Some(&time) = self.times.get(self.points.len()) {
            if time >= t + tinc {
                break;
            }
            self.points.push(populations.to_vec());
        }
    }

    pub fn species(&self) -> &[String] {
        &self.species
    }

    pub fn times(&self) -> &[f64] {
        &self.times
    }

    pub fn is_complete(&self) -> bool {
        self.points.len() == self.times.len()
    }

    /// Iterate over recorded `(time, populations)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (f64, &[f64])> {
        self.times.iter().zip(&self.points).map(|(&t, p)| (t, p.as_slice()))
    }

    /// Recorded populations of one species over time.
    pub fn series(&self, species: usize) -> Vec<(f64, f64)> {
        self.iter()
            .map(|(t, p)| (t, p.get(species).copied().unwrap_or(0.0)))
            .collect()
    }

    pub fn to_json(&self) -> Result<String, LeapError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn write_json<P: AsRef<Path>>(&self, path: P) -> Result<(), LeapError> {
        fs::write(path, self.to_json()?)?;
        Ok(())
    }
}

impl fmt::Display for Trajectory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:>13}", "time")?;
        for name in &self.species {
            write!(f, " {:>12}", name)?;
        }
        writeln!(f)?;
        for (t, row) in self.iter() {
            write!(f, "{:13.6}", t)?;
            for x in row {
                write!(f, " {:12.2}", x)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

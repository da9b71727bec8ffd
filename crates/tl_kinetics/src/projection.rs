use tl_network::ReactionNetwork;

/// Expected change of one species over a proposed leap, in the normal
/// approximation of the summed Poisson increments.
///
/// `sdev` carries the sign of `mean`, so `mean + sdev` is the extreme value
/// in the direction the population is moving.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ProjectedChange {
    pub mean: f64,
    pub sdev: f64,
}

impl ProjectedChange {
    pub fn extreme(&self) -> f64 {
        self.mean + self.sdev
    }
}

/// Fill `out` with one `ProjectedChange` per species:
///
/// ```text
/// mean_j = tau Σ_v z_jv a_v
/// sdev_j = ±tau sqrt(Σ_v z_jv² a_v)
/// ```
pub fn project_changes(
    network: &ReactionNetwork,
    a_eff: &[f64],
    tau: f64,
    out: &mut Vec<ProjectedChange>,
) {
    out.clear();
    out.extend((0..network.num_species()).map(|j| {
        let mut mean = 0.0;
        let mut var = 0.0;
        for &(v, z) in network.stoichiometry(j) {
            let z = z as f64;
            mean += z * a_eff[v];
            var += z * z * a_eff[v];
        }
        let mean = tau * mean;
        let sdev = tau * var.sqrt();
        ProjectedChange {
            mean,
            sdev: if mean < 0.0 { -sdev } else { sdev },
        }
    }));
}

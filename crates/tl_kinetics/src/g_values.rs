use tl_network::ReactionNetwork;
use tl_network::SpeciesIdx;

/// Supplies the per-species factor `g_j >= 1` that tightens the
/// species-bound leap condition: a relative population change of `eps/g_j`
/// keeps the relative change of every propensity depending on `j` below
/// `eps`.
pub trait GValueEstimator {
    fn g(&self, network: &ReactionNetwork, species: SpeciesIdx) -> f64;
}

/// The highest-order-reaction rule.
///
/// For the reaction of highest order in which species `j` is a reactant,
/// with `x` the population of `j`:
///
/// | order | copies of `j` | g                        |
/// |-------|---------------|--------------------------|
/// | 1     | 1             | 1                        |
/// | 2     | 1             | 2                        |
/// | 2     | 2             | 2 + 1/(x-1)              |
/// | 3     | 1             | 3                        |
/// | 3     | 2             | 3/2 (2 + 1/(x-1))        |
/// | 3     | 3             | 3 + 1/(x-1) + 2/(x-2)    |
/// | n > 3 | any           | n                        |
///
/// Denominators are clamped at one. Ties on the order resolve to the
/// largest g; species that enter no rate law get `g = 1`.
#[derive(Debug, Clone, Copy, Default)]
pub struct HighestOrderG;

impl GValueEstimator for HighestOrderG {
    fn g(&self, network: &ReactionNetwork, species: SpeciesIdx) -> f64 {
        let x = network.population(species);
        let mut best: Option<(u32, f64)> = None;
        for (_, rxn) in network.iter_reactions() {
            let copies = rxn.multiplicity(species);
            if copies == 0 {
                continue;
            }
            let order = rxn.order();
            let g = g_for(order, copies, x);
            best = match best {
                Some((o, bg)) if o > order || (o == order && bg >= g) => Some((o, bg)),
                _ => Some((order, g)),
            };
        }
        best.map_or(1.0, |(_, g)| g)
    }
}

fn g_for(order: u32, copies: u32, x: f64) -> f64 {
    let inv = |d: f64| 1.0 / d.max(1.0);
    match (order, copies) {
        (1, _) => 1.0,
        (2, 1) => 2.0,
        (2, _) => 2.0 + inv(x - 1.0),
        (3, 1) => 3.0,
        (3, 2) => 1.5 * (2.0 + inv(x - 1.0)),
        (3, _) => 3.0 + inv(x - 1.0) + 2.0 * inv(x - 2.0),
        (n, _) => n as f64,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tl_network::Reaction;

    #[test]
    fn test_g_table() {
        assert_eq!(g_for(1, 1, 10.0), 1.0);
        assert_eq!(g_for(2, 1, 10.0), 2.0);
        assert!((g_for(2, 2, 11.0) - 2.1).abs() < 1e-12);
        assert_eq!(g_for(3, 1, 10.0), 3.0);
        assert!((g_for(3, 2, 11.0) - 3.15).abs() < 1e-12);
        assert!((g_for(3, 3, 12.0) - (3.0 + 1.0 / 11.0 + 0.2)).abs() < 1e-12);
        assert_eq!(g_for(4, 2, 10.0), 4.0);
        // clamped denominators
        assert_eq!(g_for(2, 2, 1.0), 3.0);
        assert_eq!(g_for(3, 3, 0.0), 6.0);
    }

    #[test]
    fn test_highest_order_wins() {
        let mut net = ReactionNetwork::new();
        let a = net.add_species("A", 11.0).unwrap();
        let b = net.add_species("B", 5.0).unwrap();
        let c = net.add_species("C", 5.0).unwrap();
        net.add_reaction(Reaction::new("a-decay", 1.0, &[a], &[]).unwrap()).unwrap();
        net.add_reaction(Reaction::new("ab", 1.0, &[a, b], &[c]).unwrap()).unwrap();
        net.add_reaction(Reaction::new("aa", 1.0, &[a, a], &[c]).unwrap()).unwrap();

        let g = HighestOrderG;
        assert!((g.g(&net, a) - 2.1).abs() < 1e-12);
        assert_eq!(g.g(&net, b), 2.0);
        assert_eq!(g.g(&net, c), 1.0);
    }
}

use petgraph::stable_graph::NodeIndex;
use rand::{seq::SliceRandom, Rng};

use crate::{
    city::{Citizen, City},
    error::{Result, SpreadError},
};

/// `0 - 1 - ... - (n-1)`
pub fn path(n: usize) -> City {
    City::from_edges(n, (1..n).map(|i| (i - 1, i)))
}

/// A path closed into a ring. Fewer than three citizens give a path.
pub fn cycle(n: usize) -> City {
    let mut city = path(n);
    if n > 2 {
        city.add_road(NodeIndex::new(n - 1), NodeIndex::new(0));
    }
    city
}

/// Random lobster: a backbone path of expected length `n` where every
/// backbone citizen grows leaves with probability `p1`, and every leaf grows
/// leaves of its own with probability `p2`. Both must be below 1.
pub fn random_lobster<R: Rng + ?Sized>(n: usize, p1: f64, p2: f64, rng: &mut R) -> Result<City> {
    for (name, p) in [("p1", p1), ("p2", p2)] {
        if !(0.0..1.0).contains(&p) {
            return Err(SpreadError::invalid(name, format!("{p} must be in [0, 1)")));
        }
    }

    let backbone = (2.0 * rng.gen::<f64>() * n as f64 + 0.5) as usize;
    let mut city = path(backbone);
    for spine in 0..backbone {
        while rng.gen::<f64>() < p1 {
            let leg = city.add_citizen(Citizen::human());
            city.add_road(NodeIndex::new(spine), leg);
            while rng.gen::<f64>() < p2 {
                let claw = city.add_citizen(Citizen::human());
                city.add_road(leg, claw);
            }
        }
    }
    Ok(city)
}

/// Tries `attempts` random shortcuts between distinct citizens.
/// Returns how many new roads were actually built.
pub fn add_random_edges<R: Rng + ?Sized>(city: &mut City, attempts: usize, rng: &mut R) -> usize {
    let nodes: Vec<NodeIndex> = city.citizens().collect();
    if nodes.len() < 2 {
        return 0;
    }
    let mut built = 0;
    for _ in 0..attempts {
        let a = nodes[rng.gen_range(0..nodes.len())];
        let b = nodes[rng.gen_range(0..nodes.len())];
        if city.add_road(a, b).is_some() {
            built += 1;
        }
    }
    built
}

/// Watts-Strogatz small world: a ring where every citizen knows its `k / 2`
/// nearest neighbors on each side, then each lattice road is rewired to a
/// random citizen with probability `beta`.
pub fn watts_strogatz<R: Rng + ?Sized>(n: usize, k: usize, beta: f64, rng: &mut R) -> Result<City> {
    if k > n {
        return Err(SpreadError::invalid("k", format!("{k} exceeds the {n} citizens")));
    }
    if !(0.0..=1.0).contains(&beta) {
        return Err(SpreadError::invalid("beta", format!("{beta} is not a probability")));
    }
    if k == n {
        let pairs = (0..n).flat_map(|a| (a + 1..n).map(move |b| (a, b)));
        return Ok(City::from_edges(n, pairs));
    }

    let half = k / 2;
    let mut city = City::from_edges(
        n,
        (1..=half).flat_map(|j| (0..n).map(move |i| (i, (i + j) % n))),
    );
    let nodes: Vec<NodeIndex> = city.citizens().collect();

    for j in 1..=half {
        for i in 0..n {
            if rng.gen::<f64>() >= beta {
                continue;
            }
            let u = NodeIndex::new(i);
            let v = NodeIndex::new((i + j) % n);
            let Some(edge) = city.road_between(u, v) else {
                continue;
            };
            if city.degree(u) >= n - 1 {
                continue;
            }
            let Some(&w) = nodes
                .choose_multiple(rng, nodes.len())
                .find(|&&w| w != u && !city.has_road(u, w))
            else {
                continue;
            };
            city.remove_road(edge);
            city.add_road(u, w);
        }
    }
    Ok(city)
}

use std::{fmt, str::FromStr};

use petgraph::stable_graph::NodeIndex;
use rand::{
    distributions::{Bernoulli, Distribution},
    Rng,
};
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::{
    city::City,
    error::{check_probability, Result, SpreadError},
};

/// Fraction of infected neighbors the deterministic rule has to exceed.
pub const DETERMINISTIC_THRESHOLD: f64 = 1.0 / 3.0;

/// Infected neighbors needed under target set selection.
pub const TARGET_SET_THRESHOLD: usize = 2;

/// How the first zombies are chosen.
#[derive(Clone, Debug, PartialEq)]
pub enum SeedSet {
    /// Every citizen turns independently with this probability.
    Probability(f64),
    /// Exactly these citizens start as zombies.
    Nodes(Vec<NodeIndex>),
}

impl From<f64> for SeedSet {
    fn from(p: f64) -> Self {
        SeedSet::Probability(p)
    }
}

impl From<Vec<NodeIndex>> for SeedSet {
    fn from(nodes: Vec<NodeIndex>) -> Self {
        SeedSet::Nodes(nodes)
    }
}

/// Assigns the initial zombies and clears every infection time.
pub fn initialize<R: Rng + ?Sized>(city: &mut City, seeds: &SeedSet, rng: &mut R) -> Result<()> {
    match seeds {
        SeedSet::Probability(p) => {
            let p = check_probability("initial_probability", *p)?;
            let coin = Bernoulli::new(p)
                .map_err(|e| SpreadError::invalid("initial_probability", e.to_string()))?;
            let nodes: Vec<_> = city.citizens().collect();
            for node in nodes {
                let zombie = coin.sample(rng);
                city.set_zombie(node, zombie);
                city.set_infected_since(node, None);
            }
        }
        SeedSet::Nodes(seeds) => {
            if let Some(missing) = seeds.iter().find(|&&n| !city.contains(n)) {
                return Err(SpreadError::invalid(
                    "seeds",
                    format!("node {} is not in the city", missing.index()),
                ));
            }
            let nodes: Vec<_> = city.citizens().collect();
            for node in nodes {
                city.set_zombie(node, seeds.contains(&node));
                city.set_infected_since(node, None);
            }
        }
    }
    Ok(())
}

/// The color changing rule applied each timestep.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rule {
    /// Turn when at least two neighbors are zombies.
    #[default]
    TargetSetSelection,
    /// Turn with probability `infected / (degree + 1)`.
    Stochastic,
    /// Turn when more than a third of the neighbors are zombies.
    Deterministic,
}

impl Rule {
    pub const ALL: [Rule; 3] = [Rule::TargetSetSelection, Rule::Stochastic, Rule::Deterministic];

    pub fn name(&self) -> &'static str {
        match self {
            Rule::TargetSetSelection => "target_set_selection",
            Rule::Stochastic => "stochastic",
            Rule::Deterministic => "deterministic",
        }
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Rule {
    type Err = SpreadError;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        Rule::ALL
            .into_iter()
            .find(|rule| rule.name() == normalized)
            .ok_or_else(|| SpreadError::UnknownRule(s.to_owned()))
    }
}

/// Computes the city one timestep later under `rule`.
///
/// The returned city starts as a copy of `city`, so zombies stay zombies;
/// humans are promoted based purely on the state of `city`.
pub fn next_state<R: Rng + ?Sized>(city: &City, rule: Rule, rng: &mut R) -> Result<City> {
    let mut next = city.snapshot();
    for node in city.citizens() {
        let turns = match rule {
            Rule::TargetSetSelection => city.infected_neighbors(node) >= TARGET_SET_THRESHOLD,
            Rule::Stochastic => stochastic_turns(city, node, rng)?,
            Rule::Deterministic => match infected_fraction(city, node) {
                Ok(fraction) => fraction > DETERMINISTIC_THRESHOLD,
                Err(SpreadError::Topology { node, reason }) => {
                    trace!(
                        node = node.index(),
                        reason,
                        "skipping node under deterministic rule"
                    );
                    false
                }
                Err(e) => return Err(e),
            },
        };
        if turns {
            next.set_zombie(node, true);
        }
    }
    Ok(next)
}

fn stochastic_turns<R: Rng + ?Sized>(city: &City, node: NodeIndex, rng: &mut R) -> Result<bool> {
    let p = infection_probability(city, node);
    let coin = Bernoulli::new(p)
        .map_err(|e| SpreadError::invalid("infection_probability", e.to_string()))?;
    Ok(coin.sample(rng))
}

/// Chance that `node` turns under the stochastic rule.
/// The `+ 1` keeps isolated citizens at zero instead of dividing by zero.
pub fn infection_probability(city: &City, node: NodeIndex) -> f64 {
    city.infected_neighbors(node) as f64 / (city.degree(node) + 1) as f64
}

/// Share of `node`'s neighbors that are zombies, counted in one pass.
///
/// Fails with [`SpreadError::Topology`] for a citizen with no neighbors.
pub fn infected_fraction(city: &City, node: NodeIndex) -> Result<f64> {
    let mut infected = 0usize;
    let mut seen = 0usize;
    for neighbor in city.neighbors(node) {
        if city.is_zombie(neighbor) {
            infected += 1;
        }
        seen += 1;
    }
    if seen == 0 {
        return Err(SpreadError::Topology {
            node,
            reason: "citizen has no neighbors",
        });
    }
    Ok(infected as f64 / seen as f64)
}

use rand::{
    distributions::{Bernoulli, Distribution},
    RngCore,
};
use serde::{Deserialize, Serialize};

use crate::{
    city::City,
    error::{check_probability, Result, SpreadError},
};

/// Rewrites the roads of a city between two rule evaluations.
pub trait TopologyPolicy {
    fn update(&mut self, city: &City, rng: &mut dyn RngCore) -> Result<City>;
}

/// Keeps the city as it is.
#[derive(Clone, Copy, Debug, Default)]
pub struct Unchanged;

impl TopologyPolicy for Unchanged {
    fn update(&mut self, city: &City, _rng: &mut dyn RngCore) -> Result<City> {
        Ok(city.snapshot())
    }
}

/// Removes each road joining two zombies with a fixed probability.
#[derive(Clone, Copy, Debug)]
pub struct DropInfectedEdges {
    coin: Bernoulli,
}

impl DropInfectedEdges {
    pub fn new(probability: f64) -> Result<Self> {
        let p = check_probability("drop_probability", probability)?;
        let coin = Bernoulli::new(p)
            .map_err(|e| SpreadError::invalid("drop_probability", e.to_string()))?;
        Ok(Self { coin })
    }
}

impl TopologyPolicy for DropInfectedEdges {
    fn update(&mut self, city: &City, rng: &mut dyn RngCore) -> Result<City> {
        let mut next = city.snapshot();
        for (edge, a, b) in city.roads() {
            if city.is_zombie(a) && city.is_zombie(b) && self.coin.sample(rng) {
                next.remove_road(edge);
            }
        }
        Ok(next)
    }
}

/// Serializable choice of topology policy.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TopologyKind {
    #[default]
    None,
    DropInfectedEdges {
        probability: f64,
    },
}

impl TopologyKind {
    pub fn build(&self) -> Result<Box<dyn TopologyPolicy>> {
        Ok(match *self {
            TopologyKind::None => Box::new(Unchanged),
            TopologyKind::DropInfectedEdges { probability } => {
                Box::new(DropInfectedEdges::new(probability)?)
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use petgraph::stable_graph::NodeIndex;
    use rand::{rngs::StdRng, SeedableRng};

    use super::*;

    fn infected_triangle_with_tail() -> City {
        let mut city = City::from_edges(4, [(0, 1), (1, 2), (2, 0), (2, 3)]);
        for i in 0..3 {
            city.set_zombie(NodeIndex::new(i), true);
        }
        city
    }

    #[test]
    fn unchanged_keeps_every_road() {
        let city = infected_triangle_with_tail();
        let next = Unchanged
            .update(&city, &mut StdRng::seed_from_u64(0))
            .unwrap();
        assert_eq!(next.road_count(), 4);
        assert_eq!(next.zombies(), city.zombies());
    }

    #[test]
    fn drop_all_infected_edges() {
        let city = infected_triangle_with_tail();
        let next = DropInfectedEdges::new(1.0)
            .unwrap()
            .update(&city, &mut StdRng::seed_from_u64(0))
            .unwrap();
        assert_eq!(next.road_count(), 1);
        assert!(next.has_road(NodeIndex::new(2), NodeIndex::new(3)));
        assert_eq!(next.citizen_count(), 4);
    }

    #[test]
    fn drop_with_zero_probability_is_a_no_op() {
        let city = infected_triangle_with_tail();
        let next = DropInfectedEdges::new(0.0)
            .unwrap()
            .update(&city, &mut StdRng::seed_from_u64(0))
            .unwrap();
        assert_eq!(next.road_count(), 4);
    }

    #[test]
    fn rejects_bad_probability() {
        assert!(DropInfectedEdges::new(2.0).is_err());
        assert!(TopologyKind::DropInfectedEdges { probability: -1.0 }
            .build()
            .is_err());
    }

    #[test]
    fn kind_deserializes_from_json() {
        let kind: TopologyKind =
            serde_json::from_str(r#"{"kind":"drop_infected_edges","probability":0.1}"#).unwrap();
        assert_eq!(kind, TopologyKind::DropInfectedEdges { probability: 0.1 });
    }
}

use std::collections::HashMap;

use glam::Vec2;
use petgraph::stable_graph::NodeIndex;
use rand::{Rng, RngCore};
use tracing::debug;

use crate::{
    city::City,
    error::{Result, SpreadError},
    quadtree::{BoundingBox2D, QuadTree},
};

/// Fixed position of every citizen, normalized into `[-1, 1]` on both axes.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Layout {
    positions: HashMap<NodeIndex, Vec2>,
}

impl Layout {
    pub fn from_positions(positions: HashMap<NodeIndex, Vec2>) -> Self {
        Self { positions }
    }

    pub fn position(&self, node: NodeIndex) -> Option<Vec2> {
        self.positions.get(&node).copied()
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeIndex, Vec2)> + '_ {
        self.positions.iter().map(|(&n, &p)| (n, p))
    }
}

/// Computes a [`Layout`] for a city.
pub trait LayoutEngine {
    fn layout(&self, city: &City, rng: &mut dyn RngCore) -> Result<Layout>;
}

#[derive(Debug, Clone)]
struct Body {
    position: Vec2,
    velocity: Vec2,
    mass: f32,
}

/// Spring embedder with barnes-hut repulsion.
#[derive(Clone, Debug)]
pub struct ForceLayout {
    iterations: usize,
    spring_stiffness: f32,
    spring_neutral_length: f32,
    delta_time: f32,
    gravity_force: f32,
    repel_force_const: f32,
    damping: f32,
    quadtree_theta: f32,
}

impl ForceLayout {
    pub fn builder() -> ForceLayoutBuilder {
        ForceLayoutBuilder::default()
    }

    fn step(&self, bodies: &mut [Body], springs: &[(usize, usize)]) {
        let mut forces = vec![Vec2::ZERO; bodies.len()];

        let quadtree = Self::build_quadtree(bodies);
        for (i, body) in bodies.iter().enumerate() {
            for (position, mass) in quadtree.stack(&body.position, self.quadtree_theta) {
                forces[i] += self.repel_force(body, position, mass);
            }
            forces[i] += -body.position * body.mass * self.gravity_force;
        }

        for &(a, b) in springs {
            let spring_force = self.spring_force(&bodies[a], &bodies[b]);
            forces[a] -= spring_force;
            forces[b] += spring_force;
        }

        for (body, force) in bodies.iter_mut().zip(forces) {
            body.velocity += force / body.mass * self.delta_time;
            body.velocity *= self.damping;
            body.position += body.velocity * self.delta_time;
        }
    }

    fn build_quadtree(bodies: &[Body]) -> QuadTree {
        let boundary = BoundingBox2D::around(bodies.iter().map(|b| b.position));
        let mut quadtree = QuadTree::new(boundary);
        for body in bodies {
            quadtree.insert(body.position, body.mass);
        }
        quadtree
    }

    fn spring_force(&self, n1: &Body, n2: &Body) -> Vec2 {
        let direction_vec: Vec2 = n2.position - n1.position;
        let force_magnitude =
            self.spring_stiffness * (direction_vec.length() - self.spring_neutral_length);

        direction_vec.normalize_or(Vec2::ZERO) * -force_magnitude
    }

    fn repel_force(&self, body: &Body, position: Vec2, mass: f32) -> Vec2 {
        let dir_vec: Vec2 = position - body.position;
        if dir_vec.length_squared() == 0.0 {
            return Vec2::ZERO;
        }

        let f = -self.repel_force_const * (body.mass * mass).abs() / dir_vec.length_squared();

        (dir_vec.normalize_or(Vec2::ZERO) * f).clamp(
            Vec2::new(-100000.0, -100000.0),
            Vec2::new(100000.0, 100000.0),
        )
    }

    /// Scales positions into `[-1, 1]` keeping the aspect ratio.
    fn normalize(bodies: &mut [Body]) {
        let boundary = BoundingBox2D::around(bodies.iter().map(|b| b.position));
        let half_extent = 0.5 * boundary.width.max(boundary.height);
        for body in bodies.iter_mut() {
            body.position = if half_extent > 0.0 {
                (body.position - boundary.center) / half_extent
            } else {
                Vec2::ZERO
            };
        }
    }
}

impl LayoutEngine for ForceLayout {
    fn layout(&self, city: &City, rng: &mut dyn RngCore) -> Result<Layout> {
        let nodes: Vec<NodeIndex> = city.citizens().collect();
        let slot: HashMap<NodeIndex, usize> =
            nodes.iter().enumerate().map(|(i, &n)| (n, i)).collect();

        let mut bodies: Vec<Body> = nodes
            .iter()
            .map(|_| Body {
                position: Vec2::new(rng.gen_range(-1.0..1.0), rng.gen_range(-1.0..1.0)),
                velocity: Vec2::ZERO,
                mass: 1.0,
            })
            .collect();
        let springs: Vec<(usize, usize)> = city
            .roads()
            .filter_map(|(_, a, b)| Some((*slot.get(&a)?, *slot.get(&b)?)))
            .collect();

        if bodies.len() > 1 {
            for _ in 0..self.iterations {
                self.step(&mut bodies, &springs);
            }
            Self::normalize(&mut bodies);
        }

        if bodies.iter().any(|b| !b.position.is_finite()) {
            return Err(SpreadError::render("layout diverged to a non-finite position"));
        }

        debug!(
            nodes = bodies.len(),
            springs = springs.len(),
            iterations = self.iterations,
            "layout computed"
        );

        Ok(Layout::from_positions(
            nodes
                .into_iter()
                .zip(bodies.into_iter().map(|b| b.position))
                .collect(),
        ))
    }
}

/// Builder for `ForceLayout`
pub struct ForceLayoutBuilder {
    iterations: usize,
    spring_stiffness: f32,
    spring_neutral_length: f32,
    delta_time: f32,
    gravity_force: f32,
    repel_force_const: f32,
    damping: f32,
    quadtree_theta: f32,
}

impl ForceLayoutBuilder {
    /// Get a Instance of `ForceLayoutBuilder` with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// How many simulation steps run before the positions are frozen
    pub fn iterations(mut self, iterations: usize) -> Self {
        self.iterations = iterations;
        self
    }

    /// How strong the spring force along a road should be
    pub fn spring_stiffness(mut self, spring_stiffness: f32) -> Self {
        self.spring_stiffness = spring_stiffness;
        self
    }

    /// Length of a road in neutral position.
    /// If it is shorter it pushes apart, if it is longer it pulls together.
    pub fn spring_neutral_length(mut self, neutral_length: f32) -> Self {
        self.spring_neutral_length = neutral_length;
        self
    }

    /// How strong the pull to the center should be.
    pub fn gravity_force(mut self, gravity_force: f32) -> Self {
        self.gravity_force = gravity_force;
        self
    }

    /// How strong citizens should push others away.
    pub fn repel_force(mut self, repel_force_const: f32) -> Self {
        self.repel_force_const = repel_force_const;
        self
    }

    /// `1.0` -> No Damping
    /// `0.0` -> No Movement
    pub fn damping(mut self, damping: f32) -> Self {
        self.damping = damping;
        self
    }

    /// Barnes-hut accuracy between 0.0 and 1.0.
    /// `0.0` -> No approximation -> n^2 brute force
    pub fn quadtree_accuracy(mut self, theta: f32) -> Self {
        self.quadtree_theta = theta;
        self
    }

    /// Time simulated by one step (euler method)
    pub fn delta_time(mut self, delta_time: f32) -> Self {
        self.delta_time = delta_time;
        self
    }

    /// Constructs a instance of `ForceLayout`
    pub fn build(self) -> ForceLayout {
        ForceLayout {
            iterations: self.iterations,
            spring_stiffness: self.spring_stiffness,
            spring_neutral_length: self.spring_neutral_length,
            delta_time: self.delta_time,
            gravity_force: self.gravity_force,
            repel_force_const: self.repel_force_const,
            damping: self.damping,
            quadtree_theta: self.quadtree_theta,
        }
    }
}

impl Default for ForceLayoutBuilder {
    fn default() -> Self {
        Self {
            iterations: 500,
            spring_stiffness: 100.0,
            spring_neutral_length: 2.0,
            gravity_force: 1.0,
            repel_force_const: 100.0,
            delta_time: 0.005,
            damping: 0.9,
            quadtree_theta: 0.75,
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::{rngs::StdRng, SeedableRng};

    use super::*;

    #[test]
    fn every_citizen_gets_a_normalized_position() {
        let city = City::from_edges(10, (0..10).map(|i| (i, (i + 1) % 10)));
        let layout = ForceLayout::builder()
            .iterations(200)
            .build()
            .layout(&city, &mut StdRng::seed_from_u64(1))
            .unwrap();
        assert_eq!(layout.len(), 10);
        for (_, p) in layout.iter() {
            assert!(p.x.abs() <= 1.0 + 1e-4 && p.y.abs() <= 1.0 + 1e-4);
        }
    }

    #[test]
    fn same_seed_same_layout() {
        let city = City::from_edges(6, [(0, 1), (1, 2), (3, 4)]);
        let engine = ForceLayout::builder().iterations(50).build();
        let a = engine.layout(&city, &mut StdRng::seed_from_u64(7)).unwrap();
        let b = engine.layout(&city, &mut StdRng::seed_from_u64(7)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn tuned_forces_still_normalize() {
        let city = City::from_edges(8, (0..7).map(|i| (i, i + 1)));
        let layout = ForceLayoutBuilder::new()
            .iterations(100)
            .gravity_force(3.0)
            .repel_force(20.0)
            .damping(0.5)
            .build()
            .layout(&city, &mut StdRng::seed_from_u64(3))
            .unwrap();
        assert_eq!(layout.len(), 8);
        assert!(layout
            .iter()
            .all(|(_, p)| p.is_finite() && p.abs().max_element() <= 1.0 + 1e-4));
    }

    #[test]
    fn empty_and_single_citizen_cities() {
        let engine = ForceLayout::builder().build();
        let empty = engine.layout(&City::new(), &mut StdRng::seed_from_u64(0)).unwrap();
        assert!(empty.is_empty());

        let single = engine
            .layout(&City::with_citizens(1), &mut StdRng::seed_from_u64(0))
            .unwrap();
        assert_eq!(single.len(), 1);
    }
}

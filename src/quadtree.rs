use glam::Vec2;

const EPSILON: f32 = 1e-3;

/// Quadtree for the barnes-hut approximation used by the layout.
/// An area gets split up into 4 sections and each can contain a leaf or another quadtree.
/// Far away clusters of bodies are summarized into one body at their center of mass.
#[derive(Debug)]
pub struct QuadTree {
    children: [Option<Box<QuadTree>>; 4],
    pub boundary: BoundingBox2D,
    mass: f32,
    position: Vec2,
}

impl QuadTree {
    /// Creates a empty `QuadTree` with it's initial `BoundingBox2D`
    pub fn new(boundary: BoundingBox2D) -> Self {
        Self {
            children: [None, None, None, None],
            boundary,
            mass: 0.0,
            position: Vec2::ZERO,
        }
    }

    /// Center of mass of everything below this node
    pub fn position(&self) -> Vec2 {
        if self.mass == 0.0 {
            return Vec2::ZERO;
        }
        self.position / self.mass
    }

    pub fn mass(&self) -> f32 {
        self.mass
    }

    /// Inserts a body and places it according to its relative position in the boundary.
    /// Bodies without mass are ignored.
    pub fn insert(&mut self, position: Vec2, mass: f32) {
        if mass <= 0.0 {
            return;
        }

        if self.mass == 0.0 && self.is_leaf() {
            self.mass = mass;
            self.position = position * mass;
            return;
        }

        if self.is_leaf() {
            let leaf_position = self.position();
            let leaf_mass = self.mass;

            // Two bodies on the same spot are merged into one
            if leaf_position.distance(position) < EPSILON
                || self.boundary.width < EPSILON
                || self.boundary.height < EPSILON
            {
                self.update_mass(position, mass);
                return;
            }

            self.push_down(leaf_position, leaf_mass);
        }

        self.update_mass(position, mass);
        self.push_down(position, mass);
    }

    fn push_down(&mut self, position: Vec2, mass: f32) {
        let quadrant = self.boundary.section(&position) as usize;
        let sub_boundary = self.boundary.sub_quadrant(quadrant as u8);
        self.children[quadrant]
            .get_or_insert_with(|| Box::new(QuadTree::new(sub_boundary)))
            .insert(position, mass);
    }

    /// Returns the bodies that act on `position` according to the barnes-hut algorithm.
    /// Far away nodes get approximated.
    /// Higher `theta` values result in more approximations.
    /// If `theta` is 0, all bodies are returned without summarizing.
    pub fn stack(&self, position: &Vec2, theta: f32) -> Vec<(Vec2, f32)> {
        let mut bodies = vec![];
        let mut stack = vec![self];
        while let Some(parent) = stack.pop() {
            if parent.mass == 0.0 {
                continue;
            }
            let s = parent.boundary.width.max(parent.boundary.height);
            let center_mass = parent.position();
            let dist = center_mass.distance(*position);

            // Skip the body sitting on `position`, so nothing interacts with itself
            if (s / dist < theta || parent.is_leaf()) && dist > EPSILON {
                bodies.push((center_mass, parent.mass));
            } else {
                stack.extend(parent.children.iter().flatten().map(|c| &**c));
            }
        }
        bodies
    }

    fn update_mass(&mut self, position: Vec2, mass: f32) {
        self.position += position * mass;
        self.mass += mass;
    }

    fn is_leaf(&self) -> bool {
        self.children.iter().all(Option::is_none)
    }
}

#[derive(Clone, Debug)]
pub struct BoundingBox2D {
    pub center: Vec2,
    pub width: f32,
    pub height: f32,
}

impl BoundingBox2D {
    pub fn new(center: Vec2, width: f32, height: f32) -> Self {
        Self {
            center,
            width,
            height,
        }
    }

    /// Smallest box holding every point, padded so it is never degenerate.
    pub fn around(points: impl IntoIterator<Item = Vec2>) -> Self {
        let mut min = Vec2::splat(f32::INFINITY);
        let mut max = Vec2::splat(-f32::INFINITY);
        for p in points {
            min = min.min(p);
            max = max.max(p);
        }
        if !min.is_finite() || !max.is_finite() {
            return Self::new(Vec2::ZERO, 1.0, 1.0);
        }
        let size = (max - min).max(Vec2::splat(EPSILON)) * 1.01;
        Self::new((min + max) * 0.5, size.x, size.y)
    }

    fn section(&self, loc: &Vec2) -> u8 {
        let mut section = 0x00;

        if loc[1] > self.center[1] {
            section |= 0b10;
        }

        if loc[0] > self.center[0] {
            section |= 0b01;
        }

        section
    }

    pub fn sub_quadrant(&self, section: u8) -> Self {
        let mut shift = self.center;
        if section & 0b01 > 0 {
            shift[0] += 0.25 * self.width;
        } else {
            shift[0] -= 0.25 * self.width;
        }

        if section & 0b10 > 0 {
            shift[1] += 0.25 * self.height;
        } else {
            shift[1] -= 0.25 * self.height;
        }
        Self {
            center: shift,
            width: self.width * 0.5,
            height: self.height * 0.5,
        }
    }
}

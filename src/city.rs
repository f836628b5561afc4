use std::collections::BTreeSet;

use petgraph::{
    stable_graph::{EdgeIndex, NodeIndex, StableUnGraph},
    visit::{EdgeRef, IntoEdgeReferences},
    Undirected,
};

/// Per-node simulation state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Citizen {
    /// Whether this citizen is currently a zombie.
    pub zombie: bool,
    /// Timestep the citizen turned. Set to `None` on initialization and not
    /// written by any of the built-in rules.
    pub infected_since: Option<u32>,
}

impl Citizen {
    pub fn human() -> Self {
        Self::default()
    }

    pub fn zombie() -> Self {
        Self {
            zombie: true,
            infected_since: None,
        }
    }
}

/// Undirected graph of citizens connected by roads.
///
/// Node indices are stable for the life of a city: roads can be removed,
/// citizens cannot. Cloning a city yields an independent snapshot of every
/// citizen, which is what the update rules read from while writing the next
/// state.
#[derive(Clone, Debug, Default)]
pub struct City {
    graph: StableUnGraph<Citizen, ()>,
}

impl City {
    pub fn new() -> Self {
        Self {
            graph: StableUnGraph::default(),
        }
    }

    /// Creates `n` humans and no roads.
    pub fn with_citizens(n: usize) -> Self {
        let mut city = Self {
            graph: StableUnGraph::with_capacity(n, 0),
        };
        for _ in 0..n {
            city.add_citizen(Citizen::human());
        }
        city
    }

    /// Builds a city of `n` humans connected by `edges`.
    /// Pairs referring to missing nodes, loops and duplicates are skipped.
    pub fn from_edges(n: usize, edges: impl IntoIterator<Item = (usize, usize)>) -> Self {
        let mut city = Self::with_citizens(n);
        for (a, b) in edges {
            if a < n && b < n {
                city.add_road(NodeIndex::new(a), NodeIndex::new(b));
            }
        }
        city
    }

    pub fn add_citizen(&mut self, citizen: Citizen) -> NodeIndex {
        self.graph.add_node(citizen)
    }

    /// Connects two citizens. Returns `None` for loops, unknown nodes, or a
    /// road that already exists.
    pub fn add_road(&mut self, a: NodeIndex, b: NodeIndex) -> Option<EdgeIndex> {
        if a == b || !self.graph.contains_node(a) || !self.graph.contains_node(b) {
            return None;
        }
        if self.graph.find_edge(a, b).is_some() {
            return None;
        }
        Some(self.graph.add_edge(a, b, ()))
    }

    pub fn remove_road(&mut self, edge: EdgeIndex) -> bool {
        self.graph.remove_edge(edge).is_some()
    }

    pub fn has_road(&self, a: NodeIndex, b: NodeIndex) -> bool {
        self.graph.find_edge(a, b).is_some()
    }

    pub fn road_between(&self, a: NodeIndex, b: NodeIndex) -> Option<EdgeIndex> {
        self.graph.find_edge(a, b)
    }

    pub fn contains(&self, node: NodeIndex) -> bool {
        self.graph.contains_node(node)
    }

    pub fn citizen_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn road_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn citizens(&self) -> impl Iterator<Item = NodeIndex> + '_ {
        self.graph.node_indices()
    }

    /// Neighbors of `node`. The order is fixed for a given city.
    pub fn neighbors(&self, node: NodeIndex) -> impl Iterator<Item = NodeIndex> + '_ {
        self.graph.neighbors(node)
    }

    /// Every road as `(edge, a, b)`.
    pub fn roads(&self) -> impl Iterator<Item = (EdgeIndex, NodeIndex, NodeIndex)> + '_ {
        self.graph
            .edge_references()
            .map(|e| (e.id(), e.source(), e.target()))
    }

    pub fn degree(&self, node: NodeIndex) -> usize {
        self.graph.neighbors(node).count()
    }

    pub fn citizen(&self, node: NodeIndex) -> Option<&Citizen> {
        self.graph.node_weight(node)
    }

    pub fn is_zombie(&self, node: NodeIndex) -> bool {
        self.graph.node_weight(node).is_some_and(|c| c.zombie)
    }

    /// Sets the infection flag. Unknown nodes are ignored.
    pub fn set_zombie(&mut self, node: NodeIndex, zombie: bool) {
        if let Some(citizen) = self.graph.node_weight_mut(node) {
            citizen.zombie = zombie;
        }
    }

    pub fn infected_since(&self, node: NodeIndex) -> Option<u32> {
        self.graph.node_weight(node).and_then(|c| c.infected_since)
    }

    pub fn set_infected_since(&mut self, node: NodeIndex, t: Option<u32>) {
        if let Some(citizen) = self.graph.node_weight_mut(node) {
            citizen.infected_since = t;
        }
    }

    /// Number of neighbors of `node` that are zombies.
    pub fn infected_neighbors(&self, node: NodeIndex) -> usize {
        self.neighbors(node).filter(|&n| self.is_zombie(n)).count()
    }

    pub fn zombie_count(&self) -> usize {
        self.graph
            .node_indices()
            .filter(|&n| self.graph[n].zombie)
            .count()
    }

    /// Indices of all zombies, ordered.
    pub fn zombies(&self) -> BTreeSet<usize> {
        self.graph
            .node_indices()
            .filter(|&n| self.graph[n].zombie)
            .map(NodeIndex::index)
            .collect()
    }

    /// Snapshot of the current state, independent of `self`.
    pub fn snapshot(&self) -> Self {
        self.clone()
    }
}

impl<N, E> From<petgraph::Graph<N, E, Undirected>> for City {
    fn from(graph: petgraph::Graph<N, E, Undirected>) -> Self {
        let edges = graph
            .edge_references()
            .map(|e| (e.source().index(), e.target().index()))
            .collect::<Vec<_>>();
        Self::from_edges(graph.node_count(), edges)
    }
}

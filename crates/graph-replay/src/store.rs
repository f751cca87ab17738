use crate::color::Rgba;
use crate::layout_settings::LayoutSettings;
use crate::sim::SimContext;
use eframe::egui::{Pos2, Vec2};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Node,
    Edge,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKind::Node => f.write_str("node"),
            EntityKind::Edge => f.write_str("edge"),
        }
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("{kind} index {index} out of range ({len} present)")]
    OutOfRange {
        kind: EntityKind,
        index: usize,
        len: usize,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub pos: Pos2,
    pub velocity: Vec2,
    /// Algorithm state, drawn as the outline.
    pub highlight: Rgba,
    pub fill: Rgba,
    /// Scale factor of the graph when this node was created.
    pub size: f32,
    pub label: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    u: usize,
    v: usize,
    pub color: Rgba,
    pub optimal_length: f32,
    pub alive: bool,
}

impl Edge {
    /// Endpoints are fixed once the edge exists; only `delete_node`
    /// renumbers them.
    pub fn u(&self) -> usize {
        self.u
    }

    pub fn v(&self) -> usize {
        self.v
    }

    pub fn endpoints(&self) -> (usize, usize) {
        (self.u, self.v)
    }

    pub fn connects(&self, a: usize, b: usize) -> bool {
        (self.u == a && self.v == b) || (self.u == b && self.v == a)
    }

    pub fn touches(&self, node: usize) -> bool {
        self.u == node || self.v == node
    }
}

/// Result of a structural edge toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toggle {
    Added(usize),
    Removed(usize),
    /// Self-edges are not allowed.
    Ignored,
}

/// Nodes and edges of the graph being replayed.
///
/// Nodes and edges are addressed by their position in the arena. Edge ids
/// are positional too: appending gives the new edge the largest id and the
/// only removal that keeps every other id intact is popping the last one.
pub struct Store {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    scale: f32,
    settings: LayoutSettings,
}

impl Store {
    pub fn new(settings: LayoutSettings) -> Self {
        Self {
            nodes: Vec::new(),
            edges: Vec::new(),
            scale: 1.0,
            settings,
        }
    }

    pub fn settings(&self) -> &LayoutSettings {
        &self.settings
    }

    pub fn settings_mut(&mut self) -> &mut LayoutSettings {
        &mut self.settings
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    /// Change the rest length of every edge, present and future.
    pub fn set_edge_length(&mut self, length: f32) {
        self.settings.edge_length = length;
        let optimal = length * self.scale;
        for edge in &mut self.edges {
            edge.optimal_length = optimal;
        }
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    // ------------------------------------------------------------------
    // Bounds-checked access
    // ------------------------------------------------------------------

    pub fn node(&self, index: usize) -> Result<&Node, StoreError> {
        let len = self.nodes.len();
        self.nodes.get(index).ok_or(StoreError::OutOfRange {
            kind: EntityKind::Node,
            index,
            len,
        })
    }

    pub fn node_mut(
        &mut self,
        index: usize,
    ) -> Result<&mut Node, StoreError> {
        let len = self.nodes.len();
        self.nodes.get_mut(index).ok_or(StoreError::OutOfRange {
            kind: EntityKind::Node,
            index,
            len,
        })
    }

    pub fn edge(&self, index: usize) -> Result<&Edge, StoreError> {
        let len = self.edges.len();
        self.edges.get(index).ok_or(StoreError::OutOfRange {
            kind: EntityKind::Edge,
            index,
            len,
        })
    }

    pub fn edge_mut(
        &mut self,
        index: usize,
    ) -> Result<&mut Edge, StoreError> {
        let len = self.edges.len();
        self.edges.get_mut(index).ok_or(StoreError::OutOfRange {
            kind: EntityKind::Edge,
            index,
            len,
        })
    }

    /// Mutable views for the integrator, which walks all of them at once.
    pub(crate) fn parts_mut(&mut self) -> (&mut [Node], &[Edge]) {
        (&mut self.nodes, &self.edges)
    }

    // ------------------------------------------------------------------
    // Loading
    // ------------------------------------------------------------------

    /// Replace the whole graph. Endpoints are 0-based node indices; the
    /// store is left untouched if any of them is out of range.
    pub fn load(
        &mut self,
        ctx: &mut SimContext,
        node_count: usize,
        edges: &[(usize, usize)],
    ) -> Result<(), StoreError> {
        if let Some(bad) = edges
            .iter()
            .flat_map(|&(u, v)| [u, v])
            .find(|&endpoint| endpoint >= node_count)
        {
            return Err(StoreError::OutOfRange {
                kind: EntityKind::Node,
                index: bad,
                len: node_count,
            });
        }

        self.nodes.clear();
        self.edges.clear();
        self.scale = self.settings.scale_for(node_count);

        for i in 0..node_count {
            let node = self.new_node(ctx.random_position(), i as u32 + 1);
            self.nodes.push(node);
        }
        for &(u, v) in edges {
            let edge = self.new_edge(u, v);
            self.edges.push(edge);
        }

        log::info!(
            "loaded graph with {} nodes and {} edges (scale {:.3})",
            node_count,
            edges.len(),
            self.scale
        );
        Ok(())
    }

    fn new_node(&self, pos: Pos2, label: u32) -> Node {
        Node {
            pos,
            velocity: Vec2::ZERO,
            highlight: self.settings.node_highlight,
            fill: self.settings.node_fill,
            size: self.scale,
            label,
        }
    }

    fn new_edge(&self, u: usize, v: usize) -> Edge {
        Edge {
            u,
            v,
            color: self.settings.edge_color,
            optimal_length: self.settings.edge_length * self.scale,
            alive: true,
        }
    }

    // ------------------------------------------------------------------
    // Replay primitives
    // ------------------------------------------------------------------

    /// Append an edge with default color and length; returns its id.
    pub fn push_edge(
        &mut self,
        u: usize,
        v: usize,
    ) -> Result<usize, StoreError> {
        self.node(u)?;
        self.node(v)?;
        let edge = self.new_edge(u, v);
        self.edges.push(edge);
        Ok(self.edges.len() - 1)
    }

    pub fn pop_edge(&mut self) -> Result<Edge, StoreError> {
        self.edges.pop().ok_or(StoreError::OutOfRange {
            kind: EntityKind::Edge,
            index: 0,
            len: 0,
        })
    }

    // ------------------------------------------------------------------
    // Pointer interaction
    // ------------------------------------------------------------------

    /// Pin a node to `pos`, dropping whatever speed it had.
    pub fn set_position(
        &mut self,
        index: usize,
        pos: Pos2,
    ) -> Result<(), StoreError> {
        let node = self.node_mut(index)?;
        node.pos = pos;
        node.velocity = Vec2::ZERO;
        Ok(())
    }

    pub fn clear_velocity(
        &mut self,
        index: usize,
    ) -> Result<(), StoreError> {
        self.node_mut(index)?.velocity = Vec2::ZERO;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Structural editing (not recorded in the replay log)
    // ------------------------------------------------------------------

    /// Append a node at `pos` with the next free label; returns its index.
    pub fn add_node(&mut self, pos: Pos2) -> usize {
        let label =
            self.nodes.iter().map(|n| n.label).max().unwrap_or(0) + 1;
        let node = self.new_node(pos, label);
        self.nodes.push(node);
        self.nodes.len() - 1
    }

    /// Remove a node together with every edge touching it. Later nodes
    /// move down by one and edge endpoints follow them.
    pub fn delete_node(&mut self, index: usize) -> Result<Node, StoreError> {
        self.node(index)?;
        let removed = self.nodes.remove(index);
        self.edges.retain(|e| !e.touches(index));
        for edge in &mut self.edges {
            if edge.u > index {
                edge.u -= 1;
            }
            if edge.v > index {
                edge.v -= 1;
            }
        }
        Ok(removed)
    }

    pub fn find_edge(&self, a: usize, b: usize) -> Option<usize> {
        self.edges.iter().position(|e| e.connects(a, b))
    }

    /// Erase the edge between `a` and `b` if there is one, else add it.
    pub fn toggle_edge(
        &mut self,
        a: usize,
        b: usize,
    ) -> Result<Toggle, StoreError> {
        self.node(a)?;
        self.node(b)?;
        if a == b {
            return Ok(Toggle::Ignored);
        }
        match self.find_edge(a, b) {
            Some(id) => {
                self.edges.remove(id);
                Ok(Toggle::Removed(id))
            }
            None => Ok(Toggle::Added(self.push_edge(a, b)?)),
        }
    }

    /// Sorted, deduplicated labels; a label's rank plus one is its dense
    /// number.
    fn label_ranks(&self) -> Vec<u32> {
        let mut labels: Vec<u32> =
            self.nodes.iter().map(|n| n.label).collect();
        labels.sort_unstable();
        labels.dedup();
        labels
    }

    fn dense_label(ranks: &[u32], label: u32) -> u32 {
        // every label is present in `ranks`
        ranks.binary_search(&label).map_or(0, |i| i as u32 + 1)
    }

    /// Close the gaps left by deleted nodes, keeping the label order.
    pub fn renumber(&mut self) {
        let ranks = self.label_ranks();
        for node in &mut self.nodes {
            node.label = Self::dense_label(&ranks, node.label);
        }
    }

    /// Adjacency text: counts, then one `u v` line per edge using dense
    /// labels.
    pub fn serialize(&self) -> String {
        let ranks = self.label_ranks();
        let mut out =
            format!("{} {}\n", ranks.len(), self.edges.len());
        for edge in &self.edges {
            let u = Self::dense_label(&ranks, self.nodes[edge.u].label);
            let v = Self::dense_label(&ranks, self.nodes[edge.v].label);
            out.push_str(&format!("{} {}\n", u, v));
        }
        out
    }
}

// ------------------------------------------------------------------
// Tests
// ------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn path_store(n: usize) -> Store {
        let mut store = Store::new(LayoutSettings::default());
        let mut ctx = SimContext::seeded(Vec2::new(1000.0, 800.0), 1);
        let edges: Vec<(usize, usize)> =
            (1..n).map(|i| (i - 1, i)).collect();
        store.load(&mut ctx, n, &edges).unwrap();
        store
    }

    fn labels(store: &Store) -> Vec<u32> {
        store.nodes().iter().map(|n| n.label).collect()
    }

    #[test]
    fn test_load_sets_defaults() {
        let store = path_store(3);
        assert_eq!(store.node_count(), 3);
        assert_eq!(store.edge_count(), 2);
        assert_eq!(labels(&store), vec![1, 2, 3]);
        let edge = store.edge(1).unwrap();
        assert_eq!(edge.endpoints(), (1, 2));
        assert!(edge.alive);
        assert_eq!(edge.optimal_length, 200.0);
        assert_eq!(store.node(0).unwrap().highlight, Rgba::WHITE);
        for node in store.nodes() {
            assert!(node.pos.x >= 100.0 && node.pos.x <= 900.0);
            assert!(node.pos.y >= 80.0 && node.pos.y <= 720.0);
            assert_eq!(node.velocity, Vec2::ZERO);
        }
    }

    #[test]
    fn test_load_empty_graph_has_unit_scale() {
        let store = path_store(0);
        assert_eq!(store.scale(), 1.0);
        assert_eq!(store.serialize(), "0 0\n");
    }

    #[test]
    fn test_load_scales_large_graphs() {
        let store = path_store(40);
        assert!((store.scale() - 0.5).abs() < 1e-6);
        assert!((store.edge(0).unwrap().optimal_length - 100.0).abs() < 1e-4);
    }

    #[test]
    fn test_load_rejects_bad_endpoint_without_touching_store() {
        let mut store = path_store(2);
        let mut ctx = SimContext::seeded(Vec2::new(100.0, 100.0), 3);
        let err = store.load(&mut ctx, 2, &[(0, 2)]).unwrap_err();
        assert_eq!(
            err,
            StoreError::OutOfRange {
                kind: EntityKind::Node,
                index: 2,
                len: 2
            }
        );
        assert_eq!(store.edge_count(), 1);
    }

    #[test]
    fn test_accessors_fail_out_of_range() {
        let mut store = path_store(3);
        assert!(store.node(3).is_err());
        assert!(store.edge_mut(2).is_err());
        assert!(store.edge(1).is_ok());
    }

    #[test]
    fn test_add_node_uses_given_position_and_next_label() {
        let mut store = path_store(3);
        let idx = store.add_node(Pos2::new(12.0, 34.0));
        assert_eq!(idx, 3);
        let node = store.node(idx).unwrap();
        assert_eq!(node.pos, Pos2::new(12.0, 34.0));
        assert_eq!(node.label, 4);
    }

    #[test]
    fn test_delete_node_removes_incident_edges() {
        let mut store = path_store(4);
        store.push_edge(0, 3).unwrap();
        store.delete_node(1).unwrap();
        assert_eq!(store.node_count(), 3);
        // 0-1 and 1-2 gone, 2-3 becomes 1-2, 0-3 becomes 0-2
        let pairs: Vec<(usize, usize)> =
            store.edges().iter().map(Edge::endpoints).collect();
        assert_eq!(pairs, vec![(1, 2), (0, 2)]);
        assert_eq!(labels(&store), vec![1, 3, 4]);
    }

    #[test]
    fn test_endpoints_follow_deletes_into_range() {
        let mut store = path_store(5);
        store.push_edge(0, 4).unwrap();
        store.toggle_edge(1, 3).unwrap();
        store.delete_node(2).unwrap();
        store.delete_node(0).unwrap();
        store.edge_mut(0).unwrap().color = Rgba::from_packed(255);
        for edge in store.edges() {
            assert!(edge.u() < store.node_count());
            assert!(edge.v() < store.node_count());
        }
        let ctx = SimContext::seeded(Vec2::new(1000.0, 800.0), 2);
        crate::layout_force::step(&mut store, &ctx, 0.016);
    }

    #[test]
    fn test_delete_node_out_of_range() {
        let mut store = path_store(2);
        assert!(matches!(
            store.delete_node(5),
            Err(StoreError::OutOfRange {
                kind: EntityKind::Node,
                index: 5,
                len: 2
            })
        ));
        assert_eq!(store.node_count(), 2);
    }

    #[test]
    fn test_toggle_edge_adds_then_removes() {
        let mut store = path_store(3);
        assert_eq!(store.toggle_edge(0, 2), Ok(Toggle::Added(2)));
        assert_eq!(store.edge_count(), 3);
        assert_eq!(store.toggle_edge(2, 0), Ok(Toggle::Removed(2)));
        assert_eq!(store.edge_count(), 2);
        assert_eq!(store.toggle_edge(1, 1), Ok(Toggle::Ignored));
        assert_eq!(store.edge_count(), 2);
        assert!(store.toggle_edge(0, 9).is_err());
    }

    #[test]
    fn test_renumber_is_dense_and_idempotent() {
        let mut store = path_store(5);
        store.delete_node(1).unwrap();
        store.delete_node(2).unwrap();
        assert_eq!(labels(&store), vec![1, 3, 5]);
        store.renumber();
        assert_eq!(labels(&store), vec![1, 2, 3]);
        store.renumber();
        assert_eq!(labels(&store), vec![1, 2, 3]);
    }

    #[test]
    fn test_serialize_uses_dense_labels() {
        let mut store = path_store(4);
        store.delete_node(0).unwrap();
        // remaining labels 2,3,4 with edges 2-3 and 3-4
        assert_eq!(store.serialize(), "3 2\n1 2\n2 3\n");
    }

    #[test]
    fn test_set_edge_length_applies_scale() {
        let mut store = path_store(40);
        store.set_edge_length(300.0);
        assert_eq!(store.settings().edge_length, 300.0);
        assert!((store.edge(0).unwrap().optimal_length - 150.0).abs() < 1e-4);
        let id = store.push_edge(0, 5).unwrap();
        assert!((store.edge(id).unwrap().optimal_length - 150.0).abs() < 1e-4);
    }

    #[test]
    fn test_set_position_pins_node() {
        let mut store = path_store(2);
        store.node_mut(0).unwrap().velocity = Vec2::new(5.0, 5.0);
        store.set_position(0, Pos2::new(1.0, 2.0)).unwrap();
        let node = store.node(0).unwrap();
        assert_eq!(node.pos, Pos2::new(1.0, 2.0));
        assert_eq!(node.velocity, Vec2::ZERO);
    }
}

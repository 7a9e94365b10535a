//! Cycle graphs: the edges of one `cycleId`, arranged around a circle

use std::collections::HashMap;
use std::f64::consts::PI;

use petgraph::algo::{connected_components, toposort};
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;

use crate::inference::Position;
use crate::language::{AtomHandle, CyclicLayout, CyclicOption};

/// Shape of a cycle graph
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleShape {
    /// One component, every node with one incoming and one outgoing edge
    Ring,
    /// One component forming a simple path
    Line,
    /// Anything else; cannot be placed on a circle
    Malformed,
}

/// Directed graph of the cyclic layouts sharing one id
#[derive(Debug, Clone, Default)]
pub struct CycleGraph {
    graph: DiGraph<String, ()>,
    nodes: HashMap<String, NodeIndex>,
}

impl CycleGraph {
    pub fn new() -> Self {
        Self::default()
    }

    fn node(&mut self, atom: &str) -> NodeIndex {
        if let Some(&idx) = self.nodes.get(atom) {
            return idx;
        }
        let idx = self.graph.add_node(atom.to_string());
        self.nodes.insert(atom.to_string(), idx);
        idx
    }

    /// Add the edge `from -> to`; repeated edges are stored once
    pub fn add_edge(&mut self, from: &str, to: &str) {
        let a = self.node(from);
        let b = self.node(to);
        self.graph.update_edge(a, b, ());
    }

    /// `Counterclockwise(a, b)` adds `a -> b`; `Clockwise(a, b)` adds `b -> a`
    pub fn add_layout(&mut self, layout: &CyclicLayout<AtomHandle>) {
        match layout.option {
            CyclicOption::Counterclockwise => self.add_edge(&layout.op0.name, &layout.op1.name),
            CyclicOption::Clockwise => self.add_edge(&layout.op1.name, &layout.op0.name),
        }
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    fn degrees(&self, idx: NodeIndex) -> (usize, usize) {
        (
            self.graph.edges_directed(idx, Direction::Incoming).count(),
            self.graph.edges_directed(idx, Direction::Outgoing).count(),
        )
    }

    pub fn classify(&self) -> CycleShape {
        if self.graph.node_count() == 0 || connected_components(&self.graph) != 1 {
            return CycleShape::Malformed;
        }

        let mut sources = 0;
        let mut sinks = 0;
        let mut all_through = true;
        for idx in self.graph.node_indices() {
            match self.degrees(idx) {
                (1, 1) => {}
                (0, 1) => {
                    sources += 1;
                    all_through = false;
                }
                (1, 0) => {
                    sinks += 1;
                    all_through = false;
                }
                _ => return CycleShape::Malformed,
            }
        }

        if all_through {
            CycleShape::Ring
        } else if sources == 1 && sinks == 1 {
            CycleShape::Line
        } else {
            CycleShape::Malformed
        }
    }

    /// Atoms in circle order, or `None` for a malformed graph.
    ///
    /// A ring is cut at the first edge leaving its first node.
    pub fn order(&self) -> Option<Vec<String>> {
        let mut graph = self.graph.clone();
        match self.classify() {
            CycleShape::Malformed => return None,
            CycleShape::Line => {}
            CycleShape::Ring => {
                let first = graph.node_indices().next()?;
                let edge = graph.edges_directed(first, Direction::Outgoing).next()?.id();
                graph.remove_edge(edge);
            }
        }

        let sorted = toposort(&graph, None).ok()?;
        Some(sorted.into_iter().map(|idx| graph[idx].clone()).collect())
    }
}

/// Node `i` of `n` sits at angle `2πi/n`, measured from the +y axis
pub fn circle_positions(count: usize, center: Position, radius: f64) -> Vec<Position> {
    (0..count)
        .map(|i| {
            let theta = 2.0 * PI * (i as f64) / (count as f64);
            Position::new(center.x + radius * theta.sin(), center.y + radius * theta.cos())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn graph(edges: &[(&str, &str)]) -> CycleGraph {
        let mut g = CycleGraph::new();
        for (a, b) in edges {
            g.add_edge(a, b);
        }
        g
    }

    #[test]
    fn test_ring() {
        let g = graph(&[("a", "b"), ("b", "c"), ("c", "a")]);
        assert_eq!(g.classify(), CycleShape::Ring);
        assert_eq!(g.order().unwrap(), vec!["b", "c", "a"]);
    }

    #[test]
    fn test_line() {
        let g = graph(&[("b", "c"), ("a", "b")]);
        assert_eq!(g.classify(), CycleShape::Line);
        assert_eq!(g.order().unwrap(), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_self_loop_is_ring() {
        let g = graph(&[("a", "a")]);
        assert_eq!(g.classify(), CycleShape::Ring);
        assert_eq!(g.order().unwrap(), vec!["a"]);
    }

    #[test]
    fn test_malformed() {
        // two disjoint rings
        let g = graph(&[("a", "b"), ("b", "a"), ("c", "d"), ("d", "c")]);
        assert_eq!(g.classify(), CycleShape::Malformed);
        assert!(g.order().is_none());

        // branching
        let g = graph(&[("a", "b"), ("a", "c")]);
        assert_eq!(g.classify(), CycleShape::Malformed);

        assert_eq!(CycleGraph::new().classify(), CycleShape::Malformed);
    }

    #[test]
    fn test_duplicate_edges_collapse() {
        let g = graph(&[("a", "b"), ("a", "b"), ("b", "a")]);
        assert_eq!(g.edge_count(), 2);
        assert_eq!(g.classify(), CycleShape::Ring);
    }

    #[test]
    fn test_layout_direction() {
        let mut g = CycleGraph::new();
        g.add_layout(&CyclicLayout {
            option: CyclicOption::Clockwise,
            op0: AtomHandle::new("x"),
            op1: AtomHandle::new("y"),
            cycle_id: "cycle-0".to_string(),
        });
        assert_eq!(g.order().unwrap(), vec!["y", "x"]);
    }

    #[test]
    fn test_circle_positions() {
        let ps = circle_positions(4, Position::new(10.0, 0.0), 100.0);
        assert!((ps[0].x - 10.0).abs() < 1e-9 && (ps[0].y - 100.0).abs() < 1e-9);
        assert!((ps[1].x - 110.0).abs() < 1e-9 && ps[1].y.abs() < 1e-9);
        assert!((ps[2].x - 10.0).abs() < 1e-9 && (ps[2].y + 100.0).abs() < 1e-9);
        assert!((ps[3].x + 90.0).abs() < 1e-9 && ps[3].y.abs() < 1e-9);
    }
}

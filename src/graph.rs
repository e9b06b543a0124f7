use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::diagram::{Diagram, Link, NodeKind, Point};
use crate::*;

/// A routable location: either a room point copied from the diagram or a
/// vertex synthesized for a link waypoint. Positions are canonical and never
/// change after construction; cosmetic render offsets work on copies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vertex {
    pub id: String,
    pub x: f64,
    pub y: f64,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub label: String,
}

impl Vertex {
    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// An undirected weighted edge between two vertex ids. Parallel edges
/// between the same pair are kept; routing considers all of them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub source: String,
    pub target: String,
    pub weight: f64,
}

/// The walkable graph extracted from a diagram snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Graph {
    pub vertices: Vec<Vertex>,
    pub edges: Vec<Edge>,
}

impl Graph {
    pub fn from_json(source: &str) -> Result<Self> {
        serde_json::from_str(source).context("failed to parse graph document")
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).context("failed to serialize graph document")
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("failed to serialize graph document")
    }

    pub fn vertex(&self, id: &str) -> Option<&Vertex> {
        self.vertices.iter().find(|vertex| vertex.id == id)
    }

    /// All vertices carrying the given label. Labels are operator-assigned
    /// and not guaranteed unique, so callers get the full match set and
    /// decide what ambiguity means for them.
    pub fn vertices_labeled(&self, label: &str) -> Vec<&Vertex> {
        self.vertices
            .iter()
            .filter(|vertex| vertex.label == label)
            .collect()
    }

    fn vertex_at(&self, point: Point) -> Option<&Vertex> {
        self.vertices
            .iter()
            .find(|vertex| vertex.x == point.x && vertex.y == point.y)
    }
}

/// Maps (link id, waypoint index) to the id of the vertex materialized for
/// that waypoint, so anchored endpoints resolve without comparing floats.
type WaypointRegistry = HashMap<(String, usize), String>;

/// Extract the walkable graph from a diagram snapshot.
///
/// Room-point nodes seed the vertex set. Links whose endpoints both bind to
/// nodes are chained through their waypoints first; links whose target
/// anchors onto another link's waypoint are resolved afterwards, against the
/// vertices the first pass materialized. Links with dangling references are
/// dropped rather than reported: half-drawn diagrams are normal while the
/// operator is still editing.
pub fn build_graph(diagram: &Diagram) -> Graph {
    let mut graph = Graph::default();
    let mut registry = WaypointRegistry::new();

    for node in &diagram.nodes {
        if node.kind == NodeKind::RoomPoint {
            graph.vertices.push(Vertex {
                id: node.id.clone(),
                x: node.x,
                y: node.y,
                label: node.label.clone(),
            });
        }
    }

    for link in &diagram.links {
        if link.source.anchor.is_some() || link.target.anchor.is_some() {
            continue;
        }
        let Some(source) = graph.vertex(&link.source.id).cloned() else {
            continue;
        };
        let Some(target) = graph.vertex(&link.target.id).cloned() else {
            continue;
        };
        connect(&mut graph, &mut registry, link, &source, &target);
    }

    // Anchored links come last: they attach to waypoint vertices that only
    // exist once the direct pass has run.
    for link in &diagram.links {
        let Some(anchor) = link.target.anchor else {
            continue;
        };
        let Some(source) = graph.vertex(&link.source.id).cloned() else {
            continue;
        };
        let Some(target) = resolve_anchor(&graph, &registry, diagram, &link.target.id, anchor.index)
        else {
            continue;
        };
        connect(&mut graph, &mut registry, link, &source, &target);
    }

    graph
}

/// Find the vertex an anchored endpoint lands on: the registry entry for the
/// referenced waypoint, an exact-position match as a fallback, or the
/// nominal id reread as a plain node reference when the waypoint is gone.
fn resolve_anchor(
    graph: &Graph,
    registry: &WaypointRegistry,
    diagram: &Diagram,
    link_id: &str,
    index: usize,
) -> Option<Vertex> {
    if let Some(vertex_id) = registry.get(&(link_id.to_string(), index)) {
        if let Some(vertex) = graph.vertex(vertex_id) {
            return Some(vertex.clone());
        }
    }
    if let Some(waypoint) = diagram
        .link(link_id)
        .and_then(|link| link.vertices.get(index))
    {
        if let Some(vertex) = graph.vertex_at(*waypoint) {
            return Some(vertex.clone());
        }
    }
    graph.vertex(link_id).cloned()
}

/// Materialize a link's waypoints as fresh vertices and emit one edge per
/// consecutive pair of the source-waypoints-target chain, weighted by
/// Euclidean distance.
fn connect(
    graph: &mut Graph,
    registry: &mut WaypointRegistry,
    link: &Link,
    source: &Vertex,
    target: &Vertex,
) {
    let mut chain: Vec<(String, Point)> = Vec::with_capacity(link.vertices.len() + 2);
    chain.push((source.id.clone(), source.position()));

    for (index, waypoint) in link.vertices.iter().enumerate() {
        let id = Uuid::new_v4().to_string();
        registry.insert((link.id.clone(), index), id.clone());
        graph.vertices.push(Vertex {
            id: id.clone(),
            x: waypoint.x,
            y: waypoint.y,
            label: String::new(),
        });
        chain.push((id, *waypoint));
    }

    chain.push((target.id.clone(), target.position()));

    for pair in chain.windows(2) {
        graph.edges.push(Edge {
            source: pair[0].0.clone(),
            target: pair[1].0.clone(),
            weight: pair[0].1.distance_to(pair[1].1),
        });
    }
}

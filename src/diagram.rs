use serde::{Deserialize, Serialize};

use crate::*;

/// A 2D position on the floor sketch, in canvas units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_to(self, other: Point) -> f64 {
        ((other.x - self.x).powi(2) + (other.y - self.y).powi(2)).sqrt()
    }
}

/// What a placed node represents. Only room points take part in routing;
/// markers are label decorations and pass through (de)serialization untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NodeKind {
    RoomPoint,
    Marker,
}

/// A node placed on the diagram canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagramNode {
    pub id: String,
    pub kind: NodeKind,
    pub x: f64,
    pub y: f64,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub label: String,
}

impl DiagramNode {
    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// Where a link endpoint attaches. `id` names a diagram node, unless
/// `anchor` is present, in which case `id` names another link and `anchor`
/// selects one of that link's waypoints by index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Endpoint {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anchor: Option<WaypointAnchor>,
}

impl Endpoint {
    pub fn node(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            anchor: None,
        }
    }

    pub fn anchored(link_id: impl Into<String>, index: usize) -> Self {
        Self {
            id: link_id.into(),
            anchor: Some(WaypointAnchor { index }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaypointAnchor {
    pub index: usize,
}

/// A connector drawn between two endpoints, with optional intermediate
/// waypoints describing the walkable polyline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Link {
    pub id: String,
    pub source: Endpoint,
    pub target: Endpoint,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub vertices: Vec<Point>,
}

/// A full diagram snapshot as exported by the map editor. Referential
/// integrity is not guaranteed: links may point at nodes or waypoints that
/// no longer exist, and the graph builder tolerates that.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Diagram {
    #[serde(default)]
    pub nodes: Vec<DiagramNode>,
    #[serde(default)]
    pub links: Vec<Link>,
}

impl Diagram {
    pub fn from_json(source: &str) -> Result<Self> {
        serde_json::from_str(source).context("failed to parse diagram snapshot")
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).context("failed to serialize diagram snapshot")
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("failed to serialize diagram snapshot")
    }

    pub fn node(&self, id: &str) -> Option<&DiagramNode> {
        self.nodes.iter().find(|node| node.id == id)
    }

    pub fn link(&self, id: &str) -> Option<&Link> {
        self.links.iter().find(|link| link.id == id)
    }
}

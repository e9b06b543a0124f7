pub mod diagram;
pub mod graph;
pub mod render;
pub mod route;
pub mod utils;

pub use anyhow::{Context, Result, anyhow, bail};

pub use diagram::{Diagram, DiagramNode, Endpoint, Link, NodeKind, Point, WaypointAnchor};
pub use graph::{Edge, Graph, Vertex, build_graph};
pub use render::render_route_svg;
pub use route::{RouteError, path_length, shortest_path, shortest_path_between_labels};
pub use utils::escape_xml;

use std::fmt::Write as FmtWrite;

use crate::diagram::{Diagram, Endpoint, NodeKind, Point};
use crate::graph::{Graph, Vertex};
use crate::*;

const MARGIN: f64 = 40.0;
const ROOM_POINT_RADIUS: f64 = 6.0;
const ROUTE_STROKE_WIDTH: f64 = 5.0;
// Fixed visual drop applied to the first and last route points so the line
// starts and ends below the room marker instead of on top of it.
const ENDPOINT_DROP: f64 = 40.0;

/// Render the floor sketch with the computed route drawn over it.
///
/// Links are drawn as faint grey polylines, room points as labelled circles,
/// and the route as straight red segments. The endpoint drop is applied to
/// local copies of the first and last route points; the graph's canonical
/// positions are left alone.
pub fn render_route_svg(diagram: &Diagram, graph: &Graph, route: &[Vertex]) -> Result<String> {
    let (origin, width, height) = canvas_bounds(diagram, route);
    let (min_x, min_y) = (origin.x, origin.y);

    let mut svg = String::new();
    write!(
        svg,
        r#"<?xml version="1.0" encoding="UTF-8"?>
<svg xmlns="http://www.w3.org/2000/svg" width="{width:.0}" height="{height:.0}" viewBox="{min_x:.0} {min_y:.0} {width:.0} {height:.0}" font-family="Inter, system-ui, sans-serif">
  <rect x="{min_x:.0}" y="{min_y:.0}" width="100%" height="100%" fill="white" />
"#
    )?;

    for link in &diagram.links {
        let Some(points) = link_polyline(diagram, graph, link.id.as_str()) else {
            continue;
        };
        let rendered: Vec<String> = points
            .iter()
            .map(|point| format!("{:.1},{:.1}", point.x, point.y))
            .collect();
        writeln!(
            svg,
            "  <polyline points=\"{}\" fill=\"none\" stroke=\"#cbd5e0\" stroke-width=\"2\" />",
            rendered.join(" ")
        )?;
    }

    for node in &diagram.nodes {
        if node.kind != NodeKind::RoomPoint {
            continue;
        }
        writeln!(
            svg,
            "  <circle cx=\"{:.1}\" cy=\"{:.1}\" r=\"{ROOM_POINT_RADIUS}\" fill=\"#2d3748\" />",
            node.x, node.y
        )?;
        if !node.label.is_empty() {
            writeln!(
                svg,
                "  <text x=\"{:.1}\" y=\"{:.1}\" fill=\"#2d3748\" font-size=\"14\" text-anchor=\"middle\">{}</text>",
                node.x,
                node.y - 12.0,
                escape_xml(&node.label)
            )?;
        }
    }

    let mut route_points: Vec<Point> = route.iter().map(|vertex| vertex.position()).collect();
    if let Some(first) = route_points.first_mut() {
        first.y += ENDPOINT_DROP;
    }
    if route_points.len() > 1 {
        if let Some(last) = route_points.last_mut() {
            last.y += ENDPOINT_DROP;
        }
    }
    for pair in route_points.windows(2) {
        writeln!(
            svg,
            "  <line class=\"route\" x1=\"{:.1}\" y1=\"{:.1}\" x2=\"{:.1}\" y2=\"{:.1}\" stroke=\"red\" stroke-width=\"{ROUTE_STROKE_WIDTH}\" stroke-linecap=\"round\" stroke-linejoin=\"round\" />",
            pair[0].x, pair[0].y, pair[1].x, pair[1].y
        )?;
    }

    svg.push_str("</svg>\n");
    Ok(svg)
}

/// The drawable polyline of a link: resolved source point, waypoints,
/// resolved target point. `None` when an endpoint cannot be placed.
fn link_polyline(diagram: &Diagram, graph: &Graph, link_id: &str) -> Option<Vec<Point>> {
    let link = diagram.link(link_id)?;
    let source = endpoint_position(diagram, graph, &link.source)?;
    let target = endpoint_position(diagram, graph, &link.target)?;

    let mut points = Vec::with_capacity(link.vertices.len() + 2);
    points.push(source);
    points.extend(link.vertices.iter().copied());
    points.push(target);
    Some(points)
}

fn endpoint_position(diagram: &Diagram, graph: &Graph, endpoint: &Endpoint) -> Option<Point> {
    match endpoint.anchor {
        Some(anchor) => diagram
            .link(&endpoint.id)
            .and_then(|link| link.vertices.get(anchor.index))
            .copied()
            .or_else(|| graph.vertex(&endpoint.id).map(Vertex::position)),
        None => diagram
            .node(&endpoint.id)
            .map(DiagramNode::position)
            .or_else(|| graph.vertex(&endpoint.id).map(Vertex::position)),
    }
}

/// ViewBox origin and size covering every drawn point plus a margin, so
/// sketches using negative canvas coordinates are not clipped.
fn canvas_bounds(diagram: &Diagram, route: &[Vertex]) -> (Point, f64, f64) {
    let mut min_x = f64::INFINITY;
    let mut min_y = f64::INFINITY;
    let mut max_x = f64::NEG_INFINITY;
    let mut max_y = f64::NEG_INFINITY;
    let mut cover = |x: f64, y: f64| {
        min_x = min_x.min(x);
        min_y = min_y.min(y);
        max_x = max_x.max(x);
        max_y = max_y.max(y);
    };

    for node in &diagram.nodes {
        cover(node.x, node.y);
    }
    for link in &diagram.links {
        for waypoint in &link.vertices {
            cover(waypoint.x, waypoint.y);
        }
    }
    for (index, vertex) in route.iter().enumerate() {
        cover(vertex.x, vertex.y);
        // Only the first and last route points are drawn with the drop.
        if index == 0 || index + 1 == route.len() {
            cover(vertex.x, vertex.y + ENDPOINT_DROP);
        }
    }

    if min_x > max_x {
        (min_x, min_y, max_x, max_y) = (0.0, 0.0, 0.0, 0.0);
    }

    let origin = Point::new(min_x - MARGIN, min_y - MARGIN);
    let width = (max_x - min_x) + MARGIN * 2.0;
    let height = (max_y - min_y) + MARGIN * 2.0;
    (origin, width, height)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagram::{DiagramNode, Link};
    use crate::graph::build_graph;

    fn sample_diagram() -> Diagram {
        Diagram {
            nodes: vec![
                DiagramNode {
                    id: "a".into(),
                    kind: NodeKind::RoomPoint,
                    x: 40.0,
                    y: 60.0,
                    label: "Lobby".into(),
                },
                DiagramNode {
                    id: "b".into(),
                    kind: NodeKind::RoomPoint,
                    x: 240.0,
                    y: 60.0,
                    label: "Hall".into(),
                },
            ],
            links: vec![Link {
                id: "l".into(),
                source: Endpoint::node("a"),
                target: Endpoint::node("b"),
                vertices: vec![Point::new(140.0, 90.0)],
            }],
        }
    }

    #[test]
    fn route_segments_and_labels_are_drawn() -> Result<()> {
        let diagram = sample_diagram();
        let graph = build_graph(&diagram);
        let route = shortest_path(&graph, "a", "b").expect("route should exist");

        let svg = render_route_svg(&diagram, &graph, &route)?;
        assert!(svg.contains("<svg"));
        assert!(svg.contains("Lobby"));
        assert!(svg.contains("class=\"route\""));
        assert_eq!(svg.matches("<line class=\"route\"").count(), 2);
        Ok(())
    }

    #[test]
    fn endpoint_drop_does_not_touch_the_graph() -> Result<()> {
        let diagram = sample_diagram();
        let graph = build_graph(&diagram);
        let route = shortest_path(&graph, "a", "b").expect("route should exist");

        let before = graph.clone();
        let svg = render_route_svg(&diagram, &graph, &route)?;
        assert_eq!(graph, before);

        // First segment starts at the dropped copy of the lobby point.
        assert!(svg.contains("y1=\"100.0\""));
        Ok(())
    }

    #[test]
    fn negative_coordinates_stay_inside_the_viewbox() -> Result<()> {
        let mut diagram = sample_diagram();
        diagram.nodes[0].x = -100.0;
        diagram.nodes[0].y = -50.0;
        let graph = build_graph(&diagram);
        let route = shortest_path(&graph, "a", "b").expect("route should exist");

        let svg = render_route_svg(&diagram, &graph, &route)?;

        // Extent spans -100..240 in x and -50..100 in y, padded by the margin.
        assert!(svg.contains("viewBox=\"-140 -90 420 230\""));
        assert!(svg.contains("<rect x=\"-140\" y=\"-90\""));
        assert!(svg.contains("cx=\"-100.0\" cy=\"-50.0\""));
        Ok(())
    }

    #[test]
    fn empty_route_still_renders_the_sketch() -> Result<()> {
        let diagram = sample_diagram();
        let graph = build_graph(&diagram);

        let svg = render_route_svg(&diagram, &graph, &[])?;
        assert!(svg.contains("<polyline"));
        assert!(!svg.contains("class=\"route\""));
        Ok(())
    }
}

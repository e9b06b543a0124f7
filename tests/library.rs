use anyhow::Result;
use roomway::{Diagram, Graph, build_graph, path_length, render_route_svg,
    shortest_path, shortest_path_between_labels};

fn floor() -> Result<Diagram> {
    Ok(Diagram::from_json(include_str!("input/floor.json"))?)
}

#[test]
fn snapshot_builds_a_clean_graph() -> Result<()> {
    let graph = build_graph(&floor()?);

    // Four room points plus the corridor waypoint; the marker stays out.
    assert_eq!(graph.vertices.len(), 5);
    assert_eq!(graph.edges.len(), 4);

    for edge in &graph.edges {
        assert!(edge.weight >= 0.0);
        assert!(graph.vertex(&edge.source).is_some(), "dangling edge source");
        assert!(graph.vertex(&edge.target).is_some(), "dangling edge target");
    }

    Ok(())
}

#[test]
fn route_follows_the_anchored_branch() -> Result<()> {
    let diagram = floor()?;
    let graph = build_graph(&diagram);

    let route = shortest_path_between_labels(&graph, "Lobby", "Cafe")?
        .expect("lobby and cafe are connected");

    let labels: Vec<&str> = route.iter().map(|vertex| vertex.label.as_str()).collect();
    assert_eq!(labels, ["Lobby", "Hall", "", "Cafe"]);
    assert_eq!(path_length(&route), 440.0);

    // The unlabeled stop is the corridor waypoint the branch anchors onto.
    assert_eq!((route[2].x, route[2].y), (360.0, 200.0));
    Ok(())
}

#[test]
fn routes_are_reproducible_across_rebuilds() -> Result<()> {
    let diagram = floor()?;

    let first = build_graph(&diagram);
    let first_route = shortest_path_between_labels(&first, "Lobby", "Storage")?
        .expect("route should exist");

    for _ in 0..5 {
        let again = build_graph(&diagram);
        let route = shortest_path_between_labels(&again, "Lobby", "Storage")?
            .expect("route should exist");
        let positions: Vec<(f64, f64)> = route.iter().map(|v| (v.x, v.y)).collect();
        let expected: Vec<(f64, f64)> = first_route.iter().map(|v| (v.x, v.y)).collect();
        assert_eq!(positions, expected);
    }

    Ok(())
}

#[test]
fn graph_document_round_trip_preserves_routing() -> Result<()> {
    let graph = build_graph(&floor()?);
    let reloaded = Graph::from_json(&graph.to_json()?)?;

    assert_eq!(reloaded, graph);

    let start = &graph.vertices_labeled("Lobby")[0].id;
    let end = &graph.vertices_labeled("Cafe")[0].id;
    let original = shortest_path(&graph, start, end).expect("route should exist");
    let replayed = shortest_path(&reloaded, start, end).expect("route should exist");
    assert_eq!(original, replayed);

    Ok(())
}

#[test]
fn rendering_leaves_the_graph_untouched() -> Result<()> {
    let diagram = floor()?;
    let graph = build_graph(&diagram);
    let route = shortest_path_between_labels(&graph, "Lobby", "Cafe")?
        .expect("route should exist");

    let before = graph.clone();
    let svg = render_route_svg(&diagram, &graph, &route)?;

    assert_eq!(graph, before);
    assert!(svg.contains("<svg"));
    assert!(svg.contains("stroke=\"red\""));
    assert!(svg.contains("Lobby"));
    Ok(())
}

#[test]
fn unknown_label_yields_no_route() -> Result<()> {
    let graph = build_graph(&floor()?);
    assert!(shortest_path_between_labels(&graph, "Lobby", "Roof")?.is_none());
    Ok(())
}

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};

use thiserror::Error;

use crate::graph::{Graph, Vertex};

/// Routing failures the caller has to act on. Everything else (unknown
/// label, unreachable target, empty graph) degrades to "no route" because
/// the operator can fix those by editing the map, not the request.
#[derive(Debug, Error)]
pub enum RouteError {
    #[error(
        "label '{label}' matches {n} vertices ({ids}); labels must identify a single room point",
        n = .matches.len(),
        ids = .matches.join(", ")
    )]
    AmbiguousLabel { label: String, matches: Vec<String> },
}

/// Min-queue entry. BinaryHeap is a max-heap, so the ordering is reversed;
/// equal distances are broken by vertex id to keep routes reproducible.
struct HeapEntry<'a> {
    distance: f64,
    vertex: usize,
    id: &'a str,
}

impl PartialEq for HeapEntry<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for HeapEntry<'_> {}

impl Ord for HeapEntry<'_> {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .distance
            .partial_cmp(&self.distance)
            .unwrap_or(Ordering::Equal)
            .then_with(|| other.id.cmp(self.id))
    }
}

impl PartialOrd for HeapEntry<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Shortest path between two vertex ids by cumulative Euclidean edge weight.
///
/// Dijkstra over the undirected graph, stopping as soon as the target is
/// finalized. Returns the start-to-end vertex sequence, a single-element
/// sequence when start and end coincide, and `None` when either id is
/// unknown or no connecting edge sequence exists. A target that was never
/// finalized yields `None` outright; the predecessor chain is not consulted.
pub fn shortest_path(graph: &Graph, start_id: &str, end_id: &str) -> Option<Vec<Vertex>> {
    if graph.vertices.is_empty() {
        return None;
    }

    let index: HashMap<&str, usize> = graph
        .vertices
        .iter()
        .enumerate()
        .map(|(i, vertex)| (vertex.id.as_str(), i))
        .collect();

    let start = *index.get(start_id)?;
    let end = *index.get(end_id)?;

    if start == end {
        return Some(vec![graph.vertices[start].clone()]);
    }

    // Adjacency over edge endpoints that actually resolve; a hand-edited
    // graph document may carry dangling edges and those are just skipped.
    let mut adjacency: Vec<Vec<(usize, f64)>> = vec![Vec::new(); graph.vertices.len()];
    for edge in &graph.edges {
        let (Some(&a), Some(&b)) = (
            index.get(edge.source.as_str()),
            index.get(edge.target.as_str()),
        ) else {
            continue;
        };
        adjacency[a].push((b, edge.weight));
        adjacency[b].push((a, edge.weight));
    }

    let mut distance = vec![f64::INFINITY; graph.vertices.len()];
    let mut predecessor: Vec<Option<usize>> = vec![None; graph.vertices.len()];
    let mut finalized = vec![false; graph.vertices.len()];
    let mut queue = BinaryHeap::new();

    distance[start] = 0.0;
    queue.push(HeapEntry {
        distance: 0.0,
        vertex: start,
        id: &graph.vertices[start].id,
    });

    while let Some(entry) = queue.pop() {
        let current = entry.vertex;
        if finalized[current] {
            continue;
        }
        finalized[current] = true;
        if current == end {
            break;
        }

        for &(neighbor, weight) in &adjacency[current] {
            if finalized[neighbor] {
                continue;
            }
            let candidate = distance[current] + weight;
            if candidate < distance[neighbor] {
                distance[neighbor] = candidate;
                predecessor[neighbor] = Some(current);
                queue.push(HeapEntry {
                    distance: candidate,
                    vertex: neighbor,
                    id: &graph.vertices[neighbor].id,
                });
            }
        }
    }

    if !finalized[end] {
        return None;
    }

    let mut order = vec![end];
    let mut cursor = end;
    while cursor != start {
        cursor = predecessor[cursor]?;
        order.push(cursor);
    }
    order.reverse();

    Some(
        order
            .into_iter()
            .map(|i| graph.vertices[i].clone())
            .collect(),
    )
}

/// Label-based entry point. Labels that match nothing yield `Ok(None)`, the
/// same as an unreachable target; a label shared by several vertices is an
/// error carrying the candidate ids so the caller can disambiguate.
pub fn shortest_path_between_labels(
    graph: &Graph,
    start_label: &str,
    end_label: &str,
) -> Result<Option<Vec<Vertex>>, RouteError> {
    let Some(start) = resolve_label(graph, start_label)? else {
        return Ok(None);
    };
    let Some(end) = resolve_label(graph, end_label)? else {
        return Ok(None);
    };
    Ok(shortest_path(graph, &start.id, &end.id))
}

fn resolve_label<'a>(graph: &'a Graph, label: &str) -> Result<Option<&'a Vertex>, RouteError> {
    let matches = graph.vertices_labeled(label);
    match matches.as_slice() {
        [] => Ok(None),
        [vertex] => Ok(Some(vertex)),
        _ => Err(RouteError::AmbiguousLabel {
            label: label.to_string(),
            matches: matches.iter().map(|vertex| vertex.id.clone()).collect(),
        }),
    }
}

/// Total Euclidean length of a vertex sequence.
pub fn path_length(path: &[Vertex]) -> f64 {
    path.windows(2)
        .map(|pair| pair[0].position().distance_to(pair[1].position()))
        .sum()
}

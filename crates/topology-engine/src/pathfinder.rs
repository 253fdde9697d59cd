use crate::graph::{NodeId, TopologyGraph};
use serde::Serialize;
use std::collections::{BTreeSet, HashMap};

/// Outcome of a shortest-path query. An unreachable destination is a normal
/// result value, not an error; callers render it as "no path".
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum PathResult {
    Found {
        /// Node ids along the path, origin first, destination last.
        nodes: Vec<NodeId>,
        /// Number of edges traversed; `nodes.len() - 1`.
        hop_count: usize,
    },
    NotReachable,
}

impl PathResult {
    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found { .. })
    }

    pub fn nodes(&self) -> Option<&[NodeId]> {
        match self {
            Self::Found { nodes, .. } => Some(nodes),
            Self::NotReachable => None,
        }
    }

    pub fn hop_count(&self) -> Option<usize> {
        match self {
            Self::Found { hop_count, .. } => Some(*hop_count),
            Self::NotReachable => None,
        }
    }
}

/// Shortest hop-count path between two devices.
///
/// Dijkstra over unit edge weights, structured so a weighted cost function
/// can slot in later. The unvisited minimum is found with a linear scan over
/// an id-ordered set: strict `<` comparison means equal distances resolve to
/// the ascending node id, which keeps results reproducible across runs.
/// O(V²) with the naive scan; fine for the few hundred devices a single
/// operator's dashboard shows.
pub fn shortest_path(graph: &TopologyGraph, origin: &str, destination: &str) -> PathResult {
    if !graph.has_node(origin) || !graph.has_node(destination) {
        return PathResult::NotReachable;
    }
    if origin == destination {
        return PathResult::Found {
            nodes: vec![origin.to_string()],
            hop_count: 0,
        };
    }

    let mut unvisited: BTreeSet<&str> = graph.nodes().map(|n| n.id.as_str()).collect();
    let mut distance: HashMap<&str, usize> = HashMap::new();
    let mut predecessor: HashMap<&str, &str> = HashMap::new();
    distance.insert(origin, 0);

    while !unvisited.is_empty() {
        let mut current: Option<(&str, usize)> = None;
        for &id in &unvisited {
            if let Some(&d) = distance.get(id) {
                if current.map_or(true, |(_, best)| d < best) {
                    current = Some((id, d));
                }
            }
        }

        // Every remaining unvisited node is at infinite distance.
        let Some((current_id, current_dist)) = current else {
            break;
        };
        if current_id == destination {
            return reconstruct(origin, destination, &predecessor);
        }
        unvisited.remove(current_id);

        for (neighbor_id, _edge_id) in graph.neighbors(current_id) {
            // Re-borrow the id from the graph so it outlives this iteration.
            let Some(neighbor) = graph.node(&neighbor_id) else {
                continue;
            };
            let nid = neighbor.id.as_str();
            if !unvisited.contains(nid) {
                continue;
            }
            let candidate = current_dist + 1;
            if distance.get(nid).map_or(true, |&d| candidate < d) {
                distance.insert(nid, candidate);
                predecessor.insert(nid, current_id);
            }
        }
    }

    PathResult::NotReachable
}

/// Walk predecessor links from the destination back to the origin.
fn reconstruct(origin: &str, destination: &str, predecessor: &HashMap<&str, &str>) -> PathResult {
    let mut nodes = vec![destination.to_string()];
    let mut current = destination;
    while current != origin {
        match predecessor.get(current) {
            Some(&prev) => {
                nodes.push(prev.to_string());
                current = prev;
            }
            // Unreachable with a correctly populated predecessor map.
            None => return PathResult::NotReachable,
        }
    }
    nodes.reverse();
    let hop_count = nodes.len() - 1;
    PathResult::Found { nodes, hop_count }
}

use crate::graph::{DeviceKind, DeviceStatus, LinkStatus, NodeId, TopologyGraph};
use crate::selection::SelectionState;
use serde::Serialize;

/// A node as handed to the render collaborator. Coordinates are always
/// present: the ingestor applies the fallback grid before a node reaches the
/// graph, and hand-built graphs default to the origin.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PositionedNode {
    pub id: NodeId,
    pub label: String,
    pub kind: DeviceKind,
    pub status: DeviceStatus,
    pub address: Option<String>,
    pub x: f64,
    pub y: f64,
}

/// An edge annotated with whether it lies on the highlighted path.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewEdge {
    pub id: String,
    pub source_id: NodeId,
    pub target_id: NodeId,
    pub bandwidth: Option<f64>,
    pub status: LinkStatus,
    pub highlighted: bool,
}

/// Pull-based, read-only projection of the graph and selection for drawing.
/// The render layer never mutates the model; it rebuilds this view whenever
/// it needs to redraw.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopologyView {
    pub nodes: Vec<PositionedNode>,
    pub edges: Vec<ViewEdge>,
    pub origin: Option<NodeId>,
    pub destination: Option<NodeId>,
    pub hop_count: Option<usize>,
}

impl TopologyView {
    pub fn build(graph: &TopologyGraph, selection: &SelectionState) -> Self {
        let highlight = selection.highlight().unwrap_or(&[]);

        let mut nodes: Vec<PositionedNode> = graph
            .nodes()
            .map(|n| {
                let coords = n.coordinates.unwrap_or(crate::graph::Coordinates { x: 0.0, y: 0.0 });
                PositionedNode {
                    id: n.id.clone(),
                    label: n.label.clone(),
                    kind: n.kind,
                    status: n.status,
                    address: n.address.clone(),
                    x: coords.x,
                    y: coords.y,
                }
            })
            .collect();
        // Stable output order for the renderer and for tests.
        nodes.sort_by(|a, b| a.id.cmp(&b.id));

        let edges = graph
            .edges()
            .iter()
            .map(|e| ViewEdge {
                id: e.id.clone(),
                source_id: e.source_id.clone(),
                target_id: e.target_id.clone(),
                bandwidth: e.bandwidth,
                status: e.status,
                highlighted: on_path(highlight, &e.source_id, &e.target_id),
            })
            .collect();

        Self {
            nodes,
            edges,
            origin: selection.origin().map(str::to_string),
            destination: selection.destination().map(str::to_string),
            hop_count: match selection {
                SelectionState::PathComputed { path, .. } => path.hop_count(),
                _ => None,
            },
        }
    }
}

/// An edge is highlighted iff some consecutive id pair of the path matches
/// its endpoints, in either direction.
fn on_path(highlight: &[NodeId], source: &str, target: &str) -> bool {
    highlight.windows(2).any(|pair| {
        (pair[0] == source && pair[1] == target) || (pair[0] == target && pair[1] == source)
    })
}

use crate::graph::{NodeId, TopologyGraph};
use crate::pathfinder::{self, PathResult};
use serde::Serialize;

/// Operator input driving the origin/destination picker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionEvent {
    NodeClicked(NodeId),
    Clear,
}

/// The two-click path picker. `Idle` → first click selects the origin →
/// second click on a different node computes a path. There is no terminal
/// state; the machine cycles for the life of the session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SelectionState {
    #[default]
    Idle,
    OriginSelected {
        origin: NodeId,
    },
    PathComputed {
        origin: NodeId,
        destination: NodeId,
        path: PathResult,
    },
}

impl SelectionState {
    pub fn origin(&self) -> Option<&str> {
        match self {
            Self::Idle => None,
            Self::OriginSelected { origin } | Self::PathComputed { origin, .. } => Some(origin),
        }
    }

    pub fn destination(&self) -> Option<&str> {
        match self {
            Self::PathComputed { destination, .. } => Some(destination),
            _ => None,
        }
    }

    /// Node sequence to highlight, present only while a computed path exists.
    /// Leaving `PathComputed` reverts the highlight to none.
    pub fn highlight(&self) -> Option<&[NodeId]> {
        match self {
            Self::PathComputed { path, .. } => path.nodes(),
            _ => None,
        }
    }

    /// True unless the state references a node id missing from `graph`.
    /// Checked by the sync controller after every snapshot replacement.
    pub fn is_consistent_with(&self, graph: &TopologyGraph) -> bool {
        match self {
            Self::Idle => true,
            Self::OriginSelected { origin } => graph.has_node(origin),
            Self::PathComputed { origin, destination, .. } => {
                graph.has_node(origin) && graph.has_node(destination)
            }
        }
    }
}

/// Pure transition function: `(state, event) -> state`, independent of any
/// rendering framework. Path computation happens only on the second click of
/// a pair; re-clicking the current origin is idempotent, and any click while
/// a path is shown restarts the picker from the clicked node.
pub fn transition(
    state: SelectionState,
    event: SelectionEvent,
    graph: &TopologyGraph,
) -> SelectionState {
    match (state, event) {
        (_, SelectionEvent::Clear) => SelectionState::Idle,
        (SelectionState::Idle, SelectionEvent::NodeClicked(n)) => {
            SelectionState::OriginSelected { origin: n }
        }
        (SelectionState::OriginSelected { origin }, SelectionEvent::NodeClicked(n)) => {
            if n == origin {
                SelectionState::OriginSelected { origin }
            } else {
                let path = pathfinder::shortest_path(graph, &origin, &n);
                SelectionState::PathComputed {
                    origin,
                    destination: n,
                    path,
                }
            }
        }
        (SelectionState::PathComputed { .. }, SelectionEvent::NodeClicked(n)) => {
            SelectionState::OriginSelected { origin: n }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{DeviceKind, DeviceStatus, Edge, LinkStatus, Node, TopologyGraph};
    use pretty_assertions::assert_eq;

    fn node(id: &str) -> Node {
        Node {
            id: id.to_string(),
            label: format!("host-{id}"),
            kind: DeviceKind::Router,
            status: DeviceStatus::Up,
            address: None,
            coordinates: None,
        }
    }

    /// A–B, B–C, C–D, A–E: the scenario graph used throughout the picker tests.
    fn scenario_graph() -> TopologyGraph {
        let mut g = TopologyGraph::new();
        for id in ["A", "B", "C", "D", "E"] {
            g.add_node(node(id));
        }
        for (idx, (s, t)) in [("A", "B"), ("B", "C"), ("C", "D"), ("A", "E")]
            .iter()
            .enumerate()
        {
            g.add_edge(Edge {
                id: format!("e-{idx}"),
                source_id: s.to_string(),
                target_id: t.to_string(),
                bandwidth: None,
                status: LinkStatus::Up,
            });
        }
        g
    }

    fn click(state: SelectionState, id: &str, g: &TopologyGraph) -> SelectionState {
        transition(state, SelectionEvent::NodeClicked(id.to_string()), g)
    }

    #[test]
    fn two_clicks_compute_a_path() {
        let g = scenario_graph();
        let state = click(SelectionState::Idle, "A", &g);
        assert_eq!(state, SelectionState::OriginSelected { origin: "A".into() });

        let state = click(state, "D", &g);
        assert_eq!(
            state,
            SelectionState::PathComputed {
                origin: "A".into(),
                destination: "D".into(),
                path: PathResult::Found {
                    nodes: vec!["A".into(), "B".into(), "C".into(), "D".into()],
                    hop_count: 3,
                },
            }
        );
        assert_eq!(
            state.highlight().unwrap(),
            &["A".to_string(), "B".into(), "C".into(), "D".into()]
        );
    }

    #[test]
    fn origin_reclick_is_idempotent() {
        let g = scenario_graph();
        let state = click(SelectionState::Idle, "A", &g);
        let state = click(state, "A", &g);
        assert_eq!(state, SelectionState::OriginSelected { origin: "A".into() });
        assert!(state.highlight().is_none());
    }

    #[test]
    fn click_from_path_computed_restarts_picker() {
        let g = scenario_graph();
        let state = click(SelectionState::Idle, "A", &g);
        let state = click(state, "D", &g);
        assert!(state.highlight().is_some());

        // Any node, including a previous endpoint, resets to OriginSelected.
        let state = click(state, "C", &g);
        assert_eq!(state, SelectionState::OriginSelected { origin: "C".into() });
        assert!(state.highlight().is_none());
    }

    #[test]
    fn unreachable_destination_still_transitions() {
        let mut g = scenario_graph();
        g.add_node(node("Z"));
        let state = click(SelectionState::Idle, "A", &g);
        let state = click(state, "Z", &g);
        assert_eq!(
            state,
            SelectionState::PathComputed {
                origin: "A".into(),
                destination: "Z".into(),
                path: PathResult::NotReachable,
            }
        );
        assert!(state.highlight().is_none());
    }

    #[test]
    fn clear_resets_from_any_state() {
        let g = scenario_graph();
        for state in [
            SelectionState::Idle,
            click(SelectionState::Idle, "A", &g),
            click(click(SelectionState::Idle, "A", &g), "D", &g),
        ] {
            assert_eq!(
                transition(state, SelectionEvent::Clear, &g),
                SelectionState::Idle
            );
        }
    }

    #[test]
    fn consistency_check_tracks_graph_membership() {
        let g = scenario_graph();
        let mut smaller = TopologyGraph::new();
        smaller.add_node(node("A"));

        let origin = click(SelectionState::Idle, "A", &g);
        assert!(origin.is_consistent_with(&g));
        assert!(origin.is_consistent_with(&smaller));

        let path = click(origin, "D", &g);
        assert!(path.is_consistent_with(&g));
        assert!(!path.is_consistent_with(&smaller));
        assert!(SelectionState::Idle.is_consistent_with(&smaller));
    }
}

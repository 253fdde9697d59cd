use crate::graph::TopologyGraph;
use crate::ingest::{IngestReport, TopologyIngestor};
use crate::selection::{transition, SelectionEvent, SelectionState};
use crate::view::TopologyView;
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::{info, warn};

/// Where snapshots come from. The dashboard host implements this over its
/// REST client; tests implement it over canned payloads. Transport concerns
/// (retries, auth, timeouts) live behind this seam.
#[async_trait]
pub trait SnapshotSource: Send + Sync {
    async fn fetch(&self) -> Result<Value>;
}

/// Owns the active graph and selection for one operator session and keeps
/// them in step with the backend.
///
/// All mutation goes through `&mut self`, so the host's event loop
/// serializes refreshes and click events; no internal locking. Each session
/// gets its own controller, nothing is shared across sessions.
pub struct LiveSyncController<S> {
    source: S,
    graph: TopologyGraph,
    selection: SelectionState,
    last_report: IngestReport,
    generation: u64,
    last_refreshed: Option<DateTime<Utc>>,
}

impl<S: SnapshotSource> LiveSyncController<S> {
    /// Start with an empty graph and an idle picker; call [`refresh`] to
    /// load the first snapshot.
    ///
    /// [`refresh`]: LiveSyncController::refresh
    pub fn new(source: S) -> Self {
        Self {
            source,
            graph: TopologyGraph::new(),
            selection: SelectionState::Idle,
            last_report: IngestReport::default(),
            generation: 0,
            last_refreshed: None,
        }
    }

    /// Fetch a fresh snapshot and replace the active graph wholesale — no
    /// merging or diffing against the previous one.
    ///
    /// If the fetch fails or the payload is structurally invalid, this cycle
    /// is skipped: the previous graph and selection stay active and the
    /// error is returned. After a successful replacement the selection is
    /// reconciled: if it references a node id absent from the new graph it
    /// is forced back to `Idle`. A selection whose endpoints survive keeps
    /// its last computed path as-is — the path is deliberately NOT
    /// recomputed against the new topology until the operator clicks again.
    pub async fn refresh(&mut self) -> Result<&IngestReport> {
        let payload = self
            .source
            .fetch()
            .await
            .context("topology snapshot fetch failed")?;

        let ingested = match TopologyIngestor::ingest(&payload) {
            Ok(ingested) => ingested,
            Err(e) => {
                warn!(error = %e, "structurally invalid snapshot, keeping previous graph");
                return Err(e.into());
            }
        };

        self.graph = ingested.graph;
        self.last_report = ingested.report;
        self.generation += 1;
        self.last_refreshed = Some(Utc::now());

        if !self.selection.is_consistent_with(&self.graph) {
            info!("selection references a removed device, resetting picker");
            self.selection = SelectionState::Idle;
        }

        info!(
            nodes = self.graph.node_count(),
            edges = self.graph.edge_count(),
            nodes_skipped = self.last_report.nodes_skipped,
            links_skipped = self.last_report.links_skipped,
            generation = self.generation,
            "topology refreshed"
        );
        Ok(&self.last_report)
    }

    /// Feed one operator event through the selection state machine against
    /// the active graph.
    pub fn handle_event(&mut self, event: SelectionEvent) -> &SelectionState {
        let state = std::mem::take(&mut self.selection);
        self.selection = transition(state, event, &self.graph);
        &self.selection
    }

    /// Build the read-only projection the render collaborator draws from.
    pub fn view(&self) -> TopologyView {
        TopologyView::build(&self.graph, &self.selection)
    }

    pub fn graph(&self) -> &TopologyGraph {
        &self.graph
    }

    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }

    pub fn last_report(&self) -> &IngestReport {
        &self.last_report
    }

    /// Monotonically increasing count of applied snapshots. Hosts that
    /// overlap fetches can compare generations to detect a stale response.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn last_refreshed(&self) -> Option<DateTime<Utc>> {
        self.last_refreshed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Mutex;

    /// Replays a fixed sequence of fetch outcomes.
    struct ScriptedSource {
        responses: Mutex<Vec<Result<Value>>>,
    }

    impl ScriptedSource {
        fn new(responses: Vec<Result<Value>>) -> Self {
            Self { responses: Mutex::new(responses) }
        }
    }

    #[async_trait]
    impl SnapshotSource for ScriptedSource {
        async fn fetch(&self) -> Result<Value> {
            let mut responses = self.responses.lock().unwrap();
            if responses.is_empty() {
                anyhow::bail!("no more scripted responses");
            }
            responses.remove(0)
        }
    }

    fn snapshot(node_ids: &[&str], links: &[(&str, &str)]) -> Value {
        json!({
            "nodes": node_ids.iter().map(|id| json!({
                "id": id,
                "hostname": format!("{id}.net"),
                "device_type": "switch",
            })).collect::<Vec<_>>(),
            "links": links.iter().map(|(s, t)| json!({
                "source": s,
                "destination": t,
                "bandwidth": 100,
            })).collect::<Vec<_>>(),
        })
    }

    #[tokio::test]
    async fn refresh_replaces_graph_wholesale() {
        let source = ScriptedSource::new(vec![
            Ok(snapshot(&["a", "b"], &[("a", "b")])),
            Ok(snapshot(&["c", "d"], &[("c", "d")])),
        ]);
        let mut controller = LiveSyncController::new(source);

        controller.refresh().await.unwrap();
        assert!(controller.graph().has_node("a"));
        assert_eq!(controller.generation(), 1);

        controller.refresh().await.unwrap();
        assert!(!controller.graph().has_node("a"));
        assert!(!controller.graph().has_node("b"));
        assert!(controller.graph().has_node("c"));
        assert_eq!(controller.generation(), 2);
        assert!(controller.last_refreshed().is_some());
    }

    #[tokio::test]
    async fn fetch_failure_keeps_previous_graph() {
        let source = ScriptedSource::new(vec![
            Ok(snapshot(&["a", "b"], &[("a", "b")])),
            Err(anyhow::anyhow!("backend unreachable")),
        ]);
        let mut controller = LiveSyncController::new(source);

        controller.refresh().await.unwrap();
        let err = controller.refresh().await.unwrap_err();
        assert!(err.to_string().contains("fetch failed"));
        assert!(controller.graph().has_node("a"));
        assert_eq!(controller.generation(), 1);
    }

    #[tokio::test]
    async fn invalid_payload_keeps_previous_graph() {
        let source = ScriptedSource::new(vec![
            Ok(snapshot(&["a"], &[])),
            Ok(json!({ "links": [] })),
        ]);
        let mut controller = LiveSyncController::new(source);

        controller.refresh().await.unwrap();
        assert!(controller.refresh().await.is_err());
        assert!(controller.graph().has_node("a"));
        assert_eq!(controller.generation(), 1);
    }

    #[tokio::test]
    async fn dangling_selection_resets_to_idle() {
        let source = ScriptedSource::new(vec![
            Ok(snapshot(&["a", "b"], &[("a", "b")])),
            Ok(snapshot(&["b", "c"], &[("b", "c")])),
        ]);
        let mut controller = LiveSyncController::new(source);
        controller.refresh().await.unwrap();

        controller.handle_event(SelectionEvent::NodeClicked("a".into()));
        assert_eq!(controller.selection().origin(), Some("a"));

        // "a" disappears in the second snapshot.
        controller.refresh().await.unwrap();
        assert_eq!(controller.selection(), &SelectionState::Idle);
    }

    #[tokio::test]
    async fn surviving_selection_keeps_stale_path() {
        let source = ScriptedSource::new(vec![
            Ok(snapshot(&["a", "b", "c"], &[("a", "b"), ("b", "c")])),
            // Same devices, but the a-b link is gone.
            Ok(snapshot(&["a", "b", "c"], &[("b", "c")])),
        ]);
        let mut controller = LiveSyncController::new(source);
        controller.refresh().await.unwrap();

        controller.handle_event(SelectionEvent::NodeClicked("a".into()));
        controller.handle_event(SelectionEvent::NodeClicked("c".into()));
        let before = controller.selection().clone();
        assert!(before.highlight().is_some());

        controller.refresh().await.unwrap();
        // Endpoints survive, so the last computed path is kept untouched.
        assert_eq!(controller.selection(), &before);
    }
}

use crate::graph::{
    Coordinates, DeviceKind, DeviceStatus, Edge, LinkStatus, Node, TopologyGraph,
};
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

/// Fallback grid geometry for nodes the backend exports without coordinates.
/// Positions are derived from the node's ordinal index in the payload, so
/// the same snapshot always yields the same layout.
const FALLBACK_COLUMNS: usize = 4;
const FALLBACK_X_STEP: f64 = 260.0;
const FALLBACK_Y_STEP: f64 = 160.0;

/// Raised only for a structurally invalid top-level payload. Malformed
/// individual entries are skipped and counted, never raised.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("malformed snapshot payload: {0}")]
    MalformedPayload(&'static str),
    #[error("snapshot is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Per-ingestion accounting, surfaced to the controller and its callers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct IngestReport {
    pub nodes_ingested: usize,
    pub links_ingested: usize,
    pub nodes_skipped: usize,
    pub links_skipped: usize,
}

/// A freshly built graph plus the accounting for how it was built.
#[derive(Debug)]
pub struct Ingested {
    pub graph: TopologyGraph,
    pub report: IngestReport,
}

/// Converts one topology export payload into a [`TopologyGraph`].
///
/// The top level must carry `nodes` and `links` lists; anything else about
/// the payload is treated leniently. Ingestion always completes with a valid
/// (possibly empty) graph once the top-level shape checks out.
pub struct TopologyIngestor;

impl TopologyIngestor {
    /// Ingest an already-parsed snapshot payload.
    pub fn ingest(payload: &Value) -> Result<Ingested, IngestError> {
        let nodes = payload
            .get("nodes")
            .and_then(Value::as_array)
            .ok_or(IngestError::MalformedPayload("`nodes` missing or not a list"))?;
        let links = payload
            .get("links")
            .and_then(Value::as_array)
            .ok_or(IngestError::MalformedPayload("`links` missing or not a list"))?;

        let mut graph = TopologyGraph::new();
        let mut report = IngestReport::default();

        for (idx, raw) in nodes.iter().enumerate() {
            match parse_node(raw, idx) {
                Some(node) => {
                    if graph.add_node(node) {
                        report.nodes_ingested += 1;
                    } else {
                        report.nodes_skipped += 1;
                    }
                }
                None => {
                    debug!(index = idx, "skipping malformed node entry");
                    report.nodes_skipped += 1;
                }
            }
        }

        for (idx, raw) in links.iter().enumerate() {
            let added = parse_link(raw, idx)
                .map(|edge| graph.add_edge(edge))
                .unwrap_or(false);
            if added {
                report.links_ingested += 1;
            } else {
                debug!(index = idx, "skipping unresolved or malformed link entry");
                report.links_skipped += 1;
            }
        }

        Ok(Ingested { graph, report })
    }

    /// Ingest a raw JSON document.
    pub fn ingest_json(raw: &str) -> Result<Ingested, IngestError> {
        let payload: Value = serde_json::from_str(raw)?;
        Self::ingest(&payload)
    }
}

/// The backend is inconsistent about id types across exports; accept both
/// strings and integers and normalize to a string key.
fn id_string(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn parse_node(raw: &Value, ordinal: usize) -> Option<Node> {
    let id = id_string(raw.get("id"))?;
    let label = raw.get("hostname")?.as_str()?.trim().to_string();
    if label.is_empty() || label.contains(char::is_whitespace) {
        return None;
    }

    let kind = raw
        .get("device_type")
        .and_then(Value::as_str)
        .map(DeviceKind::from_device_type)
        .unwrap_or(DeviceKind::Unknown);
    let status = DeviceStatus::from_raw(raw.get("status").and_then(Value::as_str));
    let address = raw
        .get("ip_address")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string);

    let coordinates = parse_coordinates(raw.get("coordinates"))
        .or_else(|| Some(fallback_position(ordinal)));

    Some(Node {
        id,
        label,
        kind,
        status,
        address,
        coordinates,
    })
}

fn parse_coordinates(raw: Option<&Value>) -> Option<Coordinates> {
    let obj = raw?.as_object()?;
    let x = obj.get("x")?.as_f64()?;
    let y = obj.get("y")?.as_f64()?;
    Some(Coordinates { x, y })
}

fn fallback_position(ordinal: usize) -> Coordinates {
    Coordinates {
        x: (ordinal % FALLBACK_COLUMNS) as f64 * FALLBACK_X_STEP,
        y: (ordinal / FALLBACK_COLUMNS) as f64 * FALLBACK_Y_STEP,
    }
}

fn parse_link(raw: &Value, ordinal: usize) -> Option<Edge> {
    let source_id = id_string(raw.get("source"))?;
    let target_id = id_string(raw.get("destination"))?;
    let bandwidth = raw.get("bandwidth").and_then(Value::as_f64);
    let status = match raw.get("status").and_then(Value::as_str) {
        Some(s) if s.trim().eq_ignore_ascii_case("down") => LinkStatus::Down,
        _ => LinkStatus::Up,
    };

    Some(Edge {
        id: format!("e-{ordinal}"),
        source_id,
        target_id,
        bandwidth,
        status,
    })
}

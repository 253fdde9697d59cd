use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use tracing::warn;

/// Stable device identifier as assigned by the inventory backend.
pub type NodeId = String;

/// Link identifier, unique within one snapshot.
pub type EdgeId = String;

/// Device classes recognized by the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceKind {
    Router,
    Switch,
    Server,
    Firewall,
    AccessPoint,
    Client,
    Cloud,
    Unknown,
}

impl DeviceKind {
    /// Map the backend's free-form `device_type` string onto a device class.
    /// Unrecognized values fall through to `Unknown` rather than failing.
    pub fn from_device_type(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "router" | "edge" => Self::Router,
            "switch" | "access" | "distribution" => Self::Switch,
            "firewall" => Self::Firewall,
            "server" => Self::Server,
            "cloud" => Self::Cloud,
            "ap" => Self::AccessPoint,
            "client" => Self::Client,
            _ => Self::Unknown,
        }
    }
}

/// Operational status of a device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceStatus {
    #[default]
    Up,
    Down,
    Warning,
}

impl DeviceStatus {
    /// Parse the backend's status string. Absent or unrecognized values
    /// default to `Up`, matching what the export endpoint reports today.
    pub fn from_raw(raw: Option<&str>) -> Self {
        match raw.map(|s| s.trim().to_lowercase()).as_deref() {
            Some("down") => Self::Down,
            Some("warning") => Self::Warning,
            _ => Self::Up,
        }
    }
}

/// Operational status of a link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkStatus {
    #[default]
    Up,
    Down,
}

/// Canvas position of a node.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub x: f64,
    pub y: f64,
}

/// A device in the topology.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    pub label: String,
    pub kind: DeviceKind,
    pub status: DeviceStatus,
    pub address: Option<String>,
    pub coordinates: Option<Coordinates>,
}

/// A link between two devices. The source/target direction records data
/// provenance only; traversal treats every edge as undirected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub id: EdgeId,
    pub source_id: NodeId,
    pub target_id: NodeId,
    pub bandwidth: Option<f64>,
    pub status: LinkStatus,
}

/// In-memory topology: node lookup table, edge list and an undirected
/// adjacency index.
///
/// A graph is built fresh on every ingestion and replaced wholesale by the
/// sync controller; there are no removal or update operations. Every edge
/// admitted into the graph references two existing nodes.
#[derive(Debug, Default)]
pub struct TopologyGraph {
    nodes: HashMap<NodeId, Node>,
    edges: Vec<Edge>,
    edge_ids: HashSet<EdgeId>,
    adjacency: HashMap<NodeId, Vec<(NodeId, EdgeId)>>,
}

impl TopologyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a node. A node whose id collides with an existing one is
    /// rejected as a no-op; the first occurrence wins.
    pub fn add_node(&mut self, node: Node) -> bool {
        if self.nodes.contains_key(&node.id) {
            warn!(node_id = %node.id, "duplicate node id in snapshot, keeping first occurrence");
            return false;
        }
        self.adjacency.entry(node.id.clone()).or_default();
        self.nodes.insert(node.id.clone(), node);
        true
    }

    /// Add an edge. Admitted only if both endpoints exist and the edge id is
    /// unused; otherwise rejected silently (the ingestor surfaces rejections
    /// as a skip count).
    pub fn add_edge(&mut self, edge: Edge) -> bool {
        if !self.nodes.contains_key(&edge.source_id)
            || !self.nodes.contains_key(&edge.target_id)
            || self.edge_ids.contains(&edge.id)
        {
            return false;
        }
        self.adjacency
            .entry(edge.source_id.clone())
            .or_default()
            .push((edge.target_id.clone(), edge.id.clone()));
        if edge.source_id != edge.target_id {
            self.adjacency
                .entry(edge.target_id.clone())
                .or_default()
                .push((edge.source_id.clone(), edge.id.clone()));
        }
        self.edge_ids.insert(edge.id.clone());
        self.edges.push(edge);
        true
    }

    /// All edges touching `node_id` in either direction, as
    /// `(neighbor_id, edge_id)` pairs ordered by edge id ascending. The
    /// ordering is a reproducibility guarantee relied on by pathfinding.
    pub fn neighbors(&self, node_id: &str) -> Vec<(NodeId, EdgeId)> {
        let mut out = self.adjacency.get(node_id).cloned().unwrap_or_default();
        out.sort_by(|a, b| a.1.cmp(&b.1));
        out
    }

    pub fn has_node(&self, node_id: &str) -> bool {
        self.nodes.contains_key(node_id)
    }

    pub fn node(&self, node_id: &str) -> Option<&Node> {
        self.nodes.get(node_id)
    }

    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

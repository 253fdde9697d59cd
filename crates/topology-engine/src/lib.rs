//! Network topology graph and path-analysis engine for the NetPulse
//! operations dashboard.
//!
//! The engine ingests device/link snapshots from the inventory backend into
//! an in-memory graph, computes shortest hop paths between operator-selected
//! devices and exposes a read-only view for the render layer. Rendering,
//! transport and the CRUD surfaces of the dashboard live outside this crate.

pub mod graph;
pub mod ingest;
pub mod pathfinder;
pub mod selection;
pub mod sync;
pub mod view;

pub use graph::{DeviceKind, DeviceStatus, Edge, LinkStatus, Node, NodeId, TopologyGraph};
pub use ingest::{IngestError, IngestReport, Ingested, TopologyIngestor};
pub use pathfinder::{shortest_path, PathResult};
pub use selection::{transition, SelectionEvent, SelectionState};
pub use sync::{LiveSyncController, SnapshotSource};
pub use view::TopologyView;

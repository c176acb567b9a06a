//! JSON export of frame snapshots.
//!
//! Hosts without a Rust-side renderer (browser canvas, replay tools) receive
//! frames as JSON. `SimWorld::snapshot_json` and the demo go through these
//! helpers; `bridge` covers hosts that want a flat float buffer instead.

use crate::world::Snapshot;

/// Compact JSON bytes, for sending over a channel or socket.
pub fn snapshot_to_json(snapshot: &Snapshot) -> Result<Vec<u8>, serde_json::Error> {
    serde_json::to_vec(snapshot)
}

/// Compact JSON text.
pub fn snapshot_to_json_string(snapshot: &Snapshot) -> Result<String, serde_json::Error> {
    serde_json::to_string(snapshot)
}

/// Indented JSON text, for logs and the demo.
pub fn snapshot_to_json_pretty(snapshot: &Snapshot) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(snapshot)
}

/// Parse a snapshot from JSON bytes, e.g. a recorded frame.
pub fn snapshot_from_json(data: &[u8]) -> Result<Snapshot, serde_json::Error> {
    serde_json::from_slice(data)
}

pub fn snapshot_from_json_string(data: &str) -> Result<Snapshot, serde_json::Error> {
    serde_json::from_str(data)
}

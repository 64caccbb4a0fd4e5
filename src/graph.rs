//! Placed nodes and drawn edges.
//!
//! JSON shape (also the persisted snapshot):
//! {
//!   "nodes": [{ "id": "soil_sensor-1", "type": "soil_sensor" }],
//!   "edges": [{ "id": "e-soil_sensor-1-microcontroller-1-0", "source": "soil_sensor-1",
//!               "target": "microcontroller-1", "valid": true }]
//! }
//!
//! Edge `id` and `valid` are optional on input.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    pub id: String,
    #[serde(rename = "type")]
    pub component_type: String,
}

impl Node {
    pub fn new(id: impl Into<String>, component_type: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            component_type: component_type.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    #[serde(default)]
    pub id: String,
    pub source: String,
    pub target: String,
    /// Set once the edge has been classified against the adjacency rules.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub valid: Option<bool>,
}

impl Edge {
    /// Unclassified edge without an id.
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            id: String::new(),
            source: source.into(),
            target: target.into(),
            valid: None,
        }
    }
}

/// Everything needed to restore a canvas.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub edges: Vec<Edge>,
}

impl Snapshot {
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.edges.is_empty()
    }
}

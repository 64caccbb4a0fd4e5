//! Validated scenario structures.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// A kind of device or protocol the user can place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComponentType {
    pub id: String,
    pub label: String,
    pub description: String,
    /// Catalog group this type was declared in (common, protocol, ...).
    pub group: String,
}

/// Legal targets for edges leaving `source`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AdjacencyRule {
    pub source: String,
    pub targets: BTreeSet<String>,
}

/// A (source type, target type) pair that must be wired for completion.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RequiredConnection {
    pub source: String,
    pub target: String,
}

impl RequiredConnection {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
        }
    }
}

impl fmt::Display for RequiredConnection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.source, self.target)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Scenario {
    pub key: String,
    /// Stable key used by the progress tracker (smart-farming, ...).
    pub slug: String,
    pub title: String,
    pub summary: String,
    pub description: String,

    /// Palette in display order.
    pub components: Vec<ComponentType>,

    /// source type -> rule
    pub rules: BTreeMap<String, AdjacencyRule>,

    pub required_components: Vec<String>,
    pub required_connections: Vec<RequiredConnection>,
}

impl Scenario {
    pub fn component(&self, id: &str) -> Option<&ComponentType> {
        self.components.iter().find(|c| c.id == id)
    }

    pub fn has_component(&self, id: &str) -> bool {
        self.component(id).is_some()
    }

    /// Display label, falling back to the raw id for types outside the palette.
    pub fn label_of<'a>(&'a self, id: &'a str) -> &'a str {
        self.component(id).map(|c| c.label.as_str()).unwrap_or(id)
    }

    pub fn rule_for(&self, source_type: &str) -> Option<&AdjacencyRule> {
        self.rules.get(source_type)
    }
}

//! Catalog JSON (catalog.json) as it appears on disk.
//!
//! JSON shape:
//! {
//!   "groups": [
//!     { "name": "common", "components": [{ "id": "gateway", "label": "IoT Gateway", "description": "..." }] }
//!   ],
//!   "scenarios": [
//!     {
//!       "key": "farming",
//!       "slug": "smart-farming",              // optional, defaults to smart-<key>
//!       "groups": ["common", "protocol", "farming"],
//!       "required_components": ["soil_sensor", ...],
//!       "required_connections": [["soil_sensor", "microcontroller"], ...],
//!       "connections": [{ "source": "soil_sensor", "targets": ["microcontroller"] }]
//!     }
//!   ]
//! }
//!
//! `validate_and_build` checks every identifier against the scenario palette
//! and produces immutable `Scenario` values.

use super::scenario::{AdjacencyRule, ComponentType, RequiredConnection, Scenario};
use super::{Catalog, CatalogError};
use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, Deserialize)]
pub struct CatalogSpec {
    #[serde(default)]
    pub groups: Vec<RawGroup>,

    #[serde(default)]
    pub scenarios: Vec<RawScenario>,
}

/// Named bundle of component types (common, protocol, per-scenario).
#[derive(Debug, Clone, Deserialize)]
pub struct RawGroup {
    pub name: String,

    #[serde(default)]
    pub components: Vec<RawComponent>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawComponent {
    pub id: String,

    /// Optional display label. Defaults to `id`.
    #[serde(default)]
    pub label: Option<String>,

    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawScenario {
    pub key: String,

    #[serde(default)]
    pub slug: Option<String>,

    #[serde(default)]
    pub title: Option<String>,

    #[serde(default)]
    pub summary: String,

    #[serde(default)]
    pub description: String,

    /// Group names making up the palette, in display order.
    #[serde(default)]
    pub groups: Vec<String>,

    #[serde(default)]
    pub required_components: Vec<String>,

    /// Directed pairs: [source_type, target_type]
    #[serde(default)]
    pub required_connections: Vec<[String; 2]>,

    /// Adjacency rules.
    #[serde(default)]
    pub connections: Vec<RawRule>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawRule {
    pub source: String,

    #[serde(default)]
    pub targets: Vec<String>,
}

impl CatalogSpec {
    /// Validate a CatalogSpec and build a Catalog:
    /// - unique component ids across all groups
    /// - unique scenario keys
    /// - palette groups exist
    /// - rules, required components and required connections only name palette types
    pub fn validate_and_build(&self) -> Result<Catalog, CatalogError> {
        // 1) Component groups, unique ids.
        let mut seen = BTreeSet::<&str>::new();
        let mut groups = BTreeMap::<&str, Vec<ComponentType>>::new();
        for group in &self.groups {
            let mut components = Vec::with_capacity(group.components.len());
            for raw in &group.components {
                let id = raw.id.trim();
                if id.is_empty() {
                    return Err(CatalogError::EmptyIdentifier("component"));
                }
                if !seen.insert(id) {
                    return Err(CatalogError::DuplicateComponent(id.to_string()));
                }
                components.push(ComponentType {
                    id: id.to_string(),
                    label: raw.label.clone().unwrap_or_else(|| id.to_string()),
                    description: raw.description.clone(),
                    group: group.name.clone(),
                });
            }
            groups.entry(group.name.as_str()).or_default().extend(components);
        }

        // 2) Scenarios.
        let mut keys = BTreeSet::<String>::new();
        let mut scenarios = Vec::with_capacity(self.scenarios.len());
        for raw in &self.scenarios {
            let scenario = raw.build(&groups)?;
            if !keys.insert(scenario.key.clone())
                || (scenario.slug != scenario.key && !keys.insert(scenario.slug.clone()))
            {
                return Err(CatalogError::DuplicateScenario(scenario.key));
            }
            scenarios.push(scenario);
        }
        if scenarios.is_empty() {
            return Err(CatalogError::Empty);
        }

        Ok(Catalog::new(scenarios))
    }
}

impl RawScenario {
    fn build(&self, groups: &BTreeMap<&str, Vec<ComponentType>>) -> Result<Scenario, CatalogError> {
        let key = self.key.trim().to_ascii_lowercase();
        if key.is_empty() {
            return Err(CatalogError::EmptyIdentifier("scenario"));
        }
        let slug = self
            .slug
            .as_deref()
            .map(|s| s.trim().to_ascii_lowercase())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| format!("smart-{}", key));

        // Palette in group order.
        let mut components = Vec::new();
        for name in &self.groups {
            let group = groups.get(name.as_str()).ok_or_else(|| CatalogError::UnknownGroup {
                scenario: key.clone(),
                group: name.clone(),
            })?;
            components.extend(group.iter().cloned());
        }
        let palette: BTreeSet<&str> = components.iter().map(|c| c.id.as_str()).collect();

        let check = |id: &str, role: &'static str| -> Result<String, CatalogError> {
            let id = id.trim();
            if palette.contains(id) {
                Ok(id.to_string())
            } else {
                Err(CatalogError::UnknownComponentType {
                    scenario: key.clone(),
                    component: id.to_string(),
                    role,
                })
            }
        };

        let mut rules = BTreeMap::<String, AdjacencyRule>::new();
        for rule in &self.connections {
            let source = check(&rule.source, "adjacency rule source")?;
            let targets = rule
                .targets
                .iter()
                .map(|t| check(t, "adjacency rule target"))
                .collect::<Result<BTreeSet<_>, _>>()?;
            if rules.contains_key(&source) {
                return Err(CatalogError::DuplicateRule {
                    scenario: key.clone(),
                    source_type: source,
                });
            }
            rules.insert(source.clone(), AdjacencyRule { source, targets });
        }

        // Order-preserving dedup; coverage is a set.
        let mut required_components = Vec::new();
        for id in &self.required_components {
            let id = check(id, "required components")?;
            if !required_components.contains(&id) {
                required_components.push(id);
            }
        }

        let required_connections = self
            .required_connections
            .iter()
            .map(|[source, target]| {
                Ok(RequiredConnection {
                    source: check(source, "required connections")?,
                    target: check(target, "required connections")?,
                })
            })
            .collect::<Result<Vec<_>, CatalogError>>()?;

        Ok(Scenario {
            title: self.title.clone().unwrap_or_else(|| key.clone()),
            summary: self.summary.clone(),
            description: self.description.clone(),
            key,
            slug,
            components,
            rules,
            required_components,
            required_connections,
        })
    }
}

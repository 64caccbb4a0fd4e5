//! Rule catalog: scenario data (palette, adjacency, completion criteria).
//!
//! The catalog is data only. It owns:
//! - the raw JSON shape (`raw`)
//! - validated, immutable scenarios (`scenario`)
//!
//! Nothing in here knows how nodes are drawn.

pub mod raw;
pub mod scenario;

pub use raw::CatalogSpec;
pub use scenario::{AdjacencyRule, ComponentType, RequiredConnection, Scenario};

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Catalog shipped with the binary.
const BUILTIN_CATALOG: &str = include_str!("builtin.json");

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("scenario '{0}' not found")]
    ScenarioNotFound(String),
    #[error("scenario '{scenario}' references unknown component type '{component}' in {role}")]
    UnknownComponentType {
        scenario: String,
        component: String,
        role: &'static str,
    },
    #[error("scenario '{scenario}' references unknown component group '{group}'")]
    UnknownGroup { scenario: String, group: String },
    #[error("component type '{0}' is defined more than once")]
    DuplicateComponent(String),
    #[error("scenario '{0}' is defined more than once")]
    DuplicateScenario(String),
    #[error("scenario '{scenario}' has more than one adjacency rule for source '{source_type}'")]
    DuplicateRule {
        scenario: String,
        source_type: String,
    },
    #[error("empty {0} identifier in catalog")]
    EmptyIdentifier(&'static str),
    #[error("catalog contains no scenarios")]
    Empty,
    #[error("could not parse catalog JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("could not read catalog file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Validated set of scenarios. Immutable once built.
#[derive(Debug, Clone)]
pub struct Catalog {
    scenarios: Vec<Scenario>,
}

impl Catalog {
    /// Parse and validate the built-in catalog.
    pub fn builtin() -> Result<Self, CatalogError> {
        Self::from_json(BUILTIN_CATALOG)
    }

    pub fn from_json(text: &str) -> Result<Self, CatalogError> {
        let spec: CatalogSpec = serde_json::from_str(text)?;
        spec.validate_and_build()
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| CatalogError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text)
    }

    pub(crate) fn new(scenarios: Vec<Scenario>) -> Self {
        Self { scenarios }
    }

    /// Look up a scenario by key (`farming`) or slug (`smart-farming`).
    pub fn scenario(&self, key: &str) -> Result<&Scenario, CatalogError> {
        let wanted = key.trim().to_ascii_lowercase();
        self.scenarios
            .iter()
            .find(|s| s.key == wanted || s.slug == wanted)
            .ok_or_else(|| CatalogError::ScenarioNotFound(key.to_string()))
    }

    pub fn scenarios(&self) -> &[Scenario] {
        &self.scenarios
    }

    /// Progress-tracker keys, in catalog order.
    pub fn slugs(&self) -> impl Iterator<Item = &str> {
        self.scenarios.iter().map(|s| s.slug.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn builtin_catalog_has_three_scenarios() {
        let catalog = Catalog::builtin().unwrap();
        let keys: Vec<&str> = catalog.scenarios().iter().map(|s| s.key.as_str()).collect();
        assert_eq!(keys, vec!["farming", "healthcare", "manufacturing"]);
        assert_eq!(
            catalog.slugs().collect::<Vec<_>>(),
            vec!["smart-farming", "smart-healthcare", "smart-manufacturing"]
        );
    }

    #[test]
    fn builtin_required_sets_match_catalog_data() {
        let catalog = Catalog::builtin().unwrap();
        let counts: Vec<(usize, usize)> = catalog
            .scenarios()
            .iter()
            .map(|s| (s.required_components.len(), s.required_connections.len()))
            .collect();
        assert_eq!(counts, vec![(9, 8), (9, 8), (11, 9)]);
    }

    #[test]
    fn lookup_accepts_key_or_slug() {
        let catalog = Catalog::builtin().unwrap();
        assert_eq!(catalog.scenario("farming").unwrap().key, "farming");
        assert_eq!(catalog.scenario("smart-healthcare").unwrap().key, "healthcare");
        assert_eq!(catalog.scenario(" Manufacturing ").unwrap().key, "manufacturing");
    }

    #[test]
    fn unknown_scenario_is_an_error() {
        let catalog = Catalog::builtin().unwrap();
        let err = catalog.scenario("aquaculture").unwrap_err();
        assert!(matches!(err, CatalogError::ScenarioNotFound(ref k) if k == "aquaculture"));
        assert_eq!(err.to_string(), "scenario 'aquaculture' not found");
    }

    #[test]
    fn palette_is_common_then_protocol_then_scenario_group() {
        let catalog = Catalog::builtin().unwrap();
        let farming = catalog.scenario("farming").unwrap();
        let ids: Vec<&str> = farming.components.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(
            ids,
            vec![
                "microcontroller",
                "gateway",
                "cloud_server",
                "dashboard",
                "wifi",
                "bluetooth",
                "lorawan",
                "mqtt",
                "soil_sensor",
                "temp_sensor",
                "light_sensor",
                "irrigation_system",
            ]
        );
        assert!(!farming.has_component("patient_wearable"));
    }

    #[test]
    fn missing_file_reports_path() {
        let err = Catalog::from_path("/nonexistent/catalog.json").unwrap_err();
        assert!(err.to_string().contains("/nonexistent/catalog.json"));
    }
}

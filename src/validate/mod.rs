//! Graph validator: edge legality and progress evaluation.
//!
//! Both operations are pure. The caller passes the current nodes and edges
//! after a mutation has been fully applied; nothing is cached here.

use crate::catalog::{RequiredConnection, Scenario};
use crate::graph::{Edge, Node};
use log::debug;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// Components contribute at most this much progress; connections the rest.
const COMPONENT_SHARE: f64 = 50.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Some required component type has no node yet (progress 0..=49).
    Incomplete,
    /// All required types are placed, wiring is unfinished (progress 50..=99).
    ComponentsReady,
    /// Every required connection is present (progress 100).
    Complete,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Evaluation {
    pub progress: u8,
    pub stage: Stage,
    /// Percentage of required component types placed, rounded.
    pub component_coverage: u8,
    /// Required types without a node, in catalog order.
    pub missing_component_types: Vec<String>,
    pub satisfied_connections: usize,
    pub total_connections: usize,
    /// Required pairs not yet wired, in catalog order.
    pub unsatisfied_connections: Vec<RequiredConnection>,
    pub complete: bool,
}

/// Whether an edge from a `source_type` node to a `target_type` node is legal.
///
/// Adjacency is directional: `(a, b)` and `(b, a)` are judged independently.
pub fn is_edge_valid(scenario: &Scenario, source_type: &str, target_type: &str) -> bool {
    scenario
        .rule_for(source_type)
        .map(|rule| rule.targets.contains(target_type))
        .unwrap_or(false)
}

/// Compute progress and completion for the given graph.
///
/// Connection coverage is only assessed once every required component type
/// is present. Edges whose endpoints do not resolve to a node are skipped.
pub fn evaluate(scenario: &Scenario, nodes: &[Node], edges: &[Edge]) -> Evaluation {
    let required = &scenario.required_components;
    let total_connections = scenario.required_connections.len();

    // Step 1: component coverage (set semantics).
    let present: BTreeSet<&str> = nodes.iter().map(|n| n.component_type.as_str()).collect();
    let missing: Vec<String> = required
        .iter()
        .filter(|t| !present.contains(t.as_str()))
        .cloned()
        .collect();
    let present_required = required.len() - missing.len();
    let component_coverage = percent(present_required, required.len());

    if !missing.is_empty() {
        let coverage = present_required as f64 / required.len() as f64;
        let progress = (coverage * COMPONENT_SHARE).floor() as u8;
        debug!(
            "{}: {} of {} required component types placed, progress {}",
            scenario.key,
            present_required,
            required.len(),
            progress
        );
        return Evaluation {
            progress,
            stage: Stage::Incomplete,
            component_coverage,
            missing_component_types: missing,
            satisfied_connections: 0,
            total_connections,
            unsatisfied_connections: scenario.required_connections.clone(),
            complete: false,
        };
    }

    // Step 2: connection coverage by (source type, target type) equality.
    let mut type_of = BTreeMap::<&str, &str>::new();
    for node in nodes {
        type_of
            .entry(node.id.as_str())
            .or_insert(node.component_type.as_str());
    }

    let mut wired = BTreeSet::<(&str, &str)>::new();
    for edge in edges {
        match (type_of.get(edge.source.as_str()), type_of.get(edge.target.as_str())) {
            (Some(s), Some(t)) => {
                wired.insert((*s, *t));
            }
            _ => debug!(
                "{}: skipping edge {} -> {} with a missing endpoint",
                scenario.key, edge.source, edge.target
            ),
        }
    }

    let unsatisfied: Vec<RequiredConnection> = scenario
        .required_connections
        .iter()
        .filter(|rc| !wired.contains(&(rc.source.as_str(), rc.target.as_str())))
        .cloned()
        .collect();
    let satisfied = total_connections - unsatisfied.len();

    // Step 3: overall validity.
    let complete = satisfied == total_connections;
    let progress = if complete {
        100
    } else {
        let share = satisfied as f64 / total_connections as f64 * COMPONENT_SHARE;
        (COMPONENT_SHARE as u8 + share.round() as u8).min(99)
    };
    debug!(
        "{}: {} of {} required connections wired, progress {}",
        scenario.key, satisfied, total_connections, progress
    );

    Evaluation {
        progress,
        stage: if complete {
            Stage::Complete
        } else {
            Stage::ComponentsReady
        },
        component_coverage,
        missing_component_types: Vec::new(),
        satisfied_connections: satisfied,
        total_connections,
        unsatisfied_connections: unsatisfied,
        complete,
    }
}

/// `part / whole` as a rounded percentage; an empty whole counts as covered.
fn percent(part: usize, whole: usize) -> u8 {
    if whole == 0 {
        return 100;
    }
    (part as f64 / whole as f64 * 100.0).round() as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use pretty_assertions::assert_eq;

    fn farming() -> Scenario {
        Catalog::builtin().unwrap().scenario("farming").unwrap().clone()
    }

    fn nodes_for(types: &[&str]) -> Vec<Node> {
        types.iter().map(|t| Node::new(format!("{}-1", t), *t)).collect()
    }

    fn edges_for(pairs: &[(&str, &str)]) -> Vec<Edge> {
        pairs
            .iter()
            .map(|(s, t)| Edge::new(format!("{}-1", s), format!("{}-1", t)))
            .collect()
    }

    const FARMING_PAIRS: [(&str, &str); 8] = [
        ("soil_sensor", "microcontroller"),
        ("temp_sensor", "microcontroller"),
        ("microcontroller", "wifi"),
        ("wifi", "gateway"),
        ("gateway", "mqtt"),
        ("mqtt", "cloud_server"),
        ("cloud_server", "dashboard"),
        ("dashboard", "irrigation_system"),
    ];

    #[test]
    fn edge_legality_is_directional() {
        let s = farming();
        assert!(is_edge_valid(&s, "soil_sensor", "microcontroller"));
        assert!(!is_edge_valid(&s, "microcontroller", "soil_sensor"));
        assert!(!is_edge_valid(&s, "soil_sensor", "dashboard"));
        assert!(is_edge_valid(&s, "microcontroller", "lorawan"));
        // irrigation_system has no rule at all.
        assert!(!is_edge_valid(&s, "irrigation_system", "dashboard"));
        assert!(!is_edge_valid(&s, "not_a_type", "gateway"));
    }

    #[test]
    fn partial_components_floor_to_half() {
        let s = farming();
        let nodes = nodes_for(&["soil_sensor", "temp_sensor", "wifi", "light_sensor"]);
        let eval = evaluate(&s, &nodes, &[]);
        // 3 of 9 required -> floor(16.67)
        assert_eq!(eval.progress, 16);
        assert_eq!(eval.stage, Stage::Incomplete);
        assert_eq!(eval.component_coverage, 33);
        assert_eq!(
            eval.missing_component_types,
            vec![
                "microcontroller",
                "gateway",
                "mqtt",
                "cloud_server",
                "dashboard",
                "irrigation_system",
            ]
        );
        assert_eq!(eval.satisfied_connections, 0);
        assert_eq!(eval.total_connections, 8);
        assert_eq!(eval.unsatisfied_connections.len(), 8);
    }

    #[test]
    fn duplicate_nodes_count_once() {
        let s = farming();
        let nodes = vec![
            Node::new("a", "soil_sensor"),
            Node::new("b", "soil_sensor"),
            Node::new("c", "soil_sensor"),
        ];
        let eval = evaluate(&s, &nodes, &[]);
        assert_eq!(eval.progress, 5); // floor(1/9 * 50)
        assert_eq!(eval.missing_component_types.len(), 8);
    }

    #[test]
    fn connections_are_not_assessed_until_components_are_placed() {
        let s = farming();
        let nodes = nodes_for(&["soil_sensor", "microcontroller"]);
        let edges = edges_for(&[("soil_sensor", "microcontroller")]);
        let eval = evaluate(&s, &nodes, &edges);
        assert_eq!(eval.satisfied_connections, 0);
        assert_eq!(eval.stage, Stage::Incomplete);
    }

    #[test]
    fn connection_progress_rounds() {
        let s = farming();
        let nodes = nodes_for(&s.required_components.iter().map(String::as_str).collect::<Vec<_>>());
        let eval = evaluate(&s, &nodes, &edges_for(&FARMING_PAIRS[..3]));
        // 50 + round(3/8 * 50) = 50 + round(18.75)
        assert_eq!(eval.progress, 69);
        assert_eq!(eval.stage, Stage::ComponentsReady);
        assert_eq!(eval.satisfied_connections, 3);
        assert_eq!(
            eval.unsatisfied_connections.first(),
            Some(&RequiredConnection::new("wifi", "gateway"))
        );
    }

    #[test]
    fn reversed_edge_does_not_satisfy_pair() {
        let s = farming();
        let nodes = nodes_for(&s.required_components.iter().map(String::as_str).collect::<Vec<_>>());
        let eval = evaluate(&s, &nodes, &edges_for(&[("microcontroller", "soil_sensor")]));
        assert_eq!(eval.satisfied_connections, 0);
        assert_eq!(eval.progress, 50);
    }

    #[test]
    fn dangling_edges_are_ignored() {
        let s = farming();
        let nodes = nodes_for(&s.required_components.iter().map(String::as_str).collect::<Vec<_>>());
        let mut edges = edges_for(&FARMING_PAIRS);
        edges.push(Edge::new("ghost", "gateway-1"));
        edges.push(Edge::new("gateway-1", "ghost"));
        let eval = evaluate(&s, &nodes, &edges);
        assert!(eval.complete);

        edges.retain(|e| e.target != "irrigation_system-1");
        edges.push(Edge::new("dashboard-1", "removed-node"));
        let eval = evaluate(&s, &nodes, &edges);
        assert!(!eval.complete);
        assert_eq!(eval.satisfied_connections, 7);
    }

    #[test]
    fn empty_required_sets_are_vacuously_covered() {
        let mut s = farming();
        s.required_components.clear();
        s.required_connections.clear();
        let eval = evaluate(&s, &[], &[]);
        assert_eq!(eval.progress, 100);
        assert_eq!(eval.component_coverage, 100);
        assert!(eval.complete);
    }

    #[test]
    fn empty_required_components_still_checks_connections() {
        let mut s = farming();
        s.required_components.clear();
        let eval = evaluate(&s, &[], &[]);
        assert_eq!(eval.progress, 50);
        assert_eq!(eval.stage, Stage::ComponentsReady);
    }

    #[test]
    fn nearly_complete_never_reports_full_progress() {
        let mut s = farming();
        s.required_connections = (0..200)
            .map(|_| RequiredConnection::new("soil_sensor", "microcontroller"))
            .collect();
        s.required_connections
            .push(RequiredConnection::new("wifi", "gateway"));
        let nodes = nodes_for(&s.required_components.iter().map(String::as_str).collect::<Vec<_>>());
        let eval = evaluate(&s, &nodes, &edges_for(&[("soil_sensor", "microcontroller")]));
        assert!(!eval.complete);
        assert_eq!(eval.progress, 99);
    }
}

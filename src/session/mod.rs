//! Host-side state for one scenario run.
//!
//! A `Session` owns the placed nodes and drawn edges, classifies each new
//! edge, and re-evaluates synchronously after every confirmed mutation.
//! It also owns the one-shot "already completed" flag, so the completion
//! notice fires at most once even if the user removes and re-adds wiring.

pub mod notice;

pub use notice::{Notice, Severity, readable_type_name};

use crate::catalog::Scenario;
use crate::graph::{Edge, Node, Snapshot};
use crate::validate::{self, Evaluation, Stage};
use log::{debug, info};
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum SessionError {
    #[error("component type '{component}' is not available in scenario '{scenario}'")]
    UnknownComponentType { scenario: String, component: String },
    #[error("no node with id '{0}'")]
    UnknownNode(String),
    #[error("a node with id '{0}' already exists")]
    DuplicateNode(String),
    #[error("no edge {0}")]
    UnknownEdge(String),
}

/// Result of a confirmed mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Update {
    /// Id of the node or edge created by the mutation, if any.
    pub created: Option<String>,
    pub evaluation: Evaluation,
    pub notices: Vec<Notice>,
}

#[derive(Debug, Clone)]
pub struct Session<'a> {
    scenario: &'a Scenario,
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    next_node: u64,
    next_edge: u64,
    already_completed: bool,
    evaluation: Evaluation,
}

impl<'a> Session<'a> {
    pub fn new(scenario: &'a Scenario) -> Self {
        Self::restore(scenario, Snapshot::default())
    }

    /// Rebuild a session from a saved snapshot. Edge validity is recomputed
    /// against the current rules. Edges without an id, or sharing one with
    /// an earlier edge, get a fresh id.
    pub fn restore(scenario: &'a Scenario, snapshot: Snapshot) -> Self {
        let Snapshot { nodes, mut edges } = snapshot;
        let mut next_edge = 0;
        for i in 0..edges.len() {
            let taken = edges[i].id.is_empty() || edges[..i].iter().any(|e| e.id == edges[i].id);
            if taken {
                let (source, target) = (edges[i].source.clone(), edges[i].target.clone());
                edges[i].id = fresh_edge_id(&edges, &source, &target, &mut next_edge);
            }
            let valid = classify(scenario, &nodes, &edges[i].source, &edges[i].target);
            edges[i].valid = valid;
        }
        let evaluation = validate::evaluate(scenario, &nodes, &edges);
        Self {
            scenario,
            next_node: nodes.len() as u64 + 1,
            next_edge,
            nodes,
            edges,
            already_completed: false,
            evaluation,
        }
    }

    /// Seed the one-shot flag, typically from the progress tracker.
    pub fn set_already_completed(&mut self, completed: bool) {
        self.already_completed = completed;
    }

    pub fn already_completed(&self) -> bool {
        self.already_completed
    }

    pub fn scenario(&self) -> &Scenario {
        self.scenario
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn edge(&self, id: &str) -> Option<&Edge> {
        self.edges.iter().find(|e| e.id == id)
    }

    /// Latest evaluation.
    pub fn evaluation(&self) -> &Evaluation {
        &self.evaluation
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            nodes: self.nodes.clone(),
            edges: self.edges.clone(),
        }
    }

    /// Place a node with a generated id (`<type>-<n>`).
    pub fn add_node(&mut self, component_type: &str) -> Result<Update, SessionError> {
        let id = loop {
            let candidate = format!("{}-{}", component_type, self.next_node);
            self.next_node += 1;
            if !self.has_node(&candidate) {
                break candidate;
            }
        };
        self.add_node_with_id(&id, component_type)
    }

    pub fn add_node_with_id(&mut self, id: &str, component_type: &str) -> Result<Update, SessionError> {
        if !self.scenario.has_component(component_type) {
            return Err(SessionError::UnknownComponentType {
                scenario: self.scenario.key.clone(),
                component: component_type.to_string(),
            });
        }
        if self.has_node(id) {
            return Err(SessionError::DuplicateNode(id.to_string()));
        }
        self.nodes.push(Node::new(id, component_type));
        debug!("{}: placed {} ({})", self.scenario.key, id, component_type);
        Ok(self.reevaluate(Some(id.to_string()), Vec::new()))
    }

    /// Draw an edge. The edge is kept even when the rules reject it; it is
    /// tagged `valid: false` and an `InvalidConnection` notice is returned.
    pub fn connect(&mut self, source: &str, target: &str) -> Result<Update, SessionError> {
        let source_type = self.node_type(source)?.to_string();
        let target_type = self.node_type(target)?.to_string();
        let valid = validate::is_edge_valid(self.scenario, &source_type, &target_type);

        let id = fresh_edge_id(&self.edges, source, target, &mut self.next_edge);
        self.edges.push(Edge {
            id: id.clone(),
            source: source.to_string(),
            target: target.to_string(),
            valid: Some(valid),
        });

        let mut notices = Vec::new();
        if !valid {
            notices.push(Notice::InvalidConnection {
                source: self.scenario.label_of(&source_type).to_string(),
                target: self.scenario.label_of(&target_type).to_string(),
            });
        }
        Ok(self.reevaluate(Some(id), notices))
    }

    /// Remove a node together with every edge touching it.
    pub fn remove_node(&mut self, id: &str) -> Result<Update, SessionError> {
        if !self.has_node(id) {
            return Err(SessionError::UnknownNode(id.to_string()));
        }
        self.nodes.retain(|n| n.id != id);
        self.edges.retain(|e| e.source != id && e.target != id);
        Ok(self.reevaluate(None, Vec::new()))
    }

    pub fn remove_edge(&mut self, edge_id: &str) -> Result<Update, SessionError> {
        let idx = self
            .edges
            .iter()
            .position(|e| e.id == edge_id)
            .ok_or_else(|| SessionError::UnknownEdge(edge_id.to_string()))?;
        self.edges.remove(idx);
        Ok(self.reevaluate(None, Vec::new()))
    }

    /// Remove the most recently drawn edge from `source` to `target`.
    pub fn remove_edge_between(&mut self, source: &str, target: &str) -> Result<Update, SessionError> {
        let idx = self
            .edges
            .iter()
            .rposition(|e| e.source == source && e.target == target)
            .ok_or_else(|| SessionError::UnknownEdge(format!("{} -> {}", source, target)))?;
        self.edges.remove(idx);
        Ok(self.reevaluate(None, Vec::new()))
    }

    /// Clear the canvas. The completion flag survives.
    pub fn reset(&mut self) -> Update {
        self.nodes.clear();
        self.edges.clear();
        self.reevaluate(None, Vec::new())
    }

    fn has_node(&self, id: &str) -> bool {
        self.nodes.iter().any(|n| n.id == id)
    }

    fn node_type(&self, id: &str) -> Result<&str, SessionError> {
        type_of(&self.nodes, id).ok_or_else(|| SessionError::UnknownNode(id.to_string()))
    }

    fn reevaluate(&mut self, created: Option<String>, mut notices: Vec<Notice>) -> Update {
        let evaluation = validate::evaluate(self.scenario, &self.nodes, &self.edges);
        let moved = evaluation.progress != self.evaluation.progress;

        match evaluation.stage {
            Stage::Incomplete => {
                let cov = evaluation.component_coverage;
                if moved && cov > 0 && cov % 25 == 0 {
                    notices.push(Notice::MissingComponents {
                        missing: evaluation
                            .missing_component_types
                            .iter()
                            .map(|t| readable_type_name(t))
                            .collect(),
                    });
                }
            }
            Stage::ComponentsReady => {
                let k = evaluation.satisfied_connections;
                let n = evaluation.total_connections;
                let share = evaluation.progress.saturating_sub(50);
                if moved && k > 0 && (share % 10 == 0 || k + 1 == n) {
                    notices.push(Notice::ConnectionProgress {
                        satisfied: k,
                        total: n,
                    });
                }
            }
            Stage::Complete => {
                if !self.already_completed {
                    info!("{}: scenario complete", self.scenario.key);
                    self.already_completed = true;
                    notices.push(Notice::Completed);
                }
            }
        }

        self.evaluation = evaluation.clone();
        Update {
            created,
            evaluation,
            notices,
        }
    }
}

/// `None` when either endpoint is missing.
fn classify(scenario: &Scenario, nodes: &[Node], source: &str, target: &str) -> Option<bool> {
    let source_type = type_of(nodes, source)?;
    let target_type = type_of(nodes, target)?;
    Some(validate::is_edge_valid(scenario, source_type, target_type))
}

/// `e-<source>-<target>-<n>`, skipping ids already in use.
fn fresh_edge_id(edges: &[Edge], source: &str, target: &str, next: &mut u64) -> String {
    loop {
        let candidate = format!("e-{}-{}-{}", source, target, next);
        *next += 1;
        if !edges.iter().any(|e| e.id == candidate) {
            return candidate;
        }
    }
}

fn type_of<'n>(nodes: &'n [Node], id: &str) -> Option<&'n str> {
    nodes
        .iter()
        .find(|n| n.id == id)
        .map(|n| n.component_type.as_str())
}

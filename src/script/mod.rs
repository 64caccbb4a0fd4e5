//! Replay scripts: a line-based log of user actions on the canvas.

pub mod parse;

pub use parse::{parse_script, parse_script_file};

use crate::session::{Session, SessionError, Update};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Add { id: String, component_type: String },
    Connect { source: String, target: String },
    RemoveNode { id: String },
    /// Removes the most recent edge between the two nodes.
    RemoveEdge { source: String, target: String },
    Reset,
}

/// One parsed action with its 1-based line number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    pub line: usize,
    pub action: Action,
}

impl Action {
    pub fn apply(&self, session: &mut Session<'_>) -> Result<Update, SessionError> {
        match self {
            Action::Add { id, component_type } => session.add_node_with_id(id, component_type),
            Action::Connect { source, target } => session.connect(source, target),
            Action::RemoveNode { id } => session.remove_node(id),
            Action::RemoveEdge { source, target } => session.remove_edge_between(source, target),
            Action::Reset => Ok(session.reset()),
        }
    }
}

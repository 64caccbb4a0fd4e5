//! Wiring validator for IoT scenario exercises.
//!
//! Users place component nodes and draw directed edges; this crate judges each
//! edge against the scenario's adjacency rules and scores the graph against
//! the scenario's required components and connections.
//!
//! - `catalog`: scenario data (built-in JSON or a custom file)
//! - `validate`: pure edge check and progress evaluation
//! - `session`: host-side canvas state, notices, one-shot completion
//! - `store`: snapshot persistence and cross-scenario progress
//! - `script`: replayable action scripts

pub mod catalog;
pub mod graph;
pub mod script;
pub mod session;
pub mod store;
pub mod validate;

pub use catalog::{Catalog, CatalogError, Scenario};
pub use graph::{Edge, Node, Snapshot};
pub use session::{Notice, Session, SessionError, Update};
pub use validate::{Evaluation, Stage, evaluate, is_edge_valid};

pub type Result<T> = anyhow::Result<T>;

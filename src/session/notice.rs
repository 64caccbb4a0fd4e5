use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Info,
    Error,
    Success,
}

/// Advisory message produced by a session mutation. Hosts decide how to show it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Notice {
    /// An edge was drawn that the adjacency rules do not allow.
    InvalidConnection { source: String, target: String },
    /// Some required types are still missing (readable names).
    MissingComponents { missing: Vec<String> },
    ConnectionProgress { satisfied: usize, total: usize },
    /// First transition into the complete state for this session.
    Completed,
}

impl Notice {
    pub fn severity(&self) -> Severity {
        match self {
            Notice::InvalidConnection { .. } => Severity::Error,
            Notice::MissingComponents { .. } | Notice::ConnectionProgress { .. } => Severity::Info,
            Notice::Completed => Severity::Success,
        }
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::InvalidConnection { source, target } => {
                write!(f, "Invalid connection: {} cannot connect to {}", source, target)
            }
            Notice::MissingComponents { missing } => {
                write!(f, "Making progress! You still need to add: {}", missing.join(", "))
            }
            Notice::ConnectionProgress { satisfied, total } => write!(
                f,
                "You've connected {} of {} required components. Keep going!",
                satisfied, total
            ),
            Notice::Completed => f.write_str(
                "Great job! All components are correctly connected! The system is now fully functional!",
            ),
        }
    }
}

/// `blood_pressure_monitor` -> `Blood Pressure Monitor`
pub fn readable_type_name(id: &str) -> String {
    id.split('_')
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

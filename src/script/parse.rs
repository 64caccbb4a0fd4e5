use crate::script::{Action, Step};
use anyhow::{Context, bail};
use regex::Regex;
use std::fs;

/// Parse a replay script file into steps.
///
/// Grammar (one action per line, `#` starts a comment):
/// add <node-id> <type>
/// connect <source-id> -> <target-id>
/// remove-node <node-id>
/// remove-edge <source-id> -> <target-id>
/// reset
pub fn parse_script_file(path: &str) -> anyhow::Result<Vec<Step>> {
    let text = fs::read_to_string(path).with_context(|| format!("read script file {}", path))?;
    parse_script(&text, path)
}

/// Parse script text; `origin` names the source in error messages.
pub fn parse_script(text: &str, origin: &str) -> anyhow::Result<Vec<Step>> {
    let add = Regex::new(r"^add\s+(\S+)\s+(\S+)$")?;
    let connect = Regex::new(r"^connect\s+(\S+?)\s*->\s*(\S+)$")?;
    let remove_node = Regex::new(r"^remove-node\s+(\S+)$")?;
    let remove_edge = Regex::new(r"^remove-edge\s+(\S+?)\s*->\s*(\S+)$")?;

    let mut out = Vec::new();
    for (lineno, raw) in text.lines().enumerate() {
        let lno = lineno + 1;
        let line = raw.split('#').next().unwrap_or("").trim();
        if line.is_empty() {
            continue;
        }

        let action = if let Some(c) = add.captures(line) {
            Action::Add {
                id: c[1].to_string(),
                component_type: c[2].to_string(),
            }
        } else if let Some(c) = connect.captures(line) {
            Action::Connect {
                source: c[1].to_string(),
                target: c[2].to_string(),
            }
        } else if let Some(c) = remove_node.captures(line) {
            Action::RemoveNode {
                id: c[1].to_string(),
            }
        } else if let Some(c) = remove_edge.captures(line) {
            Action::RemoveEdge {
                source: c[1].to_string(),
                target: c[2].to_string(),
            }
        } else if line == "reset" {
            Action::Reset
        } else {
            bail!(
                "script parse error at {}:{}: cannot parse line: {:?}",
                origin,
                lno,
                line
            );
        };

        out.push(Step { line: lno, action });
    }

    Ok(out)
}

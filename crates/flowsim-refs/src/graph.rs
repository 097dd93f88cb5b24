//! Append-only mermaid `gitGraph` description.

use std::fmt;

use serde::{Deserialize, Serialize};

const HEADER: &str = "%%{init: { 'theme': 'base', 'gitGraph': {'mainBranchName': 'master', 'mainBranchOrder': 6}} }%%\ngitGraph\n";

/// Mermaid text describing the branch history, one fragment per accepted
/// operation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GraphDescription(String);

impl GraphDescription {
    /// A graph holding only master's initial tagged commit.
    pub fn new(initial_tag: &str) -> Self {
        Self(format!("{HEADER}commit tag: \"{initial_tag}\"\n"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the text still carries the mermaid header.
    pub fn has_header(&self) -> bool {
        self.0.starts_with(HEADER)
    }

    pub fn branch(&mut self, source: &str, name: &str, order: i32) {
        self.0
            .push_str(&format!("checkout {source}\nbranch {name} order: {order}\ncommit\n"));
    }

    pub fn commit(&mut self, branch: &str, message: &str) {
        self.0
            .push_str(&format!("checkout {branch}\ncommit tag: \"{message}\"\n"));
    }

    pub fn merge(&mut self, source: &str, target: &str, version: Option<&str>) {
        let line = match version {
            Some(version) => format!("checkout {target}\nmerge {source} tag: \"{version}\"\n"),
            None => format!("checkout {target}\nmerge {source}\n"),
        };
        self.0.push_str(&line);
    }
}

impl Default for GraphDescription {
    fn default() -> Self {
        Self::new("v0.5")
    }
}

impl fmt::Display for GraphDescription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

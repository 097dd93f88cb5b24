//! Simulator configuration, loaded from TOML.

use std::fs;
use std::path::{Path, PathBuf};

use flowsim_refs::RuleConfig;
use serde::{Deserialize, Serialize};

use crate::error::{SdkError, SdkResult};

/// Default location of the persisted simulation state.
pub const DEFAULT_STATE_FILE: &str = ".flowsim.json";

/// Settings for a [`Simulator`](crate::Simulator).
///
/// ```toml
/// state_file = "demo.json"
///
/// [rules]
/// max_feature_branches = 3
/// max_commit_message_len = 10
/// initial_tag = "v0.5"
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub rules: RuleConfig,
    pub state_file: PathBuf,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            rules: RuleConfig::default(),
            state_file: PathBuf::from(DEFAULT_STATE_FILE),
        }
    }
}

impl SimConfig {
    /// Parse a TOML document. Missing keys keep their defaults.
    pub fn from_toml_str(text: &str) -> SdkResult<Self> {
        Ok(toml::from_str(text)?)
    }

    pub fn load(path: impl AsRef<Path>) -> SdkResult<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| SdkError::io(path, e))?;
        Self::from_toml_str(&text)
    }
}

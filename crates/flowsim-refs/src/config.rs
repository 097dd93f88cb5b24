//! Tunable limits for the branch rule engine.

use serde::{Deserialize, Serialize};

/// Limits and defaults applied by [`BranchEngine`](crate::BranchEngine).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleConfig {
    /// Maximum number of feature branches.
    pub max_feature_branches: usize,
    /// Maximum commit message length, in characters.
    pub max_commit_message_len: usize,
    /// Tag carried by master when the engine is created.
    pub initial_tag: String,
}

impl Default for RuleConfig {
    fn default() -> Self {
        Self {
            max_feature_branches: 3,
            max_commit_message_len: 10,
            initial_tag: "v0.5".into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = RuleConfig::default();
        assert_eq!(config.max_feature_branches, 3);
        assert_eq!(config.max_commit_message_len, 10);
        assert_eq!(config.initial_tag, "v0.5");
    }

    #[test]
    fn missing_keys_fall_back() {
        let config: RuleConfig =
            serde_json::from_str(r#"{ "max_commit_message_len": 20 }"#).unwrap();
        assert_eq!(config.max_commit_message_len, 20);
        assert_eq!(config.max_feature_branches, 3);
    }
}

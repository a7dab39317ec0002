// Copyright (c) 2025 - Cowboy AI, Inc.
//! Engine configuration
//!
//! Built in code with [`EngineConfig::new`] or read from the environment:
//!
//! | Variable | Default |
//! |---|---|
//! | `EKS_CLUSTERS_CONFIG_PATH` | required |
//! | `EKS_MIN_SIZE_FLOOR` | `0` |
//! | `EKS_CONTINUE_ON_ERROR` | `false` |
//! | `EKS_CLUSTER_FILE_NAME` | `config.yaml` |
//! | `EKS_NODE_GROUP_DIR` | `nodegroups` |

use std::path::PathBuf;

use crate::domain::{MinSizeFloor, ValidationPolicy};
use crate::errors::{ProvisionError, ProvisionResult};

pub use crate::orchestrator::RunPolicy;

pub const ENV_ROOT_DIR: &str = "EKS_CLUSTERS_CONFIG_PATH";
pub const ENV_MIN_SIZE_FLOOR: &str = "EKS_MIN_SIZE_FLOOR";
pub const ENV_CONTINUE_ON_ERROR: &str = "EKS_CONTINUE_ON_ERROR";
pub const ENV_CLUSTER_FILE_NAME: &str = "EKS_CLUSTER_FILE_NAME";
pub const ENV_NODE_GROUP_DIR: &str = "EKS_NODE_GROUP_DIR";

pub const DEFAULT_CLUSTER_FILE_NAME: &str = "config.yaml";
pub const DEFAULT_NODE_GROUP_DIR: &str = "nodegroups";

/// Settings for one load-and-provision run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Root of the cluster configuration tree
    pub root_dir: PathBuf,
    pub validation: ValidationPolicy,
    pub run_policy: RunPolicy,
    /// Sentinel file name marking a cluster directory
    pub cluster_file_name: String,
    /// Subdirectory (next to the cluster file) holding node-group files
    pub node_group_dir: String,
}

impl EngineConfig {
    pub fn new(root_dir: impl Into<PathBuf>) -> Self {
        Self {
            root_dir: root_dir.into(),
            validation: ValidationPolicy::default(),
            run_policy: RunPolicy::default(),
            cluster_file_name: DEFAULT_CLUSTER_FILE_NAME.to_string(),
            node_group_dir: DEFAULT_NODE_GROUP_DIR.to_string(),
        }
    }

    pub fn with_min_size_floor(mut self, floor: MinSizeFloor) -> Self {
        self.validation.min_size_floor = floor;
        self
    }

    pub fn with_run_policy(mut self, policy: RunPolicy) -> Self {
        self.run_policy = policy;
        self
    }

    /// Load configuration from environment variables
    pub fn from_env() -> ProvisionResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through `lookup`, which returns `None` for unset keys
    pub fn from_lookup<F>(lookup: F) -> ProvisionResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let root_dir = lookup(ENV_ROOT_DIR)
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| ProvisionError::Configuration(format!("{} not set", ENV_ROOT_DIR)))?;

        let mut config = Self::new(root_dir);

        if let Some(value) = lookup(ENV_MIN_SIZE_FLOOR) {
            config.validation.min_size_floor = match value.trim() {
                "0" => MinSizeFloor::Zero,
                "1" => MinSizeFloor::One,
                other => {
                    return Err(ProvisionError::Configuration(format!(
                        "{} must be 0 or 1, got {:?}",
                        ENV_MIN_SIZE_FLOOR, other
                    )))
                }
            };
        }

        if let Some(value) = lookup(ENV_CONTINUE_ON_ERROR) {
            config.run_policy = match value.trim().to_ascii_lowercase().as_str() {
                "true" | "1" | "yes" => RunPolicy::ContinueOnError,
                "false" | "0" | "no" => RunPolicy::FailFast,
                _ => {
                    return Err(ProvisionError::Configuration(format!(
                        "{} must be true or false, got {:?}",
                        ENV_CONTINUE_ON_ERROR, value
                    )))
                }
            };
        }

        if let Some(name) = lookup(ENV_CLUSTER_FILE_NAME) {
            config.cluster_file_name = plain_file_name(ENV_CLUSTER_FILE_NAME, name)?;
        }

        if let Some(name) = lookup(ENV_NODE_GROUP_DIR) {
            config.node_group_dir = plain_file_name(ENV_NODE_GROUP_DIR, name)?;
        }

        Ok(config)
    }
}

/// A single path component: non-empty, no separators
fn plain_file_name(key: &str, value: String) -> ProvisionResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() || trimmed.contains(['/', '\\']) || trimmed == "." || trimmed == ".." {
        return Err(ProvisionError::Configuration(format!(
            "{} must be a plain file name, got {:?}",
            key, value
        )));
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = EngineConfig::from_lookup(lookup(&[(ENV_ROOT_DIR, "/srv/clusters")])).unwrap();
        assert_eq!(config, EngineConfig::new("/srv/clusters"));
        assert_eq!(config.validation.min_size_floor, MinSizeFloor::Zero);
        assert_eq!(config.run_policy, RunPolicy::FailFast);
        assert_eq!(config.cluster_file_name, "config.yaml");
        assert_eq!(config.node_group_dir, "nodegroups");
    }

    #[test]
    fn test_missing_root_is_an_error() {
        let err = EngineConfig::from_lookup(lookup(&[])).unwrap_err();
        assert!(matches!(err, ProvisionError::Configuration(_)));
    }

    #[test]
    fn test_overrides() {
        let config = EngineConfig::from_lookup(lookup(&[
            (ENV_ROOT_DIR, "clusters"),
            (ENV_MIN_SIZE_FLOOR, "1"),
            (ENV_CONTINUE_ON_ERROR, "TRUE"),
            (ENV_CLUSTER_FILE_NAME, "cluster.yaml"),
            (ENV_NODE_GROUP_DIR, "pools"),
        ]))
        .unwrap();

        assert_eq!(config.validation.min_size_floor, MinSizeFloor::One);
        assert_eq!(config.run_policy, RunPolicy::ContinueOnError);
        assert_eq!(config.cluster_file_name, "cluster.yaml");
        assert_eq!(config.node_group_dir, "pools");
    }

    #[test_case::test_case(ENV_MIN_SIZE_FLOOR, "2" ; "floor out of range")]
    #[test_case::test_case(ENV_CONTINUE_ON_ERROR, "maybe" ; "bad boolean")]
    #[test_case::test_case(ENV_NODE_GROUP_DIR, "a/b" ; "nested dir")]
    #[test_case::test_case(ENV_CLUSTER_FILE_NAME, "" ; "empty file name")]
    fn test_invalid_values(key: &str, value: &str) {
        let result = EngineConfig::from_lookup(lookup(&[(ENV_ROOT_DIR, "clusters"), (key, value)]));
        assert!(matches!(result, Err(ProvisionError::Configuration(_))));
    }
}

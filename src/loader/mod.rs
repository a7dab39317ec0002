// Copyright (c) 2025 - Cowboy AI, Inc.
//! Config Loader - directory tree to validated plan
//!
//! # Layout
//!
//! ```text
//! <root>/<cluster>/config.yaml
//! <root>/<cluster>/nodegroups/<anything>.yaml
//! ```
//!
//! # Pipeline (per file)
//!
//! ```text
//! read bytes -> parse -> validate -> append
//! ```
//!
//! # Rules
//!
//! - Files are visited depth-first in sorted name order, so two loads of an
//!   unchanged tree return identical lists
//! - The first file that fails any step ends the load; no partial list is
//!   returned
//! - Within that file every violation is reported
//! - Cluster discovery never looks inside node-group directories
//! - A cluster without a node-group directory owns no node groups

pub mod source;

use serde::de::DeserializeOwned;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use tracing::{debug, error, info};

pub use source::{walk_files, ConfigSource, FsSource, SourceEntry};

use crate::config::{EngineConfig, DEFAULT_CLUSTER_FILE_NAME, DEFAULT_NODE_GROUP_DIR};
use crate::domain::{
    ClusterConfig, ClusterPlan, NodeGroupConfig, NodeGroupEntry, ProvisioningPlan, Validate,
    ValidationPolicy,
};
use crate::errors::{ProvisionError, ProvisionResult};

const NODE_GROUP_EXTENSIONS: [&str; 2] = ["yaml", "yml"];

/// Loads and validates configuration records from a [`ConfigSource`]
#[derive(Debug, Clone)]
pub struct ConfigLoader<S: ConfigSource = FsSource> {
    source: S,
    policy: ValidationPolicy,
    cluster_file_name: String,
    node_group_dir: String,
}

impl Default for ConfigLoader<FsSource> {
    fn default() -> Self {
        Self::with_source(FsSource)
    }
}

impl ConfigLoader<FsSource> {
    pub fn new() -> Self {
        Self::default()
    }

    /// File-system loader using the engine's names and validation policy
    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new()
            .with_policy(config.validation)
            .with_layout(&config.cluster_file_name, &config.node_group_dir)
    }
}

impl<S: ConfigSource> ConfigLoader<S> {
    pub fn with_source(source: S) -> Self {
        Self {
            source,
            policy: ValidationPolicy::default(),
            cluster_file_name: DEFAULT_CLUSTER_FILE_NAME.to_string(),
            node_group_dir: DEFAULT_NODE_GROUP_DIR.to_string(),
        }
    }

    pub fn with_policy(mut self, policy: ValidationPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_layout(mut self, cluster_file_name: &str, node_group_dir: &str) -> Self {
        self.cluster_file_name = cluster_file_name.to_string();
        self.node_group_dir = node_group_dir.to_string();
        self
    }

    pub fn policy(&self) -> &ValidationPolicy {
        &self.policy
    }

    /// Phase one: every cluster file under `root_dir`
    ///
    /// Returned plans carry no node groups yet.
    pub fn load_cluster_configs(&self, root_dir: &Path) -> ProvisionResult<Vec<ClusterPlan>> {
        info!("Discovering cluster configs under {}", root_dir.display());

        let files = walk_files(&self.source, root_dir, |dir| self.is_node_group_dir(dir))?;
        let mut clusters = Vec::new();
        let mut seen: BTreeMap<String, PathBuf> = BTreeMap::new();

        for path in files {
            if path.file_name().and_then(|n| n.to_str()) != Some(self.cluster_file_name.as_str()) {
                continue;
            }

            let cluster: ClusterConfig = self.load_record(&path)?;
            if let Some(first) = seen.get(&cluster.name) {
                let err = ProvisionError::DuplicateCluster {
                    name: cluster.name.clone(),
                    path,
                    first: first.clone(),
                };
                error!("{}", err);
                return Err(err);
            }

            seen.insert(cluster.name.clone(), path.clone());
            clusters.push(ClusterPlan::new(path, cluster));
        }

        info!("Loaded {} cluster config(s)", clusters.len());
        Ok(clusters)
    }

    /// Phase two: node groups in `<cluster_dir>/<node_group_dir>`
    ///
    /// `cluster` is only used to name duplicates in errors.
    pub fn load_node_group_configs(
        &self,
        cluster: &str,
        cluster_dir: &Path,
    ) -> ProvisionResult<Vec<NodeGroupEntry>> {
        let dir = cluster_dir.join(&self.node_group_dir);
        if !self.source.is_dir(&dir) {
            debug!("No node-group directory for cluster {} at {}", cluster, dir.display());
            return Ok(Vec::new());
        }

        let files = walk_files(&self.source, &dir, |_| false)?;
        let mut node_groups = Vec::new();
        let mut seen = BTreeSet::new();

        for path in files {
            if !is_node_group_file(&path) {
                continue;
            }

            let config: NodeGroupConfig = self.load_record(&path)?;
            if !seen.insert(config.name.clone()) {
                let err = ProvisionError::DuplicateNodeGroup {
                    cluster: cluster.to_string(),
                    name: config.name,
                    path,
                };
                error!("{}", err);
                return Err(err);
            }

            node_groups.push(NodeGroupEntry { path, config });
        }

        info!(
            "Loaded {} node group config(s) for cluster {}",
            node_groups.len(),
            cluster
        );
        Ok(node_groups)
    }

    /// Both phases, paired explicitly
    pub fn load_plan(&self, root_dir: &Path) -> ProvisionResult<ProvisioningPlan> {
        let mut clusters = self.load_cluster_configs(root_dir)?;

        for plan in &mut clusters {
            let cluster_dir = plan.path.parent().unwrap_or(root_dir).to_path_buf();
            plan.node_groups = self.load_node_group_configs(&plan.cluster.name, &cluster_dir)?;
        }

        let plan = ProvisioningPlan::new(clusters);
        info!(
            "Plan ready: {} cluster(s), {} node group(s)",
            plan.clusters.len(),
            plan.node_group_count()
        );
        Ok(plan)
    }

    fn is_node_group_dir(&self, dir: &Path) -> bool {
        dir.file_name().and_then(|n| n.to_str()) == Some(self.node_group_dir.as_str())
    }

    /// Read, parse and validate one file
    fn load_record<T>(&self, path: &Path) -> ProvisionResult<T>
    where
        T: DeserializeOwned + Validate,
    {
        info!("Reading {}", path.display());

        let bytes = self
            .source
            .read(path)
            .map_err(|e| ProvisionError::ConfigRead {
                path: path.to_path_buf(),
                source: e,
            })?;

        let record: T = serde_yaml::from_slice(&bytes).map_err(|e| {
            let err = ProvisionError::ConfigParse {
                path: path.to_path_buf(),
                source: e,
            };
            error!("{}", err);
            err
        })?;

        record.validate(&self.policy).map_err(|e| {
            let err = ProvisionError::Validation {
                path: path.to_path_buf(),
                source: e,
            };
            error!("{}", err);
            err
        })?;

        debug!("Accepted {}", path.display());
        Ok(record)
    }
}

fn is_node_group_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| NODE_GROUP_EXTENSIONS.contains(&e))
}

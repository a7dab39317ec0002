// Copyright (c) 2025 - Cowboy AI, Inc.
//! Provisioning Plan - validated records paired with their owners
//!
//! The loader produces a plan in two phases: clusters first, then each
//! cluster's node groups. Ownership is the explicit `ClusterPlan` pairing,
//! never a path lookup at run time.

use serde::Serialize;
use std::path::PathBuf;

use super::{ClusterConfig, NodeGroupConfig};

/// A node-group record and the file it came from
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeGroupEntry {
    pub path: PathBuf,
    pub config: NodeGroupConfig,
}

/// One cluster and the node groups it owns, in load order
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClusterPlan {
    pub path: PathBuf,
    pub cluster: ClusterConfig,
    pub node_groups: Vec<NodeGroupEntry>,
}

impl ClusterPlan {
    pub fn new(path: impl Into<PathBuf>, cluster: ClusterConfig) -> Self {
        Self {
            path: path.into(),
            cluster,
            node_groups: Vec::new(),
        }
    }

    pub fn with_node_group(mut self, path: impl Into<PathBuf>, config: NodeGroupConfig) -> Self {
        self.node_groups.push(NodeGroupEntry {
            path: path.into(),
            config,
        });
        self
    }

    pub fn name(&self) -> &str {
        &self.cluster.name
    }
}

/// Everything one run will provision, in order
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProvisioningPlan {
    pub clusters: Vec<ClusterPlan>,
}

impl ProvisioningPlan {
    pub fn new(clusters: Vec<ClusterPlan>) -> Self {
        Self { clusters }
    }

    pub fn is_empty(&self) -> bool {
        self.clusters.is_empty()
    }

    pub fn node_group_count(&self) -> usize {
        self.clusters.iter().map(|c| c.node_groups.len()).sum()
    }

    pub fn cluster(&self, name: &str) -> Option<&ClusterPlan> {
        self.clusters.iter().find(|c| c.name() == name)
    }
}

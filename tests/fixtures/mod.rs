// Copyright (c) 2025 - Cowboy AI, Inc.
//! Test Fixtures for eks-orchestrator
//!
//! Deterministic configuration records and on-disk trees shared by the
//! integration tests. Identifiers are fixed constants so call logs compare
//! exactly across runs.
#![allow(dead_code)]

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use eks_orchestrator::domain::{ComputeConfig, ScalingConfig};
use eks_orchestrator::{ClusterConfig, ClusterPlan, NodeGroupConfig, ProvisioningPlan};

pub const SUBNET_A: &str = "subnet-0123456789abcdef0";
pub const SUBNET_B: &str = "subnet-0123456789abcdef1";
pub const NODE_SUBNET: &str = "subnet-fedcba9876543210f";
pub const SECURITY_GROUP: &str = "sg-0123456789abcdef0";
pub const EXISTING_ROLE_ARN: &str = "arn:aws:iam::123456789012:role/platform-eks";

/// Cluster YAML with an empty `identityRef`
pub fn cluster_yaml(name: &str) -> String {
    format!(
        r#"name: {name}
kubernetesVersion: "1.29"
identityRef: ""
serviceCidr: 10.100.0.0/16
publicAccessCidrs:
  - 0.0.0.0/0
securityGroupIds:
  - {SECURITY_GROUP}
subnetIds:
  - {SUBNET_A}
  - {SUBNET_B}
tags:
  team: platform
  env: test
"#
    )
}

/// Cluster YAML referencing an existing role
pub fn cluster_yaml_with_role(name: &str, role_arn: &str) -> String {
    cluster_yaml(name).replace(r#"identityRef: """#, &format!("identityRef: {}", role_arn))
}

/// Node-group YAML without subnets of its own
pub fn node_group_yaml(name: &str, min: i64, desired: i64, max: i64) -> String {
    format!(
        r#"name: {name}
scaling:
  desiredCapacity: {desired}
  minSize: {min}
  maxSize: {max}
compute:
  instanceTypes:
    - t3.medium
tags:
  team: platform
kubernetesLabels:
  role: worker
kubernetesTaints:
  - key: dedicated
    value: batch
    effect: NO_SCHEDULE
"#
    )
}

/// Node-group YAML with its own subnet list
pub fn node_group_yaml_with_subnets(name: &str, subnets: &[&str]) -> String {
    let mut yaml = node_group_yaml(name, 1, 2, 3);
    yaml.push_str("network:\n  subnetIds:\n");
    for subnet in subnets {
        yaml.push_str(&format!("    - {}\n", subnet));
    }
    yaml
}

/// Temporary `<root>/<cluster>/config.yaml` tree
pub struct ConfigTree {
    dir: TempDir,
}

impl ConfigTree {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().expect("Failed to create temp dir"),
        }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn write(&self, relative: &str, contents: &str) -> PathBuf {
        let path = self.dir.path().join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("Failed to create fixture dir");
        }
        fs::write(&path, contents).expect("Failed to write fixture file");
        path
    }

    pub fn cluster(&self, dir: &str, yaml: &str) -> PathBuf {
        self.write(&format!("{}/config.yaml", dir), yaml)
    }

    pub fn node_group(&self, cluster_dir: &str, file: &str, yaml: &str) -> PathBuf {
        self.write(&format!("{}/nodegroups/{}", cluster_dir, file), yaml)
    }
}

pub fn tags() -> BTreeMap<String, String> {
    BTreeMap::from([("team".to_string(), "platform".to_string())])
}

/// Valid cluster record built in code
pub fn valid_cluster(name: &str) -> ClusterConfig {
    ClusterConfig {
        name: name.to_string(),
        kubernetes_version: "1.29".to_string(),
        identity_ref: None,
        service_cidr: "10.100.0.0/16".to_string(),
        public_access_cidrs: vec!["0.0.0.0/0".to_string()],
        security_group_ids: vec![SECURITY_GROUP.to_string()],
        subnet_ids: vec![SUBNET_A.to_string(), SUBNET_B.to_string()],
        tags: tags(),
        enabled_log_types: Vec::new(),
    }
}

/// Valid node-group record built in code, inheriting cluster subnets
pub fn valid_node_group(name: &str) -> NodeGroupConfig {
    NodeGroupConfig {
        name: name.to_string(),
        scaling: ScalingConfig {
            desired_capacity: 2,
            min_size: 1,
            max_size: 3,
            max_unavailable: None,
        },
        compute: ComputeConfig {
            instance_types: vec!["t3.medium".to_string()],
            ..Default::default()
        },
        tags: tags(),
        ..Default::default()
    }
}

/// One cluster owning the named node groups
pub fn plan_with(cluster: ClusterConfig, node_groups: Vec<NodeGroupConfig>) -> ProvisioningPlan {
    let dir = cluster.name.clone();
    let mut plan = ClusterPlan::new(format!("{}/config.yaml", dir), cluster);
    for node_group in node_groups {
        let path = format!("{}/nodegroups/{}.yaml", dir, node_group.name);
        plan = plan.with_node_group(path, node_group);
    }
    ProvisioningPlan::new(vec![plan])
}

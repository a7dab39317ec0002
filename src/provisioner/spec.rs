// Copyright (c) 2025 - Cowboy AI, Inc.
//! Request specifications handed to the provisioner
//!
//! These are the provider-facing shapes: enums instead of literals, ARNs
//! instead of optional references, inherited values already substituted.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::ResourceKind;
use crate::domain::{
    CapacityType, ClusterConfig, ControlPlaneLogType, MaxUnavailableKind, NodeGroupConfig,
    TaintEffect, UnknownLiteral,
};

/// Desired state of one resource
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "spec", rename_all = "camelCase")]
pub enum ResourceSpec {
    Identity(RoleSpec),
    PermissionAttachment(PolicyAttachmentSpec),
    Cluster(ClusterSpec),
    NodeGroup(NodeGroupSpec),
}

impl ResourceSpec {
    pub fn kind(&self) -> ResourceKind {
        match self {
            ResourceSpec::Identity(_) => ResourceKind::Identity,
            ResourceSpec::PermissionAttachment(_) => ResourceKind::PermissionAttachment,
            ResourceSpec::Cluster(_) => ResourceKind::Cluster,
            ResourceSpec::NodeGroup(_) => ResourceKind::NodeGroup,
        }
    }
}

/// IAM role with its trust policy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleSpec {
    pub role_name: String,
    pub assume_role_policy: serde_json::Value,
    pub tags: BTreeMap<String, String>,
}

/// Managed policy attached to a role
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyAttachmentSpec {
    pub role_name: String,
    pub policy_arn: String,
}

/// EKS control plane
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterSpec {
    pub name: String,
    pub role_arn: String,
    pub version: String,
    pub service_ipv4_cidr: String,
    pub public_access_cidrs: Vec<String>,
    pub security_group_ids: Vec<String>,
    pub subnet_ids: Vec<String>,
    pub tags: BTreeMap<String, String>,
    pub enabled_log_types: Vec<ControlPlaneLogType>,
}

impl ClusterSpec {
    pub fn from_config(config: &ClusterConfig, role_arn: &str) -> Self {
        Self {
            name: config.name.clone(),
            role_arn: role_arn.to_string(),
            version: config.kubernetes_version.clone(),
            service_ipv4_cidr: config.service_cidr.clone(),
            public_access_cidrs: config.public_access_cidrs.clone(),
            security_group_ids: config.security_group_ids.clone(),
            subnet_ids: config.subnet_ids.clone(),
            tags: config.tags.clone(),
            enabled_log_types: config.log_types(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScalingSpec {
    pub desired_size: i64,
    pub min_size: i64,
    pub max_size: i64,
}

/// Node group update config
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum UpdateBudget {
    MaxUnavailable(i64),
    MaxUnavailablePercentage(i64),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaintSpec {
    pub key: String,
    pub value: String,
    pub effect: TaintEffect,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteAccessSpec {
    pub ec2_ssh_key: String,
    pub source_security_group_ids: Vec<String>,
}

/// EKS managed node group
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeGroupSpec {
    pub cluster_name: String,
    pub node_group_name: String,
    pub node_role_arn: String,
    pub subnet_ids: Vec<String>,
    pub scaling: ScalingSpec,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub update: Option<UpdateBudget>,
    pub instance_types: Vec<String>,
    pub capacity_type: CapacityType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ami_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disk_size_gib: Option<i64>,
    pub tags: BTreeMap<String, String>,
    pub labels: BTreeMap<String, String>,
    pub taints: Vec<TaintSpec>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote_access: Option<RemoteAccessSpec>,
}

impl NodeGroupSpec {
    /// Build the provider request for a validated node group
    ///
    /// A node group without subnets of its own takes `cluster_subnets`.
    /// Literal fields are parsed here; a record that passed validation never
    /// fails this step.
    pub fn from_config(
        config: &NodeGroupConfig,
        cluster_name: &str,
        node_role_arn: &str,
        cluster_subnets: &[String],
    ) -> Result<Self, UnknownLiteral> {
        let subnet_ids = if config.network.subnet_ids.is_empty() {
            cluster_subnets.to_vec()
        } else {
            config.network.subnet_ids.clone()
        };

        let update = config
            .scaling
            .max_unavailable
            .as_ref()
            .map(|budget| {
                budget
                    .kind
                    .parse::<MaxUnavailableKind>()
                    .map(|kind| match kind {
                        MaxUnavailableKind::Count => UpdateBudget::MaxUnavailable(budget.value),
                        MaxUnavailableKind::Percentage => {
                            UpdateBudget::MaxUnavailablePercentage(budget.value)
                        }
                    })
            })
            .transpose()?;

        let capacity_type = config
            .compute
            .capacity_type
            .as_deref()
            .filter(|c| !c.is_empty())
            .map(str::parse::<CapacityType>)
            .transpose()?
            .unwrap_or_default();

        let taints = config
            .kubernetes_taints
            .iter()
            .map(|taint| -> Result<TaintSpec, UnknownLiteral> {
                Ok(TaintSpec {
                    key: taint.key.clone(),
                    value: taint.value.clone(),
                    effect: taint.effect.parse()?,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let remote_access = config.network.key_pair().map(|key| RemoteAccessSpec {
            ec2_ssh_key: key.to_string(),
            source_security_group_ids: config.network.security_group_ids.clone(),
        });

        Ok(Self {
            cluster_name: cluster_name.to_string(),
            node_group_name: config.name.clone(),
            node_role_arn: node_role_arn.to_string(),
            subnet_ids,
            scaling: ScalingSpec {
                desired_size: config.scaling.desired_capacity,
                min_size: config.scaling.min_size,
                max_size: config.scaling.max_size,
            },
            update,
            instance_types: config.compute.instance_types.clone(),
            capacity_type,
            ami_type: config.compute.ami_type.clone().filter(|a| !a.is_empty()),
            disk_size_gib: config.compute.disk_size_gib,
            tags: config.tags.clone(),
            labels: config.kubernetes_labels.clone(),
            taints,
            remote_access,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{MaxUnavailableConfig, TaintConfig};

    fn cluster_subnets() -> Vec<String> {
        vec![
            "subnet-0123456789abcdef0".to_string(),
            "subnet-0123456789abcdef1".to_string(),
        ]
    }

    #[test]
    fn test_node_group_inherits_cluster_subnets() {
        let config = NodeGroupConfig {
            name: "workers".to_string(),
            ..Default::default()
        };
        let spec = NodeGroupSpec::from_config(&config, "demo", "arn", &cluster_subnets()).unwrap();
        assert_eq!(spec.subnet_ids, cluster_subnets());
        assert_eq!(spec.capacity_type, CapacityType::OnDemand);
        assert!(spec.remote_access.is_none());
    }

    #[test]
    fn test_node_group_keeps_own_subnets() {
        let mut config = NodeGroupConfig::default();
        config.network.subnet_ids = vec!["subnet-fffffffffffffffff".to_string()];
        let spec = NodeGroupSpec::from_config(&config, "demo", "arn", &cluster_subnets()).unwrap();
        assert_eq!(spec.subnet_ids, vec!["subnet-fffffffffffffffff".to_string()]);
    }

    #[test]
    fn test_literals_become_enums() {
        let mut config = NodeGroupConfig::default();
        config.compute.capacity_type = Some("SPOT".to_string());
        config.scaling.max_unavailable = Some(MaxUnavailableConfig {
            kind: "percentage".to_string(),
            value: 25,
        });
        config.kubernetes_taints = vec![TaintConfig {
            key: "dedicated".to_string(),
            value: "gpu".to_string(),
            effect: "NO_EXECUTE".to_string(),
        }];
        config.network.key_pair_ref = Some("ops".to_string());
        config.network.security_group_ids = vec!["sg-0123456789abcdef0".to_string()];

        let spec = NodeGroupSpec::from_config(&config, "demo", "arn", &[]).unwrap();
        assert_eq!(spec.capacity_type, CapacityType::Spot);
        assert_eq!(spec.update, Some(UpdateBudget::MaxUnavailablePercentage(25)));
        assert_eq!(spec.taints[0].effect, TaintEffect::NoExecute);
        assert_eq!(
            spec.remote_access,
            Some(RemoteAccessSpec {
                ec2_ssh_key: "ops".to_string(),
                source_security_group_ids: vec!["sg-0123456789abcdef0".to_string()],
            })
        );
    }

    #[test]
    fn test_unvalidated_literal_is_an_error() {
        let mut config = NodeGroupConfig::default();
        config.kubernetes_taints = vec![TaintConfig {
            key: "k".to_string(),
            value: String::new(),
            effect: "INVALID_EFFECT".to_string(),
        }];
        assert!(NodeGroupSpec::from_config(&config, "demo", "arn", &[]).is_err());
    }

    #[test]
    fn test_spec_serializes_with_kind_tag() {
        let spec = ResourceSpec::PermissionAttachment(PolicyAttachmentSpec {
            role_name: "demo-eks-cluster-role".to_string(),
            policy_arn: "arn:aws:iam::aws:policy/AmazonEKSClusterPolicy".to_string(),
        });
        let json = serde_json::to_value(&spec).unwrap();
        assert_eq!(json["kind"], "permissionAttachment");
        assert_eq!(json["spec"]["roleName"], "demo-eks-cluster-role");
        assert_eq!(spec.kind(), ResourceKind::PermissionAttachment);
    }
}

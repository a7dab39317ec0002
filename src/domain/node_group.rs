// Copyright (c) 2025 - Cowboy AI, Inc.
//! Node Group Configuration Record
//!
//! Parsed from every `.yaml`/`.yml` file in a cluster's node-group directory.
//! Ownership is given by that nesting; the record itself carries no cluster
//! reference.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use super::formats::UnknownLiteral;

/// Declarative description of one managed worker pool
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeGroupConfig {
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub scaling: ScalingConfig,

    #[serde(default)]
    pub network: NodeNetworkConfig,

    /// Existing node role; absent or empty means one is created
    #[serde(default, alias = "roleArn", skip_serializing_if = "Option::is_none")]
    pub identity_ref: Option<String>,

    #[serde(default)]
    pub compute: ComputeConfig,

    #[serde(default)]
    pub tags: BTreeMap<String, String>,

    #[serde(default, alias = "labels")]
    pub kubernetes_labels: BTreeMap<String, String>,

    #[serde(default, alias = "taints")]
    pub kubernetes_taints: Vec<TaintConfig>,
}

impl NodeGroupConfig {
    /// Reference to a pre-existing identity, if one was given
    pub fn existing_identity(&self) -> Option<&str> {
        self.identity_ref.as_deref().filter(|r| !r.is_empty())
    }
}

/// Size bounds of the pool
///
/// Kept signed so that a negative size in a file is reported as a
/// violation instead of a parse failure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScalingConfig {
    #[serde(default)]
    pub desired_capacity: i64,

    #[serde(default)]
    pub min_size: i64,

    #[serde(default)]
    pub max_size: i64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_unavailable: Option<MaxUnavailableConfig>,
}

/// Rolling-update budget: how many nodes may be unavailable at once
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaxUnavailableConfig {
    #[serde(rename = "type")]
    pub kind: String,

    pub value: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeNetworkConfig {
    /// Empty defers to the owning cluster's subnets at orchestration time
    #[serde(default)]
    pub subnet_ids: Vec<String>,

    /// EC2 key pair for SSH access to the nodes
    #[serde(default, alias = "ec2KeyPair", skip_serializing_if = "Option::is_none")]
    pub key_pair_ref: Option<String>,

    /// Source security groups allowed to reach the nodes over SSH
    #[serde(default)]
    pub security_group_ids: Vec<String>,
}

impl NodeNetworkConfig {
    pub fn key_pair(&self) -> Option<&str> {
        self.key_pair_ref.as_deref().filter(|k| !k.is_empty())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComputeConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ami_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capacity_type: Option<String>,

    #[serde(default)]
    pub instance_types: Vec<String>,

    #[serde(
        default,
        rename = "diskSizeGiB",
        alias = "diskSize",
        skip_serializing_if = "Option::is_none"
    )]
    pub disk_size_gib: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaintConfig {
    #[serde(default)]
    pub key: String,

    #[serde(default)]
    pub value: String,

    /// Kept as text so an unknown literal is a violation, not a parse error
    #[serde(default)]
    pub effect: String,
}

/// Kubernetes taint effect as the EKS API spells it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaintEffect {
    NoSchedule,
    PreferNoSchedule,
    NoExecute,
}

impl TaintEffect {
    pub const ALL: [TaintEffect; 3] = [
        TaintEffect::NoSchedule,
        TaintEffect::PreferNoSchedule,
        TaintEffect::NoExecute,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TaintEffect::NoSchedule => "NO_SCHEDULE",
            TaintEffect::PreferNoSchedule => "PREFER_NO_SCHEDULE",
            TaintEffect::NoExecute => "NO_EXECUTE",
        }
    }
}

impl fmt::Display for TaintEffect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaintEffect {
    type Err = UnknownLiteral;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|e| e.as_str() == s)
            .ok_or_else(|| UnknownLiteral::new("taint effect", s))
    }
}

/// Purchasing option for the pool's instances
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CapacityType {
    #[default]
    OnDemand,
    Spot,
}

impl FromStr for CapacityType {
    type Err = UnknownLiteral;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ON_DEMAND" => Ok(CapacityType::OnDemand),
            "SPOT" => Ok(CapacityType::Spot),
            other => Err(UnknownLiteral::new("capacity type", other)),
        }
    }
}

/// Unit of the `maxUnavailable` budget
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MaxUnavailableKind {
    Count,
    Percentage,
}

impl FromStr for MaxUnavailableKind {
    type Err = UnknownLiteral;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "count" => Ok(MaxUnavailableKind::Count),
            "percentage" => Ok(MaxUnavailableKind::Percentage),
            other => Err(UnknownLiteral::new("maxUnavailable type", other)),
        }
    }
}

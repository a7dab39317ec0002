// Copyright (c) 2025 - Cowboy AI, Inc.
//! Cluster Configuration Record
//!
//! One `ClusterConfig` is parsed from each `config.yaml` found under the
//! configuration root. Every field defaults when absent so that missing
//! required fields surface as validation violations rather than as parse
//! errors.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use super::formats::UnknownLiteral;

/// Declarative description of one managed Kubernetes control plane
///
/// # Invariants (checked by [`crate::domain::invariants`])
/// - `name`, `kubernetesVersion` non-empty
/// - `identityRef` empty, or a role ARN
/// - `serviceCidr` an IPv4 CIDR
/// - `publicAccessCidrs`, `securityGroupIds`, `subnetIds` non-empty, every
///   member well-formed
/// - `tags` holds at least one entry
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterConfig {
    #[serde(default)]
    pub name: String,

    #[serde(default, alias = "version")]
    pub kubernetes_version: String,

    /// Existing cluster role; absent or empty means one is created
    #[serde(default, alias = "roleArn", skip_serializing_if = "Option::is_none")]
    pub identity_ref: Option<String>,

    #[serde(default, alias = "serviceIpv4Cidr")]
    pub service_cidr: String,

    #[serde(default)]
    pub public_access_cidrs: Vec<String>,

    #[serde(default)]
    pub security_group_ids: Vec<String>,

    #[serde(default)]
    pub subnet_ids: Vec<String>,

    #[serde(default)]
    pub tags: BTreeMap<String, String>,

    /// Control-plane log types to ship; empty enables all of them
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub enabled_log_types: Vec<String>,
}

impl ClusterConfig {
    /// Reference to a pre-existing identity, if one was given
    pub fn existing_identity(&self) -> Option<&str> {
        self.identity_ref.as_deref().filter(|r| !r.is_empty())
    }

    /// Log types to enable on the control plane
    ///
    /// Entries that do not parse are skipped; validation has already
    /// rejected them for any record that reaches orchestration.
    pub fn log_types(&self) -> Vec<ControlPlaneLogType> {
        if self.enabled_log_types.is_empty() {
            return ControlPlaneLogType::ALL.to_vec();
        }

        self.enabled_log_types
            .iter()
            .filter_map(|t| t.parse().ok())
            .collect()
    }
}

/// EKS control-plane log stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ControlPlaneLogType {
    Api,
    Audit,
    Authenticator,
    ControllerManager,
    Scheduler,
}

impl ControlPlaneLogType {
    pub const ALL: [ControlPlaneLogType; 5] = [
        ControlPlaneLogType::Api,
        ControlPlaneLogType::Audit,
        ControlPlaneLogType::Authenticator,
        ControlPlaneLogType::ControllerManager,
        ControlPlaneLogType::Scheduler,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ControlPlaneLogType::Api => "api",
            ControlPlaneLogType::Audit => "audit",
            ControlPlaneLogType::Authenticator => "authenticator",
            ControlPlaneLogType::ControllerManager => "controllerManager",
            ControlPlaneLogType::Scheduler => "scheduler",
        }
    }
}

impl fmt::Display for ControlPlaneLogType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ControlPlaneLogType {
    type Err = UnknownLiteral;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| UnknownLiteral::new("control-plane log type", s))
    }
}

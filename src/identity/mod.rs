// Copyright (c) 2025 - Cowboy AI, Inc.
//! Identity Resolver
//!
//! Turns an optional role reference into a role the next resource can
//! depend on. One algorithm, parameterized by an [`IdentityProfile`]:
//!
//! ```text
//! requested_ref empty      -> create <prefix>-<suffix>, attach each policy in order
//! requested_ref non-empty  -> get(requested_ref), return it unmodified
//! ```
//!
//! # Rules
//!
//! - A failed lookup never falls back to creation
//! - A failed attachment fails the whole resolution; earlier attachments are
//!   left in place
//! - Cancellation is checked before every provisioner call

use serde_json::json;
use std::collections::BTreeMap;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::domain::{ClusterConfig, NodeGroupConfig};
use crate::errors::{IdentityStage, ProvisionError, ProvisionResult};
use crate::provisioner::{
    ensure_active, PolicyAttachmentSpec, Provisioner, ProvisionerError, ResourceHandle,
    ResourceKind, ResourceRequest, ResourceSpec, RoleSpec,
};

/// Trust principal and permission set for one kind of owner
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdentityProfile {
    pub role_suffix: &'static str,
    pub trust_principal: &'static str,
    pub permissions: &'static [&'static str],
}

/// Role assumed by the EKS control plane
pub const CLUSTER_IDENTITY: IdentityProfile = IdentityProfile {
    role_suffix: "eks-cluster-role",
    trust_principal: "eks.amazonaws.com",
    permissions: &["arn:aws:iam::aws:policy/AmazonEKSClusterPolicy"],
};

/// Role assumed by worker nodes
pub const NODE_GROUP_IDENTITY: IdentityProfile = IdentityProfile {
    role_suffix: "eks-nodegroup-role",
    trust_principal: "ec2.amazonaws.com",
    permissions: &[
        "arn:aws:iam::aws:policy/AmazonEKSWorkerNodePolicy",
        "arn:aws:iam::aws:policy/AmazonEKS_CNI_Policy",
        "arn:aws:iam::aws:policy/AmazonEC2ContainerRegistryReadOnly",
    ],
};

/// Everything needed to resolve one identity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityRequest {
    pub owner_kind: ResourceKind,
    pub owner: String,
    /// Existing role ARN; `None` means the role must be created
    pub requested_ref: Option<String>,
    pub name_prefix: String,
    pub role_suffix: String,
    pub trust_principal: String,
    pub permissions: Vec<String>,
    pub tags: BTreeMap<String, String>,
}

impl IdentityRequest {
    pub fn new(
        owner_kind: ResourceKind,
        owner: impl Into<String>,
        requested_ref: Option<&str>,
        profile: &IdentityProfile,
    ) -> Self {
        let owner = owner.into();
        Self {
            owner_kind,
            requested_ref: requested_ref
                .filter(|r| !r.is_empty())
                .map(str::to_string),
            name_prefix: owner.clone(),
            owner,
            role_suffix: profile.role_suffix.to_string(),
            trust_principal: profile.trust_principal.to_string(),
            permissions: profile.permissions.iter().map(|p| p.to_string()).collect(),
            tags: BTreeMap::new(),
        }
    }

    pub fn with_tags(mut self, tags: &BTreeMap<String, String>) -> Self {
        self.tags = tags.clone();
        self
    }

    pub fn for_cluster(cluster: &ClusterConfig) -> Self {
        Self::new(
            ResourceKind::Cluster,
            &cluster.name,
            cluster.existing_identity(),
            &CLUSTER_IDENTITY,
        )
        .with_tags(&cluster.tags)
    }

    /// Created roles are prefixed with the owning cluster, so equally named
    /// node groups of different clusters never share one.
    pub fn for_node_group(cluster: &str, node_group: &NodeGroupConfig) -> Self {
        let mut request = Self::new(
            ResourceKind::NodeGroup,
            &node_group.name,
            node_group.existing_identity(),
            &NODE_GROUP_IDENTITY,
        )
        .with_tags(&node_group.tags);
        request.name_prefix = format!("{}-{}", cluster, node_group.name);
        request
    }

    /// Name of the role this request would create
    pub fn role_name(&self) -> String {
        format!("{}-{}", self.name_prefix, self.role_suffix)
    }

    fn failure(&self, role: &str, stage: IdentityStage, source: ProvisionerError) -> ProvisionError {
        ProvisionError::IdentityResolution {
            owner_kind: self.owner_kind,
            owner: self.owner.clone(),
            role: role.to_string(),
            stage,
            source,
        }
    }
}

/// Role the owning resource can depend on
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentityHandle {
    Created {
        role: ResourceHandle,
        attachments: Vec<ResourceHandle>,
    },
    Existing(ResourceHandle),
}

impl IdentityHandle {
    pub fn role(&self) -> &ResourceHandle {
        match self {
            IdentityHandle::Created { role, .. } => role,
            IdentityHandle::Existing(role) => role,
        }
    }

    pub fn arn(&self) -> &str {
        &self.role().id
    }

    pub fn is_created(&self) -> bool {
        matches!(self, IdentityHandle::Created { .. })
    }
}

/// Trust policy allowing `principal` to assume the role
pub fn trust_policy(principal: &str) -> serde_json::Value {
    json!({
        "Version": "2012-10-17",
        "Statement": [{
            "Effect": "Allow",
            "Principal": { "Service": principal },
            "Action": "sts:AssumeRole"
        }]
    })
}

/// Short name of a managed policy (`.../AmazonEKSClusterPolicy` -> `AmazonEKSClusterPolicy`)
pub fn policy_name(policy_arn: &str) -> &str {
    policy_arn.rsplit('/').next().unwrap_or(policy_arn)
}

/// Create or look up the identity described by `request`
pub async fn resolve_identity(
    provisioner: &dyn Provisioner,
    cancel: &CancellationToken,
    request: &IdentityRequest,
) -> ProvisionResult<IdentityHandle> {
    if let Some(reference) = &request.requested_ref {
        ensure_active(cancel, || format!("looking up role {}", reference))?;
        info!(
            "Using existing role {} for {} {}",
            reference, request.owner_kind, request.owner
        );
        let role = provisioner
            .get(ResourceKind::Identity, reference)
            .await
            .map_err(|e| {
                request.failure(reference, IdentityStage::LookupExisting(reference.clone()), e)
            })?;
        return Ok(IdentityHandle::Existing(role));
    }

    let role_name = request.role_name();
    ensure_active(cancel, || format!("creating role {}", role_name))?;
    info!(
        "Creating role {} for {} {}",
        role_name, request.owner_kind, request.owner
    );

    let role = provisioner
        .create_or_update(ResourceRequest::new(
            &role_name,
            ResourceSpec::Identity(RoleSpec {
                role_name: role_name.clone(),
                assume_role_policy: trust_policy(&request.trust_principal),
                tags: request.tags.clone(),
            }),
        ))
        .await
        .map_err(|e| request.failure(&role_name, IdentityStage::CreateRole, e))?;

    let mut attachments = Vec::with_capacity(request.permissions.len());
    for policy_arn in &request.permissions {
        let policy = policy_name(policy_arn);
        ensure_active(cancel, || format!("attaching {} to {}", policy, role_name))?;
        debug!("Attaching {} to {}", policy_arn, role_name);

        let attachment = provisioner
            .create_or_update(
                ResourceRequest::new(
                    format!("{}-{}", role_name, policy),
                    ResourceSpec::PermissionAttachment(PolicyAttachmentSpec {
                        role_name: role.name.clone(),
                        policy_arn: policy_arn.clone(),
                    }),
                )
                .depends_on(&role),
            )
            .await
            .map_err(|e| {
                request.failure(&role_name, IdentityStage::AttachPolicy(policy.to_string()), e)
            })?;
        attachments.push(attachment);
    }

    Ok(IdentityHandle::Created { role, attachments })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provisioner::{ProvisionerCall, RecordingProvisioner};
    use pretty_assertions::assert_eq;

    fn cluster_request(reference: Option<&str>) -> IdentityRequest {
        IdentityRequest::new(ResourceKind::Cluster, "demo", reference, &CLUSTER_IDENTITY)
    }

    #[tokio::test]
    async fn test_empty_reference_creates_role_then_attachments() {
        let provisioner = RecordingProvisioner::new();
        let request = IdentityRequest::new(ResourceKind::NodeGroup, "workers", None, &NODE_GROUP_IDENTITY);

        let handle = resolve_identity(&provisioner, &CancellationToken::new(), &request)
            .await
            .unwrap();

        assert!(handle.is_created());
        assert_eq!(handle.role().name, "workers-eks-nodegroup-role");

        let requests = provisioner.requests();
        assert_eq!(requests.len(), 4);
        match &requests[0].spec {
            ResourceSpec::Identity(role) => {
                assert_eq!(
                    role.assume_role_policy["Statement"][0]["Principal"]["Service"],
                    "ec2.amazonaws.com"
                );
            }
            other => panic!("expected identity, got {:?}", other),
        }

        let attached: Vec<String> = requests[1..]
            .iter()
            .map(|r| match &r.spec {
                ResourceSpec::PermissionAttachment(a) => a.policy_arn.clone(),
                other => panic!("expected attachment, got {:?}", other),
            })
            .collect();
        assert_eq!(attached, NODE_GROUP_IDENTITY.permissions.to_vec());
        assert!(requests[1..].iter().all(|r| r.declares(handle.role())));
        assert_eq!(
            requests[1].name,
            "workers-eks-nodegroup-role-AmazonEKSWorkerNodePolicy"
        );
    }

    #[test]
    fn test_node_group_role_name_is_cluster_qualified() {
        let node_group = NodeGroupConfig {
            name: "workers".to_string(),
            ..Default::default()
        };

        let alpha = IdentityRequest::for_node_group("alpha", &node_group);
        let beta = IdentityRequest::for_node_group("beta", &node_group);

        assert_eq!(alpha.role_name(), "alpha-workers-eks-nodegroup-role");
        assert_ne!(alpha.role_name(), beta.role_name());
        assert_eq!(alpha.owner, "workers");
    }

    #[tokio::test]
    async fn test_existing_reference_issues_one_lookup() {
        let arn = "arn:aws:iam::123456789012:role/platform";
        let provisioner = RecordingProvisioner::new().with_existing(ResourceKind::Identity, arn);

        let handle = resolve_identity(&provisioner, &CancellationToken::new(), &cluster_request(Some(arn)))
            .await
            .unwrap();

        assert_eq!(handle.arn(), arn);
        assert!(!handle.is_created());
        assert_eq!(
            provisioner.calls(),
            vec![ProvisionerCall::Get {
                kind: ResourceKind::Identity,
                external_ref: arn.to_string(),
            }]
        );
    }

    #[tokio::test]
    async fn test_failed_lookup_does_not_fall_back_to_creation() {
        let provisioner = RecordingProvisioner::new();
        let arn = "arn:aws:iam::123456789012:role/missing";

        let err = resolve_identity(&provisioner, &CancellationToken::new(), &cluster_request(Some(arn)))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ProvisionError::IdentityResolution {
                stage: IdentityStage::LookupExisting(_),
                source: ProvisionerError::NotFound { .. },
                ..
            }
        ));
        assert!(provisioner.requests().is_empty());
    }

    #[tokio::test]
    async fn test_attachment_failure_fails_resolution() {
        let provisioner = RecordingProvisioner::new().with_failure(
            ResourceKind::PermissionAttachment,
            "demo-eks-cluster-role-AmazonEKSClusterPolicy",
            ProvisionerError::AccessDenied("iam:AttachRolePolicy".to_string()),
        );

        let err = resolve_identity(&provisioner, &CancellationToken::new(), &cluster_request(None))
            .await
            .unwrap_err();

        match err {
            ProvisionError::IdentityResolution { role, stage, .. } => {
                assert_eq!(role, "demo-eks-cluster-role");
                assert_eq!(stage, IdentityStage::AttachPolicy("AmazonEKSClusterPolicy".to_string()));
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_cancelled_before_any_call() {
        let provisioner = RecordingProvisioner::new();
        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = resolve_identity(&provisioner, &cancel, &cluster_request(None))
            .await
            .unwrap_err();

        assert!(err.is_cancelled());
        assert!(provisioner.calls().is_empty());
    }

    #[test]
    fn test_cluster_request_carries_tags_and_ignores_empty_reference() {
        let mut cluster = ClusterConfig {
            name: "demo".to_string(),
            identity_ref: Some(String::new()),
            ..Default::default()
        };
        cluster.tags.insert("team".to_string(), "platform".to_string());

        let request = IdentityRequest::for_cluster(&cluster);
        assert_eq!(request.requested_ref, None);
        assert_eq!(request.role_name(), "demo-eks-cluster-role");
        assert_eq!(request.tags.get("team").map(String::as_str), Some("platform"));
    }

    #[test]
    fn test_policy_name() {
        assert_eq!(
            policy_name("arn:aws:iam::aws:policy/AmazonEKS_CNI_Policy"),
            "AmazonEKS_CNI_Policy"
        );
        assert_eq!(policy_name("plain"), "plain");
    }
}

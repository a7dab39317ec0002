// Copyright (c) 2025 - Cowboy AI, Inc.
//! Cloud Resource Provisioner - the engine's only outbound boundary
//!
//! The engine never talks to a cloud API itself. It hands fully built
//! requests to a [`Provisioner`], which owns idempotency, retries and
//! persistence of the actual resources.
//!
//! # Contract
//!
//! ```text
//! create_or_update(kind, name, spec, depends_on) -> handle
//! get(kind, external_ref)                        -> handle
//! ```
//!
//! Every request lists the handles it depends on. A provisioner may rely on
//! those handles having been returned by an earlier call in the same run.
//!
//! # Implementations
//!
//! - [`RecordingProvisioner`] - in-memory, records every call in order; used
//!   for dry runs and as the test double

pub mod memory;
pub mod spec;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use tokio_util::sync::CancellationToken;

use crate::errors::{ProvisionError, ProvisionResult};

pub use memory::{ProvisionerCall, RecordingProvisioner};
pub use spec::{
    ClusterSpec, NodeGroupSpec, PolicyAttachmentSpec, RemoteAccessSpec, ResourceSpec, RoleSpec,
    ScalingSpec, TaintSpec, UpdateBudget,
};

/// Kinds of resource the engine asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ResourceKind {
    Identity,
    PermissionAttachment,
    Cluster,
    NodeGroup,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ResourceKind::Identity => "identity",
            ResourceKind::PermissionAttachment => "policy attachment",
            ResourceKind::Cluster => "cluster",
            ResourceKind::NodeGroup => "node group",
        })
    }
}

/// Reference to a resource the provisioner has confirmed
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResourceHandle {
    pub kind: ResourceKind,

    /// Logical name the engine used for the resource
    pub name: String,

    /// External reference (ARN or provider id)
    pub id: String,
}

/// One create-or-update call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceRequest {
    pub name: String,
    pub spec: ResourceSpec,
    pub depends_on: Vec<ResourceHandle>,
}

impl ResourceRequest {
    pub fn new(name: impl Into<String>, spec: ResourceSpec) -> Self {
        Self {
            name: name.into(),
            spec,
            depends_on: Vec::new(),
        }
    }

    /// Declare an explicit dependency edge
    pub fn depends_on(mut self, handle: &ResourceHandle) -> Self {
        self.depends_on.push(handle.clone());
        self
    }

    /// Kind is derived from the spec, so the two can never disagree
    pub fn kind(&self) -> ResourceKind {
        self.spec.kind()
    }

    /// Whether this request declares a dependency on `handle`
    pub fn declares(&self, handle: &ResourceHandle) -> bool {
        self.depends_on.contains(handle)
    }
}

/// Failures reported by the provisioner
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProvisionerError {
    /// Referenced resource does not exist
    #[error("{kind} {reference} not found")]
    NotFound {
        kind: ResourceKind,
        reference: String,
    },

    /// Caller lacks permission
    #[error("Access denied: {0}")]
    AccessDenied(String),

    /// Request was refused (bad spec, unmet dependency, conflict)
    #[error("Request rejected: {0}")]
    Rejected(String),

    /// Provider could not be reached or timed out
    #[error("Provider unavailable: {0}")]
    Unavailable(String),
}

/// Cloud resource provisioner
///
/// Calls block (asynchronously) until the provider confirms completion.
#[async_trait]
pub trait Provisioner: Send + Sync {
    /// Create the resource if absent, reconcile it to `request.spec` if present
    async fn create_or_update(
        &self,
        request: ResourceRequest,
    ) -> Result<ResourceHandle, ProvisionerError>;

    /// Look up an existing resource by its external reference
    async fn get(
        &self,
        kind: ResourceKind,
        external_ref: &str,
    ) -> Result<ResourceHandle, ProvisionerError>;
}

/// Refuse to start `step` once `cancel` has fired
///
/// Called before every provisioner call; calls already issued are not
/// rolled back.
pub fn ensure_active(
    cancel: &CancellationToken,
    step: impl FnOnce() -> String,
) -> ProvisionResult<()> {
    if cancel.is_cancelled() {
        return Err(ProvisionError::Cancelled { step: step() });
    }
    Ok(())
}

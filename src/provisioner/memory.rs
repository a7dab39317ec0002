// Copyright (c) 2025 - Cowboy AI, Inc.
//! Recording Provisioner - in-memory stand-in for the cloud
//!
//! Keeps every call in order and answers like an idempotent provider:
//! repeating a create-or-update for the same kind and name returns the same
//! handle. Used by the `eks-plan` dry run and as the test double.
//!
//! # Dependency Checking
//!
//! A request whose `depends_on` names a handle this provisioner has not
//! returned yet is rejected, so an out-of-order caller fails loudly instead
//! of silently producing a plan the real provider would refuse.

use async_trait::async_trait;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::debug;

use super::{Provisioner, ProvisionerError, ResourceHandle, ResourceKind, ResourceRequest};

/// Account id used in synthesized ARNs
pub const DRY_RUN_ACCOUNT: &str = "000000000000";

/// One call as observed by the provisioner
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "call", rename_all = "camelCase")]
pub enum ProvisionerCall {
    CreateOrUpdate(ResourceRequest),
    Get {
        kind: ResourceKind,
        external_ref: String,
    },
}

#[derive(Debug, Default)]
struct RecorderState {
    calls: Vec<ProvisionerCall>,
    resources: BTreeMap<(ResourceKind, String), ResourceHandle>,
    existing: BTreeMap<(ResourceKind, String), ResourceHandle>,
    failures: BTreeMap<(ResourceKind, String), ProvisionerError>,
}

/// In-memory provisioner that records calls
#[derive(Debug, Default)]
pub struct RecordingProvisioner {
    // Guards are never held across an `.await`, so a std mutex suffices.
    state: Mutex<RecorderState>,
}

impl RecordingProvisioner {
    /// Create an empty provisioner
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-register a resource that `get` can find by its external reference
    pub fn with_existing(self, kind: ResourceKind, external_ref: impl Into<String>) -> Self {
        let external_ref = external_ref.into();
        let name = external_ref
            .rsplit('/')
            .next()
            .unwrap_or(external_ref.as_str())
            .to_string();
        self.lock().existing.insert(
            (kind, external_ref.clone()),
            ResourceHandle {
                kind,
                name,
                id: external_ref,
            },
        );
        self
    }

    /// Make calls for `kind`/`name` fail with `error`
    ///
    /// `name` is matched against the request name for create-or-update and
    /// against the external reference for `get`.
    pub fn with_failure(
        self,
        kind: ResourceKind,
        name: impl Into<String>,
        error: ProvisionerError,
    ) -> Self {
        self.lock().failures.insert((kind, name.into()), error);
        self
    }

    /// Every call so far, in order
    pub fn calls(&self) -> Vec<ProvisionerCall> {
        self.lock().calls.clone()
    }

    /// Only the create-or-update requests, in order
    pub fn requests(&self) -> Vec<ResourceRequest> {
        self.lock()
            .calls
            .iter()
            .filter_map(|call| match call {
                ProvisionerCall::CreateOrUpdate(request) => Some(request.clone()),
                ProvisionerCall::Get { .. } => None,
            })
            .collect()
    }

    /// Create-or-update requests of one kind, in order
    pub fn requests_of(&self, kind: ResourceKind) -> Vec<ResourceRequest> {
        self.requests()
            .into_iter()
            .filter(|request| request.kind() == kind)
            .collect()
    }

    /// Only the lookups, in order
    pub fn lookups(&self) -> Vec<(ResourceKind, String)> {
        self.lock()
            .calls
            .iter()
            .filter_map(|call| match call {
                ProvisionerCall::Get { kind, external_ref } => Some((*kind, external_ref.clone())),
                ProvisionerCall::CreateOrUpdate(_) => None,
            })
            .collect()
    }

    /// Forget recorded calls but keep resources and configured failures
    pub fn clear_calls(&self) {
        self.lock().calls.clear();
    }

    fn lock(&self) -> MutexGuard<'_, RecorderState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn synthesize_id(kind: ResourceKind, name: &str) -> String {
        match kind {
            ResourceKind::Identity => format!("arn:aws:iam::{}:role/{}", DRY_RUN_ACCOUNT, name),
            ResourceKind::PermissionAttachment => format!("attachment/{}", name),
            ResourceKind::Cluster => {
                format!("arn:aws:eks:dry-run:{}:cluster/{}", DRY_RUN_ACCOUNT, name)
            }
            ResourceKind::NodeGroup => {
                format!("arn:aws:eks:dry-run:{}:nodegroup/{}", DRY_RUN_ACCOUNT, name)
            }
        }
    }
}

fn is_known(state: &RecorderState, handle: &ResourceHandle) -> bool {
    state.resources.get(&(handle.kind, handle.name.clone())) == Some(handle)
        || state.existing.get(&(handle.kind, handle.id.clone())) == Some(handle)
}

#[async_trait]
impl Provisioner for RecordingProvisioner {
    async fn create_or_update(
        &self,
        request: ResourceRequest,
    ) -> Result<ResourceHandle, ProvisionerError> {
        let mut state = self.lock();
        let kind = request.kind();
        let name = request.name.clone();
        state.calls.push(ProvisionerCall::CreateOrUpdate(request.clone()));

        if let Some(error) = state.failures.get(&(kind, name.clone())) {
            return Err(error.clone());
        }

        if let Some(missing) = request.depends_on.iter().find(|h| !is_known(&state, h)) {
            return Err(ProvisionerError::Rejected(format!(
                "{} {} depends on {} {} which has not been provisioned",
                kind, name, missing.kind, missing.name
            )));
        }

        let handle = state
            .resources
            .entry((kind, name.clone()))
            .or_insert_with(|| ResourceHandle {
                kind,
                name: name.clone(),
                id: Self::synthesize_id(kind, &name),
            })
            .clone();

        debug!("Recorded create-or-update of {} {}", kind, name);
        Ok(handle)
    }

    async fn get(
        &self,
        kind: ResourceKind,
        external_ref: &str,
    ) -> Result<ResourceHandle, ProvisionerError> {
        let mut state = self.lock();
        state.calls.push(ProvisionerCall::Get {
            kind,
            external_ref: external_ref.to_string(),
        });

        if let Some(error) = state.failures.get(&(kind, external_ref.to_string())) {
            return Err(error.clone());
        }

        state
            .existing
            .get(&(kind, external_ref.to_string()))
            .or_else(|| {
                state
                    .resources
                    .values()
                    .find(|h| h.kind == kind && h.id == external_ref)
            })
            .cloned()
            .ok_or_else(|| ProvisionerError::NotFound {
                kind,
                reference: external_ref.to_string(),
            })
    }
}

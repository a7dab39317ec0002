// Copyright (c) 2025 - Cowboy AI, Inc.
//! Orchestrator - drives a validated plan through the provisioner
//!
//! # Order
//!
//! ```text
//! for each cluster (load order):
//!     cluster identity  -> cluster (depends on identity)
//!     for each node group (load order):
//!         node-group identity -> node group (depends on identity + cluster)
//! ```
//!
//! Every step blocks until the provisioner confirms it. Nothing runs
//! concurrently and nothing is rolled back.
//!
//! # Failure Policy
//!
//! - [`RunPolicy::FailFast`] stops the run at the first failed subtree
//! - [`RunPolicy::ContinueOnError`] moves on to sibling subtrees
//!
//! Either way the run's error is the first failure. Cancellation always
//! stops the run.

pub mod phase;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, info_span, Instrument};
use uuid::Uuid;

pub use phase::{
    ClusterPhase, NodeGroupPhase, PhaseInput, PhaseTracker, StateMachine, Transition,
    TransitionError, TransitionResult,
};

use crate::domain::{ClusterPlan, NodeGroupEntry, ProvisioningPlan};
use crate::errors::{ProvisionError, ProvisionResult};
use crate::identity::{resolve_identity, IdentityRequest};
use crate::provisioner::{
    ensure_active, ClusterSpec, NodeGroupSpec, Provisioner, ResourceHandle, ResourceKind,
    ResourceRequest, ResourceSpec,
};

/// What to do with sibling subtrees after a failure
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RunPolicy {
    #[default]
    FailFast,
    ContinueOnError,
}

/// Terminal state of one node group
#[derive(Debug, Clone, Serialize)]
pub struct NodeGroupOutcome {
    pub name: String,
    pub path: PathBuf,
    pub identity: Option<ResourceHandle>,
    pub node_group: Option<ResourceHandle>,
    pub phase: PhaseTracker<NodeGroupPhase>,
}

impl NodeGroupOutcome {
    fn new(entry: &NodeGroupEntry) -> Self {
        Self {
            name: entry.config.name.clone(),
            path: entry.path.clone(),
            identity: None,
            node_group: None,
            phase: PhaseTracker::new(NodeGroupPhase::PendingIdentity),
        }
    }

    pub fn is_ready(&self) -> bool {
        *self.phase.current() == NodeGroupPhase::NodeGroupReady
    }
}

/// Terminal state of one cluster subtree
#[derive(Debug, Clone, Serialize)]
pub struct ClusterOutcome {
    pub name: String,
    pub path: PathBuf,
    pub identity: Option<ResourceHandle>,
    pub cluster: Option<ResourceHandle>,
    pub phase: PhaseTracker<ClusterPhase>,
    /// Node groups that were started, in order
    pub node_groups: Vec<NodeGroupOutcome>,
}

impl ClusterOutcome {
    fn new(plan: &ClusterPlan) -> Self {
        Self {
            name: plan.cluster.name.clone(),
            path: plan.path.clone(),
            identity: None,
            cluster: None,
            phase: PhaseTracker::new(ClusterPhase::PendingIdentity),
            node_groups: Vec::new(),
        }
    }

    /// Cluster ready and every started node group ready
    pub fn is_converged(&self) -> bool {
        *self.phase.current() == ClusterPhase::ClusterReady
            && self.node_groups.iter().all(NodeGroupOutcome::is_ready)
    }

    pub fn node_group(&self, name: &str) -> Option<&NodeGroupOutcome> {
        self.node_groups.iter().find(|n| n.name == name)
    }
}

/// What one run did
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    /// Clusters that were started, in order
    pub clusters: Vec<ClusterOutcome>,
}

impl RunReport {
    fn new(run_id: Uuid) -> Self {
        Self {
            run_id,
            started_at: Utc::now(),
            finished_at: None,
            clusters: Vec::new(),
        }
    }

    pub fn cluster(&self, name: &str) -> Option<&ClusterOutcome> {
        self.clusters.iter().find(|c| c.name == name)
    }

    pub fn converged_clusters(&self) -> usize {
        self.clusters.iter().filter(|c| c.is_converged()).count()
    }
}

/// Report plus the first fatal error, if any
#[derive(Debug)]
pub struct RunOutcome {
    pub report: RunReport,
    pub error: Option<ProvisionError>,
}

impl RunOutcome {
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }

    pub fn into_result(self) -> ProvisionResult<RunReport> {
        match self.error {
            Some(err) => Err(err),
            None => Ok(self.report),
        }
    }
}

/// Move `tracker` to `Failed` and hand the error back
fn fail<S>(tracker: &mut PhaseTracker<S>, err: ProvisionError) -> ProvisionResult<()>
where
    S: StateMachine<Input = PhaseInput>,
{
    error!("{}", err);
    tracker.advance(PhaseInput::Failed(err.to_string()), Utc::now())?;
    Err(err)
}

/// Sequential provisioning driver
pub struct Orchestrator<P: Provisioner> {
    provisioner: Arc<P>,
    policy: RunPolicy,
}

impl<P: Provisioner> Orchestrator<P> {
    pub fn new(provisioner: Arc<P>) -> Self {
        Self {
            provisioner,
            policy: RunPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: RunPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn provisioner(&self) -> &Arc<P> {
        &self.provisioner
    }

    pub fn policy(&self) -> RunPolicy {
        self.policy
    }

    /// Provision `plan`, returning the report or the first fatal error
    pub async fn run(
        &self,
        cancel: &CancellationToken,
        plan: &ProvisioningPlan,
    ) -> ProvisionResult<RunReport> {
        self.execute(cancel, plan).await.into_result()
    }

    /// Provision `plan`, always returning the report
    pub async fn execute(&self, cancel: &CancellationToken, plan: &ProvisioningPlan) -> RunOutcome {
        let run_id = Uuid::now_v7();
        let span = info_span!("provisioning_run", %run_id);
        self.execute_run(run_id, cancel, plan).instrument(span).await
    }

    async fn execute_run(
        &self,
        run_id: Uuid,
        cancel: &CancellationToken,
        plan: &ProvisioningPlan,
    ) -> RunOutcome {
        let mut report = RunReport::new(run_id);
        let mut first_error: Option<ProvisionError> = None;

        info!(
            "Starting provisioning run: {} cluster(s), {} node group(s)",
            plan.clusters.len(),
            plan.node_group_count()
        );

        for cluster_plan in &plan.clusters {
            let mut outcome = ClusterOutcome::new(cluster_plan);
            let result = self
                .provision_cluster(cancel, cluster_plan, &mut outcome)
                .await;
            report.clusters.push(outcome);

            if let Err(err) = result {
                let stop = err.is_cancelled() || self.policy == RunPolicy::FailFast;
                if first_error.is_none() {
                    first_error = Some(err);
                }
                if stop {
                    break;
                }
            }
        }

        report.finished_at = Some(Utc::now());
        match &first_error {
            None => info!(
                "Provisioning run finished: {} cluster(s) converged",
                report.converged_clusters()
            ),
            Some(err) => error!("Provisioning run failed: {}", err),
        }

        RunOutcome {
            report,
            error: first_error,
        }
    }

    async fn provision_cluster(
        &self,
        cancel: &CancellationToken,
        plan: &ClusterPlan,
        outcome: &mut ClusterOutcome,
    ) -> ProvisionResult<()> {
        let cluster = &plan.cluster;
        info!("Provisioning cluster {}", cluster.name);

        let identity = match resolve_identity(
            self.provisioner.as_ref(),
            cancel,
            &IdentityRequest::for_cluster(cluster),
        )
        .await
        {
            Ok(identity) => identity,
            Err(err) => return fail(&mut outcome.phase, err),
        };
        outcome.identity = Some(identity.role().clone());
        outcome
            .phase
            .advance(PhaseInput::IdentityResolved, Utc::now())?;
        info!("Cluster {} identity ready: {}", cluster.name, identity.arn());

        if let Err(err) = ensure_active(cancel, || format!("cluster {}", cluster.name)) {
            return fail(&mut outcome.phase, err);
        }
        let request = ResourceRequest::new(
            &cluster.name,
            ResourceSpec::Cluster(ClusterSpec::from_config(cluster, identity.arn())),
        )
        .depends_on(identity.role());

        let handle = match self.provisioner.create_or_update(request).await {
            Ok(handle) => handle,
            Err(source) => {
                let err = ProvisionError::ResourceOperation {
                    kind: ResourceKind::Cluster,
                    name: cluster.name.clone(),
                    source,
                };
                return fail(&mut outcome.phase, err);
            }
        };
        outcome.cluster = Some(handle.clone());
        outcome
            .phase
            .advance(PhaseInput::ResourceProvisioned, Utc::now())?;
        info!("Cluster {} ready", cluster.name);

        let mut first_error = None;
        for entry in &plan.node_groups {
            let mut node_outcome = NodeGroupOutcome::new(entry);
            let result = self
                .provision_node_group(cancel, plan, &handle, entry, &mut node_outcome)
                .await;
            outcome.node_groups.push(node_outcome);

            if let Err(err) = result {
                let stop = err.is_cancelled() || self.policy == RunPolicy::FailFast;
                if first_error.is_none() {
                    first_error = Some(err);
                }
                if stop {
                    break;
                }
            }
        }

        match first_error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    async fn provision_node_group(
        &self,
        cancel: &CancellationToken,
        plan: &ClusterPlan,
        cluster_handle: &ResourceHandle,
        entry: &NodeGroupEntry,
        outcome: &mut NodeGroupOutcome,
    ) -> ProvisionResult<()> {
        let cluster = &plan.cluster;
        let node_group = &entry.config;
        let request_name = format!("{}/{}", cluster.name, node_group.name);
        info!("Provisioning node group {}", request_name);

        let identity = match resolve_identity(
            self.provisioner.as_ref(),
            cancel,
            &IdentityRequest::for_node_group(&cluster.name, node_group),
        )
        .await
        {
            Ok(identity) => identity,
            Err(err) => return fail(&mut outcome.phase, err),
        };
        outcome.identity = Some(identity.role().clone());
        outcome
            .phase
            .advance(PhaseInput::IdentityResolved, Utc::now())?;

        if let Err(err) = ensure_active(cancel, || format!("node group {}", request_name)) {
            return fail(&mut outcome.phase, err);
        }

        let spec = match NodeGroupSpec::from_config(
            node_group,
            &cluster.name,
            identity.arn(),
            &cluster.subnet_ids,
        ) {
            Ok(spec) => spec,
            Err(source) => {
                let err = ProvisionError::InvalidRequest {
                    kind: ResourceKind::NodeGroup,
                    name: request_name,
                    source,
                };
                return fail(&mut outcome.phase, err);
            }
        };

        let request = ResourceRequest::new(&request_name, ResourceSpec::NodeGroup(spec))
            .depends_on(identity.role())
            .depends_on(cluster_handle);

        match self.provisioner.create_or_update(request).await {
            Ok(handle) => {
                outcome.node_group = Some(handle);
                outcome
                    .phase
                    .advance(PhaseInput::ResourceProvisioned, Utc::now())?;
                info!("Node group {} ready", request_name);
                Ok(())
            }
            Err(source) => {
                let err = ProvisionError::ResourceOperation {
                    kind: ResourceKind::NodeGroup,
                    name: request_name,
                    source,
                };
                fail(&mut outcome.phase, err)
            }
        }
    }
}

// Copyright (c) 2025 - Cowboy AI, Inc.
//! Declarative EKS provisioning
//!
//! Reads a directory tree of cluster and node-group YAML files, validates
//! every record against a fixed rule set, and drives idempotent
//! create-or-update calls against a [`Provisioner`] in dependency order:
//!
//! ```text
//! cluster role -> cluster -> node-group role -> node group
//! ```
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use eks_orchestrator::{ConfigLoader, EngineConfig, Orchestrator, RecordingProvisioner};
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn example() -> eks_orchestrator::ProvisionResult<()> {
//! let config = EngineConfig::from_env()?;
//! let plan = ConfigLoader::from_config(&config).load_plan(&config.root_dir)?;
//!
//! let orchestrator = Orchestrator::new(Arc::new(RecordingProvisioner::new()))
//!     .with_policy(config.run_policy);
//! let report = orchestrator.run(&CancellationToken::new(), &plan).await?;
//! println!("{} cluster(s) converged", report.converged_clusters());
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod domain;
pub mod errors;
pub mod identity;
pub mod loader;
pub mod orchestrator;
pub mod provisioner;

pub use config::{EngineConfig, RunPolicy};
pub use domain::{
    ClusterConfig, ClusterPlan, MinSizeFloor, NodeGroupConfig, ProvisioningPlan, Validate,
    ValidationError, ValidationPolicy,
};
pub use errors::{ProvisionError, ProvisionResult};
pub use identity::{resolve_identity, IdentityHandle, IdentityRequest};
pub use loader::{ConfigLoader, ConfigSource, FsSource};
pub use orchestrator::{Orchestrator, RunOutcome, RunReport};
pub use provisioner::{
    Provisioner, ProvisionerError, RecordingProvisioner, ResourceHandle, ResourceKind,
    ResourceRequest,
};

// Copyright (c) 2025 - Cowboy AI, Inc.
//! Configuration Domain Models
//!
//! The declarative records the engine consumes, the value objects they are
//! checked against, and the pure rules that decide whether a record may be
//! provisioned.
//!
//! # Records
//!
//! - [`ClusterConfig`] - one managed control plane
//! - [`NodeGroupConfig`] - one worker pool, owned by a cluster through
//!   directory nesting
//!
//! # Value Objects with Invariants
//!
//! - [`Ipv4Cidr`] - IPv4 network in CIDR notation
//! - [`Ec2ResourceId`] - `subnet-…` / `sg-…` identifiers
//!
//! # Validation
//!
//! - [`formats`] - shape predicates for identifiers
//! - [`invariants`] - per-record rule sets and the [`Validate`] trait
//!
//! # Plan
//!
//! - [`ProvisioningPlan`] - validated clusters, each paired with the node
//!   groups it owns

pub mod cluster;
pub mod formats;
pub mod invariants;
pub mod network;
pub mod node_group;
pub mod plan;

pub use cluster::{ClusterConfig, ControlPlaneLogType};
pub use formats::{FieldFormat, UnknownLiteral};
pub use invariants::{
    FieldViolation, MinSizeFloor, Validate, ValidationError, ValidationPolicy, ValidationResult,
    ViolationKind,
};
pub use network::{Ec2ResourceId, Ipv4Cidr, NetworkError};
pub use node_group::{
    CapacityType, ComputeConfig, MaxUnavailableConfig, MaxUnavailableKind, NodeGroupConfig,
    NodeNetworkConfig, ScalingConfig, TaintConfig, TaintEffect,
};
pub use plan::{ClusterPlan, NodeGroupEntry, ProvisioningPlan};

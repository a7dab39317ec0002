// Copyright (c) 2025 - Cowboy AI, Inc.
//! Error types for loading and provisioning

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

use crate::domain::{UnknownLiteral, ValidationError};
use crate::orchestrator::TransitionError;
use crate::provisioner::{ProvisionerError, ResourceKind};

/// Errors that can end a load or a provisioning run
#[derive(Debug, Error)]
pub enum ProvisionError {
    /// Directory walk or file read failed
    #[error("Failed to read {}: {source}", .path.display())]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// File is not well-formed structured data for its record type
    #[error("Malformed configuration in {}: {source}", .path.display())]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// File parsed but broke one or more field rules
    #[error("Invalid configuration in {}: {source}", .path.display())]
    Validation {
        path: PathBuf,
        #[source]
        source: ValidationError,
    },

    /// Two cluster files declare the same name
    #[error("Duplicate cluster name {name:?} in {} (already defined in {})", .path.display(), .first.display())]
    DuplicateCluster {
        name: String,
        path: PathBuf,
        first: PathBuf,
    },

    /// Two node-group files of one cluster declare the same name
    #[error("Duplicate node group name {name:?} for cluster {cluster:?} in {}", .path.display())]
    DuplicateNodeGroup {
        cluster: String,
        name: String,
        path: PathBuf,
    },

    /// Creating, attaching or looking up an identity failed
    #[error("Failed to resolve identity {role} for {owner_kind} {owner} while {stage}: {source}")]
    IdentityResolution {
        owner_kind: ResourceKind,
        owner: String,
        role: String,
        stage: IdentityStage,
        #[source]
        source: ProvisionerError,
    },

    /// The provisioner rejected a create-or-update
    #[error("Create-or-update of {kind} {name} failed: {source}")]
    ResourceOperation {
        kind: ResourceKind,
        name: String,
        #[source]
        source: ProvisionerError,
    },

    /// A record could not be turned into a provider request
    #[error("Cannot build {kind} {name} request: {source}")]
    InvalidRequest {
        kind: ResourceKind,
        name: String,
        #[source]
        source: UnknownLiteral,
    },

    /// The caller's cancellation signal fired
    #[error("Run cancelled before {step}")]
    Cancelled { step: String },

    /// A subtree was driven through an illegal phase change
    #[error("Phase error: {0}")]
    Phase(#[from] TransitionError),

    /// Engine settings are unusable
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl ProvisionError {
    /// Path of the offending file, for load-time errors
    pub fn path(&self) -> Option<&std::path::Path> {
        match self {
            ProvisionError::ConfigRead { path, .. }
            | ProvisionError::ConfigParse { path, .. }
            | ProvisionError::Validation { path, .. }
            | ProvisionError::DuplicateCluster { path, .. }
            | ProvisionError::DuplicateNodeGroup { path, .. } => Some(path),
            _ => None,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, ProvisionError::Cancelled { .. })
    }
}

/// Step of identity resolution that failed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentityStage {
    CreateRole,
    AttachPolicy(String),
    LookupExisting(String),
}

impl fmt::Display for IdentityStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IdentityStage::CreateRole => f.write_str("creating the role"),
            IdentityStage::AttachPolicy(policy) => write!(f, "attaching {}", policy),
            IdentityStage::LookupExisting(reference) => write!(f, "looking up {}", reference),
        }
    }
}

/// Result type for loading and provisioning
pub type ProvisionResult<T> = Result<T, ProvisionError>;

// Copyright (c) 2025 - Cowboy AI, Inc.
//! Subtree Phase State Machines
//!
//! Every cluster subtree and every node-group sub-sequence moves through a
//! small, pure FSM. The orchestrator drives it; the history ends up in the
//! run report.
//!
//! # Cluster
//!
//! ```text
//! PendingIdentity --IdentityResolved--> IdentityReady --ResourceProvisioned--> ClusterReady
//!        |                                    |
//!        +------------Failed------------------+--> Failed
//! ```
//!
//! # Node Group
//!
//! Same shape, ending in `NodeGroupReady`.
//!
//! Terminal states accept no input.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

/// Result of a phase transition
pub type TransitionResult<S> = Result<S, TransitionError>;

/// Illegal phase change
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransitionError {
    #[error("Invalid transition from {from} on {input}")]
    InvalidTransition { from: String, input: String },
}

impl TransitionError {
    fn invalid(from: &impl fmt::Display, input: &impl fmt::Display) -> Self {
        TransitionError::InvalidTransition {
            from: from.to_string(),
            input: input.to_string(),
        }
    }
}

/// Finite state machine with typed states and inputs
pub trait StateMachine: Sized + Clone {
    type Input;

    /// Next state for `input`, or an error if the input is not accepted here
    fn transition(&self, input: &Self::Input) -> TransitionResult<Self>;

    fn can_transition(&self, input: &Self::Input) -> bool {
        self.transition(input).is_ok()
    }

    fn is_terminal(&self) -> bool;
}

/// Phase inputs shared by both subtree kinds
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "input", content = "reason", rename_all = "camelCase")]
pub enum PhaseInput {
    IdentityResolved,
    ResourceProvisioned,
    Failed(String),
}

impl fmt::Display for PhaseInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PhaseInput::IdentityResolved => f.write_str("IdentityResolved"),
            PhaseInput::ResourceProvisioned => f.write_str("ResourceProvisioned"),
            PhaseInput::Failed(_) => f.write_str("Failed"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "phase", content = "reason")]
pub enum ClusterPhase {
    PendingIdentity,
    IdentityReady,
    ClusterReady,
    Failed(String),
}

impl fmt::Display for ClusterPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClusterPhase::PendingIdentity => f.write_str("PendingIdentity"),
            ClusterPhase::IdentityReady => f.write_str("IdentityReady"),
            ClusterPhase::ClusterReady => f.write_str("ClusterReady"),
            ClusterPhase::Failed(reason) => write!(f, "Failed({})", reason),
        }
    }
}

impl StateMachine for ClusterPhase {
    type Input = PhaseInput;

    fn transition(&self, input: &PhaseInput) -> TransitionResult<Self> {
        use ClusterPhase::*;

        match (self, input) {
            (PendingIdentity, PhaseInput::IdentityResolved) => Ok(IdentityReady),
            (IdentityReady, PhaseInput::ResourceProvisioned) => Ok(ClusterReady),
            (PendingIdentity | IdentityReady, PhaseInput::Failed(reason)) => {
                Ok(Failed(reason.clone()))
            }
            _ => Err(TransitionError::invalid(self, input)),
        }
    }

    fn is_terminal(&self) -> bool {
        matches!(self, ClusterPhase::ClusterReady | ClusterPhase::Failed(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "phase", content = "reason")]
pub enum NodeGroupPhase {
    PendingIdentity,
    IdentityReady,
    NodeGroupReady,
    Failed(String),
}

impl fmt::Display for NodeGroupPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeGroupPhase::PendingIdentity => f.write_str("PendingIdentity"),
            NodeGroupPhase::IdentityReady => f.write_str("IdentityReady"),
            NodeGroupPhase::NodeGroupReady => f.write_str("NodeGroupReady"),
            NodeGroupPhase::Failed(reason) => write!(f, "Failed({})", reason),
        }
    }
}

impl StateMachine for NodeGroupPhase {
    type Input = PhaseInput;

    fn transition(&self, input: &PhaseInput) -> TransitionResult<Self> {
        use NodeGroupPhase::*;

        match (self, input) {
            (PendingIdentity, PhaseInput::IdentityResolved) => Ok(IdentityReady),
            (IdentityReady, PhaseInput::ResourceProvisioned) => Ok(NodeGroupReady),
            (PendingIdentity | IdentityReady, PhaseInput::Failed(reason)) => {
                Ok(Failed(reason.clone()))
            }
            _ => Err(TransitionError::invalid(self, input)),
        }
    }

    fn is_terminal(&self) -> bool {
        matches!(self, NodeGroupPhase::NodeGroupReady | NodeGroupPhase::Failed(_))
    }
}

/// One recorded phase change
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Transition<S, I> {
    pub from: S,
    pub to: S,
    pub input: I,
    pub timestamp: DateTime<Utc>,
}

/// State machine plus its transition history
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(bound(serialize = "FSM: Serialize, FSM::Input: Serialize"))]
pub struct PhaseTracker<FSM: StateMachine> {
    pub current: FSM,
    pub history: Vec<Transition<FSM, FSM::Input>>,
}

impl<FSM: StateMachine> PhaseTracker<FSM>
where
    FSM::Input: Clone,
{
    pub fn new(initial: FSM) -> Self {
        Self {
            current: initial,
            history: Vec::new(),
        }
    }

    /// Apply `input`, recording the change on success
    pub fn advance(&mut self, input: FSM::Input, timestamp: DateTime<Utc>) -> TransitionResult<()> {
        let to = self.current.transition(&input)?;
        self.history.push(Transition {
            from: self.current.clone(),
            to: to.clone(),
            input,
            timestamp,
        });
        self.current = to;
        Ok(())
    }

    pub fn current(&self) -> &FSM {
        &self.current
    }
}

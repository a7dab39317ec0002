// Copyright (c) 2025 - Cowboy AI, Inc.
//! Pure Validation Functions - Configuration Invariants
//!
//! Every rule for [`ClusterConfig`] and [`NodeGroupConfig`] lives here as a
//! plain function over typed values. The rule set for each record type is
//! fixed at compile time through its [`Validate`] implementation; nothing is
//! registered at runtime.
//!
//! # Rule Categories
//!
//! 1. **Required**: strings, lists and maps must be non-empty
//! 2. **Format**: identifiers must match their [`FieldFormat`]
//! 3. **Dive**: every element of a list (or key of a map) is checked on its own
//! 4. **Cross-field**: scaling bounds, checked from both sides
//!
//! # Aggregation
//!
//! Validation never stops at the first failure. A record's violations are
//! all collected in field-declaration order, so the same record always
//! yields the same list.

use std::collections::BTreeMap;
use std::fmt;

use super::cluster::ClusterConfig;
use super::formats::FieldFormat;
use super::node_group::{MaxUnavailableConfig, NodeGroupConfig, TaintConfig};

/// Largest `maxUnavailable` value when expressed as a percentage
pub const MAX_UNAVAILABLE_PERCENTAGE: i64 = 100;

/// Lowest `maxSize` any node group may declare
pub const MIN_MAX_SIZE: i64 = 1;

/// Validation result with every violation found
pub type ValidationResult = Result<(), ValidationError>;

/// Lowest legal `minSize`
///
/// Schema revisions disagree on whether an empty pool is allowed, so the
/// floor is an explicit policy instead of a constant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum MinSizeFloor {
    /// `minSize ≥ 0`; pools may scale to zero
    #[default]
    Zero,
    /// `minSize ≥ 1`
    One,
}

impl MinSizeFloor {
    pub fn value(self) -> i64 {
        match self {
            MinSizeFloor::Zero => 0,
            MinSizeFloor::One => 1,
        }
    }
}

/// Knobs that change what counts as valid
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ValidationPolicy {
    pub min_size_floor: MinSizeFloor,
}

/// What is wrong with a single field
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViolationKind {
    /// Field is required but empty
    Required,

    /// Value does not have the expected shape
    Format { expected: FieldFormat, value: String },

    /// Value is below a fixed lower bound
    BelowMinimum { minimum: i64, actual: i64 },

    /// Value is above a fixed upper bound
    AboveMaximum { maximum: i64, actual: i64 },

    /// Value must be at least the sibling field's value
    LessThanField {
        other: &'static str,
        actual: i64,
        other_value: i64,
    },

    /// Value must be at most the sibling field's value
    GreaterThanField {
        other: &'static str,
        actual: i64,
        other_value: i64,
    },
}

/// A single failed rule, addressed by the field's path in the file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldViolation {
    /// Dotted path using file spelling, e.g. `scaling.minSize`, `subnetIds[1]`
    pub field: String,
    pub kind: ViolationKind,
}

impl FieldViolation {
    pub fn new(field: impl Into<String>, kind: ViolationKind) -> Self {
        Self {
            field: field.into(),
            kind,
        }
    }
}

impl fmt::Display for FieldViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ViolationKind::Required => write!(f, "{} is required", self.field),
            ViolationKind::Format { expected, value } => {
                write!(f, "{} must be {}, got {:?}", self.field, expected, value)
            }
            ViolationKind::BelowMinimum { minimum, actual } => {
                write!(f, "{} must be at least {}, got {}", self.field, minimum, actual)
            }
            ViolationKind::AboveMaximum { maximum, actual } => {
                write!(f, "{} must be at most {}, got {}", self.field, maximum, actual)
            }
            ViolationKind::LessThanField {
                other,
                actual,
                other_value,
            } => write!(
                f,
                "{} ({}) must be greater than or equal to {} ({})",
                self.field, actual, other, other_value
            ),
            ViolationKind::GreaterThanField {
                other,
                actual,
                other_value,
            } => write!(
                f,
                "{} ({}) must be less than or equal to {} ({})",
                self.field, actual, other, other_value
            ),
        }
    }
}

/// Every violation found in one record
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{} violation(s): {}", .violations.len(), join_violations(.violations))]
pub struct ValidationError {
    pub violations: Vec<FieldViolation>,
}

impl ValidationError {
    /// Whether any violation is addressed to `field`
    pub fn names_field(&self, field: &str) -> bool {
        self.violations.iter().any(|v| v.field == field)
    }
}

fn join_violations(violations: &[FieldViolation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Records with a statically defined rule set
pub trait Validate {
    /// Collect every violation in the record
    fn violations(&self, policy: &ValidationPolicy) -> Vec<FieldViolation>;

    /// Fail-fast form: an error iff at least one violation exists
    fn validate(&self, policy: &ValidationPolicy) -> ValidationResult {
        let violations = self.violations(policy);
        if violations.is_empty() {
            Ok(())
        } else {
            Err(ValidationError { violations })
        }
    }
}

// ============================================================================
// Field rules
// ============================================================================

/// Required string
pub fn check_required(field: &str, value: &str) -> Option<FieldViolation> {
    value
        .is_empty()
        .then(|| FieldViolation::new(field, ViolationKind::Required))
}

/// Single value against a format
pub fn check_format(field: &str, value: &str, format: FieldFormat) -> Option<FieldViolation> {
    (!format.matches(value)).then(|| {
        FieldViolation::new(
            field,
            ViolationKind::Format {
                expected: format,
                value: value.to_string(),
            },
        )
    })
}

/// Optional reference: empty passes, anything else must match
pub fn check_optional_format(
    field: &str,
    value: Option<&str>,
    format: FieldFormat,
) -> Option<FieldViolation> {
    value
        .filter(|v| !v.is_empty())
        .and_then(|v| check_format(field, v, format))
}

/// Dive into a list, checking each element against `format`
pub fn check_each(field: &str, values: &[String], format: FieldFormat) -> Vec<FieldViolation> {
    values
        .iter()
        .enumerate()
        .filter_map(|(i, v)| check_format(&format!("{}[{}]", field, i), v, format))
        .collect()
}

/// Required list: non-empty, then every element must match
pub fn check_required_each(
    field: &str,
    values: &[String],
    format: FieldFormat,
) -> Vec<FieldViolation> {
    if values.is_empty() {
        return vec![FieldViolation::new(field, ViolationKind::Required)];
    }
    check_each(field, values, format)
}

/// Dive into a mapping: keys must be non-empty
pub fn check_map_keys(field: &str, map: &BTreeMap<String, String>) -> Vec<FieldViolation> {
    map.keys()
        .filter(|k| k.is_empty())
        .map(|_| FieldViolation::new(format!("{}[\"\"]", field), ViolationKind::Required))
        .collect()
}

/// Required mapping: at least one entry, then key rules
pub fn check_required_map(field: &str, map: &BTreeMap<String, String>) -> Vec<FieldViolation> {
    if map.is_empty() {
        return vec![FieldViolation::new(field, ViolationKind::Required)];
    }
    check_map_keys(field, map)
}

/// Fixed lower bound
pub fn check_at_least(field: &str, actual: i64, minimum: i64) -> Option<FieldViolation> {
    (actual < minimum)
        .then(|| FieldViolation::new(field, ViolationKind::BelowMinimum { minimum, actual }))
}

/// Fixed upper bound
pub fn check_at_most(field: &str, actual: i64, maximum: i64) -> Option<FieldViolation> {
    (actual > maximum)
        .then(|| FieldViolation::new(field, ViolationKind::AboveMaximum { maximum, actual }))
}

// ============================================================================
// Cross-field scaling rules
//
// Each rule reports only on its own field. Both directions of every
// comparison are present, so a broken invariant is caught no matter which
// field is looked at first.
// ============================================================================

const DESIRED_CAPACITY: &str = "scaling.desiredCapacity";
const MIN_SIZE: &str = "scaling.minSize";
const MAX_SIZE: &str = "scaling.maxSize";

/// `minSize ≤ desiredCapacity ≤ maxSize`, reported on `desiredCapacity`
pub fn check_desired_capacity(desired: i64, min_size: i64, max_size: i64) -> Vec<FieldViolation> {
    let mut violations = Vec::new();

    if desired < min_size {
        violations.push(FieldViolation::new(
            DESIRED_CAPACITY,
            ViolationKind::LessThanField {
                other: MIN_SIZE,
                actual: desired,
                other_value: min_size,
            },
        ));
    }

    if desired > max_size {
        violations.push(FieldViolation::new(
            DESIRED_CAPACITY,
            ViolationKind::GreaterThanField {
                other: MAX_SIZE,
                actual: desired,
                other_value: max_size,
            },
        ));
    }

    violations
}

/// `floor ≤ minSize ≤ maxSize`, reported on `minSize`
pub fn check_min_size(min_size: i64, max_size: i64, floor: MinSizeFloor) -> Vec<FieldViolation> {
    let mut violations = Vec::new();

    violations.extend(check_at_least(MIN_SIZE, min_size, floor.value()));

    if min_size > max_size {
        violations.push(FieldViolation::new(
            MIN_SIZE,
            ViolationKind::GreaterThanField {
                other: MAX_SIZE,
                actual: min_size,
                other_value: max_size,
            },
        ));
    }

    violations
}

/// `maxSize ≥ max(1, minSize)`, reported on `maxSize`
pub fn check_max_size(max_size: i64, min_size: i64) -> Vec<FieldViolation> {
    let mut violations = Vec::new();

    violations.extend(check_at_least(MAX_SIZE, max_size, MIN_MAX_SIZE));

    if max_size < min_size {
        violations.push(FieldViolation::new(
            MAX_SIZE,
            ViolationKind::LessThanField {
                other: MIN_SIZE,
                actual: max_size,
                other_value: min_size,
            },
        ));
    }

    violations
}

fn check_max_unavailable(budget: &MaxUnavailableConfig) -> Vec<FieldViolation> {
    let mut violations = Vec::new();

    violations.extend(check_format(
        "scaling.maxUnavailable.type",
        &budget.kind,
        FieldFormat::MaxUnavailableKind,
    ));
    violations.extend(check_at_least("scaling.maxUnavailable.value", budget.value, 1));
    if budget.kind == "percentage" {
        violations.extend(check_at_most(
            "scaling.maxUnavailable.value",
            budget.value,
            MAX_UNAVAILABLE_PERCENTAGE,
        ));
    }

    violations
}

fn check_taint(index: usize, taint: &TaintConfig) -> Vec<FieldViolation> {
    let prefix = format!("kubernetesTaints[{}]", index);
    let mut violations = Vec::new();

    violations.extend(check_required(&format!("{}.key", prefix), &taint.key));
    violations.extend(check_format(
        &format!("{}.effect", prefix),
        &taint.effect,
        FieldFormat::TaintEffect,
    ));

    violations
}

// ============================================================================
// Record rule sets
// ============================================================================

impl Validate for ClusterConfig {
    fn violations(&self, _policy: &ValidationPolicy) -> Vec<FieldViolation> {
        let mut violations = Vec::new();

        violations.extend(check_required("name", &self.name));
        violations.extend(check_required("kubernetesVersion", &self.kubernetes_version));
        violations.extend(check_optional_format(
            "identityRef",
            self.identity_ref.as_deref(),
            FieldFormat::RoleArn,
        ));

        match check_required("serviceCidr", &self.service_cidr) {
            Some(missing) => violations.push(missing),
            None => violations.extend(check_format(
                "serviceCidr",
                &self.service_cidr,
                FieldFormat::Ipv4Cidr,
            )),
        }

        violations.extend(check_required_each(
            "publicAccessCidrs",
            &self.public_access_cidrs,
            FieldFormat::Ipv4Cidr,
        ));
        violations.extend(check_required_each(
            "securityGroupIds",
            &self.security_group_ids,
            FieldFormat::SecurityGroupId,
        ));
        violations.extend(check_required_each(
            "subnetIds",
            &self.subnet_ids,
            FieldFormat::SubnetId,
        ));
        violations.extend(check_required_map("tags", &self.tags));
        violations.extend(check_each(
            "enabledLogTypes",
            &self.enabled_log_types,
            FieldFormat::ControlPlaneLogType,
        ));

        violations
    }
}

impl Validate for NodeGroupConfig {
    fn violations(&self, policy: &ValidationPolicy) -> Vec<FieldViolation> {
        let mut violations = Vec::new();
        let scaling = &self.scaling;

        violations.extend(check_required("name", &self.name));

        violations.extend(check_desired_capacity(
            scaling.desired_capacity,
            scaling.min_size,
            scaling.max_size,
        ));
        violations.extend(check_min_size(
            scaling.min_size,
            scaling.max_size,
            policy.min_size_floor,
        ));
        violations.extend(check_max_size(scaling.max_size, scaling.min_size));
        if let Some(budget) = &scaling.max_unavailable {
            violations.extend(check_max_unavailable(budget));
        }

        // Empty subnets are legal here; the cluster's are inherited later
        violations.extend(check_each(
            "network.subnetIds",
            &self.network.subnet_ids,
            FieldFormat::SubnetId,
        ));
        violations.extend(check_each(
            "network.securityGroupIds",
            &self.network.security_group_ids,
            FieldFormat::SecurityGroupId,
        ));

        violations.extend(check_optional_format(
            "identityRef",
            self.identity_ref.as_deref(),
            FieldFormat::RoleArn,
        ));

        violations.extend(check_optional_format(
            "compute.capacityType",
            self.compute.capacity_type.as_deref(),
            FieldFormat::CapacityType,
        ));
        violations.extend(check_required_each(
            "compute.instanceTypes",
            &self.compute.instance_types,
            FieldFormat::InstanceType,
        ));
        if let Some(disk) = self.compute.disk_size_gib {
            violations.extend(check_at_least("compute.diskSizeGiB", disk, 1));
        }

        violations.extend(check_required_map("tags", &self.tags));
        violations.extend(check_map_keys("kubernetesLabels", &self.kubernetes_labels));
        for (i, taint) in self.kubernetes_taints.iter().enumerate() {
            violations.extend(check_taint(i, taint));
        }

        violations
    }
}

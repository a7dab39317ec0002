// Copyright (c) 2025 - Cowboy AI, Inc.
//! Format Validators
//!
//! Pure predicates deciding whether a string has the shape of a cloud
//! resource identifier. They never fail: anything that does not match is
//! simply `false`.
//!
//! | Format | Shape |
//! |---|---|
//! | subnet id | `subnet-` + 17 hex characters |
//! | security group id | `sg-` + 17 hex characters |
//! | role ARN | `arn:aws:iam::<12 digits>:role/<non-empty>` |
//! | instance type | `<alnum>+.<alnum>+` |
//! | taint effect | `NO_SCHEDULE`, `PREFER_NO_SCHEDULE`, `NO_EXECUTE` |
//! | IPv4 CIDR | `a.b.c.d/n`, `n` in 0-32 |

use std::fmt;
use thiserror::Error;

use super::cluster::ControlPlaneLogType;
use super::network::{Ec2ResourceId, Ipv4Cidr};
use super::node_group::{CapacityType, MaxUnavailableKind, TaintEffect};

const ROLE_ARN_PREFIX: &str = "arn:aws:iam::";
const ROLE_ARN_ACCOUNT_DIGITS: usize = 12;
const ROLE_ARN_RESOURCE: &str = ":role/";

/// `subnet-0123456789abcdef0`
pub fn is_subnet_id(value: &str) -> bool {
    Ec2ResourceId::subnet(value).is_ok()
}

/// `sg-0123456789abcdef0`
pub fn is_security_group_id(value: &str) -> bool {
    Ec2ResourceId::security_group(value).is_ok()
}

/// `arn:aws:iam::123456789012:role/name`
pub fn is_role_arn(value: &str) -> bool {
    let Some(rest) = value.strip_prefix(ROLE_ARN_PREFIX) else {
        return false;
    };

    let (Some(account), Some(rest)) = (
        rest.get(..ROLE_ARN_ACCOUNT_DIGITS),
        rest.get(ROLE_ARN_ACCOUNT_DIGITS..),
    ) else {
        return false;
    };

    account.bytes().all(|b| b.is_ascii_digit())
        && rest
            .strip_prefix(ROLE_ARN_RESOURCE)
            .is_some_and(|name| !name.is_empty())
}

/// `t3.medium`, `m5d.2xlarge`
pub fn is_instance_type(value: &str) -> bool {
    let Some((family, size)) = value.split_once('.') else {
        return false;
    };

    let alnum = |part: &str| !part.is_empty() && part.bytes().all(|b| b.is_ascii_alphanumeric());
    alnum(family) && alnum(size)
}

/// Exact, case-sensitive match against the three Kubernetes taint effects
pub fn is_taint_effect(value: &str) -> bool {
    value.parse::<TaintEffect>().is_ok()
}

/// `10.100.0.0/16`
pub fn is_ipv4_cidr(value: &str) -> bool {
    Ipv4Cidr::new(value).is_ok()
}

/// A string that is not one of an enumeration's literals
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Unknown {kind}: {value}")]
pub struct UnknownLiteral {
    pub kind: &'static str,
    pub value: String,
}

impl UnknownLiteral {
    pub fn new(kind: &'static str, value: impl Into<String>) -> Self {
        Self {
            kind,
            value: value.into(),
        }
    }
}

/// Shape a field value is expected to have
///
/// Every string-valued rule in the schema is one of these, so violations can
/// say what was expected without carrying closures around.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldFormat {
    SubnetId,
    SecurityGroupId,
    RoleArn,
    InstanceType,
    TaintEffect,
    Ipv4Cidr,
    CapacityType,
    MaxUnavailableKind,
    ControlPlaneLogType,
}

impl FieldFormat {
    /// Check a value against this format
    pub fn matches(self, value: &str) -> bool {
        match self {
            FieldFormat::SubnetId => is_subnet_id(value),
            FieldFormat::SecurityGroupId => is_security_group_id(value),
            FieldFormat::RoleArn => is_role_arn(value),
            FieldFormat::InstanceType => is_instance_type(value),
            FieldFormat::TaintEffect => is_taint_effect(value),
            FieldFormat::Ipv4Cidr => is_ipv4_cidr(value),
            FieldFormat::CapacityType => value.parse::<CapacityType>().is_ok(),
            FieldFormat::MaxUnavailableKind => value.parse::<MaxUnavailableKind>().is_ok(),
            FieldFormat::ControlPlaneLogType => value.parse::<ControlPlaneLogType>().is_ok(),
        }
    }

    /// Human-readable description of the expected shape
    pub fn description(self) -> &'static str {
        match self {
            FieldFormat::SubnetId => "a subnet id (subnet- followed by 17 hex characters)",
            FieldFormat::SecurityGroupId => {
                "a security group id (sg- followed by 17 hex characters)"
            }
            FieldFormat::RoleArn => "an IAM role ARN (arn:aws:iam::<12 digits>:role/<name>)",
            FieldFormat::InstanceType => "an instance type (<family>.<size>)",
            FieldFormat::TaintEffect => "one of NO_SCHEDULE, PREFER_NO_SCHEDULE, NO_EXECUTE",
            FieldFormat::Ipv4Cidr => "an IPv4 CIDR block",
            FieldFormat::CapacityType => "one of ON_DEMAND, SPOT",
            FieldFormat::MaxUnavailableKind => "one of count, percentage",
            FieldFormat::ControlPlaneLogType => {
                "one of api, audit, authenticator, controllerManager, scheduler"
            }
        }
    }
}

impl fmt::Display for FieldFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("subnet-0123456789abcdef0", true ; "seventeen lowercase hex")]
    #[test_case("subnet-0123456789ABCDEF0", true ; "seventeen uppercase hex")]
    #[test_case("subnet-12345", false ; "five hex")]
    #[test_case("subnet-0123456789abcdef01", false ; "eighteen hex")]
    #[test_case("subnet-0123456789abcdefg", false ; "non hex character")]
    #[test_case("Subnet-0123456789abcdef0", false ; "prefix is case sensitive")]
    #[test_case("", false ; "empty")]
    fn subnet_id_shape(value: &str, expected: bool) {
        assert_eq!(is_subnet_id(value), expected);
    }

    #[test_case("sg-0123456789abcdef0", true ; "valid")]
    #[test_case("sg-01234", false ; "short")]
    #[test_case("subnet-0123456789abcdef0", false ; "wrong prefix")]
    fn security_group_id_shape(value: &str, expected: bool) {
        assert_eq!(is_security_group_id(value), expected);
    }

    #[test_case("arn:aws:iam::123456789012:role/x", true ; "single char name")]
    #[test_case("arn:aws:iam::123456789012:role/eks/cluster-role", true ; "role with path")]
    #[test_case("arn:aws:iam::123456789012:role/", false ; "empty name")]
    #[test_case("arn:aws:iam::12345678901:role/x", false ; "eleven digit account")]
    #[test_case("arn:aws:iam::1234567890123:role/x", false ; "thirteen digit account")]
    #[test_case("arn:aws:iam::12345678901a:role/x", false ; "non digit account")]
    #[test_case("arn:aws:iam::123456789012:user/x", false ; "user not role")]
    #[test_case("invalid-role-arn", false ; "garbage")]
    #[test_case("arn:aws:iam::12345678901é:role/x", false ; "multibyte across account boundary")]
    #[test_case("arn:aws:iam::１２３４５６:role/x", false ; "fullwidth digits")]
    #[test_case("arn:aws:iam::é", false ; "short multibyte account")]
    fn role_arn_shape(value: &str, expected: bool) {
        assert_eq!(is_role_arn(value), expected);
    }

    #[test_case("t3.medium", true ; "burstable")]
    #[test_case("m5d.2xlarge", true ; "digit in size")]
    #[test_case("invalid-instance-type", false ; "no dot")]
    #[test_case("t3.", false ; "empty size")]
    #[test_case(".medium", false ; "empty family")]
    #[test_case("t3.medium.large", false ; "two dots")]
    fn instance_type_shape(value: &str, expected: bool) {
        assert_eq!(is_instance_type(value), expected);
    }

    #[test_case("NO_SCHEDULE", true ; "no schedule")]
    #[test_case("PREFER_NO_SCHEDULE", true ; "prefer no schedule")]
    #[test_case("NO_EXECUTE", true ; "no execute")]
    #[test_case("INVALID_EFFECT", false ; "unknown literal")]
    #[test_case("NoSchedule", false ; "kubernetes spelling")]
    #[test_case("no_schedule", false ; "lowercase")]
    fn taint_effect_literal(value: &str, expected: bool) {
        assert_eq!(is_taint_effect(value), expected);
    }

    #[test]
    fn field_format_dispatch() {
        assert!(FieldFormat::Ipv4Cidr.matches("10.100.0.0/16"));
        assert!(!FieldFormat::Ipv4Cidr.matches("10.100.0.0"));
        assert!(FieldFormat::CapacityType.matches("SPOT"));
        assert!(!FieldFormat::CapacityType.matches("RESERVED"));
        assert!(FieldFormat::ControlPlaneLogType.matches("controllerManager"));
        assert!(FieldFormat::MaxUnavailableKind.matches("percentage"));
    }
}

// Copyright (c) 2025 - Cowboy AI, Inc.
//! Network Value Objects with Validation Invariants

use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::Ipv4Addr;
use std::str::FromStr;
use thiserror::Error;

/// Network validation error
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NetworkError {
    #[error("Invalid IPv4 address: {0}")]
    InvalidIpAddress(String),

    #[error("Invalid CIDR notation: {0}")]
    InvalidCidr(String),

    #[error("Invalid prefix length: {0} (must be 0-32 for IPv4)")]
    InvalidPrefixLength(u8),

    #[error("Invalid {kind} identifier: {value}")]
    InvalidResourceId { kind: &'static str, value: String },
}

/// IPv4 network in CIDR notation
///
/// Invariants:
/// - Address is a dotted-quad IPv4 address
/// - Prefix length is present and within 0-32
///
/// Host bits are not required to be zero, matching what the EKS API accepts
/// for `publicAccessCidrs` and `serviceIpv4Cidr`.
///
/// # Examples
///
/// ```rust
/// use eks_orchestrator::domain::Ipv4Cidr;
///
/// let cidr = Ipv4Cidr::new("10.100.0.0/16").unwrap();
/// assert_eq!(cidr.prefix_length(), 16);
/// assert!(Ipv4Cidr::new("10.100.0.0").is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Ipv4Cidr {
    address: Ipv4Addr,
    prefix_length: u8,
}

impl Ipv4Cidr {
    /// Largest IPv4 prefix length
    pub const MAX_PREFIX: u8 = 32;

    /// Parse `a.b.c.d/n`
    pub fn new(cidr: impl AsRef<str>) -> Result<Self, NetworkError> {
        let cidr = cidr.as_ref();

        let (addr_str, prefix_str) = cidr
            .split_once('/')
            .ok_or_else(|| NetworkError::InvalidCidr(cidr.to_string()))?;

        let address = Ipv4Addr::from_str(addr_str)
            .map_err(|_| NetworkError::InvalidIpAddress(addr_str.to_string()))?;

        // `u8::from_str` tolerates a leading '+', CIDR notation does not
        if prefix_str.is_empty()
            || prefix_str.len() > 2
            || !prefix_str.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(NetworkError::InvalidCidr(cidr.to_string()));
        }

        let prefix_length = prefix_str
            .parse::<u8>()
            .map_err(|_| NetworkError::InvalidCidr(cidr.to_string()))?;

        if prefix_length > Self::MAX_PREFIX {
            return Err(NetworkError::InvalidPrefixLength(prefix_length));
        }

        Ok(Self {
            address,
            prefix_length,
        })
    }

    /// Get the address part
    pub fn address(&self) -> Ipv4Addr {
        self.address
    }

    /// Get the prefix length
    pub fn prefix_length(&self) -> u8 {
        self.prefix_length
    }
}

impl fmt::Display for Ipv4Cidr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.address, self.prefix_length)
    }
}

impl FromStr for Ipv4Cidr {
    type Err = NetworkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

/// Prefixed EC2 resource identifier (`subnet-…`, `sg-…`)
///
/// Invariants:
/// - Starts with the kind's literal prefix
/// - Followed by exactly 17 hexadecimal characters (either case)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Ec2ResourceId(String);

impl Ec2ResourceId {
    /// Number of hex characters after the prefix
    pub const HEX_LENGTH: usize = 17;

    /// Subnet identifier prefix
    pub const SUBNET_PREFIX: &'static str = "subnet-";

    /// Security group identifier prefix
    pub const SECURITY_GROUP_PREFIX: &'static str = "sg-";

    /// Parse a subnet identifier
    pub fn subnet(id: impl Into<String>) -> Result<Self, NetworkError> {
        Self::with_prefix(id.into(), Self::SUBNET_PREFIX, "subnet")
    }

    /// Parse a security group identifier
    pub fn security_group(id: impl Into<String>) -> Result<Self, NetworkError> {
        Self::with_prefix(id.into(), Self::SECURITY_GROUP_PREFIX, "security group")
    }

    fn with_prefix(id: String, prefix: &str, kind: &'static str) -> Result<Self, NetworkError> {
        let valid = id.strip_prefix(prefix).is_some_and(|hex| {
            hex.len() == Self::HEX_LENGTH && hex.bytes().all(|b| b.is_ascii_hexdigit())
        });

        if !valid {
            return Err(NetworkError::InvalidResourceId { kind, value: id });
        }

        Ok(Self(id))
    }

    /// Get the identifier as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Ec2ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

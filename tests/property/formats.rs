// Copyright (c) 2025 - Cowboy AI, Inc.
//! Property-Based Tests for Identifier Formats

use eks_orchestrator::domain::formats::{
    is_instance_type, is_ipv4_cidr, is_security_group_id, is_subnet_id, is_taint_effect,
};
use proptest::prelude::*;

const TAINT_EFFECTS: [&str; 3] = ["NO_SCHEDULE", "PREFER_NO_SCHEDULE", "NO_EXECUTE"];

proptest! {
    /// Prefix plus exactly 17 hex characters is a subnet id
    #[test]
    fn prop_subnet_with_17_hex_is_valid(hex in "[0-9a-fA-F]{17}") {
        let subnet = format!("subnet-{}", hex);
        let security_group = format!("sg-{}", hex);
        prop_assert!(is_subnet_id(&subnet));
        prop_assert!(is_security_group_id(&security_group));
    }

    /// Any other length is rejected
    #[test]
    fn prop_subnet_with_wrong_length_is_invalid(
        hex in "[0-9a-f]{0,30}".prop_filter("length 17 is valid", |h| h.len() != 17)
    ) {
        let subnet = format!("subnet-{}", hex);
        let security_group = format!("sg-{}", hex);
        prop_assert!(!is_subnet_id(&subnet));
        prop_assert!(!is_security_group_id(&security_group));
    }

    /// The two prefixes are not interchangeable
    #[test]
    fn prop_prefixes_do_not_cross(hex in "[0-9a-f]{17}") {
        let security_group = format!("sg-{}", hex);
        let subnet = format!("subnet-{}", hex);
        prop_assert!(!is_subnet_id(&security_group));
        prop_assert!(!is_security_group_id(&subnet));
    }

    /// Only the three literals are taint effects
    #[test]
    fn prop_taint_effect_accepts_only_known_literals(value in "[A-Z_]{0,24}") {
        prop_assert_eq!(is_taint_effect(&value), TAINT_EFFECTS.contains(&value.as_str()));
    }

    /// Prefix lengths above 32 are rejected
    #[test]
    fn prop_cidr_prefix_bound(a in 0u8..=255, b in 0u8..=255, prefix in 0u32..=64) {
        let cidr = format!("10.{}.{}.0/{}", a, b, prefix);
        prop_assert_eq!(is_ipv4_cidr(&cidr), prefix <= 32);
    }

    #[test]
    fn prop_instance_type_shape(family in "[a-z][a-z0-9]{0,5}", size in "[a-z0-9]{1,8}") {
        let instance_type = format!("{}.{}", family, size);
        prop_assert!(is_instance_type(&instance_type));
        prop_assert!(!is_instance_type(&family));
    }
}

// Copyright (c) 2025 - Cowboy AI, Inc.
//! Property-Based Tests for Record Validation
//!
//! Scaling bounds are generated around the valid region and the rule set is
//! checked from both sides.

use eks_orchestrator::domain::{MinSizeFloor, Validate, ValidationPolicy};
use proptest::prelude::*;

use crate::fixtures::{valid_cluster, valid_node_group};

fn policy(floor: MinSizeFloor) -> ValidationPolicy {
    ValidationPolicy {
        min_size_floor: floor,
    }
}

/// `(min, desired, max)` with `0 ≤ min ≤ desired ≤ max` and `max ≥ 1`
fn valid_bounds() -> impl Strategy<Value = (i64, i64, i64)> {
    (0i64..20)
        .prop_flat_map(|min| (Just(min), min.max(1)..40))
        .prop_flat_map(|(min, max)| (Just(min), min..=max, Just(max)))
}

proptest! {
    #[test]
    fn prop_valid_node_groups_have_no_violations((min, desired, max) in valid_bounds()) {
        let mut node_group = valid_node_group("workers");
        node_group.scaling.min_size = min;
        node_group.scaling.desired_capacity = desired;
        node_group.scaling.max_size = max;

        prop_assert_eq!(node_group.violations(&policy(MinSizeFloor::Zero)), vec![]);
        if min >= 1 {
            prop_assert!(node_group.validate(&policy(MinSizeFloor::One)).is_ok());
        }
    }

    /// `min > max` is reported on both fields
    #[test]
    fn prop_min_above_max_names_both_fields(
        max in 1i64..20,
        gap in 1i64..10,
        desired in 0i64..40,
    ) {
        let mut node_group = valid_node_group("workers");
        node_group.scaling.min_size = max + gap;
        node_group.scaling.max_size = max;
        node_group.scaling.desired_capacity = desired;

        let err = node_group.validate(&policy(MinSizeFloor::Zero)).unwrap_err();
        prop_assert!(err.names_field("scaling.minSize"));
        prop_assert!(err.names_field("scaling.maxSize"));
    }

    /// Desired capacity outside `[min, max]` is always caught
    #[test]
    fn prop_desired_outside_bounds_is_rejected(
        (min, _, max) in valid_bounds(),
        offset in 1i64..10,
        below in any::<bool>(),
    ) {
        let desired = if below { min - offset } else { max + offset };
        let mut node_group = valid_node_group("workers");
        node_group.scaling.min_size = min;
        node_group.scaling.max_size = max;
        node_group.scaling.desired_capacity = desired;

        let err = node_group.validate(&policy(MinSizeFloor::Zero)).unwrap_err();
        prop_assert!(err.names_field("scaling.desiredCapacity"));
    }

    /// Same record, same violations
    #[test]
    fn prop_validation_is_deterministic(
        min in -5i64..10,
        desired in -5i64..10,
        max in -5i64..10,
    ) {
        let mut node_group = valid_node_group("workers");
        node_group.scaling.min_size = min;
        node_group.scaling.desired_capacity = desired;
        node_group.scaling.max_size = max;

        let first = node_group.violations(&policy(MinSizeFloor::One));
        let second = node_group.violations(&policy(MinSizeFloor::One));
        prop_assert_eq!(first, second);
    }

    /// Every malformed subnet in a cluster list is reported by index
    #[test]
    fn prop_each_bad_subnet_is_reported(bad in proptest::collection::vec(any::<bool>(), 1..6)) {
        let mut cluster = valid_cluster("demo");
        cluster.subnet_ids = bad
            .iter()
            .map(|&b| {
                if b {
                    "subnet-12345".to_string()
                } else {
                    "subnet-0123456789abcdef0".to_string()
                }
            })
            .collect();

        let violations = cluster.violations(&ValidationPolicy::default());
        for (i, &is_bad) in bad.iter().enumerate() {
            let field = format!("subnetIds[{}]", i);
            prop_assert_eq!(violations.iter().any(|v| v.field == field), is_bad);
        }
    }
}

// Copyright (c) 2025 - Cowboy AI, Inc.
//! Properties of semantic version bumps

use cim_release::domain::{calculate_next_version, BumpType, SemanticVersion};
use proptest::prelude::*;
use test_case::test_case;

fn bump_strategy() -> impl Strategy<Value = BumpType> {
    prop_oneof![
        Just(BumpType::None),
        Just(BumpType::Patch),
        Just(BumpType::Minor),
        Just(BumpType::Major),
    ]
}

fn version_strategy() -> impl Strategy<Value = SemanticVersion> {
    (0u64..1000, 0u64..1000, 0u64..1000).prop_map(|(a, b, c)| SemanticVersion::new(a, b, c))
}

#[test_case(BumpType::Major, "2.0.0")]
#[test_case(BumpType::Minor, "1.3.0")]
#[test_case(BumpType::Patch, "1.2.4")]
#[test_case(BumpType::None, "1.2.3")]
fn test_calculate_next_version(bump: BumpType, expected: &str) {
    let current = SemanticVersion::new(1, 2, 3);
    assert_eq!(calculate_next_version(&current, bump).to_string(), expected);
}

proptest! {
    /// A releasing bump always moves the version strictly forward
    #[test]
    fn prop_release_bumps_increase(current in version_strategy(), bump in bump_strategy()) {
        let next = calculate_next_version(&current, bump);
        if bump.is_release() {
            prop_assert!(next > current);
        } else {
            prop_assert_eq!(next, current);
        }
    }

    /// A larger bump never yields a smaller version
    #[test]
    fn prop_bump_is_monotonic(current in version_strategy(), a in bump_strategy(), b in bump_strategy()) {
        let (small, large) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(calculate_next_version(&current, small) <= calculate_next_version(&current, large));
    }

    /// Display and parse agree, with or without a `v` prefix
    #[test]
    fn prop_parse_display_agree(current in version_strategy()) {
        let text = current.to_string();
        prop_assert_eq!(SemanticVersion::parse(&text).unwrap(), current.clone());
        prop_assert_eq!(SemanticVersion::parse(&format!("v{}", text)).unwrap(), current);
    }
}

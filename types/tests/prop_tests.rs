use proptest::prelude::*;

use gate_types::{CombineMode, StrategyId, Timestamp, WalletAddress};

proptest! {
    /// Any hex body parses, and every case variant of it matches the original.
    #[test]
    fn address_matches_any_casing(body in "[0-9a-fA-F]{1,40}") {
        let original = WalletAddress::new(format!("0x{body}")).unwrap();
        let upper = WalletAddress::new(format!("0x{}", body.to_ascii_uppercase())).unwrap();
        let lower = WalletAddress::new(format!("0x{}", body.to_ascii_lowercase())).unwrap();
        prop_assert!(original.matches(&upper));
        prop_assert!(original.matches(&lower));
        prop_assert_eq!(upper.normalized(), lower.normalized());
    }

    /// Distinct lowercase bodies never match.
    #[test]
    fn distinct_addresses_do_not_match(a in "[0-9a-f]{8}", b in "[0-9a-f]{8}") {
        prop_assume!(a != b);
        let left = WalletAddress::new(format!("0x{a}")).unwrap();
        let right = WalletAddress::new(format!("0x{b}")).unwrap();
        prop_assert!(!left.matches(&right));
    }

    /// AND is false as soon as any result is false.
    #[test]
    fn and_fold_fails_on_any_denial(results in prop::collection::vec(any::<bool>(), 1..8)) {
        let expected = results.iter().all(|r| *r);
        prop_assert_eq!(CombineMode::And.fold(results.clone()), expected);
    }

    /// OR is true as soon as any result is true.
    #[test]
    fn or_fold_passes_on_any_allow(results in prop::collection::vec(any::<bool>(), 1..8)) {
        let expected = results.iter().any(|r| *r);
        prop_assert_eq!(CombineMode::Or.fold(results.clone()), expected);
    }

    /// Timestamp ordering helpers agree with integer comparison.
    #[test]
    fn timestamp_before_after(a in 0u64..u64::MAX, b in 0u64..u64::MAX) {
        let ta = Timestamp::new(a);
        let tb = Timestamp::new(b);
        prop_assert_eq!(ta.is_after(tb), a > b);
        prop_assert_eq!(ta.is_before(tb), a < b);
    }
}

#[test]
fn strategy_ids_round_trip_through_strings() {
    for id in StrategyId::ALL {
        let parsed: StrategyId = id.as_str().parse().unwrap();
        assert_eq!(parsed, id);
    }
}

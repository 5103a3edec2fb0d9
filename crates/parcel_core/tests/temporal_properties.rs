use parcel_core::{PackageRegistry, PackageSnapshot};
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Update {
    Weight(i64, i64),
    Destination(i64, String),
}

fn update_strategy() -> impl Strategy<Value = Update> {
    prop_oneof![
        (0i64..50, 0i64..1_000).prop_map(|(at, weight)| Update::Weight(at, weight)),
        (0i64..50, "[A-Z]{1,3}").prop_map(|(at, dest)| Update::Destination(at, dest)),
    ]
}

/// Reference answer: last update at or before `at`, in insertion order on ties.
fn expected_at(
    created_at: i64,
    initial: &PackageSnapshot,
    updates: &[Update],
    at: i64,
) -> Option<PackageSnapshot> {
    if at < created_at {
        return None;
    }
    let mut weight = (created_at, initial.weight);
    let mut destination = (created_at, initial.destination.clone());
    for update in updates {
        match update {
            Update::Weight(when, value) if *when <= at && *when >= weight.0 => {
                weight = (*when, *value as u64);
            }
            Update::Destination(when, value) if *when <= at && *when >= destination.0 => {
                destination = (*when, value.clone());
            }
            _ => {}
        }
    }
    Some(PackageSnapshot {
        weight: weight.1,
        destination: destination.1,
    })
}

fn apply(registry: &mut PackageRegistry, updates: &[Update]) {
    for update in updates {
        match update {
            Update::Weight(at, weight) => registry.set_weight_at(*at, "pkg", *weight).unwrap(),
            Update::Destination(at, dest) => registry.redirect_at(*at, "pkg", dest).unwrap(),
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn created_package_round_trips_until_changed(
        created_at in 0i64..100,
        weight in 0i64..10_000,
        destination in "[a-z]{1,8}",
        offset in 0i64..1_000,
    ) {
        let mut registry = PackageRegistry::new();
        registry.create_at(created_at, "pkg", weight, &destination).unwrap();

        let expected = PackageSnapshot { weight: weight as u64, destination };
        prop_assert_eq!(registry.get_at(created_at + offset, "pkg").unwrap(), Some(expected));
        if created_at > 0 {
            prop_assert_eq!(registry.get_at(created_at - 1, "pkg").unwrap(), None);
        }
    }

    #[test]
    fn reads_match_reference_for_any_insertion_order(
        updates in prop::collection::vec(update_strategy(), 0..20),
        instants in prop::collection::vec(0i64..60, 1..10),
    ) {
        let initial = PackageSnapshot { weight: 1, destination: "SEED".to_string() };
        let mut registry = PackageRegistry::new();
        registry.create_at(0, "pkg", 1, "SEED").unwrap();
        apply(&mut registry, &updates);

        for at in instants {
            prop_assert_eq!(
                registry.get_at(at, "pkg").unwrap(),
                expected_at(0, &initial, &updates, at)
            );
        }
    }

    #[test]
    fn rollback_preserves_past_and_matches_truncated_history(
        updates in prop::collection::vec(update_strategy(), 0..20),
        horizon in 0i64..50,
    ) {
        let initial = PackageSnapshot { weight: 1, destination: "SEED".to_string() };
        let mut registry = PackageRegistry::new();
        registry.create_at(0, "pkg", 1, "SEED").unwrap();
        apply(&mut registry, &updates);

        let before: Vec<_> = (0..=horizon)
            .map(|at| registry.get_at(at, "pkg").unwrap())
            .collect();
        registry.rollback(horizon).unwrap();
        let after: Vec<_> = (0..=horizon)
            .map(|at| registry.get_at(at, "pkg").unwrap())
            .collect();
        prop_assert_eq!(before, after);

        let surviving: Vec<Update> = updates
            .iter()
            .filter(|update| match update {
                Update::Weight(at, _) | Update::Destination(at, _) => *at <= horizon,
            })
            .cloned()
            .collect();
        prop_assert_eq!(
            registry.get_at(100, "pkg").unwrap(),
            expected_at(0, &initial, &surviving, 100)
        );
    }
}

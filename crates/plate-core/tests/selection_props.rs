//! Property tests for the selection store and view projector.

use plate_core::{Catalog, PlateConfig, SelectionAction, SelectionStore, ViewProjector};
use plate_core::{scale_for_grams, RenderConfig, SelectionConfig};
use proptest::prelude::*;
use std::collections::HashSet;

const IDS: &[&str] = &["bread", "chicken", "rice", "fish", "tofu", "mystery"];

fn any_id() -> impl Strategy<Value = String> {
    prop::sample::select(IDS).prop_map(str::to_string)
}

fn any_raw_grams() -> impl Strategy<Value = String> {
    prop_oneof![
        (0u32..400).prop_map(|g| g.to_string()),
        Just(String::new()),
        Just("abc".to_string()),
        Just("-30".to_string()),
        Just("12.5".to_string()),
    ]
}

fn any_action() -> impl Strategy<Value = SelectionAction> {
    prop_oneof![
        (any_id(), any::<bool>()).prop_map(|(id, checked)| SelectionAction::Toggle { id, checked }),
        (any_id(), any_raw_grams()).prop_map(|(id, raw)| SelectionAction::SetGrams { id, raw }),
    ]
}

proptest! {
    #[test]
    fn prop_store_only_holds_touched_ids(actions in prop::collection::vec(any_action(), 0..40)) {
        let mut touched = HashSet::new();
        let mut store = SelectionStore::default();
        for action in &actions {
            match action {
                SelectionAction::Toggle { id, .. } | SelectionAction::SetGrams { id, .. } => {
                    touched.insert(id.clone());
                }
                SelectionAction::Reset => touched.clear(),
            }
            store = store.apply(action);
        }

        for (id, _) in store.iter() {
            prop_assert!(touched.contains(id));
        }
        prop_assert_eq!(store.len(), touched.len());
    }

    #[test]
    fn prop_toggle_then_set_grams(id in any_id(), grams in 0u32..1000) {
        let store = SelectionStore::default()
            .toggle(&id, true)
            .set_grams(&id, &grams.to_string());
        let entry = store.entry(&id).unwrap();
        prop_assert!(entry.is_selected);
        prop_assert_eq!(entry.grams, grams);
    }

    #[test]
    fn prop_set_grams_then_toggle_keeps_grams(id in any_id(), grams in 0u32..1000, checked in any::<bool>()) {
        let store = SelectionStore::default()
            .set_grams(&id, &grams.to_string())
            .toggle(&id, checked);
        let entry = store.entry(&id).unwrap();
        prop_assert_eq!(entry.is_selected, checked);
        prop_assert_eq!(entry.grams, grams);
    }

    #[test]
    fn prop_update_touches_only_target(
        actions in prop::collection::vec(any_action(), 0..20),
        next in any_action(),
    ) {
        let before = actions.iter().fold(SelectionStore::default(), |s, a| s.apply(a));
        let after = before.apply(&next);
        let target = match &next {
            SelectionAction::Toggle { id, .. } | SelectionAction::SetGrams { id, .. } => id.clone(),
            SelectionAction::Reset => unreachable!(),
        };

        for (id, entry) in before.iter() {
            if id != target {
                prop_assert_eq!(after.entry(id), Some(*entry));
            }
        }
    }

    #[test]
    fn prop_payload_excludes_inactive(actions in prop::collection::vec(any_action(), 0..40)) {
        let catalog = Catalog::builtin();
        let store = actions.iter().fold(SelectionStore::default(), |s, a| s.apply(a));
        let payload = ViewProjector::from_config(&catalog, &PlateConfig::default()).payload(&store);

        for item in &payload {
            prop_assert!(item.grams > 0);
            let ingredient = catalog.by_remote_id(item.remote_id).unwrap();
            let entry = store.entry(&ingredient.id).unwrap();
            prop_assert!(entry.is_selected);
        }
        let expected = store
            .iter()
            .filter(|(id, e)| e.is_active() && catalog.contains(id))
            .count();
        prop_assert_eq!(payload.len(), expected);
    }

    #[test]
    fn prop_sprites_match_payload(actions in prop::collection::vec(any_action(), 0..40)) {
        let catalog = Catalog::builtin();
        let store = actions.iter().fold(SelectionStore::default(), |s, a| s.apply(a));
        let projector = ViewProjector::from_config(&catalog, &PlateConfig::default());

        prop_assert_eq!(projector.sprites(&store).len(), projector.payload(&store).len());
    }

    #[test]
    fn prop_scale_monotonic(a in 0u32..400, b in 0u32..400) {
        let s = SelectionConfig::default();
        let r = RenderConfig::default();
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(scale_for_grams(lo, &s, &r) <= scale_for_grams(hi, &s, &r));
    }

    #[test]
    fn prop_scale_constant_outside_bounds(g in 0u32..50, h in 200u32..10_000) {
        let s = SelectionConfig::default();
        let r = RenderConfig::default();
        prop_assert_eq!(scale_for_grams(g, &s, &r), scale_for_grams(50, &s, &r));
        prop_assert_eq!(scale_for_grams(h, &s, &r), scale_for_grams(200, &s, &r));
    }
}

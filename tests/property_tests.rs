//! Property-based tests for field merging using proptest

use logit::prelude::*;
use proptest::prelude::*;
use std::collections::HashSet;

fn level_strategy() -> impl Strategy<Value = LogLevel> {
    prop_oneof![
        Just(LogLevel::Debug),
        Just(LogLevel::Info),
        Just(LogLevel::Warn),
        Just(LogLevel::Error),
        Just(LogLevel::Panic),
        Just(LogLevel::Fatal),
    ]
}

/// Small key space so collisions between classes are common
fn fields_strategy(max: usize) -> impl Strategy<Value = Vec<(String, i64)>> {
    prop::collection::vec(("[a-f]", any::<i64>()), 0..max)
}

fn to_fields(pairs: &[(String, i64)]) -> Vec<Field> {
    pairs.iter().map(|(k, v)| Field::int(k.clone(), *v)).collect()
}

/// First-insertion key order, as the store keeps it
fn first_seen(pairs: &[(String, i64)]) -> Vec<String> {
    let mut seen = HashSet::new();
    pairs
        .iter()
        .filter(|(k, _)| seen.insert(k.clone()))
        .map(|(k, _)| k.clone())
        .collect()
}

// ============================================================================
// Merge invariants
// ============================================================================

proptest! {
    /// Merged output never contains the same key twice
    #[test]
    fn test_merge_has_no_duplicate_keys(
        meta in fields_strategy(8),
        normal in fields_strategy(8),
        bucket in fields_strategy(8),
        ad_hoc in fields_strategy(8),
        bucket_level in level_strategy(),
        emit_level in level_strategy(),
    ) {
        let scope = LogScope::new();
        scope.add_meta_fields(to_fields(&meta));
        scope.add_fields(to_fields(&normal));
        scope.add_level_fields(bucket_level, to_fields(&bucket));

        let merged = scope.merge(emit_level, to_fields(&ad_hoc));
        let mut keys = HashSet::new();
        for field in &merged {
            prop_assert!(keys.insert(field.key.clone()), "duplicate key {}", field.key);
        }
    }

    /// Meta fields come first, in insertion order, with their latest values
    #[test]
    fn test_meta_leads_and_wins(
        meta in fields_strategy(6),
        ad_hoc in fields_strategy(6),
        level in level_strategy(),
    ) {
        let scope = LogScope::new();
        // Call-site fields first, meta added afterwards still wins
        scope.add_info(to_fields(&ad_hoc));
        scope.add_meta_fields(to_fields(&meta));

        let merged = scope.merge(level, to_fields(&ad_hoc));
        let meta_keys = first_seen(&meta);
        let leading: Vec<String> = merged.iter().take(meta_keys.len()).map(|f| f.key.clone()).collect();
        prop_assert_eq!(&leading, &meta_keys);

        for key in &meta_keys {
            let expected = meta.iter().rev().find(|(k, _)| k == key).map(|(_, v)| *v).unwrap();
            let field = merged.iter().find(|f| &f.key == key).unwrap();
            prop_assert_eq!(&field.value, &FieldValue::Int(expected));
        }
    }

    /// Ambient fields only appear at Info
    #[test]
    fn test_normal_fields_only_at_info(
        normal in prop::collection::vec(("[g-k]", any::<i64>()), 1..6),
        level in level_strategy(),
    ) {
        let scope = LogScope::new();
        scope.add_fields(to_fields(&normal));

        let merged = scope.merge(level, Vec::new());
        if level == LogLevel::Info {
            prop_assert_eq!(merged.len(), first_seen(&normal).len());
        } else {
            prop_assert!(merged.is_empty());
        }
    }

    /// Removed keys are gone from every class
    #[test]
    fn test_remove_clears_every_class(
        key in "[a-f]",
        level in level_strategy(),
    ) {
        let scope = LogScope::new();
        scope.add_meta_field(key.clone(), 1);
        scope.add_field(key.clone(), 2);
        for bucket in LogLevel::ALL {
            scope.add_level_field(bucket, key.clone(), 3);
        }

        scope.remove_field(&key);

        prop_assert!(scope.find_field(&key).is_none());
        prop_assert!(scope.find_meta_field(&key).is_none());
        prop_assert!(scope.merge(level, Vec::new()).is_empty());
    }

    /// A scope without a store keeps the first occurrence of each call-site key
    #[test]
    fn test_detached_scope_dedups_ad_hoc(ad_hoc in fields_strategy(12)) {
        let merged = LogScope::detached().merge(LogLevel::Error, to_fields(&ad_hoc));
        let keys: Vec<String> = merged.iter().map(|f| f.key.clone()).collect();
        prop_assert_eq!(keys, first_seen(&ad_hoc));

        for field in &merged {
            let first = ad_hoc.iter().find(|(k, _)| k == &field.key).map(|(_, v)| *v).unwrap();
            prop_assert_eq!(&field.value, &FieldValue::Int(first));
        }
    }
}

// ============================================================================
// Level parsing and encoding
// ============================================================================

proptest! {
    #[test]
    fn test_log_level_str_roundtrip(level in level_strategy()) {
        let parsed: LogLevel = level.to_str().parse().unwrap();
        prop_assert_eq!(level, parsed);
        let lower: LogLevel = level.to_lowercase_str().parse().unwrap();
        prop_assert_eq!(level, lower);
    }

    /// Any message encodes to exactly one JSON line
    #[test]
    fn test_json_line_per_record(message in ".*", level in level_strategy()) {
        let encoder = default_encoder()();
        let entry = LogEntry::new(level, &message);
        let bytes = encoder.encode(&entry).unwrap();
        let line = String::from_utf8(bytes).unwrap();

        prop_assert!(line.ends_with('\n'));
        prop_assert_eq!(line.matches('\n').count(), 1);
        let parsed: serde_json::Value = serde_json::from_str(line.trim_end()).unwrap();
        prop_assert_eq!(parsed["level"].as_str().unwrap(), level.to_lowercase_str());
    }
}

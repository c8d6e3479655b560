//! Merge of stored and call-site fields into one record's field list

use super::field::Field;
use super::field_store::StoreFields;
use super::log_level::LogLevel;
use std::collections::HashSet;

/// Produce the ordered, duplicate-free field list for a record at `level`.
///
/// Four passes, each skipping keys an earlier pass already placed:
///
/// 1. meta fields, in insertion order
/// 2. ambient fields, **only when `level` is [`LogLevel::Info`]**
/// 3. fields stored for `level`
/// 4. `ad_hoc` fields, in call order
///
/// Ambient fields are informational context; records at other levels only carry
/// them when they were re-added with a level-scoped call.
pub(crate) fn merge_fields(store: &StoreFields, level: LogLevel, ad_hoc: Vec<Field>) -> Vec<Field> {
    let level_bucket = store.levels.get(&level);
    let capacity = store.meta.len()
        + if level == LogLevel::Info { store.normal.len() } else { 0 }
        + level_bucket.map_or(0, |bucket| bucket.len())
        + ad_hoc.len();

    let mut merged = Vec::with_capacity(capacity);
    let mut claimed: HashSet<String> = HashSet::with_capacity(capacity);

    let stored = store.meta.iter().chain(
        (level == LogLevel::Info)
            .then(|| store.normal.iter())
            .into_iter()
            .flatten(),
    );
    for field in stored.chain(level_bucket.into_iter().flat_map(|bucket| bucket.iter())) {
        if claimed.insert(field.key.clone()) {
            merged.push(field.clone());
        }
    }

    append_ad_hoc(&mut merged, &mut claimed, ad_hoc);
    merged
}

/// Merge for a scope without a store: call-site fields only, first occurrence wins
pub(crate) fn merge_ad_hoc(ad_hoc: Vec<Field>) -> Vec<Field> {
    let mut merged = Vec::with_capacity(ad_hoc.len());
    let mut claimed = HashSet::with_capacity(ad_hoc.len());
    append_ad_hoc(&mut merged, &mut claimed, ad_hoc);
    merged
}

fn append_ad_hoc(merged: &mut Vec<Field>, claimed: &mut HashSet<String>, ad_hoc: Vec<Field>) {
    for field in ad_hoc {
        if claimed.insert(field.key.clone()) {
            merged.push(field);
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::core::{Field, FieldStore, FieldValue, LogLevel};

    fn keys(fields: &[Field]) -> Vec<&str> {
        fields.iter().map(|f| f.key.as_str()).collect()
    }

    fn value_of<'a>(fields: &'a [Field], key: &str) -> Option<&'a FieldValue> {
        fields.iter().find(|f| f.key == key).map(|f| &f.value)
    }

    fn populated_store() -> FieldStore {
        let store = FieldStore::new();
        store.add_meta_field("m1", 1);
        store.add_field("n1", 2);
        store.add_meta_field("m2", 3);
        store.add_field("n2", 4);
        store.add_info([Field::new("i1", 5)]);
        store.add_warn([Field::new("w1", 6), Field::new("w2", 7)]);
        store
    }

    #[test]
    fn test_merge_order_at_info() {
        let store = populated_store();
        let merged = store.merge(LogLevel::Info, vec![Field::new("a1", 8)]);

        assert_eq!(keys(&merged), vec!["m1", "m2", "n1", "n2", "i1", "a1"]);
    }

    #[test]
    fn test_ambient_fields_only_reach_info() {
        let store = populated_store();

        let info = store.merge(LogLevel::Info, Vec::new());
        assert!(info.iter().any(|f| f.key == "n1"));

        let warn = store.merge(LogLevel::Warn, Vec::new());
        assert_eq!(keys(&warn), vec!["m1", "m2", "w1", "w2"]);

        for level in [LogLevel::Debug, LogLevel::Error, LogLevel::Panic, LogLevel::Fatal] {
            let merged = store.merge(level, Vec::new());
            assert_eq!(keys(&merged), vec!["m1", "m2"], "level {}", level);
        }
    }

    #[test]
    fn test_meta_wins_even_when_added_later() {
        let store = FieldStore::new();
        store.add_field("user", "ambient");
        store.add_info([Field::new("user", "info-scoped")]);
        store.add_meta_field("user", "meta");

        let merged = store.merge(LogLevel::Info, vec![Field::new("user", "call-site")]);
        assert_eq!(merged.len(), 1);
        assert_eq!(value_of(&merged, "user"), Some(&FieldValue::String("meta".into())));
    }

    #[test]
    fn test_ambient_beats_level_at_info() {
        let store = FieldStore::new();
        store.add_info([Field::new("k", "level")]);
        store.add_field("k", "ambient");

        let merged = store.merge(LogLevel::Info, Vec::new());
        assert_eq!(value_of(&merged, "k"), Some(&FieldValue::String("ambient".into())));
    }

    #[test]
    fn test_stored_fields_beat_call_site() {
        let store = FieldStore::new();
        store.add_error([Field::new("code", 500)]);

        let merged = store.merge(
            LogLevel::Error,
            vec![Field::new("code", 404), Field::new("path", "/x")],
        );
        assert_eq!(keys(&merged), vec!["code", "path"]);
        assert_eq!(value_of(&merged, "code"), Some(&FieldValue::Int(500)));
    }

    #[test]
    fn test_repeated_call_site_key_keeps_first() {
        let store = FieldStore::new();
        let merged = store.merge(
            LogLevel::Debug,
            vec![Field::new("k", 1), Field::new("k", 2)],
        );
        assert_eq!(merged, vec![Field::new("k", 1)]);
    }

    #[test]
    fn test_merge_ad_hoc_without_store() {
        let merged = super::merge_ad_hoc(vec![
            Field::new("a", 1),
            Field::new("b", 2),
            Field::new("a", 3),
        ]);
        assert_eq!(keys(&merged), vec!["a", "b"]);
    }
}

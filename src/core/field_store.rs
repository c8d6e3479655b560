//! Per-unit-of-work field store
//!
//! A [`FieldStore`] accumulates fields over the life of a request or job in
//! three classes:
//!
//! - **meta**: written to every record, never overridden
//! - **normal**: ambient fields, merged into `Info` records only
//! - **level**: fields scoped to a single severity
//!
//! All mutations take the store's write lock; lookups and merges take the read
//! lock, so concurrent emits from several threads of one unit-of-work proceed in
//! parallel.

use super::field::{Field, FieldValue};
use super::log_level::LogLevel;
use super::merge::merge_fields;
use super::ordered_fields::OrderedFieldSet;
use parking_lot::RwLock;
use std::collections::BTreeMap;

/// The three field classes held by a store
#[derive(Debug, Default)]
pub(crate) struct StoreFields {
    pub(crate) meta: OrderedFieldSet,
    pub(crate) normal: OrderedFieldSet,
    pub(crate) levels: BTreeMap<LogLevel, OrderedFieldSet>,
}

/// Thread-safe accumulation of log fields for one unit-of-work
///
/// # Example
///
/// ```
/// use logit::{Field, FieldStore, LogLevel};
///
/// let store = FieldStore::new();
/// store.add_meta_field("request_id", "req-42");
/// store.add_field("path", "/users");
/// store.add_level_field(LogLevel::Warn, "retry", 2);
///
/// let fields = store.merge(LogLevel::Warn, vec![Field::new("elapsed_ms", 12)]);
/// let keys: Vec<_> = fields.iter().map(|f| f.key.as_str()).collect();
/// assert_eq!(keys, ["request_id", "retry", "elapsed_ms"]);
/// ```
#[derive(Debug, Default)]
pub struct FieldStore {
    fields: RwLock<StoreFields>,
}

impl FieldStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or overwrite an ambient field
    pub fn add_field(&self, key: impl Into<String>, value: impl Into<FieldValue>) {
        self.fields.write().normal.set(key, value);
    }

    /// Add or overwrite several ambient fields
    pub fn add_fields(&self, fields: impl IntoIterator<Item = Field>) {
        self.fields.write().normal.extend(fields);
    }

    /// Add or overwrite a field that appears in every record
    pub fn add_meta_field(&self, key: impl Into<String>, value: impl Into<FieldValue>) {
        self.fields.write().meta.set(key, value);
    }

    pub fn add_meta_fields(&self, fields: impl IntoIterator<Item = Field>) {
        self.fields.write().meta.extend(fields);
    }

    /// Add or overwrite a field that only appears in records at `level`
    pub fn add_level_field(
        &self,
        level: LogLevel,
        key: impl Into<String>,
        value: impl Into<FieldValue>,
    ) {
        self.add_level_fields(level, [Field::new(key, value)]);
    }

    pub fn add_level_fields(&self, level: LogLevel, fields: impl IntoIterator<Item = Field>) {
        let mut guard = self.fields.write();
        guard.levels.entry(level).or_default().extend(fields);
    }

    pub fn add_debug(&self, fields: impl IntoIterator<Item = Field>) {
        self.add_level_fields(LogLevel::Debug, fields);
    }

    pub fn add_info(&self, fields: impl IntoIterator<Item = Field>) {
        self.add_level_fields(LogLevel::Info, fields);
    }

    pub fn add_warn(&self, fields: impl IntoIterator<Item = Field>) {
        self.add_level_fields(LogLevel::Warn, fields);
    }

    pub fn add_error(&self, fields: impl IntoIterator<Item = Field>) {
        self.add_level_fields(LogLevel::Error, fields);
    }

    pub fn add_fatal(&self, fields: impl IntoIterator<Item = Field>) {
        self.add_level_fields(LogLevel::Fatal, fields);
    }

    /// Remove `key` from meta, ambient and every level bucket
    pub fn remove_field(&self, key: &str) {
        let mut guard = self.fields.write();
        guard.meta.remove(key);
        guard.normal.remove(key);
        for bucket in guard.levels.values_mut() {
            bucket.remove(key);
        }
    }

    /// Drop every accumulated field
    pub fn clear(&self) {
        let mut guard = self.fields.write();
        guard.meta.clear();
        guard.normal.clear();
        guard.levels.clear();
    }

    /// Look up an ambient or level-scoped field.
    ///
    /// Ambient fields are searched first; which level bucket wins when several
    /// hold the key is unspecified.
    pub fn find_field(&self, key: &str) -> Option<Field> {
        let guard = self.fields.read();
        guard
            .normal
            .get(key)
            .or_else(|| guard.levels.values().find_map(|bucket| bucket.get(key)))
            .cloned()
    }

    /// Look up a meta field
    pub fn find_meta_field(&self, key: &str) -> Option<Field> {
        self.fields.read().meta.get(key).cloned()
    }

    /// Build the final field list for a record at `level`.
    ///
    /// Meta fields come first, then ambient fields (for `Info` only), then the
    /// fields stored for `level`, then `ad_hoc`. A key placed by an earlier
    /// step is never replaced by a later one.
    pub fn merge(&self, level: LogLevel, ad_hoc: Vec<Field>) -> Vec<Field> {
        merge_fields(&self.fields.read(), level, ad_hoc)
    }

    /// Levels with a bucket, lowest first.
    ///
    /// A bucket stays present once created, even after `remove_field` empties
    /// it; only `clear` drops buckets.
    pub fn present_levels(&self) -> Vec<LogLevel> {
        self.fields.read().levels.keys().copied().collect()
    }

    /// Total number of stored fields across all classes
    pub fn len(&self) -> usize {
        let guard = self.fields.read();
        guard.meta.len()
            + guard.normal.len()
            + guard.levels.values().map(OrderedFieldSet::len).sum::<usize>()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

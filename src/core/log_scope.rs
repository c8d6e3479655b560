//! Unit-of-work handle carrying an optional field store
//!
//! A [`LogScope`] is passed explicitly through the code that serves one request
//! or job. Cloning it is cheap and every clone shares the same
//! [`FieldStore`]. Operations on a scope without a store are silent no-ops, so
//! code that receives a bare scope keeps logging instead of failing.

use super::field::{Field, FieldValue};
use super::field_store::FieldStore;
use super::log_level::LogLevel;
use super::merge::merge_ad_hoc;
use std::sync::Arc;

#[derive(Debug, Clone, Default)]
pub struct LogScope {
    store: Option<Arc<FieldStore>>,
}

impl LogScope {
    /// A scope with a fresh, empty store
    pub fn new() -> Self {
        Self {
            store: Some(Arc::new(FieldStore::new())),
        }
    }

    /// A scope with no store; field operations are ignored
    pub fn detached() -> Self {
        Self { store: None }
    }

    /// Attach a fresh store unless one is already present
    #[must_use]
    pub fn with_store(mut self) -> Self {
        self.ensure_store();
        self
    }

    /// Attach a fresh store unless one is already present, returning it
    pub fn ensure_store(&mut self) -> &Arc<FieldStore> {
        self.store.get_or_insert_with(|| Arc::new(FieldStore::new()))
    }

    /// Swap in a fresh store, returning the previous one.
    ///
    /// Other clones of this scope keep the old store.
    pub fn replace_store(&mut self) -> Option<Arc<FieldStore>> {
        self.store.replace(Arc::new(FieldStore::new()))
    }

    pub fn store(&self) -> Option<&Arc<FieldStore>> {
        self.store.as_ref()
    }

    pub fn has_store(&self) -> bool {
        self.store.is_some()
    }

    pub fn add_field(&self, key: impl Into<String>, value: impl Into<FieldValue>) {
        if let Some(store) = &self.store {
            store.add_field(key, value);
        }
    }

    pub fn add_fields(&self, fields: impl IntoIterator<Item = Field>) {
        if let Some(store) = &self.store {
            store.add_fields(fields);
        }
    }

    pub fn add_meta_field(&self, key: impl Into<String>, value: impl Into<FieldValue>) {
        if let Some(store) = &self.store {
            store.add_meta_field(key, value);
        }
    }

    pub fn add_meta_fields(&self, fields: impl IntoIterator<Item = Field>) {
        if let Some(store) = &self.store {
            store.add_meta_fields(fields);
        }
    }

    pub fn add_level_field(
        &self,
        level: LogLevel,
        key: impl Into<String>,
        value: impl Into<FieldValue>,
    ) {
        if let Some(store) = &self.store {
            store.add_level_field(level, key, value);
        }
    }

    pub fn add_level_fields(&self, level: LogLevel, fields: impl IntoIterator<Item = Field>) {
        if let Some(store) = &self.store {
            store.add_level_fields(level, fields);
        }
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

    pub fn remove_field(&self, key: &str) {
        if let Some(store) = &self.store {
            store.remove_field(key);
        }
    }

    pub fn find_field(&self, key: &str) -> Option<Field> {
        self.store.as_ref()?.find_field(key)
    }

    pub fn find_meta_field(&self, key: &str) -> Option<Field> {
        self.store.as_ref()?.find_meta_field(key)
    }

    /// Final field list for a record at `level`; call-site fields only when
    /// there is no store
    pub fn merge(&self, level: LogLevel, ad_hoc: Vec<Field>) -> Vec<Field> {
        match &self.store {
            Some(store) => store.merge(level, ad_hoc),
            None => merge_ad_hoc(ad_hoc),
        }
    }

    /// Levels with a field bucket, lowest first
    pub fn present_levels(&self) -> Vec<LogLevel> {
        self.store
            .as_ref()
            .map(|store| store.present_levels())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detached_scope_is_noop() {
        let scope = LogScope::detached();
        scope.add_field("key", "text");
        scope.add_meta_field("key", "text");
        scope.add_warn([Field::new("key", "text")]);
        scope.add_debug([Field::new("key", "text")]);
        scope.add_error([Field::new("key", "text")]);
        scope.add_fatal([Field::new("key", "text")]);
        scope.add_info([Field::new("key", "text")]);
        scope.remove_field("key");

        assert!(scope.find_field("key").is_none());
        assert!(scope.find_meta_field("key").is_none());
        assert!(scope.present_levels().is_empty());
    }

    #[test]
    fn test_detached_scope_still_merges_call_site_fields() {
        let scope = LogScope::detached();
        let merged = scope.merge(LogLevel::Warn, vec![Field::new("a", 1)]);
        assert_eq!(merged, vec![Field::new("a", 1)]);
    }

    #[test]
    fn test_with_store_keeps_existing() {
        let scope = LogScope::new();
        scope.add_meta_field("key", "text");

        let scope = scope.with_store();
        assert!(scope.find_meta_field("key").is_some());

        let attached = LogScope::detached().with_store();
        assert!(attached.has_store());
    }

    #[test]
    fn test_replace_store_starts_empty() {
        let mut scope = LogScope::new();
        scope.add_field("key", "text");
        let other = scope.clone();

        let previous = scope.replace_store().expect("had a store");
        assert!(previous.find_field("key").is_some());
        assert!(scope.find_field("key").is_none());
        assert!(other.find_field("key").is_some());
    }

    #[test]
    fn test_clones_share_store() {
        let scope = LogScope::new();
        let clone = scope.clone();
        clone.add_field("shared", true);

        assert!(scope.find_field("shared").is_some());
    }
}

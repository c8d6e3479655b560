//! Insertion-ordered field map

use super::field::{Field, FieldValue};
use std::collections::HashMap;

/// Key → field mapping that remembers the order in which keys first appeared.
///
/// Overwriting a key replaces its value in place; the key keeps its original
/// position. Not synchronized on its own; `FieldStore` guards it.
#[derive(Debug, Clone, Default)]
pub struct OrderedFieldSet {
    order: Vec<String>,
    values: HashMap<String, Field>,
}

impl OrderedFieldSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite `field`
    pub fn insert(&mut self, field: Field) {
        if !self.values.contains_key(&field.key) {
            self.order.push(field.key.clone());
        }
        self.values.insert(field.key.clone(), field);
    }

    /// Insert or overwrite a key/value pair
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<FieldValue>) {
        self.insert(Field::new(key, value));
    }

    /// Remove `key`, returning its field if present
    pub fn remove(&mut self, key: &str) -> Option<Field> {
        let removed = self.values.remove(key)?;
        self.order.retain(|k| k != key);
        Some(removed)
    }

    pub fn get(&self, key: &str) -> Option<&Field> {
        self.values.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Fields in first-insertion order
    pub fn iter(&self) -> impl Iterator<Item = &Field> {
        self.order.iter().filter_map(|key| self.values.get(key))
    }

    /// Keys in first-insertion order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn clear(&mut self) {
        self.order.clear();
        self.values.clear();
    }
}

impl FromIterator<Field> for OrderedFieldSet {
    fn from_iter<I: IntoIterator<Item = Field>>(iter: I) -> Self {
        let mut set = Self::new();
        set.extend(iter);
        set
    }
}

impl Extend<Field> for OrderedFieldSet {
    fn extend<I: IntoIterator<Item = Field>>(&mut self, iter: I) {
        for field in iter {
            self.insert(field);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(set: &OrderedFieldSet) -> Vec<&str> {
        set.keys().collect()
    }

    #[test]
    fn test_first_insertion_order() {
        let mut set = OrderedFieldSet::new();
        set.set("b", 1);
        set.set("a", 2);
        set.set("c", 3);

        assert_eq!(keys(&set), vec!["b", "a", "c"]);
    }

    #[test]
    fn test_overwrite_keeps_position() {
        let mut set = OrderedFieldSet::new();
        set.set("a", 1);
        set.set("b", 2);
        set.set("a", 10);

        assert_eq!(keys(&set), vec!["a", "b"]);
        assert_eq!(set.get("a").map(|f| &f.value), Some(&FieldValue::Int(10)));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_remove_and_reinsert_moves_to_end() {
        let mut set: OrderedFieldSet =
            vec![Field::new("a", 1), Field::new("b", 2), Field::new("c", 3)]
                .into_iter()
                .collect();

        assert!(set.remove("a").is_some());
        assert!(set.remove("a").is_none());
        assert_eq!(keys(&set), vec!["b", "c"]);

        set.set("a", 4);
        assert_eq!(keys(&set), vec!["b", "c", "a"]);
    }

    #[test]
    fn test_iter_matches_order() {
        let mut set = OrderedFieldSet::new();
        set.set("x", "1");
        set.set("y", "2");

        let rendered: Vec<String> = set.iter().map(ToString::to_string).collect();
        assert_eq!(rendered, vec!["x=1", "y=2"]);
    }
}

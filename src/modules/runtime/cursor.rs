//! Cursor cache keyed by statement and parameters

use sqlblock_core::{CursorResult, Parameters};
use std::collections::HashMap;

/// Identity of a cursor
///
/// The statement is compared as written, so statements differing only in
/// whitespace get separate cursors. Parameters compare by their canonical
/// form; empty parameters are the same as none.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StatementKey {
    statement: String,
    parameters: Option<String>,
}

impl StatementKey {
    pub fn new(statement: &str, parameters: Option<&Parameters>) -> Self {
        Self {
            statement: statement.to_string(),
            parameters: parameters
                .filter(|p| !p.is_empty())
                .map(Parameters::canonical),
        }
    }

    pub fn statement(&self) -> &str {
        &self.statement
    }
}

/// Open cursors of a connector
#[derive(Debug, Default)]
pub struct CursorCache {
    cursors: HashMap<StatementKey, CursorResult>,
}

impl CursorCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_mut(&mut self, key: &StatementKey) -> Option<&mut CursorResult> {
        self.cursors.get_mut(key)
    }

    pub fn contains(&self, key: &StatementKey) -> bool {
        self.cursors.contains_key(key)
    }

    /// Store a cursor, replacing any cursor under the same key
    pub fn insert(&mut self, key: StatementKey, cursor: CursorResult) -> &mut CursorResult {
        self.cursors.remove(&key);
        self.cursors.entry(key).or_insert(cursor)
    }

    pub fn remove(&mut self, key: &StatementKey) -> Option<CursorResult> {
        self.cursors.remove(key)
    }

    pub fn len(&self) -> usize {
        self.cursors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cursors.is_empty()
    }

    /// Discard every cursor, returning how many were open
    pub fn clear(&mut self) -> usize {
        let count = self.cursors.len();
        self.cursors.clear();
        count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::BTreeMap;

    #[test]
    fn test_key_normalization() {
        let a = StatementKey::new("SELECT 1", None);
        let b = StatementKey::new("SELECT 1", Some(&Parameters::Positional(vec![])));
        let c = StatementKey::new("SELECT 1", Some(&Parameters::Named(BTreeMap::new())));
        assert_eq!(a, b);
        assert_eq!(a, c);

        let spaced = StatementKey::new("SELECT  1", None);
        assert_ne!(a, spaced);
    }

    #[test]
    fn test_key_named_order_independent() {
        let a = Parameters::named([("x", json!(1)), ("y", json!(2))]);
        let b = Parameters::named([("y", json!(2)), ("x", json!(1))]);
        assert_eq!(
            StatementKey::new("q", Some(&a)),
            StatementKey::new("q", Some(&b))
        );

        let c = Parameters::named([("x", json!(1)), ("y", json!(3))]);
        assert_ne!(
            StatementKey::new("q", Some(&a)),
            StatementKey::new("q", Some(&c))
        );
    }

    #[test]
    fn test_cache_insert_replace_clear() {
        let mut cache = CursorCache::new();
        let key = StatementKey::new("SELECT 1", None);
        cache.insert(key.clone(), CursorResult::from_rows_affected(1));
        assert!(cache.contains(&key));
        cache.insert(key.clone(), CursorResult::from_rows_affected(2));
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get_mut(&key).unwrap().rows_affected(), 2);

        cache.insert(StatementKey::new("SELECT 2", None), CursorResult::default());
        assert_eq!(cache.clear(), 2);
        assert!(cache.is_empty());
    }
}

//! Ordered session table with case-insensitive ids

use serde::Serialize;
use std::collections::HashMap;

/// A named connection spec (`user@host[:port]`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Session {
    pub id: String,
    pub spec: String,
}

/// Sessions in first-seen order.
///
/// Ids compare case-insensitively; inserting an id that already exists is
/// rejected so the first occurrence keeps both its value and its position.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct SessionTable {
    entries: Vec<Session>,
    #[serde(skip)]
    index: HashMap<String, usize>,
}

impl SessionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert unless the id is already present. Returns whether it was added.
    pub fn insert_first(&mut self, id: impl Into<String>, spec: impl Into<String>) -> bool {
        let id = id.into();
        let key = id.to_lowercase();
        if self.index.contains_key(&key) {
            return false;
        }
        self.index.insert(key, self.entries.len());
        self.entries.push(Session {
            id,
            spec: spec.into(),
        });
        true
    }

    pub fn get(&self, id: &str) -> Option<&Session> {
        self.index
            .get(&id.to_lowercase())
            .map(|&position| &self.entries[position])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(&id.to_lowercase())
    }

    /// Position of the id in display order
    pub fn position(&self, id: &str) -> Option<usize> {
        self.index.get(&id.to_lowercase()).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Session> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<'a> IntoIterator for &'a SessionTable {
    type Item = &'a Session;
    type IntoIter = std::slice::Iter<'a, Session>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_occurrence_wins() {
        let mut table = SessionTable::new();
        assert!(table.insert_first("Prod", "root@prod"));
        assert!(table.insert_first("dev", "me@dev"));
        assert!(!table.insert_first("PROD", "other@prod"));

        assert_eq!(table.len(), 2);
        assert_eq!(table.get("prod").unwrap().spec, "root@prod");
        assert_eq!(table.get("prod").unwrap().id, "Prod");
        assert_eq!(table.position("PrOd"), Some(0));
    }

    #[test]
    fn test_iteration_keeps_insertion_order() {
        let mut table = SessionTable::new();
        table.insert_first("zeta", "z@host");
        table.insert_first("alpha", "a@host");
        table.insert_first("mid", "m@host");

        let ids: Vec<&str> = table.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn test_serializes_as_list() {
        let mut table = SessionTable::new();
        table.insert_first("web", "www@10.0.0.1:2222");
        let json = serde_json::to_string(&table).unwrap();
        assert_eq!(json, r#"[{"id":"web","spec":"www@10.0.0.1:2222"}]"#);
    }
}

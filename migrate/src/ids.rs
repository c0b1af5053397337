//! Translation from legacy natural keys to identifiers assigned during this run.
use admin::Id;
use std::collections::HashMap;

#[derive(Debug, Default, Clone, PartialEq)]
pub struct IdMap {
    ids: HashMap<String, Id>,
}

impl IdMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Each key is expected once per run. A second record replaces the first.
    pub fn record(&mut self, key: impl Into<String>, id: Id) {
        let key = key.into();
        if let Some(previous) = self.ids.insert(key.clone(), id) {
            tracing::warn!(key, previous, id, "Identifier recorded twice, keeping the latest");
        }
    }

    /// Zero is never assigned, so a stored zero counts as unresolved too.
    pub fn resolve(&self, key: &str) -> Option<Id> {
        self.ids.get(key).copied().filter(|id| *id != 0)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, Id)> for IdMap {
    fn from_iter<T: IntoIterator<Item = (K, Id)>>(iter: T) -> Self {
        let mut map = IdMap::new();
        for (key, id) in iter {
            map.record(key, id);
        }
        map
    }
}

/// Cluster names and server addresses, filled by the first two phases.
#[derive(Debug, Default)]
pub struct IdTables {
    pub clusters: IdMap,
    pub servers: IdMap,
}

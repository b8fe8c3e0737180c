//! Streaming extraction with first-wins deduplication.

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

use tracing::debug;

use crate::errors::ExtractError;
use crate::source::{CsvSource, Row};

/// Records keyed by natural key; the first record offered for a key wins.
#[derive(Debug, Clone)]
pub struct EntityCollector<K, V> {
    records: BTreeMap<K, V>,
    duplicates: u64,
}

impl<K: Ord, V> Default for EntityCollector<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Ord, V> EntityCollector<K, V> {
    pub fn new() -> Self {
        Self {
            records: BTreeMap::new(),
            duplicates: 0,
        }
    }

    /// Scan `source` once. `extract` decides acceptance and normalizes the
    /// row into a keyed record; `None` skips the row.
    pub fn scan<F>(source: CsvSource, extract: F) -> Result<(Self, u64), ExtractError>
    where
        F: FnMut(&Row<'_>) -> Result<Option<(K, V)>, ExtractError>,
    {
        let path = source.path().to_path_buf();
        let mut collector = Self::new();
        let rows = collector.extend_from(source, extract)?;
        if collector.duplicates > 0 {
            debug!(
                path = %path.display(),
                duplicates = collector.duplicates,
                "kept first row for duplicate keys"
            );
        }
        Ok((collector, rows))
    }

    /// Like [`EntityCollector::scan`], adding to an existing collector.
    pub fn extend_from<F>(&mut self, source: CsvSource, mut extract: F) -> Result<u64, ExtractError>
    where
        F: FnMut(&Row<'_>) -> Result<Option<(K, V)>, ExtractError>,
    {
        source.for_each_row(|row| {
            if let Some((key, value)) = extract(row)? {
                self.offer(key, value);
            }
            Ok(())
        })
    }

    /// Keep `value` unless `key` is already present. Returns whether it was kept.
    pub fn offer(&mut self, key: K, value: V) -> bool {
        match self.records.entry(key) {
            Entry::Vacant(slot) => {
                slot.insert(value);
                true
            }
            Entry::Occupied(_) => {
                self.duplicates += 1;
                false
            }
        }
    }

    pub fn contains(&self, key: &K) -> bool {
        self.records.contains_key(key)
    }

    pub fn get(&self, key: &K) -> Option<&V> {
        self.records.get(key)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records ignored because their key was already taken.
    pub fn duplicates(&self) -> u64 {
        self.duplicates
    }

    pub fn into_map(self) -> BTreeMap<K, V> {
        self.records
    }

    pub fn into_values(self) -> Vec<V> {
        self.records.into_values().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::{parse_int, text};

    #[test]
    fn first_offer_wins() {
        let mut collector = EntityCollector::new();
        assert!(collector.offer((1, 2), "Main"));
        assert!(!collector.offer((1, 2), "Supporting"));
        assert_eq!(collector.get(&(1, 2)), Some(&"Main"));
        assert_eq!(collector.duplicates(), 1);
    }

    #[test]
    fn scan_applies_predicate_and_dedup() {
        let dir = std::env::temp_dir().join(format!("animeseed_collect_{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).expect("temp dir");
        let path = dir.join("character_nicknames.csv");
        std::fs::write(
            &path,
            "character_mal_id,nickname\n1,Spike\n1,Spike\n2,Faye\nx,Ed\n1,Swimming Bird\n",
        )
        .expect("write csv");

        let source = CsvSource::open(&path, &["character_mal_id", "nickname"], false).expect("open");
        let (collector, rows) = EntityCollector::scan(source, |row| {
            let Some(id) = parse_int(row.get("character_mal_id")) else {
                return Ok(None);
            };
            if id != 1 {
                return Ok(None);
            }
            Ok(text(row.get("nickname")).map(|nickname| ((id, nickname.clone()), nickname)))
        })
        .expect("scan");

        assert_eq!(rows, 5);
        assert_eq!(
            collector.into_values(),
            vec!["Spike".to_string(), "Swimming Bird".to_string()]
        );
    }
}

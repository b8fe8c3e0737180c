use std::collections::{BTreeMap, BTreeSet};

use animeseed_core::tables;

use crate::records::{Reference, SeedRow};
use crate::seedset::SeedSet;

/// Emitted primary-entity ids, indexed by table, for resolving references.
#[derive(Debug, Clone, Default)]
pub struct ParentIndex {
    ids: BTreeMap<&'static str, BTreeSet<i64>>,
}

impl ParentIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_seed(seed: &SeedSet) -> Self {
        let mut index = Self::new();
        index.ingest(tables::ANIME, seed.anime.keys().copied());
        index.ingest(tables::CHARACTER, seed.characters.keys().copied());
        index.ingest(tables::PERSON, seed.persons.keys().copied());
        index.ingest(tables::APP_USER, seed.app_users.keys().copied());
        index
    }

    pub fn ingest(&mut self, table: &'static str, ids: impl IntoIterator<Item = i64>) {
        self.ids.entry(table).or_default().extend(ids);
    }

    pub fn contains(&self, reference: &Reference) -> bool {
        self.ids
            .get(reference.table)
            .is_some_and(|ids| ids.contains(&reference.id))
    }

    /// First reference of `row` with no emitted parent.
    pub fn dangling<R: SeedRow>(&self, row: &R) -> Option<Reference> {
        row.references()
            .into_iter()
            .find(|reference| !self.contains(reference))
    }
}

use serde::{Deserialize, Serialize};

use crate::constraints::{ForeignKey, NaturalKey};

/// Relational layout of every table the seed generator emits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedCatalog {
    /// Contract version for this catalog format.
    pub catalog_version: String,
    /// Tables loaded by other seed scripts (lookups). References to them are
    /// resolved at mapping time and never re-checked.
    pub external_tables: Vec<String>,
    /// Tables rendered by this generator.
    pub tables: Vec<TableSpec>,
}

impl SeedCatalog {
    pub fn table(&self, name: &str) -> Option<&TableSpec> {
        self.tables.iter().find(|table| table.name == name)
    }

    pub fn is_external(&self, name: &str) -> bool {
        self.external_tables.iter().any(|table| table == name)
    }

    /// Tables sorted by their load-order number.
    pub fn tables_in_load_order(&self) -> Vec<&TableSpec> {
        let mut tables: Vec<&TableSpec> = self.tables.iter().collect();
        tables.sort_by_key(|table| table.load_order);
        tables
    }
}

/// A seed table: ordered columns, natural key and outgoing references.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableSpec {
    /// Position in the numbered seed file sequence.
    pub load_order: u16,
    pub name: String,
    pub columns: Vec<String>,
    pub key: NaturalKey,
    pub foreign_keys: Vec<ForeignKey>,
}

impl TableSpec {
    pub fn new(load_order: u16, name: &str, columns: &[&str], key: &[&str]) -> Self {
        Self {
            load_order,
            name: name.to_string(),
            columns: columns.iter().map(|column| column.to_string()).collect(),
            key: NaturalKey::new(key),
            foreign_keys: Vec::new(),
        }
    }

    pub fn references(mut self, column: &str, table: &str) -> Self {
        self.foreign_keys.push(ForeignKey::to_id(column, table));
        self
    }

    /// File name of the rendered script, e.g. `019_anime_seed.sql`.
    pub fn file_name(&self) -> String {
        format!("{:03}_{}_seed.sql", self.load_order, self.name)
    }

    pub fn conflict_clause(&self) -> String {
        format!("ON CONFLICT ({}) DO NOTHING;", self.key.columns.join(", "))
    }

    pub fn column_index(&self, column: &str) -> Option<usize> {
        self.columns.iter().position(|name| name == column)
    }
}

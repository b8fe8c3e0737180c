use serde::{Deserialize, Serialize};

/// Natural key of a seed table, in column order.
///
/// Drives both the `ON CONFLICT` target and the ascending row order of the
/// rendered script.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NaturalKey {
    pub columns: Vec<String>,
}

impl NaturalKey {
    pub fn new(columns: &[&str]) -> Self {
        Self {
            columns: columns.iter().map(|column| column.to_string()).collect(),
        }
    }
}

/// Foreign key definition preserving column ordering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForeignKey {
    pub columns: Vec<String>,
    pub referenced_table: String,
    pub referenced_columns: Vec<String>,
}

impl ForeignKey {
    /// Single-column reference to the `id` column of `table`.
    pub fn to_id(column: &str, table: &str) -> Self {
        Self {
            columns: vec![column.to_string()],
            referenced_table: table.to_string(),
            referenced_columns: vec!["id".to_string()],
        }
    }
}

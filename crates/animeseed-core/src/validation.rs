use std::collections::{BTreeMap, BTreeSet};

use crate::error::{Error, Result};
use crate::graph::build_fk_graph_report;
use crate::schema::SeedCatalog;

/// Validate internal consistency of a seed catalog.
///
/// This checks:
/// - duplicate tables/load-order numbers/columns
/// - natural key columns exist
/// - foreign key columns and referenced targets exist
/// - every referenced seed table loads before the referencing one
pub fn validate_catalog(catalog: &SeedCatalog) -> Result<()> {
    let mut columns_by_table: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();
    let mut load_orders = BTreeMap::new();

    for table in &catalog.tables {
        if catalog.is_external(&table.name) {
            return Err(Error::InvalidCatalog(format!(
                "table '{}' is declared both external and seeded",
                table.name
            )));
        }

        if let Some(previous) = load_orders.insert(table.load_order, table.name.as_str()) {
            return Err(Error::InvalidCatalog(format!(
                "load order {} shared by '{}' and '{}'",
                table.load_order, previous, table.name
            )));
        }

        let mut columns = BTreeSet::new();
        for column in &table.columns {
            if !columns.insert(column.as_str()) {
                return Err(Error::InvalidCatalog(format!(
                    "duplicate column name: {}.{}",
                    table.name, column
                )));
            }
        }

        if columns_by_table.insert(&table.name, columns).is_some() {
            return Err(Error::InvalidCatalog(format!(
                "duplicate table name: {}",
                table.name
            )));
        }
    }

    for table in &catalog.tables {
        let columns = &columns_by_table[table.name.as_str()];

        if table.key.columns.is_empty() {
            return Err(Error::InvalidCatalog(format!(
                "table '{}' has an empty natural key",
                table.name
            )));
        }
        for column in &table.key.columns {
            if !columns.contains(column.as_str()) {
                return Err(Error::InvalidCatalog(format!(
                    "natural key column not found: {}.{}",
                    table.name, column
                )));
            }
        }

        for fk in &table.foreign_keys {
            if fk.columns.len() != fk.referenced_columns.len() {
                return Err(Error::InvalidCatalog(format!(
                    "foreign key column count mismatch: {} -> {}",
                    table.name, fk.referenced_table
                )));
            }
            for column in &fk.columns {
                if !columns.contains(column.as_str()) {
                    return Err(Error::InvalidCatalog(format!(
                        "foreign key column not found: {}.{}",
                        table.name, column
                    )));
                }
            }

            if catalog.is_external(&fk.referenced_table) {
                continue;
            }

            let parent = catalog.table(&fk.referenced_table).ok_or_else(|| {
                Error::InvalidCatalog(format!(
                    "referenced table not found: {}",
                    fk.referenced_table
                ))
            })?;
            for column in &fk.referenced_columns {
                if !parent.columns.contains(column) {
                    return Err(Error::InvalidCatalog(format!(
                        "referenced column not found: {}.{}",
                        parent.name, column
                    )));
                }
            }
            if parent.name != table.name && parent.load_order >= table.load_order {
                return Err(Error::InvalidCatalog(format!(
                    "'{}' (#{}) must load after '{}' (#{})",
                    table.name, table.load_order, parent.name, parent.load_order
                )));
            }
        }
    }

    let report = build_fk_graph_report(catalog);
    if let Some(cycle) = report.cycle {
        return Err(Error::InvalidCatalog(format!(
            "foreign key cycle between: {}",
            cycle.join(", ")
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::seed_catalog;
    use crate::schema::TableSpec;

    fn catalog_with(tables: Vec<TableSpec>) -> SeedCatalog {
        SeedCatalog {
            catalog_version: "0.1".to_string(),
            external_tables: vec!["genre".to_string()],
            tables,
        }
    }

    #[test]
    fn seed_catalog_is_valid() {
        validate_catalog(&seed_catalog()).expect("seed catalog validates");
    }

    #[test]
    fn rejects_child_loaded_before_parent() {
        let catalog = catalog_with(vec![
            TableSpec::new(2, "anime", &["id"], &["id"]),
            TableSpec::new(1, "anime_genre", &["anime_id", "genre_id"], &["anime_id", "genre_id"])
                .references("anime_id", "anime")
                .references("genre_id", "genre"),
        ]);

        let err = validate_catalog(&catalog).expect_err("order violation");
        assert!(err.to_string().contains("must load after"));
    }

    #[test]
    fn rejects_unknown_reference() {
        let catalog = catalog_with(vec![
            TableSpec::new(1, "anime_studio", &["anime_id"], &["anime_id"])
                .references("anime_id", "anime"),
        ]);

        let err = validate_catalog(&catalog).expect_err("missing parent");
        assert!(err.to_string().contains("referenced table not found"));
    }

    #[test]
    fn rejects_key_outside_columns() {
        let catalog = catalog_with(vec![TableSpec::new(1, "anime", &["id"], &["mal_id"])]);

        let err = validate_catalog(&catalog).expect_err("bad key");
        assert!(err.to_string().contains("natural key column not found"));
    }
}

use std::collections::HashMap;

use animeseed_core::{SeedCatalog, build_fk_graph_report, validate_catalog};

use crate::errors::ExtractError;

/// Planned output for one seed table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputTask {
    pub load_order: u16,
    pub table: String,
    pub file: String,
}

/// Plan the numbered seed files, checking that the numbering is a valid
/// topological order of the catalog's foreign-key graph.
pub fn plan_outputs(catalog: &SeedCatalog) -> Result<Vec<OutputTask>, ExtractError> {
    validate_catalog(catalog)?;

    let report = build_fk_graph_report(catalog);
    if report.topo_order.is_none() {
        let cycle = report.cycle.unwrap_or_default();
        return Err(ExtractError::InvalidOptions(format!(
            "cyclic foreign-key graph: {}",
            cycle.join(", ")
        )));
    }

    let ordered = catalog.tables_in_load_order();
    let position: HashMap<&str, usize> = ordered
        .iter()
        .enumerate()
        .map(|(index, table)| (table.name.as_str(), index))
        .collect();

    for table in &ordered {
        for fk in &table.foreign_keys {
            if fk.referenced_table == table.name {
                continue;
            }
            if let Some(parent) = position.get(fk.referenced_table.as_str())
                && *parent >= position[table.name.as_str()]
            {
                return Err(ExtractError::InvalidOptions(format!(
                    "seed file for '{}' would load before its parent '{}'",
                    table.name, fk.referenced_table
                )));
            }
        }
    }

    if ordered.is_empty() {
        return Err(ExtractError::InvalidOptions(
            "catalog has no seed tables".to_string(),
        ));
    }

    Ok(ordered
        .into_iter()
        .map(|table| OutputTask {
            load_order: table.load_order,
            table: table.name.clone(),
            file: table.file_name(),
        })
        .collect())
}

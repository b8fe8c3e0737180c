use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::schema::SeedCatalog;

/// Summary of FK graph structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FkGraphSummary {
    pub nodes: usize,
    pub edges: usize,
}

/// Report for FK dependency ordering.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FkGraphReport {
    pub summary: FkGraphSummary,
    pub topo_order: Option<Vec<String>>,
    pub cycle: Option<Vec<String>>,
}

/// Build a deterministic FK dependency report for the seed catalog.
///
/// External lookup tables are left out of the graph: they are always loaded
/// before any seed file and cannot participate in a cycle.
pub fn build_fk_graph_report(catalog: &SeedCatalog) -> FkGraphReport {
    let graph = build_adjacency(catalog);
    let nodes = graph.len();
    let edges = graph.values().map(|targets| targets.len()).sum();
    let summary = FkGraphSummary { nodes, edges };

    match toposort(&graph) {
        Ok(order) => FkGraphReport {
            summary,
            topo_order: Some(order),
            cycle: None,
        },
        Err(cycle) => FkGraphReport {
            summary,
            topo_order: None,
            cycle: Some(cycle),
        },
    }
}

fn build_adjacency(catalog: &SeedCatalog) -> BTreeMap<String, BTreeSet<String>> {
    let mut graph: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();

    for table in &catalog.tables {
        graph.entry(table.name.clone()).or_default();

        for fk in &table.foreign_keys {
            if catalog.is_external(&fk.referenced_table) {
                continue;
            }
            // Self references (recommendations) do not constrain load order.
            if fk.referenced_table == table.name {
                continue;
            }
            graph
                .entry(fk.referenced_table.clone())
                .or_default()
                .insert(table.name.clone());
        }
    }

    graph
}

fn toposort(graph: &BTreeMap<String, BTreeSet<String>>) -> Result<Vec<String>, Vec<String>> {
    let mut indegree: BTreeMap<String, usize> = BTreeMap::new();

    for node in graph.keys() {
        indegree.entry(node.clone()).or_insert(0);
    }

    for targets in graph.values() {
        for target in targets {
            *indegree.entry(target.clone()).or_insert(0) += 1;
        }
    }

    let mut ready: BTreeSet<String> = indegree
        .iter()
        .filter_map(|(node, count)| (*count == 0).then(|| node.clone()))
        .collect();

    let mut order = Vec::with_capacity(graph.len());

    while let Some(node) = ready.pop_first() {
        order.push(node.clone());

        if let Some(targets) = graph.get(&node) {
            for target in targets {
                if let Some(count) = indegree.get_mut(target) {
                    *count = count.saturating_sub(1);
                    if *count == 0 {
                        ready.insert(target.clone());
                    }
                }
            }
        }
    }

    if order.len() == graph.len() {
        Ok(order)
    } else {
        let cycle_nodes: Vec<String> = indegree
            .into_iter()
            .filter_map(|(node, count)| (count > 0).then_some(node))
            .collect();
        Err(cycle_nodes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{seed_catalog, tables};
    use crate::schema::TableSpec;

    #[test]
    fn toposort_reports_cycle() {
        let catalog = SeedCatalog {
            catalog_version: "0.1".to_string(),
            external_tables: Vec::new(),
            tables: vec![
                TableSpec::new(1, "a", &["id", "b_id"], &["id"]).references("b_id", "b"),
                TableSpec::new(2, "b", &["id", "a_id"], &["id"]).references("a_id", "a"),
            ],
        };

        let report = build_fk_graph_report(&catalog);
        assert!(report.topo_order.is_none());
        let cycle = report.cycle.expect("cycle");
        assert!(cycle.contains(&"a".to_string()));
        assert!(cycle.contains(&"b".to_string()));
    }

    #[test]
    fn toposort_orders_dependencies() {
        let report = build_fk_graph_report(&seed_catalog());
        let order = report.topo_order.expect("expected toposort");
        let position = |name: &str| order.iter().position(|item| item == name).unwrap();

        assert!(position(tables::ANIME) < position(tables::CHARACTER_ANIME_WORK));
        assert!(position(tables::CHARACTER) < position(tables::PERSON_VOICE_WORK));
        assert!(position(tables::PERSON) < position(tables::PERSON_ALTERNATE_NAME));
        assert_eq!(report.summary.nodes, 18);
    }
}

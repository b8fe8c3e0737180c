//! Core contracts and helpers for animeseed.
//!
//! This crate defines the seed table catalog, its foreign-key ordering checks
//! and the SQL literal type shared by the extraction engine and the CLI.

pub mod catalog;
pub mod constraints;
pub mod error;
pub mod graph;
pub mod schema;
pub mod validation;
pub mod value;

pub use catalog::{ANIME_ATTRIBUTE_TABLES, CATALOG_VERSION, seed_catalog, tables};
pub use constraints::{ForeignKey, NaturalKey};
pub use error::{Error, Result};
pub use graph::{FkGraphReport, FkGraphSummary, build_fk_graph_report};
pub use schema::{SeedCatalog, TableSpec};
pub use validation::validate_catalog;
pub use value::{Number, SqlValue};

//! Referential-integrity-preserving seed extraction for animeseed.
//!
//! This crate samples anchor anime from the source datasets, pulls in every
//! character, person and relation they depend on, filters the result until no
//! row dangles and renders one conflict-safe SQL seed file per table.

pub mod closure;
pub mod collector;
pub mod consistency;
pub mod engine;
pub mod entities;
pub mod errors;
pub mod foreign;
pub mod lookup;
pub mod model;
pub mod normalize;
pub mod output;
pub mod planner;
pub mod records;
pub mod relations;
pub mod sampler;
pub mod seedset;
pub mod source;
pub mod validator;

pub use engine::{SeedEngine, SeedResult};
pub use errors::ExtractError;
pub use model::{ExtractOptions, ExtractionReport, SourceLayout, TableReport};

//! Primary entities: source columns, normalization and acceptance rules.

pub mod anime;
pub mod app_user;
pub mod character;
pub mod person;

pub use anime::{AnimeExtraction, AnimeRecord, AnimeRow, AnimeStats, extract_anime};
pub use app_user::{AppUserRow, sample_app_users};
pub use character::{CharacterRow, extract_characters};
pub use person::{PersonRow, extract_persons};

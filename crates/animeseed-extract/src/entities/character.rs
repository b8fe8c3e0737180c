use std::collections::{BTreeMap, BTreeSet};

use animeseed_core::SqlValue;

use crate::collector::EntityCollector;
use crate::errors::ExtractError;
use crate::model::{ExtractionReport, SourceLayout};
use crate::normalize::{parse_int, text};
use crate::records::SeedRow;
use crate::source::{CsvSource, Row};
use crate::validator::{DropReason, Validate, has_text, validate_all};

pub const CHARACTER_COLUMNS: [&str; 7] = [
    "character_mal_id",
    "url",
    "name",
    "name_kanji",
    "image",
    "favorites",
    "about",
];

/// Normalized `characters.csv` row.
#[derive(Debug, Clone, PartialEq)]
pub struct CharacterRecord {
    pub id: i64,
    pub url: Option<String>,
    pub name: Option<String>,
    pub name_japanese: Option<String>,
    pub image_url: Option<String>,
    pub favorites: i64,
    pub about: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CharacterRow {
    pub id: i64,
    pub url: String,
    pub name: String,
    pub name_japanese: Option<String>,
    pub image_url: String,
    pub favorites: i64,
    pub about: Option<String>,
}

impl CharacterRecord {
    pub fn from_row(id: i64, row: &Row<'_>) -> Self {
        Self {
            id,
            url: text(row.get("url")),
            name: text(row.get("name")),
            name_japanese: text(row.get("name_kanji")),
            image_url: text(row.get("image")),
            favorites: parse_int(row.get("favorites")).unwrap_or(0),
            about: text(row.get("about")),
        }
    }
}

impl Validate for CharacterRecord {
    type Row = CharacterRow;

    fn validate(&self) -> Result<CharacterRow, DropReason> {
        let (Some(name), Some(url)) = (&self.name, &self.url) else {
            return Err(DropReason::CharacterMissingRequiredText);
        };
        if !has_text(Some(name.as_str())) || !has_text(Some(url.as_str())) {
            return Err(DropReason::CharacterMissingRequiredText);
        }

        Ok(CharacterRow {
            id: self.id,
            url: url.clone(),
            name: name.clone(),
            name_japanese: self.name_japanese.clone(),
            image_url: self.image_url.clone().unwrap_or_default(),
            favorites: self.favorites,
            about: self.about.clone(),
        })
    }
}

impl SeedRow for CharacterRow {
    type Key = i64;

    fn key(&self) -> i64 {
        self.id
    }

    fn values(&self) -> Vec<SqlValue> {
        vec![
            self.id.into(),
            self.url.as_str().into(),
            self.name.as_str().into(),
            self.name_japanese.clone().into(),
            self.image_url.as_str().into(),
            self.favorites.into(),
            self.about.clone().into(),
        ]
    }
}

/// Fetch and validate the characters in `wanted`.
pub fn extract_characters(
    layout: &SourceLayout,
    wanted: &BTreeSet<i64>,
    report: &mut ExtractionReport,
    progress: bool,
) -> Result<BTreeMap<i64, CharacterRow>, ExtractError> {
    let source = CsvSource::open(
        &layout.dataset(&layout.characters),
        &CHARACTER_COLUMNS,
        progress,
    )?;
    let (records, rows) = EntityCollector::scan(source, |row| {
        Ok(parse_int(row.get("character_mal_id"))
            .filter(|id| wanted.contains(id))
            .map(|id| (id, CharacterRecord::from_row(id, row))))
    })?;
    report.record_scan("characters", rows);

    Ok(validate_all(
        wanted,
        &records.into_map(),
        DropReason::CharacterMissingDetails,
        report,
    ))
}

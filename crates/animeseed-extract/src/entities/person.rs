use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;

use animeseed_core::SqlValue;

use crate::collector::EntityCollector;
use crate::entities::anime::date_value;
use crate::errors::ExtractError;
use crate::lookup::{LookupKind, Lookups};
use crate::model::{ExtractionReport, SourceLayout};
use crate::normalize::{parse_date, parse_int, split_location, text};
use crate::records::SeedRow;
use crate::source::{CsvSource, Row};
use crate::validator::{DropReason, Validate, validate_all};

pub const PERSON_COLUMNS: [&str; 10] = [
    "person_mal_id",
    "url",
    "website_url",
    "image_url",
    "name",
    "given_name",
    "family_name",
    "birthday",
    "favorites",
    "relevant_location",
];

/// Normalized `person_details.csv` row; the location is already split and the
/// country resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct PersonRecord {
    pub id: i64,
    pub url: Option<String>,
    pub website_url: Option<String>,
    pub image_url: Option<String>,
    pub name: Option<String>,
    pub given_name: Option<String>,
    pub family_name: Option<String>,
    pub birthday: Option<NaiveDate>,
    pub favorites: i64,
    pub city: Option<String>,
    pub country_id: Option<i64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PersonRow {
    pub id: i64,
    pub url: String,
    pub website_url: Option<String>,
    pub image_url: Option<String>,
    pub name: Option<String>,
    pub given_name: Option<String>,
    pub family_name: Option<String>,
    pub birthday: Option<NaiveDate>,
    pub favorites: i64,
    pub city: String,
    pub country_id: i64,
}

impl PersonRecord {
    pub fn from_row(id: i64, row: &Row<'_>, lookups: &Lookups) -> Self {
        let (city, country) = split_location(row.get("relevant_location"));
        Self {
            id,
            url: text(row.get("url")),
            website_url: text(row.get("website_url")),
            image_url: text(row.get("image_url")),
            name: text(row.get("name")),
            given_name: text(row.get("given_name")),
            family_name: text(row.get("family_name")),
            birthday: parse_date(row.get("birthday")),
            favorites: parse_int(row.get("favorites")).unwrap_or(0),
            city,
            country_id: lookups.resolve(LookupKind::Country, country.as_deref()),
        }
    }
}

impl Validate for PersonRecord {
    type Row = PersonRow;

    fn validate(&self) -> Result<PersonRow, DropReason> {
        let (Some(city), Some(country_id)) = (&self.city, self.country_id) else {
            return Err(DropReason::PersonMissingLocationCountry);
        };

        Ok(PersonRow {
            id: self.id,
            url: self.url.clone().unwrap_or_default(),
            website_url: self.website_url.clone(),
            image_url: self.image_url.clone(),
            name: self.name.clone(),
            given_name: self.given_name.clone(),
            family_name: self.family_name.clone(),
            birthday: self.birthday,
            favorites: self.favorites,
            city: city.clone(),
            country_id,
        })
    }
}

impl SeedRow for PersonRow {
    type Key = i64;

    fn key(&self) -> i64 {
        self.id
    }

    fn values(&self) -> Vec<SqlValue> {
        vec![
            self.id.into(),
            self.url.as_str().into(),
            self.website_url.clone().into(),
            self.image_url.clone().into(),
            self.name.clone().into(),
            self.given_name.clone().into(),
            self.family_name.clone().into(),
            date_value(self.birthday),
            self.favorites.into(),
            self.city.as_str().into(),
            self.country_id.into(),
        ]
    }
}

/// Fetch and validate the persons in `wanted`.
pub fn extract_persons(
    layout: &SourceLayout,
    wanted: &BTreeSet<i64>,
    lookups: &Lookups,
    report: &mut ExtractionReport,
    progress: bool,
) -> Result<BTreeMap<i64, PersonRow>, ExtractError> {
    let source = CsvSource::open(
        &layout.dataset(&layout.person_details),
        &PERSON_COLUMNS,
        progress,
    )?;
    let (records, rows) = EntityCollector::scan(source, |row| {
        Ok(parse_int(row.get("person_mal_id"))
            .filter(|id| wanted.contains(id))
            .map(|id| (id, PersonRecord::from_row(id, row, lookups))))
    })?;
    report.record_scan("person_details", rows);

    Ok(validate_all(
        wanted,
        &records.into_map(),
        DropReason::PersonMissingDetails,
        report,
    ))
}

//! Row acceptance policies and the reasons rows are dropped.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use animeseed_core::tables;

use crate::model::ExtractionReport;

/// Why a row was left out of the seed set. Each reason maps to one report code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DropReason {
    AnimeMissingDetails,
    AnimeMissingStats,
    AnimeMissingSourceStatus,
    AnimeMissingRequiredText,
    CharacterMissingDetails,
    CharacterMissingRequiredText,
    PersonMissingDetails,
    PersonMissingLocationCountry,
    AppUserMissingRequiredValues,
    /// A list value of an anime attribute column has no lookup id.
    UnknownAttributeValue(&'static str),
    UnknownRole,
    MissingPosition,
    UnknownLanguage,
    InvalidId(&'static str),
    RecommendationOutsideSubset,
    DanglingReference(&'static str),
    Unreferenced(&'static str),
}

impl DropReason {
    pub fn code(&self) -> String {
        match self {
            DropReason::AnimeMissingDetails => "anime.missing_details_row".to_string(),
            DropReason::AnimeMissingStats => "anime.missing_stats_row".to_string(),
            DropReason::AnimeMissingSourceStatus => {
                "anime.missing_source_status_lookup".to_string()
            }
            DropReason::AnimeMissingRequiredText => "anime.missing_required_text".to_string(),
            DropReason::CharacterMissingDetails => "character.missing_details_row".to_string(),
            DropReason::CharacterMissingRequiredText => {
                "character.missing_required_text".to_string()
            }
            DropReason::PersonMissingDetails => "person.missing_details_row".to_string(),
            DropReason::PersonMissingLocationCountry => {
                "person.missing_location_country".to_string()
            }
            DropReason::AppUserMissingRequiredValues => {
                "app_user.missing_required_values".to_string()
            }
            DropReason::UnknownAttributeValue(table) => format!("{table}.unknown_value"),
            DropReason::UnknownRole => format!("{}.unknown_role", tables::CHARACTER_ANIME_WORK),
            DropReason::MissingPosition => {
                format!("{}.missing_position", tables::PERSON_ANIME_WORK)
            }
            DropReason::UnknownLanguage => {
                format!("{}.unknown_language", tables::PERSON_VOICE_WORK)
            }
            DropReason::InvalidId(table) => format!("{table}.invalid_id"),
            DropReason::RecommendationOutsideSubset => {
                format!("{}.outside_subset", tables::ANIME_RECOMMENDATION)
            }
            DropReason::DanglingReference(table) => format!("{table}.dangling_reference"),
            DropReason::Unreferenced(table) => format!("{table}.unreferenced"),
        }
    }
}

impl fmt::Display for DropReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.code())
    }
}

/// A normalized source record that becomes a seed row once its required
/// fields and lookups are present.
pub trait Validate {
    type Row;

    fn validate(&self) -> Result<Self::Row, DropReason>;
}

/// Validate the record for every wanted id.
///
/// Ids without a record count as `missing`; rejected records count under
/// their own reason. Accepted rows are keyed by id.
pub fn validate_all<D: Validate>(
    wanted: &BTreeSet<i64>,
    records: &BTreeMap<i64, D>,
    missing: DropReason,
    report: &mut ExtractionReport,
) -> BTreeMap<i64, D::Row> {
    let mut accepted = BTreeMap::new();

    for id in wanted {
        let Some(record) = records.get(id) else {
            report.record_drop(missing);
            continue;
        };
        match record.validate() {
            Ok(row) => {
                accepted.insert(*id, row);
            }
            Err(reason) => report.record_drop(reason),
        }
    }

    accepted
}

/// Required text is present when it has at least one non-blank character.
pub fn has_text(value: Option<&str>) -> bool {
    value.is_some_and(|value| !value.trim().is_empty())
}

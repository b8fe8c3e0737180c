//! Secondary relation files scanned after the entity sets are known.

use std::collections::BTreeSet;

use crate::collector::EntityCollector;
use crate::errors::ExtractError;
use crate::model::{ExtractionReport, SourceLayout};
use crate::normalize::{parse_int, text};
use crate::records::{AnimeRecommendationRow, CharacterNicknameRow, PersonAlternateNameRow};
use crate::source::CsvSource;
use crate::validator::DropReason;

pub const NICKNAME_COLUMNS: [&str; 2] = ["character_mal_id", "nickname"];
pub const ALTERNATE_NAME_COLUMNS: [&str; 2] = ["person_mal_id", "alt_name"];
pub const RECOMMENDATION_COLUMNS: [&str; 2] = ["mal_id", "recommendation_mal_id"];

pub fn extract_character_nicknames(
    layout: &SourceLayout,
    characters: &BTreeSet<i64>,
    report: &mut ExtractionReport,
    progress: bool,
) -> Result<Vec<CharacterNicknameRow>, ExtractError> {
    let source = CsvSource::open(
        &layout.dataset(&layout.character_nicknames),
        &NICKNAME_COLUMNS,
        progress,
    )?;
    let (nicknames, rows) = EntityCollector::scan(source, |row| {
        let Some(character_id) =
            parse_int(row.get("character_mal_id")).filter(|id| characters.contains(id))
        else {
            return Ok(None);
        };
        Ok(text(row.get("nickname")).map(|nickname| {
            (
                (character_id, nickname.clone()),
                CharacterNicknameRow {
                    character_id,
                    nickname,
                },
            )
        }))
    })?;
    report.record_scan("character_nicknames", rows);
    Ok(nicknames.into_values())
}

pub fn extract_person_alternate_names(
    layout: &SourceLayout,
    persons: &BTreeSet<i64>,
    report: &mut ExtractionReport,
    progress: bool,
) -> Result<Vec<PersonAlternateNameRow>, ExtractError> {
    let source = CsvSource::open(
        &layout.dataset(&layout.person_alternate_names),
        &ALTERNATE_NAME_COLUMNS,
        progress,
    )?;
    let (names, rows) = EntityCollector::scan(source, |row| {
        let Some(person_id) = parse_int(row.get("person_mal_id")).filter(|id| persons.contains(id))
        else {
            return Ok(None);
        };
        Ok(text(row.get("alt_name")).map(|alternate_name| {
            (
                (person_id, alternate_name.clone()),
                PersonAlternateNameRow {
                    person_id,
                    alternate_name,
                },
            )
        }))
    })?;
    report.record_scan("person_alternate_names", rows);
    Ok(names.into_values())
}

/// Recommendations with both ends in `anime`; others count as outside the subset.
pub fn extract_recommendations(
    layout: &SourceLayout,
    anime: &BTreeSet<i64>,
    report: &mut ExtractionReport,
    progress: bool,
) -> Result<Vec<AnimeRecommendationRow>, ExtractError> {
    let source = CsvSource::open(
        &layout.dataset(&layout.recommendations),
        &RECOMMENDATION_COLUMNS,
        progress,
    )?;
    let mut outside = 0_u64;
    let (recommendations, rows) = EntityCollector::scan(source, |row| {
        let (Some(anime_id), Some(recommended_anime_id)) = (
            parse_int(row.get("mal_id")),
            parse_int(row.get("recommendation_mal_id")),
        ) else {
            return Ok(None);
        };
        if !anime.contains(&anime_id) || !anime.contains(&recommended_anime_id) {
            outside += 1;
            return Ok(None);
        }
        let recommendation = AnimeRecommendationRow {
            anime_id,
            recommended_anime_id,
        };
        Ok(Some((recommendation, recommendation)))
    })?;
    report.record_scan("recommendations", rows);
    report.record_drops(DropReason::RecommendationOutsideSubset, outside);
    Ok(recommendations.into_values())
}

//! Characters and persons reachable from the validated anime set.

use std::collections::BTreeSet;

use tracing::info;

use animeseed_core::tables;

use crate::collector::EntityCollector;
use crate::errors::ExtractError;
use crate::lookup::{LookupKind, Lookups};
use crate::model::{ExtractionReport, SourceLayout};
use crate::normalize::{parse_int, text};
use crate::records::{CharacterAnimeWorkRow, PersonAnimeWorkRow, PersonVoiceWorkRow};
use crate::source::CsvSource;
use crate::validator::DropReason;

pub const CHARACTER_WORK_COLUMNS: [&str; 3] = ["anime_mal_id", "character_mal_id", "role"];
pub const PERSON_WORK_COLUMNS: [&str; 3] = ["person_mal_id", "position", "anime_mal_id"];
pub const VOICE_WORK_COLUMNS: [&str; 4] =
    ["person_mal_id", "anime_mal_id", "character_mal_id", "language"];

/// Relation rows tied to the anime set and the entity ids they reference.
#[derive(Debug, Clone, Default)]
pub struct DependencyClosure {
    pub character_works: Vec<CharacterAnimeWorkRow>,
    pub person_works: Vec<PersonAnimeWorkRow>,
    pub voice_works: Vec<PersonVoiceWorkRow>,
    pub character_ids: BTreeSet<i64>,
    pub person_ids: BTreeSet<i64>,
}

impl DependencyClosure {
    /// Scan the three relation files once each, in dependency order: voice
    /// works need the character closure from the cast scan.
    pub fn compute(
        layout: &SourceLayout,
        anime_ids: &BTreeSet<i64>,
        lookups: &Lookups,
        report: &mut ExtractionReport,
        progress: bool,
    ) -> Result<Self, ExtractError> {
        let character_works = scan_character_works(layout, anime_ids, lookups, report, progress)?;
        let character_ids: BTreeSet<i64> = character_works
            .iter()
            .map(|row| row.character_id)
            .collect();

        let person_works = scan_person_works(layout, anime_ids, report, progress)?;
        let voice_works =
            scan_voice_works(layout, anime_ids, &character_ids, lookups, report, progress)?;

        let person_ids: BTreeSet<i64> = person_works
            .iter()
            .map(|row| row.person_id)
            .chain(voice_works.iter().map(|row| row.person_id))
            .collect();

        info!(
            character_works = character_works.len(),
            person_works = person_works.len(),
            voice_works = voice_works.len(),
            characters = character_ids.len(),
            persons = person_ids.len(),
            "closure computed"
        );

        Ok(Self {
            character_works,
            person_works,
            voice_works,
            character_ids,
            person_ids,
        })
    }
}

fn scan_character_works(
    layout: &SourceLayout,
    anime_ids: &BTreeSet<i64>,
    lookups: &Lookups,
    report: &mut ExtractionReport,
    progress: bool,
) -> Result<Vec<CharacterAnimeWorkRow>, ExtractError> {
    let source = CsvSource::open(
        &layout.dataset(&layout.character_anime_works),
        &CHARACTER_WORK_COLUMNS,
        progress,
    )?;
    let mut invalid = 0_u64;
    let mut unknown_role = 0_u64;

    let (works, rows) = EntityCollector::scan(source, |row| {
        let Some(anime_id) = parse_int(row.get("anime_mal_id")).filter(|id| anime_ids.contains(id))
        else {
            return Ok(None);
        };
        let Some(character_id) = parse_int(row.get("character_mal_id")) else {
            invalid += 1;
            return Ok(None);
        };
        let Some(character_role_id) =
            lookups.resolve(LookupKind::CharacterRole, text(row.get("role")).as_deref())
        else {
            unknown_role += 1;
            return Ok(None);
        };

        Ok(Some((
            (anime_id, character_id),
            CharacterAnimeWorkRow {
                anime_id,
                character_id,
                character_role_id,
            },
        )))
    })?;

    report.record_scan("character_anime_works", rows);
    report.record_drops(DropReason::InvalidId(tables::CHARACTER_ANIME_WORK), invalid);
    report.record_drops(DropReason::UnknownRole, unknown_role);
    Ok(works.into_values())
}

fn scan_person_works(
    layout: &SourceLayout,
    anime_ids: &BTreeSet<i64>,
    report: &mut ExtractionReport,
    progress: bool,
) -> Result<Vec<PersonAnimeWorkRow>, ExtractError> {
    let source = CsvSource::open(
        &layout.dataset(&layout.person_anime_works),
        &PERSON_WORK_COLUMNS,
        progress,
    )?;
    let mut invalid = 0_u64;
    let mut missing_position = 0_u64;

    let (works, rows) = EntityCollector::scan(source, |row| {
        let Some(anime_id) = parse_int(row.get("anime_mal_id")).filter(|id| anime_ids.contains(id))
        else {
            return Ok(None);
        };
        let Some(person_id) = parse_int(row.get("person_mal_id")) else {
            invalid += 1;
            return Ok(None);
        };
        let Some(position) = text(row.get("position")) else {
            missing_position += 1;
            return Ok(None);
        };

        Ok(Some((
            (anime_id, person_id),
            PersonAnimeWorkRow {
                anime_id,
                person_id,
                position,
            },
        )))
    })?;

    report.record_scan("person_anime_works", rows);
    report.record_drops(DropReason::InvalidId(tables::PERSON_ANIME_WORK), invalid);
    report.record_drops(DropReason::MissingPosition, missing_position);
    Ok(works.into_values())
}

fn scan_voice_works(
    layout: &SourceLayout,
    anime_ids: &BTreeSet<i64>,
    character_ids: &BTreeSet<i64>,
    lookups: &Lookups,
    report: &mut ExtractionReport,
    progress: bool,
) -> Result<Vec<PersonVoiceWorkRow>, ExtractError> {
    let source = CsvSource::open(
        &layout.dataset(&layout.person_voice_works),
        &VOICE_WORK_COLUMNS,
        progress,
    )?;
    let mut invalid = 0_u64;
    let mut unknown_language = 0_u64;

    let (works, rows) = EntityCollector::scan(source, |row| {
        let Some(anime_id) = parse_int(row.get("anime_mal_id")).filter(|id| anime_ids.contains(id))
        else {
            return Ok(None);
        };
        let (Some(person_id), Some(character_id)) = (
            parse_int(row.get("person_mal_id")),
            parse_int(row.get("character_mal_id")),
        ) else {
            invalid += 1;
            return Ok(None);
        };
        if !character_ids.contains(&character_id) {
            return Ok(None);
        }
        let Some(language_id) =
            lookups.resolve(LookupKind::Language, text(row.get("language")).as_deref())
        else {
            unknown_language += 1;
            return Ok(None);
        };

        let work = PersonVoiceWorkRow {
            person_id,
            anime_id,
            character_id,
            language_id,
        };
        Ok(Some((work, work)))
    })?;

    report.record_scan("person_voice_works", rows);
    report.record_drops(DropReason::InvalidId(tables::PERSON_VOICE_WORK), invalid);
    report.record_drops(DropReason::UnknownLanguage, unknown_language);
    Ok(works.into_values())
}

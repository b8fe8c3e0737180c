//! Re-filter relations against the emitted entity sets until nothing dangles.

use std::collections::BTreeSet;

use tracing::{debug, info};

use animeseed_core::tables;

use crate::errors::ExtractError;
use crate::foreign::ParentIndex;
use crate::model::ExtractionReport;
use crate::records::SeedRow;
use crate::seedset::SeedSet;
use crate::validator::DropReason;

/// Drop relation rows whose parents are gone, and characters or persons no
/// surviving relation references, until a pass removes nothing.
///
/// Returns the number of passes.
pub fn enforce(seed: &mut SeedSet, report: &mut ExtractionReport) -> usize {
    let mut passes = 0;

    loop {
        passes += 1;
        let index = ParentIndex::from_seed(seed);

        for (table, rows) in seed.attributes.iter_mut() {
            retain_resolved(rows, &index, *table, report);
        }
        retain_resolved(
            &mut seed.recommendations,
            &index,
            tables::ANIME_RECOMMENDATION,
            report,
        );
        retain_resolved(
            &mut seed.character_works,
            &index,
            tables::CHARACTER_ANIME_WORK,
            report,
        );
        retain_resolved(
            &mut seed.person_works,
            &index,
            tables::PERSON_ANIME_WORK,
            report,
        );
        retain_resolved(
            &mut seed.voice_works,
            &index,
            tables::PERSON_VOICE_WORK,
            report,
        );

        let cast: BTreeSet<i64> = seed
            .character_works
            .iter()
            .map(|row| row.character_id)
            .collect();
        let before = seed.characters.len();
        seed.characters.retain(|id, _| cast.contains(id));
        let characters_dropped = before - seed.characters.len();
        report.record_drops(
            DropReason::Unreferenced(tables::CHARACTER),
            characters_dropped as u64,
        );

        let staff: BTreeSet<i64> = seed
            .person_works
            .iter()
            .map(|row| row.person_id)
            .chain(seed.voice_works.iter().map(|row| row.person_id))
            .collect();
        let before = seed.persons.len();
        seed.persons.retain(|id, _| staff.contains(id));
        let persons_dropped = before - seed.persons.len();
        report.record_drops(
            DropReason::Unreferenced(tables::PERSON),
            persons_dropped as u64,
        );

        debug!(
            pass = passes,
            characters_dropped, persons_dropped, "consistency pass finished"
        );
        if characters_dropped == 0 && persons_dropped == 0 {
            break;
        }
    }

    let index = ParentIndex::from_seed(seed);
    retain_resolved(
        &mut seed.character_nicknames,
        &index,
        tables::CHARACTER_NICKNAME,
        report,
    );
    retain_resolved(
        &mut seed.person_alternate_names,
        &index,
        tables::PERSON_ALTERNATE_NAME,
        report,
    );

    info!(
        passes,
        characters = seed.characters.len(),
        persons = seed.persons.len(),
        "consistency filter converged"
    );
    passes
}

/// Fail if any emitted row still references a missing parent.
pub fn verify(seed: &SeedSet) -> Result<(), ExtractError> {
    let index = ParentIndex::from_seed(seed);

    for (table, rows) in &seed.attributes {
        check_rows(rows, &index, table)?;
    }
    check_rows(&seed.recommendations, &index, tables::ANIME_RECOMMENDATION)?;
    check_rows(&seed.character_works, &index, tables::CHARACTER_ANIME_WORK)?;
    check_rows(&seed.person_works, &index, tables::PERSON_ANIME_WORK)?;
    check_rows(&seed.voice_works, &index, tables::PERSON_VOICE_WORK)?;
    check_rows(&seed.character_nicknames, &index, tables::CHARACTER_NICKNAME)?;
    check_rows(
        &seed.person_alternate_names,
        &index,
        tables::PERSON_ALTERNATE_NAME,
    )?;
    Ok(())
}

fn retain_resolved<R: SeedRow>(
    rows: &mut Vec<R>,
    index: &ParentIndex,
    table: &'static str,
    report: &mut ExtractionReport,
) {
    let before = rows.len();
    rows.retain(|row| index.dangling(row).is_none());
    report.record_drops(
        DropReason::DanglingReference(table),
        (before - rows.len()) as u64,
    );
}

fn check_rows<R: SeedRow>(rows: &[R], index: &ParentIndex, table: &str) -> Result<(), ExtractError> {
    for row in rows {
        if let Some(reference) = index.dangling(row) {
            return Err(ExtractError::IntegrityViolation(format!(
                "{table} row {:?} references missing {} {}",
                row.key(),
                reference.table,
                reference.id
            )));
        }
    }
    Ok(())
}

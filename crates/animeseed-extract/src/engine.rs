use std::collections::BTreeSet;
use std::path::PathBuf;
use std::time::Instant;

use tracing::{debug, info, warn};

use animeseed_core::{ANIME_ATTRIBUTE_TABLES, SeedCatalog, TableSpec, seed_catalog, tables};

use crate::closure::DependencyClosure;
use crate::consistency;
use crate::entities::{extract_anime, extract_characters, extract_persons, sample_app_users};
use crate::errors::ExtractError;
use crate::lookup::Lookups;
use crate::model::{ExtractOptions, ExtractionReport};
use crate::output::sql::{RenderedTable, render_table, write_tables};
use crate::planner::{OutputTask, plan_outputs};
use crate::relations::{
    extract_character_nicknames, extract_person_alternate_names, extract_recommendations,
};
use crate::sampler::sample_anchor_ids;
use crate::seedset::SeedSet;
use crate::validator::{DropReason, validate_all};

/// Result of an extraction run.
#[derive(Debug, Clone)]
pub struct SeedResult {
    pub out_dir: PathBuf,
    pub report: ExtractionReport,
}

/// Entry point for extracting a consistent seed subset.
#[derive(Debug, Clone)]
pub struct SeedEngine {
    options: ExtractOptions,
    catalog: SeedCatalog,
}

impl SeedEngine {
    pub fn new(options: ExtractOptions) -> Self {
        Self::with_catalog(options, seed_catalog())
    }

    pub fn with_catalog(options: ExtractOptions, catalog: SeedCatalog) -> Self {
        Self { options, catalog }
    }

    pub fn options(&self) -> &ExtractOptions {
        &self.options
    }

    /// Extract, filter, render and write every seed table.
    ///
    /// Nothing is written to the output directory unless every stage succeeds.
    pub fn run(&self) -> Result<SeedResult, ExtractError> {
        let start = Instant::now();
        let options = &self.options;
        if options.sample_size == 0 {
            return Err(ExtractError::InvalidOptions(
                "sample size must be greater than 0".to_string(),
            ));
        }

        let tasks = plan_outputs(&self.catalog)?;
        let seed = options.seed.unwrap_or_else(rand::random::<u64>);
        let run_id = options
            .run_id
            .clone()
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
        let mut report = ExtractionReport::new(run_id.clone(), seed);

        info!(
            run_id = %run_id,
            sample_size = options.sample_size,
            seed,
            seed_given = options.seed.is_some(),
            tables = tasks.len(),
            "extraction started"
        );

        let seed_set = self.extract(seed, &mut report)?;
        let rendered = self.render(&tasks, &seed_set)?;

        for table_report in write_tables(&options.out_dir, &rendered)? {
            info!(
                table = %table_report.table,
                file = %table_report.file,
                rows = table_report.rows,
                bytes = table_report.bytes,
                "seed file written"
            );
            report.bytes_written += table_report.bytes;
            report.tables.push(table_report);
        }

        for (reason, count) in &report.drops {
            warn!(reason = %reason, count = *count, "rows dropped");
        }

        report.duration_ms = start.elapsed().as_millis() as u64;
        info!(
            run_id = %run_id,
            tables = report.tables.len(),
            dropped = report.total_dropped(),
            bytes_written = report.bytes_written,
            duration_ms = report.duration_ms,
            "extraction completed"
        );

        Ok(SeedResult {
            out_dir: options.out_dir.clone(),
            report,
        })
    }

    fn extract(&self, seed: u64, report: &mut ExtractionReport) -> Result<SeedSet, ExtractError> {
        let options = &self.options;
        let layout = &options.layout;
        let progress = options.progress;

        let lookups = Lookups::load(layout, progress)?;

        let anchors = sample_anchor_ids(
            &layout.anchor_pool_path(),
            options.sample_size,
            seed,
            progress,
        )?;
        report.anchors_requested = options.sample_size as u64;
        report.anchors_sampled = anchors.len() as u64;

        let anime = extract_anime(layout, &anchors, &lookups, report, progress)?;
        let anime_rows = validate_all(
            &anchors,
            &anime.records,
            DropReason::AnimeMissingDetails,
            report,
        );
        let anime_ids: BTreeSet<i64> = anime_rows.keys().copied().collect();
        info!(
            stage = "anime",
            anchors = anchors.len(),
            valid = anime_ids.len(),
            "stage finished"
        );

        let closure = DependencyClosure::compute(layout, &anime_ids, &lookups, report, progress)?;

        let characters = extract_characters(layout, &closure.character_ids, report, progress)?;
        let persons = extract_persons(layout, &closure.person_ids, &lookups, report, progress)?;
        info!(
            stage = "entities",
            characters = characters.len(),
            persons = persons.len(),
            "stage finished"
        );

        let character_ids: BTreeSet<i64> = characters.keys().copied().collect();
        let person_ids: BTreeSet<i64> = persons.keys().copied().collect();
        let character_nicknames =
            extract_character_nicknames(layout, &character_ids, report, progress)?;
        let person_alternate_names =
            extract_person_alternate_names(layout, &person_ids, report, progress)?;
        let recommendations = extract_recommendations(layout, &anime_ids, report, progress)?;

        let mut seed_set = SeedSet {
            anime: anime_rows,
            characters,
            persons,
            character_nicknames,
            person_alternate_names,
            attributes: anime
                .attributes
                .into_iter()
                .map(|(table, rows)| (table, rows.into_iter().collect()))
                .collect(),
            character_works: closure.character_works,
            person_works: closure.person_works,
            voice_works: closure.voice_works,
            recommendations,
            ..SeedSet::default()
        };

        consistency::enforce(&mut seed_set, report);
        consistency::verify(&seed_set)?;

        let app_user_count = options.app_users();
        report.app_users_requested = app_user_count as u64;
        seed_set.app_users = sample_app_users(
            &layout.dataset(&layout.profiles),
            app_user_count,
            seed.wrapping_add(options.app_user_seed_offset),
            &lookups,
            report,
            progress,
        )?;

        Ok(seed_set)
    }

    fn render(
        &self,
        tasks: &[OutputTask],
        seed_set: &SeedSet,
    ) -> Result<Vec<RenderedTable>, ExtractError> {
        tasks
            .iter()
            .map(|task| {
                let spec = self.catalog.table(&task.table).ok_or_else(|| {
                    ExtractError::InvalidOptions(format!(
                        "table '{}' not found in catalog",
                        task.table
                    ))
                })?;
                debug!(
                    table = %task.table,
                    file = %task.file,
                    rows = seed_set.row_count(&task.table),
                    "rendering seed table"
                );
                self.render_spec(spec, seed_set)
            })
            .collect()
    }

    fn render_spec(
        &self,
        spec: &TableSpec,
        seed_set: &SeedSet,
    ) -> Result<RenderedTable, ExtractError> {
        let generated_by = self.options.generated_by.as_str();
        match spec.name.as_str() {
            tables::ANIME => render_table(spec, seed_set.anime.values(), generated_by),
            tables::CHARACTER => render_table(spec, seed_set.characters.values(), generated_by),
            tables::PERSON => render_table(spec, seed_set.persons.values(), generated_by),
            tables::APP_USER => render_table(spec, seed_set.app_users.values(), generated_by),
            tables::CHARACTER_NICKNAME => {
                render_table(spec, &seed_set.character_nicknames, generated_by)
            }
            tables::PERSON_ALTERNATE_NAME => {
                render_table(spec, &seed_set.person_alternate_names, generated_by)
            }
            tables::CHARACTER_ANIME_WORK => {
                render_table(spec, &seed_set.character_works, generated_by)
            }
            tables::PERSON_ANIME_WORK => render_table(spec, &seed_set.person_works, generated_by),
            tables::PERSON_VOICE_WORK => render_table(spec, &seed_set.voice_works, generated_by),
            tables::ANIME_RECOMMENDATION => {
                render_table(spec, &seed_set.recommendations, generated_by)
            }
            name if ANIME_ATTRIBUTE_TABLES
                .iter()
                .any(|(table, ..)| *table == name) =>
            {
                render_table(spec, seed_set.attribute_rows(name), generated_by)
            }
            other => Err(ExtractError::InvalidOptions(format!(
                "no row source for table '{other}'"
            ))),
        }
    }
}

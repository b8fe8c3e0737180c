use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::validator::DropReason;

/// Offset added to the run seed for the app-user sampling stream.
pub const DEFAULT_APP_USER_SEED_OFFSET: u64 = 1000;

/// Where the source datasets and lookup CSVs live.
///
/// Dataset file names are relative to `datasets_dir`; the anchor pool and
/// lookup files are relative to `lookups_dir`. Absolute paths are used as-is.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct SourceLayout {
    pub datasets_dir: PathBuf,
    pub lookups_dir: PathBuf,
    pub anchor_pool: PathBuf,
    pub details: PathBuf,
    pub stats: PathBuf,
    pub characters: PathBuf,
    pub character_anime_works: PathBuf,
    pub character_nicknames: PathBuf,
    pub person_details: PathBuf,
    pub person_alternate_names: PathBuf,
    pub person_anime_works: PathBuf,
    pub person_voice_works: PathBuf,
    pub recommendations: PathBuf,
    pub profiles: PathBuf,
    /// Per-lookup file overrides keyed by lookup name (`genre`, `country`, ...).
    pub lookup_overrides: BTreeMap<String, PathBuf>,
}

impl Default for SourceLayout {
    fn default() -> Self {
        Self {
            datasets_dir: PathBuf::from("data-import/datasets"),
            lookups_dir: PathBuf::from("data-import/output"),
            anchor_pool: PathBuf::from("details/mal_id_distinct.csv"),
            details: PathBuf::from("details.csv"),
            stats: PathBuf::from("stats.csv"),
            characters: PathBuf::from("characters.csv"),
            character_anime_works: PathBuf::from("character_anime_works.csv"),
            character_nicknames: PathBuf::from("character_nicknames.csv"),
            person_details: PathBuf::from("person_details.csv"),
            person_alternate_names: PathBuf::from("person_alternate_names.csv"),
            person_anime_works: PathBuf::from("person_anime_works.csv"),
            person_voice_works: PathBuf::from("person_voice_works.csv"),
            recommendations: PathBuf::from("recommendations.csv"),
            profiles: PathBuf::from("profiles.csv"),
            lookup_overrides: BTreeMap::new(),
        }
    }
}

impl SourceLayout {
    /// Layout rooted at a single directory with `datasets/` and `output/` inside.
    pub fn rooted_at(root: &Path) -> Self {
        Self {
            datasets_dir: root.join("datasets"),
            lookups_dir: root.join("output"),
            ..Self::default()
        }
    }

    pub fn dataset(&self, file: &Path) -> PathBuf {
        self.datasets_dir.join(file)
    }

    pub fn anchor_pool_path(&self) -> PathBuf {
        self.lookups_dir.join(&self.anchor_pool)
    }

    pub fn lookup_path(&self, name: &str, default_relative: &str) -> PathBuf {
        match self.lookup_overrides.get(name) {
            Some(path) => self.lookups_dir.join(path),
            None => self.lookups_dir.join(default_relative),
        }
    }
}

/// Options for an extraction run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractOptions {
    /// Number of anchor anime ids to sample.
    pub sample_size: usize,
    /// Run-level seed; a random one is drawn (and reported) when absent.
    pub seed: Option<u64>,
    /// Number of app users to sample; defaults to `sample_size`.
    pub app_user_count: Option<usize>,
    pub app_user_seed_offset: u64,
    pub layout: SourceLayout,
    /// Directory receiving the numbered seed files.
    pub out_dir: PathBuf,
    /// Draw progress bars for streaming passes.
    pub progress: bool,
    /// Name written into each seed file header.
    pub generated_by: String,
    /// Run identifier used in logs and the report.
    pub run_id: Option<String>,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            sample_size: 0,
            seed: None,
            app_user_count: None,
            app_user_seed_offset: DEFAULT_APP_USER_SEED_OFFSET,
            layout: SourceLayout::default(),
            out_dir: PathBuf::from("dml/seeds"),
            progress: false,
            generated_by: "animeseed".to_string(),
            run_id: None,
        }
    }
}

impl ExtractOptions {
    pub fn app_users(&self) -> usize {
        self.app_user_count.unwrap_or(self.sample_size)
    }
}

/// Summary of a written seed table.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct TableReport {
    pub table: String,
    pub file: String,
    pub rows: u64,
    pub bytes: u64,
    pub sha256: String,
}

/// Report for an extraction run.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ExtractionReport {
    pub run_id: String,
    /// Effective run seed; rerun with it to reproduce the output.
    pub seed: u64,
    pub anchors_requested: u64,
    pub anchors_sampled: u64,
    pub app_users_requested: u64,
    pub tables: Vec<TableReport>,
    /// Rows read per source file label.
    pub rows_scanned: BTreeMap<String, u64>,
    /// Dropped rows by reason code.
    pub drops: BTreeMap<String, u64>,
    pub bytes_written: u64,
    pub duration_ms: u64,
}

impl ExtractionReport {
    pub fn new(run_id: String, seed: u64) -> Self {
        Self {
            run_id,
            seed,
            anchors_requested: 0,
            anchors_sampled: 0,
            app_users_requested: 0,
            tables: Vec::new(),
            rows_scanned: BTreeMap::new(),
            drops: BTreeMap::new(),
            bytes_written: 0,
            duration_ms: 0,
        }
    }

    pub fn record_drop(&mut self, reason: DropReason) {
        self.record_drops(reason, 1);
    }

    pub fn record_drops(&mut self, reason: DropReason, count: u64) {
        if count == 0 {
            return;
        }
        *self.drops.entry(reason.code()).or_insert(0) += count;
    }

    pub fn record_scan(&mut self, label: &str, rows: u64) {
        *self.rows_scanned.entry(label.to_string()).or_insert(0) += rows;
    }

    pub fn drop_count(&self, code: &str) -> u64 {
        self.drops.get(code).copied().unwrap_or(0)
    }

    pub fn total_dropped(&self) -> u64 {
        self.drops.values().sum()
    }

    pub fn table(&self, name: &str) -> Option<&TableReport> {
        self.tables.iter().find(|table| table.table == name)
    }
}

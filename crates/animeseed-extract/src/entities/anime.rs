use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;

use animeseed_core::{SqlValue, tables};

use crate::collector::EntityCollector;
use crate::errors::ExtractError;
use crate::lookup::{LookupKind, Lookups};
use crate::model::{ExtractionReport, SourceLayout};
use crate::normalize::{parse_date, parse_float, parse_int, parse_list, text};
use crate::records::{AnimeAttributeRow, SeedRow};
use crate::source::{CsvSource, Row};
use crate::validator::{DropReason, Validate, has_text};

pub const DETAILS_COLUMNS: [&str; 29] = [
    "mal_id",
    "title",
    "title_japanese",
    "url",
    "image_url",
    "type",
    "status",
    "source",
    "rating",
    "season",
    "score",
    "scored_by",
    "start_date",
    "end_date",
    "synopsis",
    "rank",
    "popularity",
    "members",
    "favorites",
    "episodes",
    "year",
    "genres",
    "explicit_genres",
    "licensors",
    "demographics",
    "producers",
    "streaming",
    "studios",
    "themes",
];

pub const STATS_COLUMNS: [&str; 27] = [
    "mal_id",
    "watching",
    "completed",
    "on_hold",
    "dropped",
    "plan_to_watch",
    "total",
    "score_1_votes",
    "score_1_percentage",
    "score_2_votes",
    "score_2_percentage",
    "score_3_votes",
    "score_3_percentage",
    "score_4_votes",
    "score_4_percentage",
    "score_5_votes",
    "score_5_percentage",
    "score_6_votes",
    "score_6_percentage",
    "score_7_votes",
    "score_7_percentage",
    "score_8_votes",
    "score_8_percentage",
    "score_9_votes",
    "score_9_percentage",
    "score_10_votes",
    "score_10_percentage",
];

/// A list-valued details column feeding one junction table.
#[derive(Debug, Clone, Copy)]
pub struct AttributeColumn {
    pub table: &'static str,
    pub column: &'static str,
    pub lookup: LookupKind,
}

pub const ATTRIBUTE_COLUMNS: [AttributeColumn; 8] = [
    AttributeColumn {
        table: tables::ANIME_GENRE,
        column: "genres",
        lookup: LookupKind::Genre,
    },
    AttributeColumn {
        table: tables::ANIME_EXPLICIT_GENRE,
        column: "explicit_genres",
        lookup: LookupKind::ExplicitGenre,
    },
    AttributeColumn {
        table: tables::ANIME_LICENSOR,
        column: "licensors",
        lookup: LookupKind::Licensor,
    },
    AttributeColumn {
        table: tables::ANIME_DEMOGRAPHIC,
        column: "demographics",
        lookup: LookupKind::Demographic,
    },
    AttributeColumn {
        table: tables::ANIME_PRODUCER,
        column: "producers",
        lookup: LookupKind::Producer,
    },
    AttributeColumn {
        table: tables::ANIME_STREAMING_SERVICE,
        column: "streaming",
        lookup: LookupKind::StreamingService,
    },
    AttributeColumn {
        table: tables::ANIME_STUDIO,
        column: "studios",
        lookup: LookupKind::Studio,
    },
    AttributeColumn {
        table: tables::ANIME_THEME,
        column: "themes",
        lookup: LookupKind::Theme,
    },
];

/// Normalized `details.csv` row with lookups already resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct AnimeDetails {
    pub id: i64,
    pub type_id: Option<i64>,
    pub rating_id: Option<i64>,
    pub season_id: Option<i64>,
    pub source_id: Option<i64>,
    pub status_id: Option<i64>,
    pub title: Option<String>,
    pub title_japanese: Option<String>,
    pub url: Option<String>,
    pub image_url: Option<String>,
    pub score: f64,
    pub scored_by: Option<i64>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub synopsis: Option<String>,
    pub rank: Option<i64>,
    pub popularity: i64,
    pub members: i64,
    pub favorites: i64,
    pub episodes: Option<i64>,
    pub year: Option<i64>,
}

/// Normalized `stats.csv` row.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AnimeStats {
    pub watching: i64,
    pub completed: i64,
    pub on_hold: i64,
    pub dropped: i64,
    pub plan_to_watch: i64,
    pub total: i64,
    pub score_votes: [i64; 10],
    pub score_percentages: [f64; 10],
}

/// Details merged with stats, waiting for validation.
#[derive(Debug, Clone, PartialEq)]
pub struct AnimeRecord {
    pub details: AnimeDetails,
    pub stats: Option<AnimeStats>,
}

/// A validated `anime` row.
#[derive(Debug, Clone, PartialEq)]
pub struct AnimeRow {
    pub id: i64,
    pub type_id: Option<i64>,
    pub rating_id: Option<i64>,
    pub season_id: Option<i64>,
    pub source_id: i64,
    pub status_id: i64,
    pub title: String,
    pub title_japanese: String,
    pub url: String,
    pub image_url: String,
    pub score: f64,
    pub scored_by: Option<i64>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub synopsis: Option<String>,
    pub rank: Option<i64>,
    pub popularity: i64,
    pub members: i64,
    pub favorites: i64,
    pub episodes: Option<i64>,
    pub year: Option<i64>,
    pub stats: AnimeStats,
}

impl AnimeDetails {
    pub fn from_row(id: i64, row: &Row<'_>, lookups: &Lookups) -> Self {
        let resolve = |kind: LookupKind, column: &str| {
            lookups.resolve(kind, text(row.get(column)).as_deref())
        };
        let title = text(row.get("title"));

        Self {
            id,
            type_id: resolve(LookupKind::Type, "type"),
            rating_id: resolve(LookupKind::Rating, "rating"),
            season_id: resolve(LookupKind::Season, "season"),
            source_id: resolve(LookupKind::Source, "source"),
            status_id: resolve(LookupKind::Status, "status"),
            title_japanese: text(row.get("title_japanese")).or_else(|| title.clone()),
            title,
            url: text(row.get("url")),
            image_url: text(row.get("image_url")),
            score: parse_float(row.get("score")).unwrap_or(0.0),
            scored_by: parse_int(row.get("scored_by")),
            start_date: parse_date(row.get("start_date")),
            end_date: parse_date(row.get("end_date")),
            synopsis: text(row.get("synopsis")),
            rank: parse_int(row.get("rank")),
            popularity: parse_int(row.get("popularity")).unwrap_or(0),
            members: parse_int(row.get("members")).unwrap_or(0),
            favorites: parse_int(row.get("favorites")).unwrap_or(0),
            episodes: parse_int(row.get("episodes")),
            year: parse_int(row.get("year")),
        }
    }
}

impl AnimeStats {
    pub fn from_row(row: &Row<'_>) -> Self {
        let count = |column: &str| parse_int(row.get(column)).unwrap_or(0);
        let mut stats = Self {
            watching: count("watching"),
            completed: count("completed"),
            on_hold: count("on_hold"),
            dropped: count("dropped"),
            plan_to_watch: count("plan_to_watch"),
            total: count("total"),
            ..Self::default()
        };
        for score in 1..=10 {
            stats.score_votes[score - 1] = count(&format!("score_{score}_votes"));
            stats.score_percentages[score - 1] =
                parse_float(row.get(&format!("score_{score}_percentage"))).unwrap_or(0.0);
        }
        stats
    }
}

impl Validate for AnimeRecord {
    type Row = AnimeRow;

    fn validate(&self) -> Result<AnimeRow, DropReason> {
        let details = &self.details;
        let stats = self.stats.clone().ok_or(DropReason::AnimeMissingStats)?;
        let (Some(source_id), Some(status_id)) = (details.source_id, details.status_id) else {
            return Err(DropReason::AnimeMissingSourceStatus);
        };

        let required = [
            &details.title,
            &details.title_japanese,
            &details.url,
            &details.image_url,
        ];
        if !required.iter().all(|value| has_text(value.as_deref())) {
            return Err(DropReason::AnimeMissingRequiredText);
        }
        let text_or_empty = |value: &Option<String>| value.clone().unwrap_or_default();

        Ok(AnimeRow {
            id: details.id,
            type_id: details.type_id,
            rating_id: details.rating_id,
            season_id: details.season_id,
            source_id,
            status_id,
            title: text_or_empty(&details.title),
            title_japanese: text_or_empty(&details.title_japanese),
            url: text_or_empty(&details.url),
            image_url: text_or_empty(&details.image_url),
            score: details.score,
            scored_by: details.scored_by,
            start_date: details.start_date,
            end_date: details.end_date,
            synopsis: details.synopsis.clone(),
            rank: details.rank,
            popularity: details.popularity,
            members: details.members,
            favorites: details.favorites,
            episodes: details.episodes,
            year: details.year,
            stats,
        })
    }
}

impl SeedRow for AnimeRow {
    type Key = i64;

    fn key(&self) -> i64 {
        self.id
    }

    fn values(&self) -> Vec<SqlValue> {
        let mut values: Vec<SqlValue> = vec![
            self.id.into(),
            self.type_id.into(),
            self.rating_id.into(),
            self.season_id.into(),
            self.source_id.into(),
            self.status_id.into(),
            self.title.as_str().into(),
            self.title_japanese.as_str().into(),
            self.url.as_str().into(),
            self.image_url.as_str().into(),
            self.score.into(),
            self.scored_by.into(),
            date_value(self.start_date),
            date_value(self.end_date),
            self.synopsis.clone().into(),
            self.rank.into(),
            self.popularity.into(),
            self.members.into(),
            self.favorites.into(),
            self.episodes.into(),
            self.year.into(),
            self.stats.watching.into(),
            self.stats.completed.into(),
            self.stats.on_hold.into(),
            self.stats.dropped.into(),
            self.stats.plan_to_watch.into(),
            self.stats.total.into(),
        ];
        for (votes, percentage) in self
            .stats
            .score_votes
            .iter()
            .zip(self.stats.score_percentages.iter())
        {
            values.push((*votes).into());
            values.push((*percentage).into());
        }
        values
    }
}

/// ISO date literal or NULL.
pub fn date_value(date: Option<NaiveDate>) -> SqlValue {
    date.map(|date| SqlValue::Text(date.format("%Y-%m-%d").to_string()))
        .unwrap_or(SqlValue::Null)
}

/// Anime details for the anchor set, plus the resolved attribute junctions.
#[derive(Debug, Clone, Default)]
pub struct AnimeExtraction {
    pub records: BTreeMap<i64, AnimeRecord>,
    pub attributes: BTreeMap<&'static str, BTreeSet<AnimeAttributeRow>>,
}

/// Read `details.csv` for the anchors, then merge `stats.csv` by id.
///
/// Unmapped attribute list values are counted per junction table.
pub fn extract_anime(
    layout: &SourceLayout,
    anchors: &BTreeSet<i64>,
    lookups: &Lookups,
    report: &mut ExtractionReport,
    progress: bool,
) -> Result<AnimeExtraction, ExtractError> {
    let mut attributes: BTreeMap<&'static str, BTreeSet<AnimeAttributeRow>> = ATTRIBUTE_COLUMNS
        .iter()
        .map(|attribute| (attribute.table, BTreeSet::new()))
        .collect();
    let mut unknown: BTreeMap<&'static str, u64> = BTreeMap::new();

    let details_source =
        CsvSource::open(&layout.dataset(&layout.details), &DETAILS_COLUMNS, progress)?;
    let mut details: EntityCollector<i64, AnimeDetails> = EntityCollector::new();
    let rows = details_source.for_each_row(|row| {
        let Some(id) = parse_int(row.get("mal_id")).filter(|id| anchors.contains(id)) else {
            return Ok(());
        };
        // Later rows for the same anime are ignored along with their lists.
        if details.contains(&id) {
            return Ok(());
        }

        for attribute in &ATTRIBUTE_COLUMNS {
            let junction = attributes.entry(attribute.table).or_default();
            for name in parse_list(row.get(attribute.column)) {
                match lookups.resolve(attribute.lookup, Some(&name)) {
                    Some(value_id) => {
                        junction.insert(AnimeAttributeRow {
                            anime_id: id,
                            value_id,
                        });
                    }
                    None => *unknown.entry(attribute.table).or_insert(0) += 1,
                }
            }
        }

        details.offer(id, AnimeDetails::from_row(id, row, lookups));
        Ok(())
    })?;
    report.record_scan("details", rows);

    for (table, count) in unknown {
        report.record_drops(DropReason::UnknownAttributeValue(table), count);
    }

    let mut records: BTreeMap<i64, AnimeRecord> = details
        .into_map()
        .into_iter()
        .map(|(id, details)| (id, AnimeRecord { details, stats: None }))
        .collect();

    let stats_source = CsvSource::open(&layout.dataset(&layout.stats), &STATS_COLUMNS, progress)?;
    let rows = stats_source.for_each_row(|row| {
        let Some(id) = parse_int(row.get("mal_id")) else {
            return Ok(());
        };
        if let Some(record) = records.get_mut(&id)
            && record.stats.is_none()
        {
            record.stats = Some(AnimeStats::from_row(row));
        }
        Ok(())
    })?;
    report.record_scan("stats", rows);

    Ok(AnimeExtraction {
        records,
        attributes,
    })
}

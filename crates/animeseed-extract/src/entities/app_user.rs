use std::collections::BTreeMap;
use std::path::Path;

use chrono::NaiveDate;
use tracing::info;

use animeseed_core::SqlValue;

use crate::entities::anime::date_value;
use crate::errors::ExtractError;
use crate::lookup::{LookupKind, Lookups};
use crate::model::ExtractionReport;
use crate::normalize::{country_name, parse_date, text};
use crate::records::SeedRow;
use crate::sampler::{Reservoir, sampling_rng};
use crate::source::{CsvSource, Row};
use crate::validator::{DropReason, Validate};

pub const PROFILE_COLUMNS: [&str; 5] = ["username", "gender", "birthday", "location", "joined"];

/// A sampled `profiles.csv` row, identified by its 1-based row index.
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileRecord {
    pub id: i64,
    pub username: Option<String>,
    pub gender_id: Option<i64>,
    pub country_id: Option<i64>,
    pub birthday: Option<NaiveDate>,
    pub joined_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppUserRow {
    pub id: i64,
    pub gender_id: Option<i64>,
    pub country_id: i64,
    pub birthday: Option<NaiveDate>,
    pub joined_date: NaiveDate,
    pub username: String,
}

impl ProfileRecord {
    /// The whole location cell is the country name for app users.
    pub fn from_row(row: &Row<'_>, lookups: &Lookups) -> Self {
        Self {
            id: row.index() as i64,
            username: text(row.get("username")),
            gender_id: lookups.resolve(LookupKind::Gender, text(row.get("gender")).as_deref()),
            country_id: lookups.resolve(
                LookupKind::Country,
                country_name(row.get("location")).as_deref(),
            ),
            birthday: parse_date(row.get("birthday")),
            joined_date: parse_date(row.get("joined")),
        }
    }
}

impl Validate for ProfileRecord {
    type Row = AppUserRow;

    fn validate(&self) -> Result<AppUserRow, DropReason> {
        let (Some(username), Some(joined_date), Some(country_id)) =
            (&self.username, self.joined_date, self.country_id)
        else {
            return Err(DropReason::AppUserMissingRequiredValues);
        };

        Ok(AppUserRow {
            id: self.id,
            gender_id: self.gender_id,
            country_id,
            birthday: self.birthday,
            joined_date,
            username: username.clone(),
        })
    }
}

impl SeedRow for AppUserRow {
    type Key = i64;

    fn key(&self) -> i64 {
        self.id
    }

    fn values(&self) -> Vec<SqlValue> {
        vec![
            self.id.into(),
            self.gender_id.into(),
            self.country_id.into(),
            date_value(self.birthday),
            date_value(Some(self.joined_date)),
            self.username.as_str().into(),
        ]
    }
}

/// Sample `count` profiles uniformly with the app-user stream, then validate them.
///
/// A profile pool smaller than `count` is fatal.
pub fn sample_app_users(
    profiles: &Path,
    count: usize,
    seed: u64,
    lookups: &Lookups,
    report: &mut ExtractionReport,
    progress: bool,
) -> Result<BTreeMap<i64, AppUserRow>, ExtractError> {
    let mut rng = sampling_rng(seed);
    let mut reservoir = Reservoir::new(count);

    let rows = CsvSource::open(profiles, &PROFILE_COLUMNS, progress)?.for_each_row(|row| {
        reservoir.offer(ProfileRecord::from_row(row, lookups), &mut rng);
        Ok(())
    })?;
    report.record_scan("profiles", rows);

    if rows < count as u64 {
        return Err(ExtractError::InsufficientPool {
            pool: profiles.display().to_string(),
            requested: count,
            available: rows,
        });
    }

    let mut users = BTreeMap::new();
    for record in reservoir.into_items() {
        match record.validate() {
            Ok(user) => {
                users.insert(user.id, user);
            }
            Err(reason) => report.record_drop(reason),
        }
    }

    info!(requested = count, sampled = users.len(), "app users sampled");
    Ok(users)
}

//! Name-to-id maps loaded from the precomputed lookup CSVs.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use tracing::info;

use crate::errors::ExtractError;
use crate::model::SourceLayout;
use crate::source::CsvSource;

/// Every lookup the extraction resolves names against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LookupKind {
    Type,
    Rating,
    Season,
    Source,
    Status,
    Genre,
    ExplicitGenre,
    Licensor,
    Demographic,
    Producer,
    StreamingService,
    Studio,
    Theme,
    CharacterRole,
    Country,
    Gender,
    Language,
}

impl LookupKind {
    pub const ALL: [LookupKind; 17] = [
        LookupKind::Type,
        LookupKind::Rating,
        LookupKind::Season,
        LookupKind::Source,
        LookupKind::Status,
        LookupKind::Genre,
        LookupKind::ExplicitGenre,
        LookupKind::Licensor,
        LookupKind::Demographic,
        LookupKind::Producer,
        LookupKind::StreamingService,
        LookupKind::Studio,
        LookupKind::Theme,
        LookupKind::CharacterRole,
        LookupKind::Country,
        LookupKind::Gender,
        LookupKind::Language,
    ];

    /// Name of the lookup table, also the key for path overrides.
    pub fn name(self) -> &'static str {
        match self {
            LookupKind::Type => "type",
            LookupKind::Rating => "rating",
            LookupKind::Season => "season",
            LookupKind::Source => "source",
            LookupKind::Status => "status",
            LookupKind::Genre => "genre",
            LookupKind::ExplicitGenre => "explicit_genre",
            LookupKind::Licensor => "licensor",
            LookupKind::Demographic => "demographic",
            LookupKind::Producer => "producer",
            LookupKind::StreamingService => "streaming_service",
            LookupKind::Studio => "studio",
            LookupKind::Theme => "theme",
            LookupKind::CharacterRole => "character_role",
            LookupKind::Country => "country",
            LookupKind::Gender => "gender",
            LookupKind::Language => "language",
        }
    }

    /// Location of the lookup CSV relative to the lookups directory.
    pub fn default_path(self) -> &'static str {
        match self {
            LookupKind::Type => "details/type_distinct.csv",
            LookupKind::Rating => "details/rating_distinct.csv",
            LookupKind::Season => "details/season_distinct.csv",
            LookupKind::Source => "details/source_distinct.csv",
            LookupKind::Status => "details/status_distinct.csv",
            LookupKind::Genre => "details/genres_distinct.csv",
            LookupKind::ExplicitGenre => "details/explicit_genres_distinct.csv",
            LookupKind::Licensor => "details/licensors_distinct.csv",
            LookupKind::Demographic => "details/demographics_distinct.csv",
            LookupKind::Producer => "details/producers_distinct.csv",
            LookupKind::StreamingService => "details/streaming_distinct.csv",
            LookupKind::Studio => "details/studios_distinct.csv",
            LookupKind::Theme => "details/themes_distinct.csv",
            LookupKind::CharacterRole => "character_anime_works/role_distinct.csv",
            LookupKind::Country => "profiles/location_distinct.csv",
            LookupKind::Gender => "profiles/gender_distinct.csv",
            LookupKind::Language => "person_voice_works/language_distinct.csv",
        }
    }
}

/// A single `value -> id` map.
#[derive(Debug, Clone, Default)]
pub struct Lookup {
    path: PathBuf,
    ids: HashMap<String, i64>,
}

impl Lookup {
    /// Load an `id,value` CSV. Rows with an empty id or value are skipped and
    /// the first id seen for a value wins.
    pub fn load(path: &Path, progress: bool) -> Result<Self, ExtractError> {
        let source = CsvSource::open(path, &["id", "value"], progress)?;
        let mut ids = HashMap::new();

        source.for_each_row(|row| {
            let raw_id = row.get("id").trim();
            let value = row.get("value").trim();
            if raw_id.is_empty() || value.is_empty() {
                return Ok(());
            }
            let id = raw_id
                .parse::<i64>()
                .map_err(|_| ExtractError::InvalidLookupId {
                    path: path.to_path_buf(),
                    value: raw_id.to_string(),
                })?;
            ids.entry(value.to_string()).or_insert(id);
            Ok(())
        })?;

        Ok(Self {
            path: path.to_path_buf(),
            ids,
        })
    }

    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, i64)>) -> Self {
        let mut ids = HashMap::new();
        for (value, id) in pairs {
            ids.entry(value.to_string()).or_insert(id);
        }
        Self {
            path: PathBuf::new(),
            ids,
        }
    }

    pub fn resolve(&self, value: &str) -> Option<i64> {
        self.ids.get(value).copied()
    }

    /// Resolve an optional, already normalized name.
    pub fn resolve_opt(&self, value: Option<&str>) -> Option<i64> {
        value.and_then(|value| self.resolve(value))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// All lookups, loaded once before extraction and immutable afterwards.
#[derive(Debug, Clone, Default)]
pub struct Lookups {
    maps: BTreeMap<LookupKind, Lookup>,
}

impl Lookups {
    pub fn load(layout: &SourceLayout, progress: bool) -> Result<Self, ExtractError> {
        let mut maps = BTreeMap::new();
        for kind in LookupKind::ALL {
            let path = layout.lookup_path(kind.name(), kind.default_path());
            let lookup = Lookup::load(&path, progress)?;
            info!(lookup = kind.name(), entries = lookup.len(), "lookup loaded");
            maps.insert(kind, lookup);
        }
        Ok(Self { maps })
    }

    pub fn insert(&mut self, kind: LookupKind, lookup: Lookup) {
        self.maps.insert(kind, lookup);
    }

    /// The lookup for `kind`; an unloaded lookup resolves nothing.
    pub fn get(&self, kind: LookupKind) -> &Lookup {
        static EMPTY: std::sync::OnceLock<Lookup> = std::sync::OnceLock::new();
        self.maps
            .get(&kind)
            .unwrap_or_else(|| EMPTY.get_or_init(Lookup::default))
    }

    pub fn resolve(&self, kind: LookupKind, value: Option<&str>) -> Option<i64> {
        self.get(kind).resolve_opt(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_file(name: &str, contents: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("animeseed_lookup_{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).expect("temp dir");
        let path = dir.join(name);
        std::fs::write(&path, contents).expect("write lookup");
        path
    }

    #[test]
    fn first_id_wins_and_blank_rows_skip() {
        let path = temp_file(
            "genres_distinct.csv",
            "id,value\n1,Action\n2, Drama \n,Comedy\n4,\n5,Action\n",
        );
        let lookup = Lookup::load(&path, false).expect("load");

        assert_eq!(lookup.resolve("Action"), Some(1));
        assert_eq!(lookup.resolve("Drama"), Some(2));
        assert_eq!(lookup.resolve("Comedy"), None);
        assert_eq!(lookup.len(), 2);
    }

    #[test]
    fn non_integer_id_is_fatal() {
        let path = temp_file("type_distinct.csv", "id,value\nx1,TV\n");
        let err = Lookup::load(&path, false).expect_err("bad id");
        assert!(matches!(err, ExtractError::InvalidLookupId { ref value, .. } if value == "x1"));
    }

    #[test]
    fn missing_value_column_is_fatal() {
        let path = temp_file("status_distinct.csv", "id,name\n1,Finished\n");
        let err = Lookup::load(&path, false).expect_err("missing column");
        assert!(matches!(err, ExtractError::MissingColumns { .. }));
    }

    #[test]
    fn overrides_replace_default_paths() {
        let mut layout = SourceLayout::default();
        layout.lookups_dir = PathBuf::from("lookups");
        layout
            .lookup_overrides
            .insert("country".to_string(), PathBuf::from("geo/countries.csv"));

        let country = LookupKind::Country;
        let gender = LookupKind::Gender;
        assert_eq!(
            layout.lookup_path(country.name(), country.default_path()),
            PathBuf::from("lookups/geo/countries.csv")
        );
        assert_eq!(
            layout.lookup_path(gender.name(), gender.default_path()),
            PathBuf::from("lookups/profiles/gender_distinct.csv")
        );
    }

    #[test]
    fn unloaded_lookup_resolves_nothing() {
        let lookups = Lookups::default();
        assert_eq!(lookups.resolve(LookupKind::Genre, Some("Action")), None);
    }
}

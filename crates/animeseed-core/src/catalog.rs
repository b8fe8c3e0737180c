//! The fixed catalog of seed tables, numbered in foreign-key load order.

use crate::schema::{SeedCatalog, TableSpec};

/// Table names shared by the catalog and the extraction engine.
pub mod tables {
    pub const CHARACTER: &str = "character";
    pub const ANIME: &str = "anime";
    pub const PERSON: &str = "person";
    pub const APP_USER: &str = "app_user";
    pub const CHARACTER_NICKNAME: &str = "character_nickname";
    pub const PERSON_ALTERNATE_NAME: &str = "person_alternate_name";
    pub const ANIME_GENRE: &str = "anime_genre";
    pub const ANIME_EXPLICIT_GENRE: &str = "anime_explicit_genre";
    pub const ANIME_LICENSOR: &str = "anime_licensor";
    pub const ANIME_DEMOGRAPHIC: &str = "anime_demographic";
    pub const ANIME_PRODUCER: &str = "anime_producer";
    pub const ANIME_STREAMING_SERVICE: &str = "anime_streaming_service";
    pub const ANIME_STUDIO: &str = "anime_studio";
    pub const ANIME_THEME: &str = "anime_theme";
    pub const CHARACTER_ANIME_WORK: &str = "character_anime_work";
    pub const PERSON_ANIME_WORK: &str = "person_anime_work";
    pub const PERSON_VOICE_WORK: &str = "person_voice_work";
    pub const ANIME_RECOMMENDATION: &str = "anime_recommendation";
}

/// Lookup tables seeded by the external lookup scripts (001-017).
pub const EXTERNAL_TABLES: [&str; 17] = [
    "type",
    "rating",
    "season",
    "source",
    "status",
    "genre",
    "explicit_genre",
    "licensor",
    "demographic",
    "producer",
    "streaming_service",
    "studio",
    "theme",
    "character_role",
    "country",
    "gender",
    "language",
];

pub const CATALOG_VERSION: &str = "0.1";

pub const ANIME_COLUMNS: [&str; 47] = [
    "id",
    "type_id",
    "rating_id",
    "season_id",
    "source_id",
    "status_id",
    "title",
    "title_japanese",
    "url",
    "image_url",
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

/// Anime attribute junctions: (table, lookup-id column, lookup table, load order).
pub const ANIME_ATTRIBUTE_TABLES: [(&str, &str, &str, u16); 8] = [
    (tables::ANIME_GENRE, "genre_id", "genre", 24),
    (tables::ANIME_EXPLICIT_GENRE, "explicit_genre_id", "explicit_genre", 25),
    (tables::ANIME_LICENSOR, "licensor_id", "licensor", 26),
    (tables::ANIME_DEMOGRAPHIC, "demographic_id", "demographic", 27),
    (tables::ANIME_PRODUCER, "producer_id", "producer", 28),
    (tables::ANIME_STREAMING_SERVICE, "streaming_service_id", "streaming_service", 29),
    (tables::ANIME_STUDIO, "studio_id", "studio", 30),
    (tables::ANIME_THEME, "theme_id", "theme", 31),
];

/// Build the catalog of every table rendered by the generator.
pub fn seed_catalog() -> SeedCatalog {
    let mut specs = vec![
        TableSpec::new(
            18,
            tables::CHARACTER,
            &["id", "url", "name", "name_japanese", "image_url", "favorites", "about"],
            &["id"],
        ),
        TableSpec::new(19, tables::ANIME, &ANIME_COLUMNS, &["id"])
            .references("type_id", "type")
            .references("rating_id", "rating")
            .references("season_id", "season")
            .references("source_id", "source")
            .references("status_id", "status"),
        TableSpec::new(
            20,
            tables::PERSON,
            &[
                "id",
                "url",
                "website_url",
                "image_url",
                "name",
                "given_name",
                "family_name",
                "birthday",
                "favorites",
                "city",
                "country_id",
            ],
            &["id"],
        )
        .references("country_id", "country"),
        TableSpec::new(
            21,
            tables::APP_USER,
            &["id", "gender_id", "country_id", "birthday", "joined_date", "username"],
            &["id"],
        )
        .references("gender_id", "gender")
        .references("country_id", "country"),
        TableSpec::new(
            22,
            tables::CHARACTER_NICKNAME,
            &["character_id", "nickname"],
            &["character_id", "nickname"],
        )
        .references("character_id", tables::CHARACTER),
        TableSpec::new(
            23,
            tables::PERSON_ALTERNATE_NAME,
            &["person_id", "alternate_name"],
            &["person_id", "alternate_name"],
        )
        .references("person_id", tables::PERSON),
    ];

    for (table, column, lookup, load_order) in ANIME_ATTRIBUTE_TABLES {
        specs.push(
            TableSpec::new(load_order, table, &["anime_id", column], &["anime_id", column])
                .references("anime_id", tables::ANIME)
                .references(column, lookup),
        );
    }

    specs.extend([
        TableSpec::new(
            32,
            tables::CHARACTER_ANIME_WORK,
            &["anime_id", "character_id", "character_role_id"],
            &["anime_id", "character_id"],
        )
        .references("anime_id", tables::ANIME)
        .references("character_id", tables::CHARACTER)
        .references("character_role_id", "character_role"),
        TableSpec::new(
            33,
            tables::PERSON_ANIME_WORK,
            &["anime_id", "person_id", "position"],
            &["anime_id", "person_id"],
        )
        .references("anime_id", tables::ANIME)
        .references("person_id", tables::PERSON),
        TableSpec::new(
            34,
            tables::PERSON_VOICE_WORK,
            &["person_id", "anime_id", "character_id", "language_id"],
            &["person_id", "anime_id", "character_id", "language_id"],
        )
        .references("person_id", tables::PERSON)
        .references("anime_id", tables::ANIME)
        .references("character_id", tables::CHARACTER)
        .references("language_id", "language"),
        TableSpec::new(
            35,
            tables::ANIME_RECOMMENDATION,
            &["anime_id", "recommended_anime_id"],
            &["anime_id", "recommended_anime_id"],
        )
        .references("anime_id", tables::ANIME)
        .references("recommended_anime_id", tables::ANIME),
    ]);

    SeedCatalog {
        catalog_version: CATALOG_VERSION.to_string(),
        external_tables: EXTERNAL_TABLES.iter().map(|name| name.to_string()).collect(),
        tables: specs,
    }
}

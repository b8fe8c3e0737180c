#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use animeseed_extract::closure::{CHARACTER_WORK_COLUMNS, PERSON_WORK_COLUMNS, VOICE_WORK_COLUMNS};
use animeseed_extract::entities::anime::{DETAILS_COLUMNS, STATS_COLUMNS};
use animeseed_extract::entities::app_user::PROFILE_COLUMNS;
use animeseed_extract::entities::character::CHARACTER_COLUMNS;
use animeseed_extract::entities::person::PERSON_COLUMNS;
use animeseed_extract::lookup::LookupKind;
use animeseed_extract::relations::{
    ALTERNATE_NAME_COLUMNS, NICKNAME_COLUMNS, RECOMMENDATION_COLUMNS,
};
use animeseed_extract::{ExtractOptions, SourceLayout};

pub fn temp_root(label: &str) -> PathBuf {
    std::env::temp_dir().join(format!("animeseed_{label}_{}", uuid::Uuid::new_v4()))
}

/// Values used by the default lookup files.
pub fn lookup_values(kind: LookupKind) -> Vec<(i64, &'static str)> {
    match kind {
        LookupKind::Type => vec![(1, "TV"), (2, "Movie")],
        LookupKind::Rating => vec![(1, "PG-13 - Teens 13 or older")],
        LookupKind::Season => vec![(1, "spring"), (2, "fall")],
        LookupKind::Source => vec![(1, "Original"), (3, "Manga")],
        LookupKind::Status => vec![(1, "Currently Airing"), (2, "Finished")],
        LookupKind::Genre => vec![(1, "Action"), (2, "Drama")],
        LookupKind::ExplicitGenre => vec![(1, "Hentai")],
        LookupKind::Licensor => vec![(1, "Funimation")],
        LookupKind::Demographic => vec![(1, "Shounen")],
        LookupKind::Producer => vec![(1, "Bandai Visual")],
        LookupKind::StreamingService => vec![(1, "Crunchyroll")],
        LookupKind::Studio => vec![(1, "Sunrise")],
        LookupKind::Theme => vec![(1, "Space")],
        LookupKind::CharacterRole => vec![(1, "Main"), (2, "Supporting")],
        LookupKind::Country => vec![(1, "Japan"), (2, "United States")],
        LookupKind::Gender => vec![(1, "Male"), (2, "Female")],
        LookupKind::Language => vec![(1, "Japanese"), (2, "English")],
    }
}

/// Source datasets and lookups for one test run, written under a temp root.
#[derive(Debug, Default)]
pub struct Fixture {
    pub details: Vec<Vec<String>>,
    pub stats: Vec<Vec<String>>,
    pub characters: Vec<Vec<String>>,
    pub character_works: Vec<Vec<String>>,
    pub nicknames: Vec<Vec<String>>,
    pub persons: Vec<Vec<String>>,
    pub alternate_names: Vec<Vec<String>>,
    pub person_works: Vec<Vec<String>>,
    pub voice_works: Vec<Vec<String>>,
    pub recommendations: Vec<Vec<String>>,
    pub profiles: Vec<Vec<String>>,
    /// Anchor pool ids; defaults to the details ids.
    pub pool: Option<Vec<i64>>,
}

fn record(columns: &[&str], values: &[(&str, &str)]) -> Vec<String> {
    columns
        .iter()
        .map(|column| {
            values
                .iter()
                .find(|(name, _)| name == column)
                .map(|(_, value)| value.to_string())
                .unwrap_or_default()
        })
        .collect()
}

impl Fixture {
    /// Three anchor anime with a small cast and staff around them.
    ///
    /// Anime 3 has no stats row, character 12 has no name and person 102 has
    /// no location, so each is dropped along with the relations touching it.
    pub fn standard() -> Self {
        let mut fixture = Self::default();
        fixture
            .anime_with(
                1,
                &[
                    ("title", "Cowboy Bebop"),
                    ("type", "TV"),
                    ("source", "Manga"),
                    ("status", "Finished"),
                    ("score", "8.75"),
                    ("start_date", "1998-04-03"),
                    ("genres", "['Action', 'Unknown']"),
                    ("studios", "['Sunrise']"),
                ],
            )
            .anime(2, "Trigun", "Original", "Currently Airing")
            .anime(3, "Monster", "Manga", "Finished");
        fixture.stats(1).stats(2);

        fixture
            .character(10, "Spike Spiegel")
            .character(11, "Vash")
            .characters
            .push(record(&CHARACTER_COLUMNS, &[("character_mal_id", "12"), ("url", "u")]));
        fixture
            .character_work(1, 10, "Main")
            .character_work(1, 12, "Supporting")
            .character_work(2, 11, "Main")
            .character_work(99, 10, "Main")
            .nickname(10, "Swimming Bird")
            .nickname(12, "Nameless");

        fixture
            .person(100, "Tokyo, Japan")
            .person(101, "Los Angeles, USA")
            .person(102, "")
            .person_work(100, "Director", 1)
            .person_work(102, "Producer", 2)
            .voice_work(101, 1, 10, "Japanese")
            .voice_work(101, 2, 12, "Japanese")
            .alternate_name(100, "Shinichiro")
            .alternate_name(102, "Nobody");

        fixture
            .recommendation(1, 2)
            .recommendation(1, 3)
            .recommendation(2, 1)
            .profile("alice", "Female", "Japan", "Mar 12, 2010")
            .profile("bob", "Male", "USA", "2012-06-15")
            .profile("carol", "", "Japan", "Jan 15, 2015");
        fixture
    }

    pub fn anime(&mut self, id: i64, title: &str, source: &str, status: &str) -> &mut Self {
        self.anime_with(
            id,
            &[("title", title), ("source", source), ("status", status)],
        )
    }

    /// Details row for `id`; url and image default to stable values.
    pub fn anime_with(&mut self, id: i64, values: &[(&str, &str)]) -> &mut Self {
        let id_text = id.to_string();
        let url = format!("https://myanimelist.net/anime/{id}");
        let image = format!("https://cdn.myanimelist.net/images/anime/{id}.jpg");
        let mut all = vec![
            ("mal_id", id_text.as_str()),
            ("url", url.as_str()),
            ("image_url", image.as_str()),
        ];
        all.extend_from_slice(values);
        self.details.push(record(&DETAILS_COLUMNS, &all));
        self
    }

    pub fn stats(&mut self, id: i64) -> &mut Self {
        let id_text = id.to_string();
        self.stats.push(record(
            &STATS_COLUMNS,
            &[
                ("mal_id", id_text.as_str()),
                ("watching", "10"),
                ("completed", "20"),
                ("total", "30"),
                ("score_10_votes", "5"),
                ("score_10_percentage", "50.0"),
            ],
        ));
        self
    }

    pub fn character(&mut self, id: i64, name: &str) -> &mut Self {
        let id_text = id.to_string();
        let url = format!("https://myanimelist.net/character/{id}");
        self.characters.push(record(
            &CHARACTER_COLUMNS,
            &[
                ("character_mal_id", id_text.as_str()),
                ("url", url.as_str()),
                ("name", name),
                ("favorites", "1,024"),
            ],
        ));
        self
    }

    pub fn character_work(&mut self, anime: i64, character: i64, role: &str) -> &mut Self {
        self.character_works.push(vec![
            anime.to_string(),
            character.to_string(),
            role.to_string(),
        ]);
        self
    }

    pub fn nickname(&mut self, character: i64, nickname: &str) -> &mut Self {
        self.nicknames
            .push(vec![character.to_string(), nickname.to_string()]);
        self
    }

    pub fn person(&mut self, id: i64, location: &str) -> &mut Self {
        let id_text = id.to_string();
        let url = format!("https://myanimelist.net/people/{id}");
        let name = format!("Person {id}");
        self.persons.push(record(
            &PERSON_COLUMNS,
            &[
                ("person_mal_id", id_text.as_str()),
                ("url", url.as_str()),
                ("name", name.as_str()),
                ("birthday", "1965-01-24"),
                ("relevant_location", location),
            ],
        ));
        self
    }

    pub fn person_work(&mut self, person: i64, position: &str, anime: i64) -> &mut Self {
        self.person_works.push(vec![
            person.to_string(),
            position.to_string(),
            anime.to_string(),
        ]);
        self
    }

    pub fn voice_work(
        &mut self,
        person: i64,
        anime: i64,
        character: i64,
        language: &str,
    ) -> &mut Self {
        self.voice_works.push(vec![
            person.to_string(),
            anime.to_string(),
            character.to_string(),
            language.to_string(),
        ]);
        self
    }

    pub fn alternate_name(&mut self, person: i64, name: &str) -> &mut Self {
        self.alternate_names
            .push(vec![person.to_string(), name.to_string()]);
        self
    }

    pub fn recommendation(&mut self, anime: i64, recommended: i64) -> &mut Self {
        self.recommendations
            .push(vec![anime.to_string(), recommended.to_string()]);
        self
    }

    pub fn profile(&mut self, username: &str, gender: &str, location: &str, joined: &str) -> &mut Self {
        self.profiles.push(record(
            &PROFILE_COLUMNS,
            &[
                ("username", username),
                ("gender", gender),
                ("location", location),
                ("joined", joined),
            ],
        ));
        self
    }

    /// Write every source file under `root` and return its layout.
    pub fn write(&self, root: &Path) -> SourceLayout {
        let layout = SourceLayout::rooted_at(root);

        for kind in LookupKind::ALL {
            let rows = lookup_values(kind)
                .into_iter()
                .map(|(id, value)| vec![id.to_string(), value.to_string()])
                .collect::<Vec<_>>();
            write_csv(
                &layout.lookup_path(kind.name(), kind.default_path()),
                &["id", "value"],
                &rows,
            );
        }

        let pool = self.pool.clone().unwrap_or_else(|| {
            let mut ids: Vec<i64> = self
                .details
                .iter()
                .filter_map(|row| row[0].parse().ok())
                .collect();
            ids.dedup();
            ids
        });
        let pool_rows: Vec<Vec<String>> = pool.iter().map(|id| vec![id.to_string()]).collect();
        write_csv(&layout.anchor_pool_path(), &["value"], &pool_rows);

        let datasets: [(&Path, &[&str], &[Vec<String>]); 11] = [
            (layout.details.as_path(), &DETAILS_COLUMNS[..], &self.details[..]),
            (layout.stats.as_path(), &STATS_COLUMNS[..], &self.stats[..]),
            (layout.characters.as_path(), &CHARACTER_COLUMNS[..], &self.characters[..]),
            (
                layout.character_anime_works.as_path(),
                &CHARACTER_WORK_COLUMNS[..],
                &self.character_works[..],
            ),
            (
                layout.character_nicknames.as_path(),
                &NICKNAME_COLUMNS[..],
                &self.nicknames[..],
            ),
            (layout.person_details.as_path(), &PERSON_COLUMNS[..], &self.persons[..]),
            (
                layout.person_alternate_names.as_path(),
                &ALTERNATE_NAME_COLUMNS[..],
                &self.alternate_names[..],
            ),
            (
                layout.person_anime_works.as_path(),
                &PERSON_WORK_COLUMNS[..],
                &self.person_works[..],
            ),
            (
                layout.person_voice_works.as_path(),
                &VOICE_WORK_COLUMNS[..],
                &self.voice_works[..],
            ),
            (
                layout.recommendations.as_path(),
                &RECOMMENDATION_COLUMNS[..],
                &self.recommendations[..],
            ),
            (layout.profiles.as_path(), &PROFILE_COLUMNS[..], &self.profiles[..]),
        ];
        for (file, headers, rows) in datasets {
            write_csv(&layout.dataset(file), headers, rows);
        }

        layout
    }

    /// Write the fixture and build options for a run into `<root>/seeds`.
    pub fn options(&self, root: &Path, sample_size: usize, seed: u64) -> ExtractOptions {
        ExtractOptions {
            sample_size,
            seed: Some(seed),
            layout: self.write(root),
            out_dir: root.join("seeds"),
            run_id: Some("test-run".to_string()),
            ..ExtractOptions::default()
        }
    }
}

pub fn write_csv(path: &Path, headers: &[&str], rows: &[Vec<String>]) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create fixture dir");
    }
    let mut writer = csv::Writer::from_path(path).expect("open fixture csv");
    writer.write_record(headers).expect("write header");
    for row in rows {
        writer.write_record(row).expect("write row");
    }
    writer.flush().expect("flush fixture csv");
}

pub fn read_seed(dir: &Path, file: &str) -> String {
    fs::read_to_string(dir.join(file))
        .unwrap_or_else(|_| panic!("missing seed file {}", dir.join(file).display()))
}

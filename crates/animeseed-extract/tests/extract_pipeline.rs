mod common;

use std::fs;

use animeseed_extract::{ExtractError, SeedEngine};

use common::{Fixture, read_seed, temp_root, write_csv};

#[test]
fn single_anchor_resolves_source_and_status() {
    let root = temp_root("single");
    let mut fixture = Fixture::default();
    fixture
        .anime(1, "Foo", "Manga", "Finished")
        .stats(1)
        .profile("alice", "Female", "Japan", "2010-03-12");

    let options = fixture.options(&root, 1, 42);
    let result = SeedEngine::new(options).run().expect("run extraction");

    let anime = result.report.table("anime").expect("anime table");
    assert_eq!(anime.rows, 1);
    let sql = read_seed(&result.out_dir, &anime.file);
    assert!(
        sql.contains("    (1, NULL, NULL, NULL, 3, 2, 'Foo', 'Foo', 'https://myanimelist.net/anime/1'"),
        "unexpected anime seed:\n{sql}"
    );
    assert!(sql.ends_with("ON CONFLICT (id) DO NOTHING;\n"));
    assert_eq!(result.report.anchors_sampled, 1);
    assert_eq!(result.report.total_dropped(), 0);
}

#[test]
fn missing_stats_row_drops_the_anime() {
    let root = temp_root("no_stats");
    let mut fixture = Fixture::default();
    fixture
        .anime(1, "Foo", "Manga", "Finished")
        .profile("alice", "Female", "Japan", "2010-03-12");

    let options = fixture.options(&root, 1, 42);
    let result = SeedEngine::new(options).run().expect("run extraction");

    let anime = result.report.table("anime").expect("anime table");
    assert_eq!(anime.rows, 0);
    assert_eq!(result.report.drop_count("anime.missing_stats_row"), 1);
    assert!(read_seed(&result.out_dir, &anime.file).contains("-- No rows generated for anime."));
}

#[test]
fn standard_fixture_keeps_only_consistent_rows() {
    let root = temp_root("standard");
    let options = Fixture::standard().options(&root, 3, 7);
    let result = SeedEngine::new(options).run().expect("run extraction");
    let report = &result.report;

    let rows = |table: &str| report.table(table).map(|table| table.rows).unwrap_or(u64::MAX);
    assert_eq!(report.tables.len(), 18);
    assert_eq!(rows("anime"), 2);
    assert_eq!(rows("character"), 2);
    assert_eq!(rows("person"), 2);
    assert_eq!(rows("app_user"), 3);
    assert_eq!(rows("character_anime_work"), 2);
    assert_eq!(rows("person_anime_work"), 1);
    assert_eq!(rows("person_voice_work"), 1);
    assert_eq!(rows("character_nickname"), 1);
    assert_eq!(rows("person_alternate_name"), 1);
    assert_eq!(rows("anime_recommendation"), 2);
    assert_eq!(rows("anime_genre"), 1);
    assert_eq!(rows("anime_studio"), 1);
    assert_eq!(rows("anime_theme"), 0);

    assert_eq!(report.drop_count("anime.missing_stats_row"), 1);
    assert_eq!(report.drop_count("character.missing_required_text"), 1);
    assert_eq!(report.drop_count("person.missing_location_country"), 1);
    assert_eq!(report.drop_count("anime_genre.unknown_value"), 1);
    assert_eq!(report.drop_count("anime_recommendation.outside_subset"), 1);
    assert_eq!(report.drop_count("character_anime_work.dangling_reference"), 1);
    assert_eq!(report.drop_count("person_anime_work.dangling_reference"), 1);
    assert_eq!(report.drop_count("person_voice_work.dangling_reference"), 1);

    let character_works = read_seed(
        &result.out_dir,
        &report.table("character_anime_work").expect("cast").file,
    );
    assert!(character_works.contains("    (1, 10, 1),\n    (2, 11, 1)\n"));

    let persons = read_seed(&result.out_dir, &report.table("person").expect("person").file);
    assert!(persons.contains("'Los Angeles', 2)"));
    assert!(persons.contains("'Tokyo', 1)"));
}

#[test]
fn seed_files_load_parents_first() {
    let root = temp_root("order");
    let options = Fixture::standard().options(&root, 3, 7);
    let result = SeedEngine::new(options).run().expect("run extraction");

    let files: Vec<&str> = result
        .report
        .tables
        .iter()
        .map(|table| table.file.as_str())
        .collect();
    let mut sorted = files.clone();
    sorted.sort();
    assert_eq!(files, sorted);

    let position = |table: &str| {
        result
            .report
            .tables
            .iter()
            .position(|report| report.table == table)
            .expect("table written")
    };
    assert!(position("anime") < position("anime_genre"));
    assert!(position("character") < position("character_anime_work"));
    assert!(position("person") < position("person_voice_work"));
}

#[test]
fn same_seed_writes_identical_bytes() {
    let root_a = temp_root("idempotent_a");
    let root_b = temp_root("idempotent_b");
    let fixture = Fixture::standard();

    let result_a = SeedEngine::new(fixture.options(&root_a, 2, 11))
        .run()
        .expect("run A");
    let result_b = SeedEngine::new(fixture.options(&root_b, 2, 11))
        .run()
        .expect("run B");

    assert_eq!(result_a.report.tables.len(), result_b.report.tables.len());
    for (a, b) in result_a.report.tables.iter().zip(&result_b.report.tables) {
        assert_eq!(a.sha256, b.sha256, "{} differs between runs", a.file);
        assert_eq!(
            fs::read(result_a.out_dir.join(&a.file)).expect("read A"),
            fs::read(result_b.out_dir.join(&b.file)).expect("read B")
        );
    }

    // Re-running into the same directory overwrites with the same bytes.
    let rerun = SeedEngine::new(fixture.options(&root_a, 2, 11))
        .run()
        .expect("rerun A");
    for (first, again) in result_a.report.tables.iter().zip(&rerun.report.tables) {
        assert_eq!(first.sha256, again.sha256);
    }
}

#[test]
fn duplicate_source_rows_keep_the_first() {
    let root = temp_root("dedup");
    let mut fixture = Fixture::default();
    fixture
        .anime(1, "First", "Manga", "Finished")
        .anime(1, "Second", "Original", "Currently Airing")
        .stats(1)
        .character(10, "Spike")
        .character(10, "Not Spike")
        .character_work(1, 10, "Main")
        .character_work(1, 10, "Supporting")
        .profile("alice", "Female", "Japan", "2010-03-12");
    fixture.pool = Some(vec![1]);

    let result = SeedEngine::new(fixture.options(&root, 1, 3))
        .run()
        .expect("run extraction");
    let report = &result.report;

    let anime = read_seed(&result.out_dir, &report.table("anime").expect("anime").file);
    assert!(anime.contains("'First'"));
    assert!(!anime.contains("'Second'"));

    let characters = read_seed(
        &result.out_dir,
        &report.table("character").expect("character").file,
    );
    assert!(characters.contains("'Spike'"));
    assert!(!characters.contains("'Not Spike'"));

    let cast = read_seed(
        &result.out_dir,
        &report.table("character_anime_work").expect("cast").file,
    );
    assert!(cast.contains("    (1, 10, 1)\n"));
    assert_eq!(report.table("character_anime_work").map(|t| t.rows), Some(1));
}

#[test]
fn zero_sample_size_is_rejected() {
    let root = temp_root("zero");
    let options = Fixture::standard().options(&root, 0, 1);
    let out_dir = options.out_dir.clone();

    let err = SeedEngine::new(options).run().expect_err("zero sample");
    assert!(matches!(err, ExtractError::InvalidOptions(_)));
    assert!(!out_dir.exists());
}

#[test]
fn sample_larger_than_pool_is_fatal() {
    let root = temp_root("pool");
    let options = Fixture::standard().options(&root, 4, 1);
    let out_dir = options.out_dir.clone();

    let err = SeedEngine::new(options).run().expect_err("pool too small");
    assert!(matches!(
        err,
        ExtractError::InsufficientPool {
            requested: 4,
            available: 3,
            ..
        }
    ));
    assert!(!out_dir.exists());
}

#[test]
fn profile_pool_smaller_than_app_user_count_is_fatal() {
    let root = temp_root("profiles");
    let mut options = Fixture::standard().options(&root, 1, 1);
    options.app_user_count = Some(5);
    let out_dir = options.out_dir.clone();

    let err = SeedEngine::new(options).run().expect_err("too few profiles");
    assert!(matches!(
        err,
        ExtractError::InsufficientPool { requested: 5, .. }
    ));
    assert!(!out_dir.exists());
}

#[test]
fn missing_required_column_is_fatal() {
    let root = temp_root("columns");
    let options = Fixture::standard().options(&root, 1, 1);
    let out_dir = options.out_dir.clone();
    write_csv(
        &options.layout.dataset(&options.layout.details),
        &["mal_id", "title"],
        &[vec!["1".to_string(), "Foo".to_string()]],
    );

    let err = SeedEngine::new(options).run().expect_err("missing columns");
    match err {
        ExtractError::MissingColumns { missing, .. } => {
            assert!(missing.contains(&"status".to_string()));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(!out_dir.exists());
}

#[test]
fn non_integer_lookup_id_is_fatal() {
    let root = temp_root("lookup");
    let options = Fixture::standard().options(&root, 1, 1);
    let out_dir = options.out_dir.clone();
    write_csv(
        &options
            .layout
            .lookups_dir
            .join("details/source_distinct.csv"),
        &["id", "value"],
        &[vec!["three".to_string(), "Manga".to_string()]],
    );

    let err = SeedEngine::new(options).run().expect_err("bad lookup id");
    assert!(matches!(
        err,
        ExtractError::InvalidLookupId { ref value, .. } if value == "three"
    ));
    assert!(!out_dir.exists());
}

#[test]
fn reported_checksums_match_written_files() {
    use sha2::{Digest, Sha256};

    let root = temp_root("checksums");
    let options = Fixture::standard().options(&root, 3, 5);
    let result = SeedEngine::new(options).run().expect("run extraction");

    for table in &result.report.tables {
        let bytes = fs::read(result.out_dir.join(&table.file)).expect("read seed file");
        assert_eq!(table.bytes, bytes.len() as u64);
        assert_eq!(table.sha256, hex::encode(Sha256::digest(&bytes)));
    }
    assert_eq!(
        result.report.bytes_written,
        result.report.tables.iter().map(|table| table.bytes).sum::<u64>()
    );
}

//! Tests for save-file rotation, corruption isolation, and tamper detection.

use std::fs;
use std::path::Path;

use breakthrough::{Board, FirstMove, GameEngine, SaveStore};
use chrono::{TimeDelta, Utc};
use tempfile::TempDir;

const CODE_FORMAT: &str = "%Y%m%d%H%M%S%3f";

fn setup_store() -> (TempDir, SaveStore) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
    let dir = TempDir::new().expect("Failed to create temp dir");
    let store = SaveStore::new(dir.path());
    (dir, store)
}

fn players() -> [String; 2] {
    ["Alice".to_string(), "Bob".to_string()]
}

/// Valid save-file JSON with an all-empty 6x4 board.
fn forged_json(code: &str, names: serde_json::Value, move_count: u32, is_win: bool) -> String {
    serde_json::json!({
        "UniqueCode": code,
        "MoveCount": move_count,
        "Players": names,
        "FirstMove": 0,
        "Matrix": vec![vec![0u8; 4]; 6],
        "IsWin": is_win,
    })
    .to_string()
}

fn write_save(store: &SaveStore, code: &str, contents: &str) {
    let dir = store.saves_dir();
    fs::create_dir_all(&dir).expect("Failed to create saves dir");
    fs::write(dir.join(format!("{code}.json")), contents).expect("Failed to write save file");
}

fn save_file_count(store: &SaveStore) -> usize {
    fs::read_dir(store.saves_dir())
        .expect("Failed to read saves dir")
        .filter_map(Result::ok)
        .filter(|e| e.path().extension().and_then(|x| x.to_str()) == Some("json"))
        .count()
}

fn error_log_lines(dir: &Path) -> Vec<String> {
    let contents = fs::read_to_string(dir.join("error.log")).expect("Failed to read error log");
    contents.lines().map(str::to_string).collect()
}

#[test]
fn test_persist_then_load_round_trip() {
    let (_dir, store) = setup_store();
    let board = Board::new(8, 8).expect("Valid dimensions");

    let record = store
        .create(board, players(), FirstMove::White)
        .expect("Create failed");

    let loaded = store.load_all().expect("Load failed");
    assert_eq!(loaded.len(), 1);
    assert_eq!(loaded[0], record);
}

#[test]
fn test_rotation_keeps_one_file_per_game() {
    let (_dir, store) = setup_store();
    let board = Board::new(8, 8).expect("Valid dimensions");

    let mut record = store
        .create(board, players(), FirstMove::White)
        .expect("Create failed");
    let first_code = record.unique_code().clone();

    for _ in 0..3 {
        let board = record.board().clone();
        record = store.rotate(&record, board).expect("Rotate failed");
    }

    assert_eq!(*record.move_count(), 3);
    assert!(record.unique_code() > &first_code, "codes must increase");
    assert_eq!(save_file_count(&store), 1, "old files must be deleted");

    let loaded = store.load_all().expect("Load failed");
    assert_eq!(loaded.len(), 1);
    assert_eq!(loaded[0].unique_code(), record.unique_code());
}

#[test]
fn test_load_all_sorted_most_recent_first() {
    let (_dir, store) = setup_store();

    for _ in 0..3 {
        let board = Board::new(6, 4).expect("Valid dimensions");
        store
            .create(board, players(), FirstMove::White)
            .expect("Create failed");
    }

    let loaded = store.load_all().expect("Load failed");
    assert_eq!(loaded.len(), 3);
    assert!(loaded[0].unique_code() > loaded[1].unique_code());
    assert!(loaded[1].unique_code() > loaded[2].unique_code());
}

#[test]
fn test_corrupt_json_is_skipped_and_logged() {
    let (dir, store) = setup_store();
    let board = Board::new(8, 8).expect("Valid dimensions");
    store
        .create(board, players(), FirstMove::White)
        .expect("Create failed");

    write_save(&store, &store.generate_code(), "{ this is not json");

    let loaded = store.load_all().expect("Load failed");
    assert_eq!(loaded.len(), 1, "the valid record must still load");

    let lines = error_log_lines(dir.path());
    assert_eq!(lines.len(), 1);
    let fields: Vec<&str> = lines[0].split('\t').collect();
    assert_eq!(fields.len(), 4, "timestamp, path, kind, message");
    assert!(fields[1].ends_with(".json"));
    assert_eq!(fields[2], "MALFORMED_JSON");
}

#[test]
fn test_missing_required_field_is_skipped_and_logged() {
    let (dir, store) = setup_store();

    let code = store.generate_code();
    let no_players = serde_json::json!({
        "UniqueCode": code,
        "MoveCount": 2,
        "FirstMove": 0,
        "Matrix": vec![vec![0u8; 4]; 6],
        "IsWin": false,
    })
    .to_string();
    write_save(&store, &code, &no_players);

    let loaded = store.load_all().expect("Load failed");
    assert!(loaded.is_empty());

    let lines = error_log_lines(dir.path());
    assert_eq!(lines.len(), 1);
    assert!(lines[0].contains("MALFORMED_RECORD"));
    assert!(lines[0].contains("Players"));
}

#[test]
fn test_tampered_file_is_skipped_and_logged() {
    let (dir, store) = setup_store();

    // A freshly written file whose name encodes an instant an hour ago:
    // its mtime is now, so the drift exceeds the 100 ms tolerance.
    let stale_code = (Utc::now() - TimeDelta::hours(1))
        .format(CODE_FORMAT)
        .to_string();
    write_save(
        &store,
        &stale_code,
        &forged_json(&stale_code, serde_json::json!(["Alice", "Bob"]), 4, false),
    );

    let loaded = store.load_all().expect("Load failed");
    assert!(loaded.is_empty(), "tampered file must not be trusted");

    let lines = error_log_lines(dir.path());
    assert_eq!(lines.len(), 1);
    assert!(lines[0].contains("INTEGRITY_VIOLATION"));
}

#[test]
fn test_fresh_forged_file_passes_tamper_check() {
    let (_dir, store) = setup_store();

    let code = store.generate_code();
    write_save(
        &store,
        &code,
        &forged_json(&code, serde_json::json!(["Alice", "Bob"]), 4, false),
    );

    let loaded = store.load_all().expect("Load failed");
    assert_eq!(loaded.len(), 1);
    assert_eq!(*loaded[0].move_count(), 4);
}

#[test]
fn test_top_scores_undetermined_without_finished_games() {
    let (dir, store) = setup_store();
    let board = Board::new(8, 8).expect("Valid dimensions");
    store
        .create(board, players(), FirstMove::White)
        .expect("Create failed");

    let snapshot = store.refresh_top_scores().expect("Refresh failed");
    assert_eq!(*snapshot.best_player(), None);

    let contents =
        fs::read_to_string(dir.path().join("top-scores.txt")).expect("Missing top scores");
    let lines: Vec<&str> = contents.lines().collect();
    assert_eq!(lines.len(), 6);
    assert_eq!(lines[1], "undetermined");
    assert_eq!(lines[3], "undetermined");
    assert_eq!(lines[5], "undetermined");
}

#[test]
fn test_leaderboard_tie_reports_undetermined() {
    let (_dir, store) = setup_store();

    // Two finished games, one win each for distinct players.
    // move_count 3 with first_move 0 makes players[0] the winner.
    let code_a = store.generate_code();
    write_save(
        &store,
        &code_a,
        &forged_json(&code_a, serde_json::json!(["Alice", "Bob"]), 3, true),
    );
    let code_b = store.generate_code();
    write_save(
        &store,
        &code_b,
        &forged_json(&code_b, serde_json::json!(["Carol", "Dan"]), 5, true),
    );

    let snapshot = store.refresh_top_scores().expect("Refresh failed");
    assert_eq!(*snapshot.best_player(), None, "tie must be undetermined");
    assert_eq!(*snapshot.shortest_game(), Some(3));
    assert_eq!(*snapshot.longest_game(), Some(5));
}

#[test]
fn test_engine_win_refreshes_top_scores_file() {
    let (dir, store) = setup_store();
    let engine = GameEngine::new(store);

    // Single white pawn one diagonal step from the far edge, so the first
    // move both ends the game and exercises the finished-record rotation.
    let code = engine.store().generate_code();
    let mut matrix = vec![vec![0u8; 4]; 6];
    matrix[1][1] = 1;
    matrix[4][3] = 2;
    let json = serde_json::json!({
        "UniqueCode": code,
        "MoveCount": 0,
        "Players": ["Alice", "Bob"],
        "FirstMove": 0,
        "Matrix": matrix,
        "IsWin": false,
    })
    .to_string();
    write_save(engine.store(), &code, &json);

    let record = engine
        .store()
        .load_all()
        .expect("Load failed")
        .into_iter()
        .next()
        .expect("Forged record must load");

    let (finished, outcome) = engine
        .apply_move(&record, (1, 1), (0, 0))
        .expect("Apply failed");
    assert!(matches!(outcome, breakthrough::Outcome::Won { .. }));
    assert!(*finished.is_win());

    let contents =
        fs::read_to_string(dir.path().join("top-scores.txt")).expect("Missing top scores");
    let lines: Vec<&str> = contents.lines().collect();
    // Winner parity: (0 + 1 + 1) % 2 = 0 -> Alice.
    assert_eq!(lines[0], "Most wins");
    assert_eq!(lines[1], "Alice");
    assert_eq!(lines[3], "1");
    assert_eq!(lines[5], "1");
}

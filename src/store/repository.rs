//! Durable save-file store with crash-safe rotation and tamper detection.
//!
//! One logical game is backed by at most one file in `Saves/`, named by
//! its unique code. Every persisted change writes a new file first and
//! deletes the previous one second, so a crash between the steps leaves a
//! stale extra file rather than losing data.

use super::error::{StoreError, StoreErrorKind};
use super::record::{GameRecord, SaveData};
use crate::game::Board;
use crate::leaderboard::LeaderboardSnapshot;
use crate::store::FirstMove;
use chrono::{DateTime, DurationRound, NaiveDateTime, TimeDelta, Utc};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{debug, info, instrument, warn};

/// Timestamp format backing unique codes: `yyyyMMddHHmmssfff`, UTC.
const CODE_FORMAT: &str = "%Y%m%d%H%M%S%3f";

/// Maximum drift between a file's mtime and the code in its name.
const TAMPER_TOLERANCE_MS: i64 = 100;

/// Single-writer record store rooted at a directory.
///
/// Layout under the root: `Saves/<code>.json` per record,
/// `top-scores.txt` for the leaderboard, `error.log` for load failures.
#[derive(Debug)]
pub struct SaveStore {
    root: PathBuf,
    last_issued: Mutex<Option<DateTime<Utc>>>,
}

impl SaveStore {
    /// Creates a store rooted at the given directory.
    #[instrument(skip(root))]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        info!(root = %root.display(), "Creating SaveStore");
        Self {
            root,
            last_issued: Mutex::new(None),
        }
    }

    /// Directory holding the save files.
    pub fn saves_dir(&self) -> PathBuf {
        self.root.join("Saves")
    }

    /// Path of the regenerated leaderboard file.
    pub fn top_scores_path(&self) -> PathBuf {
        self.root.join("top-scores.txt")
    }

    fn error_log_path(&self) -> PathBuf {
        self.root.join("error.log")
    }

    fn file_path(&self, code: &str) -> PathBuf {
        self.saves_dir().join(format!("{code}.json"))
    }

    /// Generates a fresh unique code from the current UTC time.
    ///
    /// Codes are strictly increasing per store instance: two calls within
    /// the same millisecond bump the second by 1 ms. Clock rollback is an
    /// accepted limitation.
    pub fn generate_code(&self) -> String {
        let mut last = self.last_issued.lock().expect("code clock mutex poisoned");
        let now = Utc::now();
        let mut instant = now
            .duration_trunc(TimeDelta::milliseconds(1))
            .unwrap_or(now);
        if let Some(prev) = *last {
            if instant <= prev {
                instant = prev + TimeDelta::milliseconds(1);
            }
        }
        *last = Some(instant);
        instant.format(CODE_FORMAT).to_string()
    }

    /// Writes a brand-new record for a fresh game at move 0.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the file cannot be written.
    #[instrument(skip(self, board, players))]
    pub fn create(
        &self,
        board: Board,
        players: [String; 2],
        first_move: FirstMove,
    ) -> Result<GameRecord, StoreError> {
        let record = GameRecord::create(self.generate_code(), board, players, first_move);
        self.write_record(&record)?;
        info!(code = %record.unique_code(), "Game record created");
        Ok(record)
    }

    /// Persists the board after a move: `move_count + 1` under a fresh
    /// code, then the previous file is deleted.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the new file cannot be written. A
    /// failed delete of the old file is tolerated — the stale file is an
    /// independent candidate on the next [`load_all`](Self::load_all).
    #[instrument(skip(self, record, board), fields(code = %record.unique_code()))]
    pub fn rotate(&self, record: &GameRecord, board: Board) -> Result<GameRecord, StoreError> {
        let next = record.advanced(self.generate_code(), board);
        self.replace(record.unique_code(), next)
    }

    /// Persists the record once more with `is_win` set.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the new file cannot be written.
    #[instrument(skip(self, record), fields(code = %record.unique_code()))]
    pub fn mark_won(&self, record: &GameRecord) -> Result<GameRecord, StoreError> {
        let next = record.finished(self.generate_code());
        self.replace(record.unique_code(), next)
    }

    /// Save-new-then-delete-old rotation step.
    fn replace(&self, old_code: &str, next: GameRecord) -> Result<GameRecord, StoreError> {
        self.write_record(&next)?;
        self.delete_file(old_code);
        debug!(old = %old_code, new = %next.unique_code(), "Save rotated");
        Ok(next)
    }

    fn write_record(&self, record: &GameRecord) -> Result<(), StoreError> {
        let dir = self.saves_dir();
        fs::create_dir_all(&dir).map_err(|e| StoreError::from_io(&e, &dir))?;

        let path = self.file_path(record.unique_code());
        let json = serde_json::to_string(&SaveData::from_record(record))
            .map_err(|e| StoreError::from_json(&e, &path))?;
        fs::write(&path, json).map_err(|e| StoreError::from_io(&e, &path))?;
        debug!(path = %path.display(), "Save file written");
        Ok(())
    }

    fn delete_file(&self, code: &str) {
        let path = self.file_path(code);
        match fs::remove_file(&path) {
            Ok(()) => debug!(path = %path.display(), "Previous save file deleted"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!(
                path = %path.display(),
                error = %e,
                "Could not delete previous save file; it will surface as a stale candidate"
            ),
        }
    }

    /// Loads every readable record, sorted by code descending (most
    /// recent first).
    ///
    /// Each file is an independent candidate: a corrupt, tampered, or
    /// unreadable file is classified, appended to `error.log`, and
    /// skipped without aborting the rest of the load.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] only when the saves directory itself cannot
    /// be created or read.
    #[instrument(skip(self))]
    pub fn load_all(&self) -> Result<Vec<GameRecord>, StoreError> {
        let dir = self.saves_dir();
        fs::create_dir_all(&dir).map_err(|e| StoreError::from_io(&e, &dir))?;

        let entries = fs::read_dir(&dir).map_err(|e| StoreError::from_io(&e, &dir))?;
        let mut records = Vec::new();
        for entry in entries {
            let path = match entry {
                Ok(entry) => entry.path(),
                Err(e) => {
                    self.log_load_error(&StoreError::from_io(&e, &dir));
                    continue;
                }
            };
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            match self.try_load(&path) {
                Ok(record) => records.push(record),
                Err(e) => self.log_load_error(&e),
            }
        }

        records.sort_by(|a, b| b.unique_code().cmp(a.unique_code()));
        info!(count = records.len(), "Save records loaded");
        Ok(records)
    }

    fn try_load(&self, path: &Path) -> Result<GameRecord, StoreError> {
        let json = fs::read_to_string(path).map_err(|e| StoreError::from_io(&e, path))?;
        let data: SaveData =
            serde_json::from_str(&json).map_err(|e| StoreError::from_json(&e, path))?;
        self.verify_untampered(path)?;
        data.into_record(path)
    }

    /// The code in the filename doubles as a checksum against filesystem
    /// metadata: a save rewritten outside the store drifts its mtime away
    /// from the instant encoded in its name.
    fn verify_untampered(&self, path: &Path) -> Result<(), StoreError> {
        let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
            return Ok(());
        };
        let Ok(encoded) = NaiveDateTime::parse_from_str(stem, CODE_FORMAT) else {
            // Files not named by a code carry no metadata to verify.
            return Ok(());
        };

        let meta = fs::metadata(path).map_err(|e| StoreError::from_io(&e, path))?;
        let modified = meta.modified().map_err(|e| StoreError::from_io(&e, path))?;
        let modified: DateTime<Utc> = modified.into();

        let drift = (modified.naive_utc() - encoded).abs();
        if drift > TimeDelta::milliseconds(TAMPER_TOLERANCE_MS) {
            return Err(StoreError::integrity(
                format!(
                    "file modified {} ms away from its encoded code",
                    drift.num_milliseconds()
                ),
                path,
            ));
        }
        Ok(())
    }

    /// Recomputes the leaderboard from all finished records and rewrites
    /// `top-scores.txt` in full.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the saves directory cannot be read or
    /// the leaderboard file cannot be written.
    #[instrument(skip(self))]
    pub fn refresh_top_scores(&self) -> Result<LeaderboardSnapshot, StoreError> {
        let records = self.load_all()?;
        let snapshot = LeaderboardSnapshot::recompute(records.iter().filter(|r| *r.is_win()));

        let path = self.top_scores_path();
        let mut contents = snapshot.to_report().join("\n");
        contents.push('\n');
        fs::write(&path, contents).map_err(|e| StoreError::from_io(&e, &path))?;

        info!(path = %path.display(), "Top scores refreshed");
        Ok(snapshot)
    }

    /// Appends one tab-separated line per failed load:
    /// `timestamp\tpath\tkind\tmessage`. Best effort — logging must never
    /// abort the load that triggered it.
    fn log_load_error(&self, err: &StoreError) {
        warn!(
            kind = %err.kind,
            path = %err.path.display(),
            message = %err.message,
            "Skipping unreadable save file"
        );
        let line = format!(
            "{}\t{}\t{}\t{}\n",
            Utc::now().format("%Y-%m-%d %H:%M:%S%.3f"),
            err.path.display(),
            err.kind,
            err.message
        );
        if let Err(io_err) = append_line(&self.error_log_path(), &line) {
            warn!(error = %io_err, "Could not append to error log");
        }
    }
}

fn append_line(path: &Path, line: &str) -> std::io::Result<()> {
    fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)?
        .write_all(line.as_bytes())
}

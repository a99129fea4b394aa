//! Loading and saving the score vector, the practice log, and the
//! placement flag. Stored data written by older versions (or damaged by
//! hand) never fails a load; it falls back to defaults with a warning.

use anyhow::{Context, Result};
use rusqlite::Connection;

use crate::db;
use crate::feedback::{LogEntry, PracticeLog};
use crate::skill::SkillScores;

pub const SCORES_KEY: &str = "bandSkillScores";
pub const LOG_KEY: &str = "bandPracticeLog";
pub const PLACEMENT_KEY: &str = "hasCompletedPlacementTest";

pub trait Store {
    fn load(&self, key: &str) -> Result<Option<String>>;

    fn save(&mut self, key: &str, value: &str) -> Result<()>;

    /// Write several keys so that readers see all of them or none.
    fn save_all(&mut self, pairs: &[(&str, &str)]) -> Result<()>;
}

pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Wrap a connection, creating the schema if needed.
    pub fn new(conn: Connection) -> Result<Self> {
        db::init(&conn)?;
        Ok(Self { conn })
    }
}

impl Store for SqliteStore {
    fn load(&self, key: &str) -> Result<Option<String>> {
        db::get(&self.conn, key)
    }

    fn save(&mut self, key: &str, value: &str) -> Result<()> {
        db::put(&self.conn, key, value)
    }

    fn save_all(&mut self, pairs: &[(&str, &str)]) -> Result<()> {
        let tx = self.conn.transaction().context("failed to begin transaction")?;
        for (key, value) in pairs {
            db::put(&tx, key, value)?;
        }
        tx.commit().context("failed to commit transaction")?;
        Ok(())
    }
}

pub fn load_scores(store: &dyn Store) -> Result<SkillScores> {
    let Some(raw) = store.load(SCORES_KEY)? else {
        return Ok(SkillScores::new());
    };
    match serde_json::from_str::<serde_json::Value>(&raw) {
        Ok(serde_json::Value::Object(map)) => Ok(SkillScores::from_json_map(&map)),
        Ok(_) => {
            log::warn!("stored skill scores are not an object; starting from zero");
            Ok(SkillScores::new())
        }
        Err(e) => {
            log::warn!("stored skill scores are malformed ({e}); starting from zero");
            Ok(SkillScores::new())
        }
    }
}

pub fn load_log(store: &dyn Store) -> Result<PracticeLog> {
    let Some(raw) = store.load(LOG_KEY)? else {
        return Ok(PracticeLog::new());
    };
    let items = match serde_json::from_str::<serde_json::Value>(&raw) {
        Ok(serde_json::Value::Array(items)) => items,
        Ok(_) => {
            log::warn!("stored practice log is not an array; starting empty");
            return Ok(PracticeLog::new());
        }
        Err(e) => {
            log::warn!("stored practice log is malformed ({e}); starting empty");
            return Ok(PracticeLog::new());
        }
    };
    let total = items.len();
    let entries: Vec<LogEntry> = items
        .into_iter()
        .filter_map(|item| serde_json::from_value(item).ok())
        .collect();
    if entries.len() < total {
        log::warn!("skipped {} malformed practice log entries", total - entries.len());
    }
    Ok(PracticeLog::from_entries(entries))
}

/// Whether the user has finished or skipped placement.
///
/// Users with scores but no flag predate the placement test; they count as
/// placed and the flag is written for them.
pub fn load_placement_completed(store: &mut dyn Store, scores: &SkillScores) -> Result<bool> {
    if store.load(PLACEMENT_KEY)?.as_deref() == Some("true") {
        return Ok(true);
    }
    if scores.has_progress() {
        log::info!("existing scores found; marking placement as completed");
        mark_placement_completed(store)?;
        return Ok(true);
    }
    Ok(false)
}

pub fn mark_placement_completed(store: &mut dyn Store) -> Result<()> {
    store.save(PLACEMENT_KEY, "true")
}

pub fn save_scores(store: &mut dyn Store, scores: &SkillScores) -> Result<()> {
    let json = serde_json::to_string(scores)?;
    store.save(SCORES_KEY, &json)
}

/// Persist placement scores and the completion flag together.
pub fn save_placement(store: &mut dyn Store, scores: &SkillScores) -> Result<()> {
    let json = serde_json::to_string(scores)?;
    store.save_all(&[(SCORES_KEY, json.as_str()), (PLACEMENT_KEY, "true")])
}

/// Persist scores and log together.
pub fn save_progress(store: &mut dyn Store, scores: &SkillScores, log: &PracticeLog) -> Result<()> {
    let scores_json = serde_json::to_string(scores)?;
    let log_json = serde_json::to_string(log)?;
    store.save_all(&[(SCORES_KEY, scores_json.as_str()), (LOG_KEY, log_json.as_str())])
}

/// Everything the application needs at startup.
pub struct Loaded {
    pub scores: SkillScores,
    pub log: PracticeLog,
    pub placement_completed: bool,
}

pub fn load_all(store: &mut dyn Store) -> Result<Loaded> {
    let scores = load_scores(store)?;
    let log = load_log(store)?;
    let placement_completed = load_placement_completed(store, &scores)?;
    Ok(Loaded {
        scores,
        log,
        placement_completed,
    })
}

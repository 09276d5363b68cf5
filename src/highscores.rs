//! High score leaderboard
//!
//! One row per player holding their best score, persisted to SQLite.
//! Every call goes to the database; nothing is cached.

use std::path::Path;

use serde::{Deserialize, Serialize};
use sqlx::sqlite::SqlitePool;

use crate::error::{ScoreError, ScoreResult};
use crate::persistence::Database;
use crate::sim::ScoreSink;

/// A single leaderboard row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreEntry {
    /// Assigned on first insert, never reused
    pub id: i64,
    pub name: String,
    pub score: u32,
}

/// What `submit` did with a score
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// First score for this name
    Inserted { id: i64 },
    /// Beat the stored best
    Improved { id: i64, previous: u32 },
    /// Stored best was higher or equal; nothing written
    Kept { id: i64, best: u32 },
}

impl SubmitOutcome {
    pub fn id(&self) -> i64 {
        match *self {
            SubmitOutcome::Inserted { id }
            | SubmitOutcome::Improved { id, .. }
            | SubmitOutcome::Kept { id, .. } => id,
        }
    }

    /// Whether the submitted score is now the player's best
    pub fn is_new_best(&self) -> bool {
        !matches!(self, SubmitOutcome::Kept { .. })
    }
}

/// Ranked list for display, or the fact that it could not be read
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scoreboard {
    Available(Vec<ScoreEntry>),
    Unavailable,
}

impl Scoreboard {
    pub fn is_available(&self) -> bool {
        matches!(self, Scoreboard::Available(_))
    }

    pub fn entries(&self) -> &[ScoreEntry] {
        match self {
            Scoreboard::Available(entries) => entries,
            Scoreboard::Unavailable => &[],
        }
    }

    /// 1-indexed position of a player's row (for highlighting)
    pub fn rank_of(&self, name: &str) -> Option<usize> {
        self.entries()
            .iter()
            .position(|e| e.name == name)
            .map(|i| i + 1)
    }

    /// Get the top score (if any)
    pub fn top_score(&self) -> Option<u32> {
        self.entries().first().map(|e| e.score)
    }
}

/// Best-score-per-player table
pub struct ScoreStore {
    db: Database,
}

impl ScoreStore {
    /// Open the leaderboard file, creating it on first use
    pub fn open(path: impl AsRef<Path>) -> ScoreResult<Self> {
        Ok(Self {
            db: Database::open(path.as_ref())?,
        })
    }

    /// Throwaway leaderboard (tests, guest play)
    pub fn open_in_memory() -> ScoreResult<Self> {
        Ok(Self {
            db: Database::open_in_memory()?,
        })
    }

    pub fn location(&self) -> &str {
        self.db.location()
    }

    /// Record a score, keeping only the player's best
    pub fn submit(&self, name: &str, score: u32) -> ScoreResult<SubmitOutcome> {
        validate_name(name)?;

        let outcome = self
            .db
            .block_on(upsert_max(self.db.pool(), name, score))
            .inspect_err(|e| log::error!("Score submit for {} failed: {}", name, e))?;

        match outcome {
            SubmitOutcome::Inserted { id } => {
                log::info!("{}: {} inserted (id {})", name, score, id)
            }
            SubmitOutcome::Improved { previous, .. } => {
                log::info!("Updated score for {} from {} to {}", name, previous, score)
            }
            SubmitOutcome::Kept { best, .. } => {
                log::debug!("{} already has {} >= {}", name, best, score)
            }
        }
        Ok(outcome)
    }

    /// All entries, best first; ties keep insertion order
    pub fn list(&self) -> ScoreResult<Vec<ScoreEntry>> {
        let rows: Vec<(i64, String, i64)> = self.db.block_on(
            sqlx::query_as("SELECT id, name, score FROM Scoreboard ORDER BY score DESC, id ASC")
                .fetch_all(self.db.pool()),
        )?;

        rows.into_iter().map(row_to_entry).collect()
    }

    /// The stored best for one player
    pub fn best_for(&self, name: &str) -> ScoreResult<Option<ScoreEntry>> {
        let row: Option<(i64, String, i64)> = self.db.block_on(
            sqlx::query_as("SELECT id, name, score FROM Scoreboard WHERE name = ? ORDER BY id LIMIT 1")
                .bind(name)
                .fetch_optional(self.db.pool()),
        )?;

        row.map(row_to_entry).transpose()
    }

    /// Ranked list for display. Read failures are logged and reported as
    /// `Unavailable` instead of a partial list.
    pub fn scoreboard(&self) -> Scoreboard {
        match self.list() {
            Ok(entries) => Scoreboard::Available(entries),
            Err(e) => {
                log::warn!("Scoreboard unavailable: {}", e);
                Scoreboard::Unavailable
            }
        }
    }
}

/// Round-end hook: storage trouble is logged, never raised into the round
impl ScoreSink for &ScoreStore {
    fn submit_score(&mut self, name: &str, score: u32) {
        if let Err(e) = self.submit(name, score) {
            log::warn!("Score for {} not saved: {}", name, e);
        }
    }
}

/// Any non-empty name is a player; names are stored verbatim
fn validate_name(name: &str) -> ScoreResult<()> {
    if name.is_empty() {
        return Err(ScoreError::Validation("player name is empty".into()));
    }
    Ok(())
}

fn row_to_entry((id, name, score): (i64, String, i64)) -> ScoreResult<ScoreEntry> {
    let score = u32::try_from(score)
        .map_err(|_| ScoreError::Corrupt(format!("score {} for id {}", score, id)))?;
    Ok(ScoreEntry { id, name, score })
}

/// Lookup, then insert / raise / keep, inside one transaction.
/// Dropping the transaction on an error path rolls it back.
async fn upsert_max(pool: &SqlitePool, name: &str, score: u32) -> Result<SubmitOutcome, sqlx::Error> {
    let mut tx = pool.begin().await?;

    let existing: Option<(i64, i64)> =
        sqlx::query_as("SELECT id, score FROM Scoreboard WHERE name = ? ORDER BY id LIMIT 1")
            .bind(name)
            .fetch_optional(&mut *tx)
            .await?;

    let outcome = match existing {
        None => {
            let result = sqlx::query("INSERT INTO Scoreboard (name, score) VALUES (?, ?)")
                .bind(name)
                .bind(i64::from(score))
                .execute(&mut *tx)
                .await?;
            SubmitOutcome::Inserted {
                id: result.last_insert_rowid(),
            }
        }
        Some((id, previous)) if previous < i64::from(score) => {
            sqlx::query("UPDATE Scoreboard SET score = ? WHERE id = ?")
                .bind(i64::from(score))
                .bind(id)
                .execute(&mut *tx)
                .await?;
            SubmitOutcome::Improved {
                id,
                previous: previous.clamp(0, i64::from(u32::MAX)) as u32,
            }
        }
        Some((id, best)) => SubmitOutcome::Kept {
            id,
            best: best.clamp(0, i64::from(u32::MAX)) as u32,
        },
    };

    tx.commit().await?;
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{GamePhase, GameSession, SessionConfig};
    use proptest::prelude::*;

    fn store() -> ScoreStore {
        ScoreStore::open_in_memory().unwrap()
    }

    fn names_and_scores(store: &ScoreStore) -> Vec<(String, u32)> {
        store
            .list()
            .unwrap()
            .into_iter()
            .map(|e| (e.name, e.score))
            .collect()
    }

    #[test]
    fn test_lower_score_keeps_best() {
        let store = store();
        let first = store.submit("Alice", 50).unwrap();
        assert!(matches!(first, SubmitOutcome::Inserted { .. }));

        let second = store.submit("Alice", 30).unwrap();
        assert_eq!(
            second,
            SubmitOutcome::Kept {
                id: first.id(),
                best: 50
            }
        );
        assert_eq!(names_and_scores(&store), vec![("Alice".to_string(), 50)]);
    }

    #[test]
    fn test_higher_score_updates_in_place() {
        let store = store();
        let first = store.submit("Alice", 30).unwrap();
        let second = store.submit("Alice", 75).unwrap();

        assert_eq!(
            second,
            SubmitOutcome::Improved {
                id: first.id(),
                previous: 30
            }
        );
        let entries = store.list().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].id, first.id());
        assert_eq!(entries[0].score, 75);
    }

    #[test]
    fn test_equal_score_is_noop() {
        let store = store();
        store.submit("Alice", 40).unwrap();
        let before = store.list().unwrap();

        let outcome = store.submit("Alice", 40).unwrap();
        assert!(!outcome.is_new_best());
        assert_eq!(store.list().unwrap(), before);
    }

    #[test]
    fn test_empty_name_rejected() {
        let store = store();
        store.submit("Bob", 5).unwrap();

        let err = store.submit("", 10).unwrap_err();
        assert!(matches!(err, ScoreError::Validation(_)));
        assert!(!err.is_storage());
        assert_eq!(names_and_scores(&store), vec![("Bob".to_string(), 5)]);
    }

    #[test]
    fn test_any_non_empty_name_accepted() {
        let store = store();
        let long_name = "Maximilian Alexander von Habsburg";
        assert!(long_name.chars().count() > 32);

        store.submit(long_name, 10).unwrap();
        store.submit("   ", 4).unwrap();
        store.submit(&"x".repeat(500), 1).unwrap();

        let entries = store.list().unwrap();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].name, long_name);
        assert_eq!(entries[1].name, "   ");
    }

    #[test]
    fn test_long_name_round_is_saved() {
        let store = store();
        let long_name = "Maximilian Alexander von Habsburg";
        let config = SessionConfig {
            round_seconds: 1,
            ..Default::default()
        };
        let mut session = GameSession::new(long_name, config, &store);
        session.start();
        session.on_tap();
        session.advance(1000);

        assert_eq!(names_and_scores(&store), vec![(long_name.to_string(), 1)]);
    }

    #[test]
    fn test_broken_medium_is_contained() {
        let store = store();
        store.submit("Alice", 50).unwrap();
        assert!(store.location().contains("memory"));

        store
            .db
            .block_on(sqlx::query("DROP TABLE Scoreboard").execute(store.db.pool()))
            .unwrap();

        let err = store.submit("Bob", 1).unwrap_err();
        assert!(err.is_storage());
        assert!(matches!(err, ScoreError::StorageQuery(_)));
        assert!(store.list().is_err());

        // A round ending on a broken medium still finishes
        let config = SessionConfig {
            round_seconds: 1,
            ..Default::default()
        };
        let mut session = GameSession::new("Bob", config, &store);
        session.start();
        session.on_tap();
        session.advance(1000);
        assert_eq!(session.phase(), GamePhase::Ended);
        assert_eq!(session.score(), 1);

        let board = store.scoreboard();
        assert_eq!(board, Scoreboard::Unavailable);
        assert_eq!(board.rank_of("Alice"), None);
    }

    #[test]
    fn test_ranking_ties_keep_insert_order() {
        let store = store();
        store.submit("Alice", 50).unwrap();
        store.submit("Bob", 80).unwrap();
        store.submit("Carol", 80).unwrap();

        assert_eq!(
            names_and_scores(&store),
            vec![
                ("Bob".to_string(), 80),
                ("Carol".to_string(), 80),
                ("Alice".to_string(), 50),
            ]
        );
    }

    #[test]
    fn test_names_are_exact_match() {
        let store = store();
        store.submit("alice", 10).unwrap();
        store.submit("Alice", 20).unwrap();
        store.submit("Alice ", 30).unwrap();
        assert_eq!(store.list().unwrap().len(), 3);
    }

    #[test]
    fn test_ids_not_reused() {
        let store = store();
        let a = store.submit("A", 1).unwrap().id();
        let b = store.submit("B", 1).unwrap().id();
        let a_again = store.submit("A", 9).unwrap().id();

        assert_ne!(a, b);
        assert_eq!(a, a_again);
    }

    #[test]
    fn test_best_for() {
        let store = store();
        assert_eq!(store.best_for("Alice").unwrap(), None);
        store.submit("Alice", 12).unwrap();
        store.submit("Alice", 7).unwrap();

        let best = store.best_for("Alice").unwrap().unwrap();
        assert_eq!(best.score, 12);
    }

    #[test]
    fn test_scoreboard_rank() {
        let store = store();
        store.submit("Alice", 50).unwrap();
        store.submit("Bob", 80).unwrap();

        let board = store.scoreboard();
        assert!(board.is_available());
        assert_eq!(board.rank_of("Alice"), Some(2));
        assert_eq!(board.rank_of("Zed"), None);
        assert_eq!(board.top_score(), Some(80));

        assert!(Scoreboard::Unavailable.entries().is_empty());
        assert_eq!(Scoreboard::Unavailable.top_score(), None);
    }

    #[test]
    fn test_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scores.sqlite");

        {
            let store = ScoreStore::open(&path).unwrap();
            store.submit("Alice", 50).unwrap();
        }
        let store = ScoreStore::open(&path).unwrap();
        store.submit("Alice", 30).unwrap();
        assert_eq!(names_and_scores(&store), vec![("Alice".to_string(), 50)]);
    }

    #[test]
    fn test_sink_swallows_validation() {
        let store = store();
        let mut sink = &store;
        sink.submit_score("", 3);
        sink.submit_score("Dee", 3);
        assert_eq!(names_and_scores(&store), vec![("Dee".to_string(), 3)]);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn prop_stored_score_is_max(s1 in 0u32..10_000, s2 in 0u32..10_000) {
            let store = store();
            store.submit("Alice", s1).unwrap();
            store.submit("Alice", s2).unwrap();

            let best = store.best_for("Alice").unwrap().unwrap();
            prop_assert_eq!(best.score, s1.max(s2));
            prop_assert_eq!(store.list().unwrap().len(), 1);
        }
    }
}

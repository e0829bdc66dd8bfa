//! SQLite-backed [`QueueStore`] implementation.
//!
//! All conflict serialization the coordinator relies on lives here: the
//! `UNIQUE(queue_id, voter_id)` constraint arbitrates racing votes, the
//! single-row `radio_now_playing` slot is enforced at the schema level,
//! and the vote counter is bumped with an atomic `votes = votes + 1`
//! update rather than read-modify-write.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use classradio_core::store::{QueueStore, StoreError, StoreEvent, StoreResult};
use classradio_core::track::{NowPlaying, QueuedTrack, VoterId};
use rusqlite::OptionalExtension;
use std::path::Path;
use tokio::sync::broadcast;
use tokio_rusqlite::Connection;
use tracing::{debug, info};

const SCHEMA_SQL: &str = r"
-- Queued tracks; votes is a display cache, the ledger below is the truth
CREATE TABLE IF NOT EXISTS radio_queue (
    id TEXT PRIMARY KEY,
    title TEXT NOT NULL,
    artist TEXT NOT NULL,
    spotify_url TEXT NOT NULL,
    votes INTEGER NOT NULL DEFAULT 0,
    submitted_by TEXT NOT NULL,
    created_at INTEGER NOT NULL
);

-- Vote ledger: one row per (track, voter), never updated or deleted
CREATE TABLE IF NOT EXISTS radio_votes (
    queue_id TEXT NOT NULL REFERENCES radio_queue(id),
    voter_id TEXT NOT NULL,
    created_at INTEGER NOT NULL,
    UNIQUE(queue_id, voter_id)
);

-- Now-playing slot; the slot = 0 check caps the table at one row
CREATE TABLE IF NOT EXISTS radio_now_playing (
    slot INTEGER PRIMARY KEY CHECK (slot = 0),
    spotify_url TEXT NOT NULL,
    title TEXT NOT NULL,
    artist TEXT NOT NULL,
    started_at INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_radio_queue_priority ON radio_queue(votes DESC, created_at ASC);
CREATE INDEX IF NOT EXISTS idx_radio_votes_voter ON radio_votes(voter_id);
";

/// SQLite-based queue store
pub struct SqliteQueueStore {
    conn: Connection,
    events: broadcast::Sender<StoreEvent>,
}

impl SqliteQueueStore {
    /// Open (or create) a store at a specific path
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or initialized.
    pub async fn open(path: &Path, channel_capacity: usize) -> StoreResult<Self> {
        info!("Opening queue database at {:?}", path);

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| StoreError::Unavailable {
                reason: e.to_string(),
            })?;
        }

        let conn = Connection::open(path.to_path_buf())
            .await
            .map_err(map_store_err)?;

        conn.call(|conn| {
            conn.execute_batch(SCHEMA_SQL)?;
            conn.pragma_update(None, "journal_mode", "WAL")?;
            conn.pragma_update(None, "foreign_keys", "ON")?;
            Ok(())
        })
        .await
        .map_err(map_store_err)?;

        info!("Queue database initialized");
        let (events, _) = broadcast::channel(channel_capacity);
        Ok(Self { conn, events })
    }

    /// Open a transient in-memory store (used by tests and demos)
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be initialized.
    pub async fn open_in_memory(channel_capacity: usize) -> StoreResult<Self> {
        let conn = Connection::open_in_memory().await.map_err(map_store_err)?;

        conn.call(|conn| {
            conn.execute_batch(SCHEMA_SQL)?;
            conn.pragma_update(None, "foreign_keys", "ON")?;
            Ok(())
        })
        .await
        .map_err(map_store_err)?;

        let (events, _) = broadcast::channel(channel_capacity);
        Ok(Self { conn, events })
    }

    /// Checkpoint WAL for clean shutdown
    ///
    /// # Errors
    ///
    /// Returns an error if the WAL checkpoint fails.
    pub async fn checkpoint(&self) -> StoreResult<()> {
        self.conn
            .call(|conn| {
                conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE)")?;
                Ok(())
            })
            .await
            .map_err(map_store_err)
    }

    fn emit(&self, event: StoreEvent) {
        // No subscribers is fine; views come and go
        let _ = self.events.send(event);
    }
}

#[async_trait]
impl QueueStore for SqliteQueueStore {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    async fn insert_track(&self, track: QueuedTrack) -> StoreResult<QueuedTrack> {
        let row = track.clone();
        self.conn
            .call(move |conn| {
                conn.execute(
                    r"
                    INSERT INTO radio_queue (id, title, artist, spotify_url, votes, submitted_by, created_at)
                    VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                ",
                    rusqlite::params![
                        row.id,
                        row.title,
                        row.artist,
                        row.spotify_url,
                        i64::from(row.votes),
                        row.submitted_by,
                        row.created_at.timestamp_millis(),
                    ],
                )?;
                Ok(())
            })
            .await
            .map_err(map_store_err)?;

        debug!("Inserted track {} into queue", track.id);
        self.emit(StoreEvent::TrackSubmitted {
            track: track.clone(),
        });
        Ok(track)
    }

    async fn get_track(&self, queue_id: &str) -> StoreResult<Option<QueuedTrack>> {
        let id = queue_id.to_string();
        self.conn
            .call(move |conn| {
                let mut stmt = conn.prepare_cached(
                    r"
                    SELECT id, title, artist, spotify_url, votes, submitted_by, created_at
                    FROM radio_queue
                    WHERE id = ?1
                ",
                )?;
                let result = stmt
                    .query_row(rusqlite::params![id], track_from_row)
                    .optional()?;
                Ok(result)
            })
            .await
            .map_err(map_store_err)
    }

    async fn list_tracks(&self) -> StoreResult<Vec<QueuedTrack>> {
        self.conn
            .call(|conn| {
                let mut stmt = conn.prepare_cached(
                    r"
                    SELECT id, title, artist, spotify_url, votes, submitted_by, created_at
                    FROM radio_queue
                    ORDER BY votes DESC, created_at ASC
                ",
                )?;
                let tracks = stmt
                    .query_map([], track_from_row)?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(tracks)
            })
            .await
            .map_err(map_store_err)
    }

    async fn insert_vote(&self, queue_id: &str, voter_id: &VoterId) -> StoreResult<()> {
        let queue_id = queue_id.to_string();
        let voter_id = voter_id.as_str().to_string();
        let now = Utc::now().timestamp_millis();

        self.conn
            .call(move |conn| {
                conn.execute(
                    r"
                    INSERT INTO radio_votes (queue_id, voter_id, created_at)
                    VALUES (?1, ?2, ?3)
                ",
                    rusqlite::params![queue_id, voter_id, now],
                )?;
                Ok(())
            })
            .await
            .map_err(map_store_err)
    }

    async fn increment_votes(&self, queue_id: &str) -> StoreResult<u32> {
        let id = queue_id.to_string();
        let votes = self
            .conn
            .call(move |conn| {
                let changed = conn.execute(
                    "UPDATE radio_queue SET votes = votes + 1 WHERE id = ?1",
                    rusqlite::params![id],
                )?;
                if changed == 0 {
                    return Ok(None);
                }
                let votes: i64 = conn.query_row(
                    "SELECT votes FROM radio_queue WHERE id = ?1",
                    rusqlite::params![id],
                    |row| row.get(0),
                )?;
                Ok(Some(votes))
            })
            .await
            .map_err(map_store_err)?
            .ok_or(StoreError::RowNotFound)?;

        let votes = u32::try_from(votes).unwrap_or_default();
        self.emit(StoreEvent::VoteRecorded {
            queue_id: queue_id.to_string(),
            votes,
        });
        Ok(votes)
    }

    async fn count_votes(&self, queue_id: &str) -> StoreResult<u32> {
        let id = queue_id.to_string();
        let count: i64 = self
            .conn
            .call(move |conn| {
                let count = conn.query_row(
                    "SELECT COUNT(*) FROM radio_votes WHERE queue_id = ?1",
                    rusqlite::params![id],
                    |row| row.get(0),
                )?;
                Ok(count)
            })
            .await
            .map_err(map_store_err)?;
        Ok(u32::try_from(count).unwrap_or_default())
    }

    async fn now_playing(&self) -> StoreResult<Option<NowPlaying>> {
        self.conn
            .call(|conn| {
                let mut stmt = conn.prepare_cached(
                    r"
                    SELECT spotify_url, title, artist, started_at
                    FROM radio_now_playing
                    WHERE slot = 0
                ",
                )?;
                let result = stmt
                    .query_row([], |row| {
                        Ok(NowPlaying {
                            spotify_url: row.get(0)?,
                            title: row.get(1)?,
                            artist: row.get(2)?,
                            started_at: millis_to_datetime(row.get(3)?),
                        })
                    })
                    .optional()?;
                Ok(result)
            })
            .await
            .map_err(map_store_err)
    }

    async fn set_now_playing(&self, entry: NowPlaying) -> StoreResult<()> {
        let row = entry.clone();
        self.conn
            .call(move |conn| {
                // Upsert keeps the slot at one row even if a racing writer
                // slipped in between a caller's clear and this write
                conn.execute(
                    r"
                    INSERT INTO radio_now_playing (slot, spotify_url, title, artist, started_at)
                    VALUES (0, ?1, ?2, ?3, ?4)
                    ON CONFLICT(slot) DO UPDATE SET
                        spotify_url = excluded.spotify_url,
                        title = excluded.title,
                        artist = excluded.artist,
                        started_at = excluded.started_at
                ",
                    rusqlite::params![
                        row.spotify_url,
                        row.title,
                        row.artist,
                        row.started_at.timestamp_millis(),
                    ],
                )?;
                Ok(())
            })
            .await
            .map_err(map_store_err)?;

        self.emit(StoreEvent::NowPlayingChanged { entry });
        Ok(())
    }

    async fn clear_now_playing(&self) -> StoreResult<bool> {
        let cleared = self
            .conn
            .call(|conn| {
                let changed = conn.execute("DELETE FROM radio_now_playing", [])?;
                Ok(changed > 0)
            })
            .await
            .map_err(map_store_err)?;

        if cleared {
            self.emit(StoreEvent::NowPlayingCleared);
        }
        Ok(cleared)
    }

    fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.events.subscribe()
    }
}

fn track_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<QueuedTrack> {
    Ok(QueuedTrack {
        id: row.get(0)?,
        title: row.get(1)?,
        artist: row.get(2)?,
        spotify_url: row.get(3)?,
        votes: u32::try_from(row.get::<_, i64>(4)?).unwrap_or_default(),
        submitted_by: row.get(5)?,
        created_at: millis_to_datetime(row.get(6)?),
    })
}

fn millis_to_datetime(millis: i64) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(millis).unwrap_or_else(Utc::now)
}

/// Translate backend failures into the store error taxonomy.
///
/// A unique-constraint rejection is the expected signal for a duplicate
/// vote; a foreign-key rejection means the referenced track is gone.
fn map_store_err(err: tokio_rusqlite::Error) -> StoreError {
    match err {
        tokio_rusqlite::Error::Rusqlite(rusqlite::Error::SqliteFailure(code, message)) => {
            match code.extended_code {
                rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
                | rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY => StoreError::UniqueViolation {
                    constraint: message.unwrap_or_else(|| "unique constraint".to_string()),
                },
                rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY => StoreError::RowNotFound,
                _ => StoreError::Unavailable {
                    reason: message.unwrap_or_else(|| code.to_string()),
                },
            }
        }
        other => StoreError::Unavailable {
            reason: other.to_string(),
        },
    }
}

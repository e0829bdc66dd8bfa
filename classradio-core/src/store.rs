use crate::track::{NowPlaying, QueuedTrack, VoterId};
use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::broadcast;

/// Errors surfaced by a queue store backend.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A uniqueness constraint rejected the write (e.g. a duplicate vote).
    #[error("unique constraint violated: {constraint}")]
    UniqueViolation { constraint: String },

    /// The referenced row does not exist.
    #[error("row not found")]
    RowNotFound,

    /// The backend could not be reached or failed the request.
    #[error("store unavailable: {reason}")]
    Unavailable { reason: String },
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Change notification pushed to subscribers after every successful
/// mutation, so views can refresh without polling.
#[derive(Debug, Clone)]
pub enum StoreEvent {
    /// A new track entered the queue
    TrackSubmitted { track: QueuedTrack },
    /// A vote was recorded; `votes` is the updated display count
    VoteRecorded { queue_id: String, votes: u32 },
    /// The now-playing slot was replaced
    NowPlayingChanged { entry: NowPlaying },
    /// The now-playing slot was emptied
    NowPlayingCleared,
}

/// Storage seam consumed by the [`crate::QueueCoordinator`].
///
/// Implementations must provide three things beyond plain CRUD:
///
/// - uniqueness enforcement on `(queue_id, voter_id)` vote rows, reported
///   as [`StoreError::UniqueViolation`] — this is the only concurrency
///   control in the subsystem;
/// - an atomic vote-counter increment (`votes = votes + 1`), so racing
///   votes never lose a tally to read-modify-write;
/// - a broadcast channel of [`StoreEvent`]s fired on each mutation.
///
/// Any backend with a unique-constraint primitive and a change
/// notification mechanism can satisfy this contract.
#[async_trait]
pub trait QueueStore: Send + Sync {
    /// Backend name for logging
    fn name(&self) -> &'static str;

    /// Persist a new queue entry exactly as given.
    async fn insert_track(&self, track: QueuedTrack) -> StoreResult<QueuedTrack>;

    /// Look up a single queue entry.
    async fn get_track(&self, queue_id: &str) -> StoreResult<Option<QueuedTrack>>;

    /// All queue entries, votes descending with earlier `created_at`
    /// winning ties (see [`crate::track::queue_ordering`]).
    async fn list_tracks(&self) -> StoreResult<Vec<QueuedTrack>>;

    /// Record a vote. Fails with [`StoreError::UniqueViolation`] if this
    /// voter already voted for this track, and [`StoreError::RowNotFound`]
    /// if the track does not exist.
    async fn insert_vote(&self, queue_id: &str, voter_id: &VoterId) -> StoreResult<()>;

    /// Atomically bump the display counter, returning the new count.
    async fn increment_votes(&self, queue_id: &str) -> StoreResult<u32>;

    /// Ledger size for a track — the source of truth for vote totals.
    async fn count_votes(&self, queue_id: &str) -> StoreResult<u32>;

    /// Read the now-playing slot (0 or 1 entries).
    async fn now_playing(&self) -> StoreResult<Option<NowPlaying>>;

    /// Write the now-playing slot. Callers clear first; the slot must
    /// never hold more than one entry.
    async fn set_now_playing(&self, entry: NowPlaying) -> StoreResult<()>;

    /// Empty the now-playing slot. Returns whether an entry was removed;
    /// clearing an empty slot is not an error.
    async fn clear_now_playing(&self) -> StoreResult<bool>;

    /// Subscribe to change notifications.
    fn subscribe(&self) -> broadcast::Receiver<StoreEvent>;
}

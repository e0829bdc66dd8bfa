//! The queue coordinator: submission, vote dedup and tally, ordering,
//! and the now-playing transition.

use crate::error::{CoreError, Result};
use crate::store::{QueueStore, StoreError, StoreEvent};
use crate::track::{NowPlaying, QueuedTrack, TrackSubmission, VoterId};
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, info};

/// Rules governing the shared radio queue.
///
/// The coordinator holds no cross-request state and takes no locks; all
/// serialization of conflicting writes is delegated to the store's
/// constraint engine. Every operation is scoped to a single request, never
/// retried, and never fatal to the process.
pub struct QueueCoordinator {
    store: Arc<dyn QueueStore>,
}

impl QueueCoordinator {
    pub fn new(store: Arc<dyn QueueStore>) -> Self {
        Self { store }
    }

    /// Queue a new track with zero votes.
    ///
    /// Resubmitting the same song creates a distinct candidate entry; no
    /// duplicate detection is attempted.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidSubmission`] if a required field is
    /// blank; store failures propagate unchanged.
    pub async fn submit_track(&self, submission: TrackSubmission) -> Result<QueuedTrack> {
        submission.validate()?;
        let track = submission.into_track();
        info!(
            "Queueing track: {} - {} (submitted by {})",
            track.artist, track.title, track.submitted_by
        );
        Ok(self.store.insert_track(track).await?)
    }

    /// Record a vote for `queue_id` from `voter`, returning the updated
    /// display count.
    ///
    /// The ledger insert is the dedup checkpoint and happens before any
    /// tally mutation, so two racing voters cannot both pass a pre-check
    /// and double-increment. The counter bump that follows is atomic in
    /// the store but deliberately not transactional with the insert: a
    /// failure in between leaves the display count stale, which is
    /// tolerated because the ledger is the source of truth for "has this
    /// voter voted".
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::AlreadyVoted`] for a duplicate vote (expected,
    /// user-facing) and [`CoreError::TrackNotFound`] for an unknown track.
    pub async fn vote(&self, queue_id: &str, voter: &VoterId) -> Result<u32> {
        match self.store.insert_vote(queue_id, voter).await {
            Ok(()) => {}
            Err(StoreError::UniqueViolation { .. }) => {
                debug!("Duplicate vote for track {queue_id} from {voter}");
                return Err(CoreError::AlreadyVoted);
            }
            Err(StoreError::RowNotFound) => {
                return Err(CoreError::TrackNotFound {
                    queue_id: queue_id.to_string(),
                });
            }
            Err(e) => return Err(e.into()),
        }

        let votes = self.store.increment_votes(queue_id).await?;
        debug!("Track {queue_id} now at {votes} vote(s)");
        Ok(votes)
    }

    /// Queue snapshot: votes descending, earlier submission wins ties.
    ///
    /// # Errors
    ///
    /// Store failures propagate unchanged.
    pub async fn list_queue(&self) -> Result<Vec<QueuedTrack>> {
        Ok(self.store.list_tracks().await?)
    }

    /// Promote a queued track to the now-playing slot.
    ///
    /// Clear-then-write keeps the slot at no more than one entry; racing
    /// plays resolve last-writer-wins. The track itself stays in the queue
    /// as a candidate for replay.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::TrackNotFound`] if `queue_id` does not exist.
    pub async fn play(&self, queue_id: &str) -> Result<NowPlaying> {
        let track = self
            .store
            .get_track(queue_id)
            .await?
            .ok_or_else(|| CoreError::TrackNotFound {
                queue_id: queue_id.to_string(),
            })?;

        self.store.clear_now_playing().await?;
        let entry = NowPlaying::from_track(&track);
        self.store.set_now_playing(entry.clone()).await?;
        info!("Now playing: {} - {}", entry.artist, entry.title);
        Ok(entry)
    }

    /// Stop the broadcast. Idempotent: stopping with nothing playing
    /// succeeds.
    ///
    /// # Errors
    ///
    /// Store failures propagate unchanged.
    pub async fn stop(&self) -> Result<()> {
        if self.store.clear_now_playing().await? {
            info!("Broadcast stopped");
        } else {
            debug!("Stop requested with nothing playing");
        }
        Ok(())
    }

    /// Read the now-playing slot.
    ///
    /// # Errors
    ///
    /// Store failures propagate unchanged.
    pub async fn now_playing(&self) -> Result<Option<NowPlaying>> {
        Ok(self.store.now_playing().await?)
    }

    /// Subscribe to store change notifications.
    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.store.subscribe()
    }
}

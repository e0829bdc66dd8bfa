use crate::error::{CoreError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use uuid::Uuid;

/// Label recorded when a submission carries no submitter name.
pub const ANONYMOUS_SUBMITTER: &str = "anonymous";

/// A track waiting in the radio queue.
///
/// Created once on submission; only `votes` mutates afterwards. A played
/// track stays in the queue as a candidate for replay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueuedTrack {
    pub id: String,
    pub title: String,
    pub artist: String,
    pub spotify_url: String,
    pub votes: u32,
    pub submitted_by: String,
    pub created_at: DateTime<Utc>,
}

/// Input for queueing a new track.
///
/// Title, artist, and Spotify URL are required; the submitter name is
/// optional and defaults to [`ANONYMOUS_SUBMITTER`]. The URL's *format* is
/// the caller's responsibility (see the [`crate::spotify`] helpers).
#[derive(Debug, Clone)]
pub struct TrackSubmission {
    pub title: String,
    pub artist: String,
    pub spotify_url: String,
    pub submitted_by: Option<String>,
}

impl TrackSubmission {
    /// Create a new submission
    pub fn new(
        title: impl Into<String>,
        artist: impl Into<String>,
        spotify_url: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            artist: artist.into(),
            spotify_url: spotify_url.into(),
            submitted_by: None,
        }
    }

    /// Set the submitter name
    #[must_use]
    pub fn with_submitter(mut self, name: impl Into<String>) -> Self {
        self.submitted_by = Some(name.into());
        self
    }

    /// Check that all required fields are present and non-blank
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidSubmission`] naming the first missing field.
    pub fn validate(&self) -> Result<()> {
        for (field, value) in [
            ("title", &self.title),
            ("artist", &self.artist),
            ("spotify_url", &self.spotify_url),
        ] {
            if value.trim().is_empty() {
                return Err(CoreError::InvalidSubmission {
                    reason: format!("{field} is required"),
                });
            }
        }
        Ok(())
    }

    /// Materialize the submission as a fresh queue entry with zero votes
    #[must_use]
    pub fn into_track(self) -> QueuedTrack {
        QueuedTrack {
            id: Uuid::new_v4().to_string(),
            title: self.title,
            artist: self.artist,
            spotify_url: self.spotify_url,
            votes: 0,
            submitted_by: self
                .submitted_by
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| ANONYMOUS_SUBMITTER.to_string()),
            created_at: Utc::now(),
        }
    }
}

/// The currently broadcast track. At most one exists at a time; it is
/// replaced wholesale by `play` and removed by `stop`, never patched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NowPlaying {
    pub spotify_url: String,
    pub title: String,
    pub artist: String,
    pub started_at: DateTime<Utc>,
}

impl NowPlaying {
    /// Build a now-playing entry from a queued track, stamped with the
    /// current time.
    #[must_use]
    pub fn from_track(track: &QueuedTrack) -> Self {
        Self {
            spotify_url: track.spotify_url.clone(),
            title: track.title.clone(),
            artist: track.artist.clone(),
            started_at: Utc::now(),
        }
    }
}

/// Opaque per-device voter identity used only for vote deduplication.
///
/// Not a security credential. The presentation layer generates one per
/// device and persists it; the coordinator treats it as an opaque input
/// passed explicitly on every vote call.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VoterId(String);

impl VoterId {
    /// Wrap an existing identifier
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a fresh random identity
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VoterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Queue priority: votes descending, then earlier submission wins ties.
///
/// This is the single ordering every queue view must agree on; there is no
/// separate rank column.
#[must_use]
pub fn queue_ordering(a: &QueuedTrack, b: &QueuedTrack) -> Ordering {
    b.votes
        .cmp(&a.votes)
        .then_with(|| a.created_at.cmp(&b.created_at))
}

/// Sort a queue snapshot in place by [`queue_ordering`].
pub fn sort_queue(tracks: &mut [QueuedTrack]) {
    tracks.sort_by(queue_ordering);
}

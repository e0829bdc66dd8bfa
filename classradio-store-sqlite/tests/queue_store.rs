//! Store-level contract tests against an in-memory database.

#![allow(clippy::unwrap_used)]

use chrono::{TimeZone, Utc};
use classradio_core::store::{QueueStore, StoreError, StoreEvent};
use classradio_core::track::{NowPlaying, QueuedTrack, VoterId};
use classradio_store_sqlite::SqliteQueueStore;
use uuid::Uuid;

async fn store() -> SqliteQueueStore {
    SqliteQueueStore::open_in_memory(16).await.unwrap()
}

fn track_at(title: &str, votes: u32, created_secs: i64) -> QueuedTrack {
    QueuedTrack {
        id: Uuid::new_v4().to_string(),
        title: title.to_string(),
        artist: "Artist".to_string(),
        spotify_url: "https://open.spotify.com/track/abc".to_string(),
        votes,
        submitted_by: "tester".to_string(),
        created_at: Utc.timestamp_opt(created_secs, 0).single().unwrap(),
    }
}

#[tokio::test]
async fn test_insert_and_get_round_trip() {
    let store = store().await;
    let track = track_at("Song", 0, 100);
    store.insert_track(track.clone()).await.unwrap();

    let fetched = store.get_track(&track.id).await.unwrap().unwrap();
    assert_eq!(fetched, track);
}

#[tokio::test]
async fn test_get_missing_track_is_none() {
    let store = store().await;
    assert!(store.get_track("missing").await.unwrap().is_none());
}

#[tokio::test]
async fn test_duplicate_vote_is_unique_violation() {
    let store = store().await;
    let track = track_at("Song", 0, 100);
    store.insert_track(track.clone()).await.unwrap();

    let voter = VoterId::new("device-1");
    store.insert_vote(&track.id, &voter).await.unwrap();
    let second = store.insert_vote(&track.id, &voter).await;
    assert!(matches!(second, Err(StoreError::UniqueViolation { .. })));

    // Exactly one ledger row survives
    assert_eq!(store.count_votes(&track.id).await.unwrap(), 1);
}

#[tokio::test]
async fn test_same_voter_may_vote_for_different_tracks() {
    let store = store().await;
    let a = track_at("A", 0, 100);
    let b = track_at("B", 0, 200);
    store.insert_track(a.clone()).await.unwrap();
    store.insert_track(b.clone()).await.unwrap();

    let voter = VoterId::new("device-1");
    store.insert_vote(&a.id, &voter).await.unwrap();
    store.insert_vote(&b.id, &voter).await.unwrap();
}

#[tokio::test]
async fn test_vote_for_missing_track_is_row_not_found() {
    let store = store().await;
    let result = store.insert_vote("missing", &VoterId::new("device-1")).await;
    assert!(matches!(result, Err(StoreError::RowNotFound)));
}

#[tokio::test]
async fn test_increment_votes_returns_new_count() {
    let store = store().await;
    let track = track_at("Song", 0, 100);
    store.insert_track(track.clone()).await.unwrap();

    assert_eq!(store.increment_votes(&track.id).await.unwrap(), 1);
    assert_eq!(store.increment_votes(&track.id).await.unwrap(), 2);

    let fetched = store.get_track(&track.id).await.unwrap().unwrap();
    assert_eq!(fetched.votes, 2);
}

#[tokio::test]
async fn test_increment_votes_missing_track_is_row_not_found() {
    let store = store().await;
    let result = store.increment_votes("missing").await;
    assert!(matches!(result, Err(StoreError::RowNotFound)));
}

#[tokio::test]
async fn test_list_orders_by_votes_then_created_at() {
    let store = store().await;
    // A(votes=3, t=1), B(votes=3, t=2), C(votes=5, t=3) -> [C, A, B]
    let a = track_at("A", 3, 1);
    let b = track_at("B", 3, 2);
    let c = track_at("C", 5, 3);
    for track in [&b, &c, &a] {
        store.insert_track(track.clone()).await.unwrap();
    }

    let queue = store.list_tracks().await.unwrap();
    let titles: Vec<_> = queue.iter().map(|t| t.title.as_str()).collect();
    assert_eq!(titles, ["C", "A", "B"]);
}

#[tokio::test]
async fn test_now_playing_slot_holds_at_most_one_entry() {
    let store = store().await;
    let first = NowPlaying::from_track(&track_at("First", 0, 1));
    let second = NowPlaying::from_track(&track_at("Second", 0, 2));

    store.set_now_playing(first).await.unwrap();
    store.set_now_playing(second.clone()).await.unwrap();

    let playing = store.now_playing().await.unwrap().unwrap();
    assert_eq!(playing.title, second.title);
}

#[tokio::test]
async fn test_clear_now_playing_reports_whether_anything_was_removed() {
    let store = store().await;
    assert!(!store.clear_now_playing().await.unwrap());

    let entry = NowPlaying::from_track(&track_at("Song", 0, 1));
    store.set_now_playing(entry).await.unwrap();
    assert!(store.clear_now_playing().await.unwrap());
    assert!(store.now_playing().await.unwrap().is_none());
    assert!(!store.clear_now_playing().await.unwrap());
}

#[tokio::test]
async fn test_mutations_notify_subscribers() {
    let store = store().await;
    let mut rx = store.subscribe();

    let track = track_at("Song", 0, 100);
    store.insert_track(track.clone()).await.unwrap();
    store.increment_votes(&track.id).await.unwrap();
    store
        .set_now_playing(NowPlaying::from_track(&track))
        .await
        .unwrap();
    store.clear_now_playing().await.unwrap();

    assert!(matches!(
        rx.recv().await.unwrap(),
        StoreEvent::TrackSubmitted { .. }
    ));
    assert!(matches!(
        rx.recv().await.unwrap(),
        StoreEvent::VoteRecorded { votes: 1, .. }
    ));
    assert!(matches!(
        rx.recv().await.unwrap(),
        StoreEvent::NowPlayingChanged { .. }
    ));
    assert!(matches!(
        rx.recv().await.unwrap(),
        StoreEvent::NowPlayingCleared
    ));
}

#[tokio::test]
async fn test_timestamps_survive_storage() {
    let store = store().await;
    let track = track_at("Song", 0, 1_700_000_000);
    store.insert_track(track.clone()).await.unwrap();

    let fetched = store.get_track(&track.id).await.unwrap().unwrap();
    assert_eq!(fetched.created_at, track.created_at);
}

//! Helpers for Spotify track links.
//!
//! The coordinator itself treats `spotify_url` as an opaque external
//! reference; these helpers exist for the presentation layer, which
//! validates links before submission and builds embed-player URLs.

use url::Url;

/// Host of shareable Spotify track links
pub const OPEN_SPOTIFY_HOST: &str = "open.spotify.com";

/// Extract the track id from an `open.spotify.com/track/...` link or a
/// `spotify:track:...` URI.
///
/// Handles locale-prefixed paths (`/intl-de/track/{id}`) and trailing
/// query strings. Returns `None` for anything that does not reference a
/// single track.
#[must_use]
pub fn track_id(input: &str) -> Option<String> {
    if let Some(rest) = input.strip_prefix("spotify:track:") {
        return valid_id(rest).then(|| rest.to_string());
    }

    let url = Url::parse(input).ok()?;
    if url.host_str()? != OPEN_SPOTIFY_HOST {
        return None;
    }

    let mut segments = url.path_segments()?;
    let mut segment = segments.next()?;
    if segment.starts_with("intl-") {
        segment = segments.next()?;
    }
    if segment != "track" {
        return None;
    }

    let id = segments.next()?;
    valid_id(id).then(|| id.to_string())
}

/// True if the string references a single Spotify track.
#[must_use]
pub fn is_track_url(input: &str) -> bool {
    track_id(input).is_some()
}

/// Embed-player URL for a track link, if the link can be parsed.
#[must_use]
pub fn embed_url(input: &str) -> Option<String> {
    track_id(input).map(|id| format!("https://{OPEN_SPOTIFY_HOST}/embed/track/{id}"))
}

fn valid_id(id: &str) -> bool {
    !id.is_empty() && id.chars().all(|c| c.is_ascii_alphanumeric())
}

//! Per-device voter identity.
//!
//! The coordinator treats the voter id as an opaque input; creating and
//! persisting it once per device is this layer's job. It is a dedup key,
//! not a credential.

use classradio_core::{paths, Result, VoterId};
use std::fs;
use std::path::Path;
use tracing::debug;

/// Load the persisted voter identity, generating and saving one on first
/// use.
///
/// # Errors
///
/// Returns an error if a fresh identity cannot be written to disk.
pub fn load_or_create() -> Result<VoterId> {
    load_or_create_at(&paths::voter_id_path())
}

fn load_or_create_at(path: &Path) -> Result<VoterId> {
    if let Ok(existing) = fs::read_to_string(path) {
        let trimmed = existing.trim();
        if !trimmed.is_empty() {
            return Ok(VoterId::new(trimmed));
        }
    }

    let voter = VoterId::generate();
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, voter.as_str())?;
    debug!("Created voter identity at {:?}", path);
    Ok(voter)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> std::path::PathBuf {
        std::env::temp_dir()
            .join(format!("classradio-test-{}", uuid::Uuid::new_v4()))
            .join(name)
    }

    #[test]
    fn test_identity_is_created_once_and_reused() {
        let path = temp_path(".voter_id");

        let first = load_or_create_at(&path).unwrap();
        let second = load_or_create_at(&path).unwrap();
        assert_eq!(first, second);

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_blank_identity_file_is_replaced() {
        let path = temp_path(".voter_id");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "  \n").unwrap();

        let voter = load_or_create_at(&path).unwrap();
        assert!(!voter.as_str().is_empty());

        fs::remove_file(&path).unwrap();
    }
}

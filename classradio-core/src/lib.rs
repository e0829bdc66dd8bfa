pub mod config;
pub mod coordinator;
pub mod error;
pub mod paths;
pub mod spotify;
pub mod store;
pub mod track;

pub use config::{DatabaseConfig, EventsConfig, RadioConfig, StationConfig, CONFIG_TEMPLATE};
pub use coordinator::QueueCoordinator;
pub use error::{CoreError, Result};
pub use paths::{
    config_dir, config_path, queue_db_path, voter_id_path, CONFIG_DIR_NAME, CONFIG_FILE_NAME,
    QUEUE_DB_FILE_NAME, VOTER_ID_FILE_NAME,
};
pub use store::{QueueStore, StoreError, StoreEvent, StoreResult};
pub use track::{
    queue_ordering, sort_queue, NowPlaying, QueuedTrack, TrackSubmission, VoterId,
    ANONYMOUS_SUBMITTER,
};

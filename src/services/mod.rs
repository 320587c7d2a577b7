pub mod geolocation;
pub mod hasher;
pub mod upload;

pub use geolocation::{Coordinates, FallbackGeolocator, Geolocator};
pub use hasher::{Argon2Hasher, Hasher};
pub use upload::{DiskUploadStore, IncomingFile, StoredFile, UploadStore};

use thiserror::Error;

/// Failures of the side-channel collaborators
#[derive(Debug, Error)]
pub enum CollaboratorError {
    #[error("Upload failed: {0}")]
    Upload(#[from] std::io::Error),

    #[error("Password hashing failed: {0}")]
    Hashing(String),

    #[error("Blocking task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

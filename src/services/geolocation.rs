use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{CollaboratorError, StoredFile};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

/// Derives coordinates for a cat being created, optionally from its uploaded image
#[async_trait]
pub trait Geolocator: Send + Sync {
    async fn locate(&self, image: Option<&StoredFile>) -> Result<Coordinates, CollaboratorError>;
}

/// Always answers with the configured default position
#[derive(Debug, Clone)]
pub struct FallbackGeolocator {
    coordinates: Coordinates,
}

impl FallbackGeolocator {
    pub fn new(coordinates: Coordinates) -> Self {
        Self { coordinates }
    }
}

#[async_trait]
impl Geolocator for FallbackGeolocator {
    async fn locate(&self, image: Option<&StoredFile>) -> Result<Coordinates, CollaboratorError> {
        if let Some(image) = image {
            tracing::debug!("No location data read from {}, using default", image.filename);
        }
        Ok(self.coordinates)
    }
}

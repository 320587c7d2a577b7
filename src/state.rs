use anyhow::Context;
use std::sync::Arc;

use crate::auth::TokenVerifier;
use crate::config::AppConfig;
use crate::controllers::{CatController, UserController};
use crate::database::{CatStore, HealthCheck, UserStore};
use crate::services::{Argon2Hasher, Coordinates, DiskUploadStore, FallbackGeolocator};

/// Shared handles for every request
#[derive(Clone)]
pub struct AppState {
    pub cats: Arc<CatController>,
    pub users: Arc<UserController>,
    pub verifier: Arc<TokenVerifier>,
    pub health: Arc<dyn HealthCheck>,
}

impl AppState {
    /// Wire controllers and collaborators over one store backend
    pub fn build<S>(config: &AppConfig, store: Arc<S>) -> anyhow::Result<Self>
    where
        S: CatStore + UserStore + HealthCheck + 'static,
    {
        let hasher = Argon2Hasher::new(&config.security.password_hash)
            .context("invalid password hash configuration")?;
        let verifier = TokenVerifier::new(&config.security.jwt_secret)
            .context("SECURITY_JWT_SECRET must be set")?;

        let geolocator = FallbackGeolocator::new(Coordinates {
            lat: config.geolocation.default_lat,
            lng: config.geolocation.default_lng,
        });

        let cats = CatController::new(
            store.clone(),
            Arc::new(DiskUploadStore::new(config.uploads.dir.clone())),
            Arc::new(geolocator),
            config.uploads.placeholder_filename.clone(),
        );
        let users = UserController::new(store.clone(), Arc::new(hasher));

        Ok(Self {
            cats: Arc::new(cats),
            users: Arc::new(users),
            verifier: Arc::new(verifier),
            health: store,
        })
    }
}

use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

/// Process-wide configuration. Built once in `main` and passed down explicitly;
/// nothing reads the environment after startup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub database: DatabaseConfig,
    pub api: ApiConfig,
    pub security: SecurityConfig,
    pub uploads: UploadConfig,
    pub geolocation: GeolocationConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: Option<String>,
    pub max_connections: u32,
    pub connection_timeout: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub port: u16,
    pub max_request_size_bytes: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub enable_cors: bool,
    pub cors_origins: Vec<String>,
    pub jwt_secret: String,
    pub password_hash: PasswordHashConfig,
}

/// argon2 cost settings; `cost` is the iteration count
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PasswordHashConfig {
    pub cost: u32,
    pub memory_kib: u32,
    pub parallelism: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadConfig {
    pub dir: PathBuf,
    /// Filename recorded for cats created without an image
    pub placeholder_filename: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeolocationConfig {
    pub default_lat: f64,
    pub default_lng: f64,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_overrides(|key| env::var(key).ok())
    }

    fn with_overrides(mut self, var: impl Fn(&str) -> Option<String>) -> Self {
        // Database overrides
        if let Some(v) = var("DATABASE_URL") {
            self.database.url = Some(v);
        }
        if let Some(v) = var("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }
        if let Some(v) = var("DATABASE_CONNECTION_TIMEOUT") {
            self.database.connection_timeout = v.parse().unwrap_or(self.database.connection_timeout);
        }

        // API overrides
        if let Some(v) = var("API_PORT").or_else(|| var("PORT")) {
            self.api.port = v.parse().unwrap_or(self.api.port);
        }
        if let Some(v) = var("API_MAX_REQUEST_SIZE_BYTES") {
            self.api.max_request_size_bytes = v.parse().unwrap_or(self.api.max_request_size_bytes);
        }

        // Security overrides
        if let Some(v) = var("SECURITY_ENABLE_CORS") {
            self.security.enable_cors = v.parse().unwrap_or(self.security.enable_cors);
        }
        if let Some(v) = var("SECURITY_CORS_ORIGINS") {
            self.security.cors_origins = v.split(',').map(|s| s.trim().to_string()).collect();
        }
        if let Some(v) = var("SECURITY_JWT_SECRET").or_else(|| var("JWT_SECRET")) {
            self.security.jwt_secret = v;
        }
        if let Some(v) = var("PASSWORD_HASH_COST") {
            self.security.password_hash.cost = v.parse().unwrap_or(self.security.password_hash.cost);
        }
        if let Some(v) = var("PASSWORD_HASH_MEMORY_KIB") {
            self.security.password_hash.memory_kib =
                v.parse().unwrap_or(self.security.password_hash.memory_kib);
        }
        if let Some(v) = var("PASSWORD_HASH_PARALLELISM") {
            self.security.password_hash.parallelism =
                v.parse().unwrap_or(self.security.password_hash.parallelism);
        }

        // Upload overrides
        if let Some(v) = var("UPLOAD_DIR") {
            self.uploads.dir = PathBuf::from(v);
        }
        if let Some(v) = var("UPLOAD_PLACEHOLDER_FILENAME") {
            self.uploads.placeholder_filename = v;
        }

        // Geolocation overrides
        if let Some(v) = var("GEO_DEFAULT_LAT") {
            self.geolocation.default_lat = v.parse().unwrap_or(self.geolocation.default_lat);
        }
        if let Some(v) = var("GEO_DEFAULT_LNG") {
            self.geolocation.default_lng = v.parse().unwrap_or(self.geolocation.default_lng);
        }

        self
    }

    pub fn development() -> Self {
        Self {
            environment: Environment::Development,
            database: DatabaseConfig {
                url: None,
                max_connections: 10,
                connection_timeout: 30,
            },
            api: ApiConfig {
                port: 3000,
                max_request_size_bytes: 10 * 1024 * 1024, // 10MB
            },
            security: SecurityConfig {
                enable_cors: true,
                cors_origins: vec!["http://localhost:3000".to_string(), "http://localhost:5173".to_string()],
                jwt_secret: "development-secret".to_string(),
                password_hash: PasswordHashConfig {
                    cost: 2,
                    memory_kib: 19 * 1024,
                    parallelism: 1,
                },
            },
            uploads: Self::default_uploads(),
            geolocation: Self::default_geolocation(),
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            database: DatabaseConfig {
                url: None,
                max_connections: 20,
                connection_timeout: 10,
            },
            api: ApiConfig {
                port: 3000,
                max_request_size_bytes: 5 * 1024 * 1024, // 5MB
            },
            security: SecurityConfig {
                enable_cors: true,
                cors_origins: vec!["https://staging.example.com".to_string()],
                jwt_secret: String::new(),
                password_hash: PasswordHashConfig {
                    cost: 3,
                    memory_kib: 19 * 1024,
                    parallelism: 1,
                },
            },
            uploads: Self::default_uploads(),
            geolocation: Self::default_geolocation(),
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            database: DatabaseConfig {
                url: None,
                max_connections: 50,
                connection_timeout: 5,
            },
            api: ApiConfig {
                port: 3000,
                max_request_size_bytes: 2 * 1024 * 1024, // 2MB
            },
            security: SecurityConfig {
                enable_cors: true,
                cors_origins: vec!["https://app.example.com".to_string()],
                // Must come from SECURITY_JWT_SECRET
                jwt_secret: String::new(),
                password_hash: PasswordHashConfig {
                    cost: 3,
                    memory_kib: 64 * 1024,
                    parallelism: 1,
                },
            },
            uploads: Self::default_uploads(),
            geolocation: Self::default_geolocation(),
        }
    }

    fn default_uploads() -> UploadConfig {
        UploadConfig {
            dir: PathBuf::from("uploads"),
            placeholder_filename: "moro".to_string(),
        }
    }

    fn default_geolocation() -> GeolocationConfig {
        GeolocationConfig {
            default_lat: 60.24,
            default_lng: 24.74,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_development_config() {
        let config = AppConfig::development();
        assert_eq!(config.api.port, 3000);
        assert!(!config.security.jwt_secret.is_empty());
        assert_eq!(config.uploads.placeholder_filename, "moro");
    }

    #[test]
    fn test_default_production_config() {
        let config = AppConfig::production();
        assert!(config.security.jwt_secret.is_empty());
        assert_eq!(config.api.max_request_size_bytes, 2 * 1024 * 1024);
    }

    #[test]
    fn env_overrides_replace_preset_values() {
        let config = AppConfig::development().with_overrides(vars(&[
            ("PORT", "8080"),
            ("PASSWORD_HASH_COST", "4"),
            ("SECURITY_CORS_ORIGINS", "https://a.fi, https://b.fi"),
            ("GEO_DEFAULT_LAT", "61.5"),
        ]));

        assert_eq!(config.api.port, 8080);
        assert_eq!(config.security.password_hash.cost, 4);
        assert_eq!(config.security.cors_origins, vec!["https://a.fi", "https://b.fi"]);
        assert_eq!(config.geolocation.default_lat, 61.5);
    }

    #[test]
    fn unparsable_overrides_keep_defaults() {
        let config = AppConfig::development().with_overrides(vars(&[("DATABASE_MAX_CONNECTIONS", "many")]));
        assert_eq!(config.database.max_connections, 10);
    }
}

#![allow(dead_code)]

use anyhow::{Context, Result};
use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::Value;
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

use cat_api::auth::Claims;
use cat_api::config::AppConfig;
use cat_api::database::MemoryStore;
use cat_api::models::Role;
use cat_api::{app, AppState};

const SECRET: &str = "integration-secret";
const BOUNDARY: &str = "cat-api-test-boundary";

/// Router over a fresh in-memory store and a scratch upload directory
pub struct TestApp {
    router: Router,
    pub uploads: TempDir,
}

impl TestApp {
    pub fn spawn() -> Result<Self> {
        let uploads = tempfile::tempdir().context("failed to create upload dir")?;

        let mut config = AppConfig::development();
        config.security.jwt_secret = SECRET.to_string();
        config.security.password_hash.cost = 1;
        config.security.password_hash.memory_kib = 1024;
        config.security.password_hash.parallelism = 1;
        config.uploads.dir = uploads.path().to_path_buf();

        let state = AppState::build(&config, Arc::new(MemoryStore::new()))?;
        Ok(Self {
            router: app(state, &config),
            uploads,
        })
    }

    pub fn token(&self, user_id: i64, role: Role) -> String {
        let claims = Claims {
            user_id,
            role,
            exp: chrono::Utc::now().timestamp() + 3600,
        };
        encode(&Header::default(), &claims, &EncodingKey::from_secret(SECRET.as_bytes()))
            .expect("token encodes")
    }

    pub async fn send(&self, request: Request<Body>) -> Result<(StatusCode, Value)> {
        let response = self.router.clone().oneshot(request).await?;
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await?;
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)?
        };
        Ok((status, body))
    }

    pub async fn json(
        &self,
        method: Method,
        path: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> Result<(StatusCode, Value)> {
        let mut builder = Request::builder().method(method).uri(path);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))?,
            None => builder.body(Body::empty())?,
        };
        self.send(request).await
    }

    pub async fn get(&self, path: &str) -> Result<(StatusCode, Value)> {
        self.json(Method::GET, path, None, None).await
    }

    /// POST a multipart form of text fields plus an optional `cat` file part
    pub async fn multipart(
        &self,
        path: &str,
        token: Option<&str>,
        fields: &[(&str, &str)],
        file: Option<(&str, &[u8])>,
    ) -> Result<(StatusCode, Value)> {
        let mut body = Vec::new();
        for (name, value) in fields {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
                )
                .as_bytes(),
            );
        }
        if let Some((filename, bytes)) = file {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"cat\"; filename=\"{filename}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
                )
                .as_bytes(),
            );
            body.extend_from_slice(bytes);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

        let mut builder = Request::builder()
            .method(Method::POST)
            .uri(path)
            .header(header::CONTENT_TYPE, format!("multipart/form-data; boundary={BOUNDARY}"));
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        self.send(builder.body(Body::from(body))?).await
    }

    /// Register a user and return the new id
    pub async fn register(&self, user_name: &str) -> Result<i64> {
        let body = serde_json::json!({ "user_name": user_name, "password": "secret" });
        let (status, body) = self.json(Method::POST, "/api/v1/users", None, Some(body)).await?;
        anyhow::ensure!(status == StatusCode::OK, "registration failed: {}", body);
        body["user_id"].as_i64().context("user_id missing")
    }

    /// Create one cat owned by the token holder
    pub async fn cat_for(&self, owner_token: &str) -> Result<i64> {
        let (status, body) = self
            .multipart(
                "/api/v1/cats",
                Some(owner_token),
                &[("cat_name", "Fluffy"), ("weight", "4.5"), ("birthdate", "2020-01-01")],
                None,
            )
            .await?;
        anyhow::ensure!(status == StatusCode::OK, "cat create failed: {}", body);
        body["id"].as_i64().context("id missing")
    }
}

pub mod app;
pub mod auth;
pub mod config;
pub mod controllers;
pub mod database;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;
pub mod state;
pub mod validation;

pub use app::app;
pub use state::AppState;

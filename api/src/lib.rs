//! Backend for a personal blog: markdown posts on disk, users and themes
//! in SQLite, JWT authentication and a JSON API served by axum.

pub mod auth;
pub mod config;
pub mod content;
pub mod dto;
pub mod errors;
pub mod extract;
pub mod models;
pub mod pagination;
pub mod routes;
pub mod states;
pub mod store;

pub use routes::router;
pub use states::AppState;

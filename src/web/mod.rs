//! Browser UI and JSON API served by `zonescout-web`

pub mod handlers;
pub mod pages;
pub mod routes;
pub mod types;

pub use handlers::AppState;
pub use routes::create_router;

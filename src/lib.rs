//! Items list service.
//!
//! A validated CRUD API over a single item collection, a server-rendered UI
//! with a browser script, and a reconciling client controller.

pub mod app;
pub mod client;
pub mod config;
pub mod errors;
pub mod persistence;
pub mod routes;
pub mod services;
pub mod state;
pub mod views;

pub use app::build_app;
pub use config::AppConfig;
pub use state::items::{Item, ItemId, ItemStore};

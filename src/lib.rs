pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod models;
pub mod notifications;
pub mod services;

pub use db::create_pool;
pub use error::{PlacementError, Result};

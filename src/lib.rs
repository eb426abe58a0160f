pub mod actions;
pub mod app;
pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod memory;
pub mod state;

pub use app::build_app;
pub use state::AppState;

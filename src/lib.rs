pub mod app;
pub mod client;
pub mod config;
pub mod confirm;
pub mod enrich;
pub mod envelope;
pub mod errors;
pub mod handlers;
pub mod links;
pub mod models;
pub mod projection;
pub mod resolver;
pub mod state;
pub mod stats;
pub mod ui;
pub mod view;

pub use app::router;
pub use client::{Collection, ResourceClient};
pub use config::Config;
pub use state::AppState;

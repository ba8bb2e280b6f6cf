pub mod api;
pub mod app;
pub mod config;
pub mod errors;
pub mod format;
pub mod forms;
pub mod handlers;
pub mod models;
pub mod pages;
pub mod progress;
pub mod report;
pub mod state;
pub mod ui;

pub use api::ApiClient;
pub use app::router;
pub use config::Config;
pub use state::AppState;

pub mod checkers;
pub mod config;
pub mod fetcher;
pub mod health;
pub mod models;
pub mod notify;
pub mod poller;
pub mod scheduler;
pub mod state_store;
pub mod utils;
pub mod web;

// Re-export commonly used types
pub use config::AppConfig;
pub use utils::error::AppError;

pub type Result<T> = std::result::Result<T, AppError>;

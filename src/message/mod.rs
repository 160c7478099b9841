// Public API - what other modules can use
pub use handlers::{add_message, list_messages};

// Internal modules
mod handlers;
pub mod models;
pub mod repository;
pub mod service;
mod types;

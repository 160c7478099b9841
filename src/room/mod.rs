// Public API - what other modules can use
pub use handlers::{enter_room, get_status, leave_room};

// Internal modules
mod expiry_task;
mod handlers;
pub mod models;
pub mod service;
mod types;

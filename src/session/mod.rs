// Public API - what other modules can use
pub use service::SessionService;

// Internal modules
pub mod service;

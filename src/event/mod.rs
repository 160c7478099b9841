// Event-driven architecture components
//
// This module provides the publish/subscribe plumbing that pushes
// occupancy changes out to connected observers.

// Public API - what other modules can use
pub use bus::{EventBus, Subscription};
pub use events::{StatusBus, STATUS_CHANGED_TOPIC};

// Internal modules
mod bus;
mod events;

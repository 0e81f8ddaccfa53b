//! Status Store
//!
//! Holds the single shared "websocket active" flag. Any tab may write
//! it; the store keeps the last value reported and nothing else.

/// Process-wide connection status flag
#[derive(Debug, Default)]
pub struct StatusStore {
    active: bool,
}

impl StatusStore {
    /// Create a store with the flag cleared
    pub fn new() -> Self {
        Self::default()
    }

    /// Record whether a websocket connection is currently active
    pub fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    /// Read the current flag value
    pub fn is_active(&self) -> bool {
        self.active
    }
}

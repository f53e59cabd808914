use std::sync::{Arc, Mutex};

/// Discrete tick counter. The kernel advances it once per simulation step.
#[derive(Clone, Default)]
pub struct Clock {
    tick: Arc<Mutex<usize>>,
}

impl Clock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts the next tick and returns its number (0-based).
    pub fn advance(&self) -> usize {
        let mut tick = self.tick.lock().unwrap();
        let current = *tick;
        *tick += 1;
        current
    }

    pub fn current_tick(&self) -> usize {
        *self.tick.lock().unwrap()
    }
}

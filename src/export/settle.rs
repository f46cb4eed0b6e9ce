use std::cell::RefCell;
use std::time::Duration;

/// Waits that let layout, fonts and image decoding catch up before a capture.
pub trait Settle {
    fn settle(&self, reason: &'static str, delay: Duration);
}

/// Blocks the calling thread for the full delay.
#[derive(Clone, Copy, Debug, Default)]
pub struct ThreadSettle;

impl Settle for ThreadSettle {
    fn settle(&self, reason: &'static str, delay: Duration) {
        if delay.is_zero() {
            return;
        }
        tracing::debug!(reason, ms = delay.as_millis() as u64, "settling");
        std::thread::sleep(delay);
    }
}

/// Returns immediately. Every wait is still recorded, in order.
#[derive(Debug, Default)]
pub struct NoSettle {
    waits: RefCell<Vec<(&'static str, Duration)>>,
}

impl NoSettle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits requested so far.
    pub fn waits(&self) -> Vec<(&'static str, Duration)> {
        self.waits.borrow().clone()
    }
}

impl Settle for NoSettle {
    fn settle(&self, reason: &'static str, delay: Duration) {
        self.waits.borrow_mut().push((reason, delay));
    }
}

#[cfg(test)]
#[path = "../../tests/unit/export/settle.rs"]
mod tests;

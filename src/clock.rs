// src/clock.rs

// clock module definition and implementations

// dependencies
use tokio::time::Instant;

/// Clock trait to abstract time retrieval.
/// Implementors must be thread-safe (Send + Sync).
/// The `now_ms` method returns a monotonic timestamp in milliseconds.
/// Only differences between two readings are meaningful, the origin is arbitrary.
pub trait Clock: Send + Sync {
    fn now_ms(&self) -> u64;
}

/// MonotonicClock implementation measuring milliseconds since the clock was created.
/// Built on `tokio::time::Instant`, so it follows tokio's paused clock in tests
/// and falls back to the OS monotonic clock everywhere else.
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

// Make MonotonicClock the default
impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now_ms(&self) -> u64 {
        self.origin.elapsed().as_millis() as u64
    }
}

impl<C: Clock + ?Sized> Clock for std::sync::Arc<C> {
    fn now_ms(&self) -> u64 {
        (**self).now_ms()
    }
}

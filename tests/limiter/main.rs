// tests/limiter/main.rs

// test modules
mod fixtures;
mod attempt_tests;
mod timer_tests;

// Re-export common test utilities
pub use fixtures::test_clock::TestClock;

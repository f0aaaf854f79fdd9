// tests/limiter/fixtures/mod.rs

pub mod recording_sink;

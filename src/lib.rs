// src/lib.rs

//! # Window Limiter
//!
//! A sliding-window limiter for user-triggered actions such as form
//! submissions: at most `limit` attempts are accepted in any rolling
//! `window_ms`, and a blocked caller gets a countdown and an automatic unblock
//! when the oldest accepted attempt ages out.
//!
//! The limiter is advisory. It throttles a well-behaved client session and is
//! no substitute for server-side abuse protection.
//!
//! ## Quick Example
//!
//! ```rust
//! use window_limiter::{MonotonicClock, WindowLimiter, WindowLimiterConfig};
//!
//! # async fn send() -> Result<(), std::io::Error> { Ok(()) }
//! # async fn run() -> Result<(), std::io::Error> {
//! let config = WindowLimiterConfig::new(3, 60_000);
//! let limiter = WindowLimiter::with_config(config, MonotonicClock::new()).unwrap();
//!
//! if limiter.attempt(|| send()).await? {
//!     println!("Sent, {} attempts left", limiter.attempts_left());
//! } else {
//!     println!("{}", limiter.block_message());
//! }
//! # Ok(())
//! # }
//! ```

// private modules
mod clock;
mod config;
mod errors;
mod window;
mod window_limiter;

// public modules
pub mod contact;
pub mod faq;
pub mod sessions;

// public API exports
pub use clock::{Clock, MonotonicClock};
pub use config::WindowLimiterConfig;
pub use errors::{ContactError, Result, WindowLimiterError};
pub use sessions::SessionLimiters;
pub use window::{SlidingWindow, WindowDecision, format_block_message};
pub use window_limiter::{LimiterStatus, WindowLimiter};

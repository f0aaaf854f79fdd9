// src/window.rs

//! Sliding-window bookkeeping with explicit timestamps.
//!
//! [`SlidingWindow`] holds the accepted attempts and the block state but owns
//! no timers and reads no clock; every operation takes `now` in milliseconds.
//! [`WindowLimiter`](crate::WindowLimiter) wraps it with a clock and the
//! countdown/auto-unblock tasks.

// dependencies
use std::collections::VecDeque;

/// Outcome of checking the window at a given instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowDecision {
    /// Below the limit, an attempt may be recorded.
    Allowed,
    /// A block had run its course and was lifted by this check. Allowed.
    Reopened,
    /// This check filled the window and started a block.
    BlockStarted { block_ends_at: u64 },
    /// Already blocked; nothing was mutated.
    StillBlocked { block_ends_at: u64 },
}

impl WindowDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, WindowDecision::Allowed | WindowDecision::Reopened)
    }
}

/// Accepted attempts inside a rolling window plus the cached block state.
#[derive(Debug, Clone)]
pub struct SlidingWindow {
    attempts: VecDeque<u64>,
    limit: u32,
    window_ms: u64,
    blocked: bool,
    block_ends_at: Option<u64>,
}

impl SlidingWindow {
    pub fn new(limit: u32, window_ms: u64) -> Self {
        Self {
            attempts: VecDeque::new(),
            limit,
            window_ms,
            blocked: false,
            block_ends_at: None,
        }
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    pub fn window_ms(&self) -> u64 {
        self.window_ms
    }

    pub fn is_blocked(&self) -> bool {
        self.blocked
    }

    pub fn block_ends_at(&self) -> Option<u64> {
        self.block_ends_at
    }

    /// Timestamps currently held, oldest first.
    pub fn attempts(&self) -> impl Iterator<Item = u64> + '_ {
        self.attempts.iter().copied()
    }

    /// Most recent accepted attempt still held.
    pub fn newest(&self) -> Option<u64> {
        self.attempts.back().copied()
    }

    // drop attempts whose age has reached the window width, oldest first
    fn evict(&mut self, now: u64) {
        while let Some(&oldest) = self.attempts.front() {
            if now.saturating_sub(oldest) >= self.window_ms {
                self.attempts.pop_front();
            } else {
                break;
            }
        }
    }

    /// Evict stale attempts and decide whether a new attempt may proceed.
    /// Does not record anything; see [`SlidingWindow::record`].
    pub fn check(&mut self, now: u64) -> WindowDecision {
        self.evict(now);

        if self.blocked {
            let block_ends_at = self.block_ends_at.unwrap_or(now);
            if now >= block_ends_at {
                self.reset();
                return WindowDecision::Reopened;
            }
            return WindowDecision::StillBlocked { block_ends_at };
        }

        if self.attempts.len() >= self.limit as usize {
            // anchored to the oldest accepted attempt, rejections never move it
            let oldest = self.attempts.front().copied().unwrap_or(now);
            let block_ends_at = oldest.saturating_add(self.window_ms);
            self.blocked = true;
            self.block_ends_at = Some(block_ends_at);
            return WindowDecision::BlockStarted { block_ends_at };
        }

        WindowDecision::Allowed
    }

    /// Record an accepted attempt at `now`.
    ///
    /// Returns false and leaves the window untouched while blocked or when the
    /// window is already full.
    pub fn record(&mut self, now: u64) -> bool {
        self.evict(now);
        if self.blocked || self.attempts.len() >= self.limit as usize {
            return false;
        }
        self.attempts.push_back(now);
        true
    }

    /// Check and, if allowed, record in one step.
    pub fn try_acquire(&mut self, now: u64) -> WindowDecision {
        let decision = self.check(now);
        if decision.is_allowed() {
            self.record(now);
        }
        decision
    }

    /// Remaining slots at `now`, counting only attempts still inside the window.
    pub fn attempts_left(&self, now: u64) -> u32 {
        if self.blocked {
            return 0;
        }
        let live = self
            .attempts
            .iter()
            .filter(|&&ts| now.saturating_sub(ts) < self.window_ms)
            .count() as u32;
        self.limit.saturating_sub(live)
    }

    /// Milliseconds until the current block lifts, zero when open.
    pub fn remaining_ms(&self, now: u64) -> u64 {
        match (self.blocked, self.block_ends_at) {
            (true, Some(ends)) => ends.saturating_sub(now),
            _ => 0,
        }
    }

    /// Clear all attempts and lift any block.
    pub fn reset(&mut self) {
        self.attempts.clear();
        self.blocked = false;
        self.block_ends_at = None;
    }
}

/// Whole seconds left, rounded up.
pub(crate) fn ceil_secs(ms: u64) -> u64 {
    ms.div_ceil(1_000)
}

/// Visitor-facing wait message for a block with `seconds` left.
pub fn format_block_message(seconds: u64) -> String {
    if seconds >= 60 {
        let minutes = seconds.div_ceil(60);
        let unit = if minutes > 1 { "minutes" } else { "minute" };
        return format!("Too many attempts. Please wait {minutes} {unit}.");
    }
    let unit = if seconds != 1 { "seconds" } else { "second" };
    format!("Too many attempts. Please wait {seconds} {unit}.")
}

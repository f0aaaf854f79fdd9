// src/window_limiter.rs

// window-limiter: a sliding-window limiter with a countdown and an auto-unblock timer.

// dependencies
use crate::clock::{Clock, MonotonicClock};
use crate::config::WindowLimiterConfig;
use crate::errors::Result;
use crate::window::{SlidingWindow, WindowDecision, ceil_secs, format_block_message};
use parking_lot::Mutex;
use std::future::Future;
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, trace};

/// The main WindowLimiter model.
/// C is the clock type, defaulting to MonotonicClock.
///
/// One limiter gates one action for one session. At most `limit` attempts are
/// accepted inside any rolling `window_ms`; once the window is full the
/// limiter blocks until the oldest accepted attempt ages out.
///
/// While blocked, two tasks run on the ambient tokio runtime: a countdown that
/// refreshes [`block_time_left`](Self::block_time_left) once per second, and an
/// auto-unblock timer that resets the limiter when the block ends. Both are
/// cancelled by [`reset`](Self::reset), [`dispose`](Self::dispose) and drop.
/// Without a runtime the limiter still lifts blocks lazily on the next check.
#[derive(Debug)]
pub struct WindowLimiter<C = MonotonicClock>
where
    C: Clock + 'static,
{
    shared: Arc<Shared<C>>,
}

#[derive(Debug)]
struct Shared<C> {
    state: Mutex<LimiterState>,
    clock: C,
}

#[derive(Debug)]
struct LimiterState {
    window: SlidingWindow,
    block_time_left: u64,
    last_activity_ms: Option<u64>,
    // bumped on every block start and every reset, stale timers compare against it
    generation: u64,
    timers: BlockTimers,
}

#[derive(Debug, Default)]
struct BlockTimers {
    countdown: Option<JoinHandle<()>>,
    unblock: Option<JoinHandle<()>>,
}

impl BlockTimers {
    fn cancel(&mut self) -> bool {
        let mut cancelled = false;
        for handle in [self.countdown.take(), self.unblock.take()].into_iter().flatten() {
            handle.abort();
            cancelled = true;
        }
        cancelled
    }
}

impl LimiterState {
    fn clear(&mut self) {
        self.window.reset();
        self.block_time_left = 0;
        self.generation += 1;
        if self.timers.cancel() {
            trace!("Cancelled block timers");
        }
    }
}

/// Snapshot of the state a form needs to render its submit control
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LimiterStatus {
    pub is_blocked: bool,
    pub attempts_left: u32,
    /// Seconds, as last published by the countdown
    pub block_time_left: u64,
}

// methods for the WindowLimiter type
impl<C> WindowLimiter<C>
where
    C: Clock + 'static,
{
    // method to create a new limiter given a validated limit and window
    pub(crate) fn new(limit: u32, window_ms: u64, clock: C) -> Self {
        Self {
            shared: Arc::new(Shared {
                state: Mutex::new(LimiterState {
                    window: SlidingWindow::new(limit, window_ms),
                    block_time_left: 0,
                    last_activity_ms: None,
                    generation: 0,
                    timers: BlockTimers::default(),
                }),
                clock,
            }),
        }
    }

    // method to create a new limiter from a config object
    pub fn with_config(config: WindowLimiterConfig, clock: C) -> Result<Self> {
        config.validate()?;
        Ok(Self::new(config.limit, config.window_ms, clock))
    }

    // accessor method to return the configured limit
    pub fn limit(&self) -> u32 {
        self.shared.state.lock().window.limit()
    }

    // accessor method to return the configured window width
    pub fn window_ms(&self) -> u64 {
        self.shared.state.lock().window.window_ms()
    }

    pub fn is_blocked(&self) -> bool {
        self.shared.state.lock().window.is_blocked()
    }

    /// Whether a block is in force at the current time.
    ///
    /// [`is_blocked`](Self::is_blocked) reports the cached flag, which stays
    /// set until a timer or the next check lifts it. This compares the block
    /// end against the clock instead.
    pub fn is_blocked_now(&self) -> bool {
        let now = self.shared.clock.now_ms();
        self.shared.state.lock().window.remaining_ms(now) > 0
    }

    pub fn attempts_left(&self) -> u32 {
        let now = self.shared.clock.now_ms();
        self.shared.state.lock().window.attempts_left(now)
    }

    pub fn block_time_left(&self) -> u64 {
        self.shared.state.lock().block_time_left
    }

    pub fn status(&self) -> LimiterStatus {
        let now = self.shared.clock.now_ms();
        let state = self.shared.state.lock();
        LimiterStatus {
            is_blocked: state.window.is_blocked(),
            attempts_left: state.window.attempts_left(now),
            block_time_left: state.block_time_left,
        }
    }

    /// Timestamp of the most recent accepted attempt, if any was ever made.
    pub fn last_activity_ms(&self) -> Option<u64> {
        self.shared.state.lock().last_activity_ms
    }

    /// Evict stale attempts and report whether one more attempt may proceed.
    ///
    /// Filling the window starts a block and arms the timers. Checking while
    /// blocked changes nothing. Does not record an attempt.
    pub fn check_allowed(&self) -> bool {
        let now = self.shared.clock.now_ms();
        let mut state = self.shared.state.lock();
        let decision = state.window.check(now);
        self.apply(&mut state, decision, now)
    }

    /// Record an attempt at the current time.
    ///
    /// Meant to follow a successful [`check_allowed`](Self::check_allowed);
    /// ignored while blocked or when the window is already full.
    pub fn record_attempt(&self) {
        let now = self.shared.clock.now_ms();
        let mut state = self.shared.state.lock();
        if state.window.record(now) {
            state.last_activity_ms = Some(now);
        } else {
            trace!(now, "Attempt not recorded, window full or blocked");
        }
    }

    /// Run `action` if the limiter allows it.
    ///
    /// Returns `Ok(false)` without invoking `action` when blocked, `Ok(true)`
    /// once the action completed, and the action's own error unchanged if it
    /// failed. A failed action still consumes its slot.
    pub async fn attempt<F, Fut, E>(&self, action: F) -> std::result::Result<bool, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = std::result::Result<(), E>>,
    {
        if !self.try_acquire() {
            return Ok(false);
        }
        action().await?;
        Ok(true)
    }

    // check and record under a single lock so overlapping attempts cannot share a slot
    fn try_acquire(&self) -> bool {
        let now = self.shared.clock.now_ms();
        let mut state = self.shared.state.lock();
        let decision = state.window.check(now);
        if !self.apply(&mut state, decision, now) {
            return false;
        }
        if state.window.record(now) {
            state.last_activity_ms = Some(now);
        }
        true
    }

    /// Clear all attempts, lift any block and cancel pending timers.
    pub fn reset(&self) {
        let mut state = self.shared.state.lock();
        state.clear();
        debug!("Limiter reset");
    }

    /// Human readable wait message, empty when not blocked.
    pub fn block_message(&self) -> String {
        let now = self.shared.clock.now_ms();
        let state = self.shared.state.lock();
        if !state.window.is_blocked() {
            return String::new();
        }
        let seconds = ceil_secs(state.window.remaining_ms(now)).max(1);
        format_block_message(seconds)
    }

    /// Cancel outstanding timers. Dropping the limiter does the same.
    pub fn dispose(&self) {
        let mut state = self.shared.state.lock();
        if state.timers.cancel() {
            debug!("Disposed limiter with pending block timers");
        }
        // any timer already past its abort point must not touch the state
        state.generation += 1;
    }

    fn apply(&self, state: &mut LimiterState, decision: WindowDecision, now: u64) -> bool {
        match decision {
            WindowDecision::Allowed => {
                trace!(now, "Attempt allowed");
            }
            WindowDecision::Reopened => {
                state.clear();
                debug!(now, "Block expired, limiter reopened");
            }
            WindowDecision::BlockStarted { block_ends_at } => {
                let remaining_ms = block_ends_at.saturating_sub(now);
                state.generation += 1;
                state.block_time_left = ceil_secs(remaining_ms);
                debug!(
                    limit = state.window.limit(),
                    window_ms = state.window.window_ms(),
                    block_ends_at,
                    remaining_ms,
                    "Limit reached, blocking"
                );
                self.arm_timers(state, remaining_ms);
            }
            WindowDecision::StillBlocked { block_ends_at } => {
                trace!(now, block_ends_at, "Attempt rejected while blocked");
            }
        }
        decision.is_allowed()
    }

    fn arm_timers(&self, state: &mut LimiterState, remaining_ms: u64) {
        let Ok(handle) = Handle::try_current() else {
            trace!("No tokio runtime, block will lift on the next check");
            return;
        };
        state.timers.cancel();

        let generation = state.generation;
        let weak = Arc::downgrade(&self.shared);
        state.timers.countdown = Some(handle.spawn(run_countdown(weak.clone(), generation)));
        state.timers.unblock = Some(handle.spawn(run_unblock(
            weak,
            generation,
            Duration::from_millis(remaining_ms),
        )));
    }
}

// refresh block_time_left once per second until the block ends or is superseded
async fn run_countdown<C: Clock>(shared: Weak<Shared<C>>, generation: u64) {
    let mut ticker = tokio::time::interval(Duration::from_secs(1));
    loop {
        ticker.tick().await;
        let Some(shared) = shared.upgrade() else {
            return;
        };
        let mut state = shared.state.lock();
        if state.generation != generation || !state.window.is_blocked() {
            return;
        }
        let remaining_ms = state.window.remaining_ms(shared.clock.now_ms());
        state.block_time_left = ceil_secs(remaining_ms);
        if remaining_ms == 0 {
            return;
        }
    }
}

// fully reset the limiter once the block runs out
async fn run_unblock<C: Clock>(shared: Weak<Shared<C>>, generation: u64, delay: Duration) {
    tokio::time::sleep(delay).await;
    let Some(shared) = shared.upgrade() else {
        return;
    };
    let mut state = shared.state.lock();
    if state.generation != generation {
        return;
    }
    state.window.reset();
    state.block_time_left = 0;
    state.generation += 1;
    // this task is finishing on its own, only the countdown needs stopping
    state.timers.unblock.take();
    if let Some(countdown) = state.timers.countdown.take() {
        countdown.abort();
    }
    debug!("Block window elapsed, limiter unblocked");
}

impl<C> Drop for WindowLimiter<C>
where
    C: Clock + 'static,
{
    fn drop(&mut self) {
        self.shared.state.lock().timers.cancel();
    }
}

// src/sessions.rs

// per-session limiters keyed by a caller chosen session id

// dependencies
use crate::clock::{Clock, MonotonicClock};
use crate::config::WindowLimiterConfig;
use crate::errors::Result;
use crate::window_limiter::WindowLimiter;
use dashmap::DashMap;
use std::hash::Hash;
use std::sync::Arc;
use tracing::debug;

/// Registry handing each session its own limiter.
/// K identifies sessions (e.g., a page-load id or connection id).
/// C is the clock type shared by every session's limiter.
/// We use `DashMap` for thread-safe concurrent access to session state.
#[derive(Debug)]
pub struct SessionLimiters<K, C = MonotonicClock>
where
    K: Hash + Eq + Clone,
    C: Clock + 'static,
{
    config: WindowLimiterConfig,
    clock: Arc<C>,
    pub(crate) sessions: DashMap<K, SessionEntry<C>>,
}

#[derive(Debug)]
pub(crate) struct SessionEntry<C>
where
    C: Clock + 'static,
{
    limiter: Arc<WindowLimiter<Arc<C>>>,
    created_ms: u64,
}

impl<K, C> SessionLimiters<K, C>
where
    K: Hash + Eq + Clone,
    C: Clock + 'static,
{
    pub fn with_config(config: WindowLimiterConfig, clock: C) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            clock: Arc::new(clock),
            sessions: DashMap::new(),
        })
    }

    /// The session's limiter, created fresh on first use.
    pub fn session(&self, key: K) -> Arc<WindowLimiter<Arc<C>>> {
        if let Some(entry) = self.sessions.get(&key) {
            return Arc::clone(&entry.limiter);
        }
        let entry = self.sessions.entry(key).or_insert_with(|| {
            // config was validated when the registry was built
            let limiter = WindowLimiter::new(
                self.config.limit,
                self.config.window_ms,
                Arc::clone(&self.clock),
            );
            debug!(
                limit = self.config.limit,
                window_ms = self.config.window_ms,
                "Opened limiter session"
            );
            SessionEntry {
                limiter: Arc::new(limiter),
                created_ms: self.clock.now_ms(),
            }
        });
        Arc::clone(&entry.limiter)
    }

    /// Remove a session and cancel its timers. Returns false for unknown keys.
    pub fn end_session(&self, key: &K) -> bool {
        match self.sessions.remove(key) {
            Some((_, entry)) => {
                entry.limiter.dispose();
                debug!("Ended limiter session");
                true
            }
            None => false,
        }
    }

    /// Drop sessions that are not blocked and saw no accepted attempt for
    /// `max_idle_ms`. A session with no attempts is idle since it was opened.
    /// A block whose end has passed no longer protects a session, even if no
    /// timer or check has lifted it yet.
    pub fn cleanup_idle_sessions(&self, max_idle_ms: u64) {
        let now = self.clock.now_ms();
        let before = self.sessions.len();
        self.sessions.retain(|_, entry| {
            let last_seen = entry
                .limiter
                .last_activity_ms()
                .map_or(entry.created_ms, |ts| ts.max(entry.created_ms));
            let keep =
                entry.limiter.is_blocked_now() || now.saturating_sub(last_seen) < max_idle_ms;
            if !keep {
                entry.limiter.dispose();
            }
            keep
        });
        let removed = before.saturating_sub(self.sessions.len());
        if removed > 0 {
            debug!(removed, "Swept idle limiter sessions");
        }
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

// tests/limiter/attempt_tests.rs

#[cfg(test)]
mod tests {
    use crate::fixtures::test_clock::TestClock;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use window_limiter::{MonotonicClock, WindowLimiter, WindowLimiterConfig};

    #[derive(Debug, PartialEq, Eq)]
    struct SendFailed(&'static str);

    #[tokio::test]
    async fn attempt_runs_action_and_consumes_a_slot() {
        let limiter =
            WindowLimiter::with_config(WindowLimiterConfig::new(3, 60_000), TestClock::new(0)).unwrap();
        let calls = AtomicUsize::new(0);
        let counter = &calls;

        let allowed = limiter
            .attempt(move || async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok::<_, SendFailed>(())
            })
            .await;

        assert_eq!(allowed, Ok(true));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(limiter.attempts_left(), 2);
        assert!(!limiter.is_blocked());
    }

    #[tokio::test]
    async fn blocked_attempt_does_not_invoke_action() {
        let clock = TestClock::new(0);
        let limiter =
            WindowLimiter::with_config(WindowLimiterConfig::new(3, 60_000), clock.clone()).unwrap();
        let calls = AtomicUsize::new(0);
        let counter = &calls;
        let action = move || async move {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok::<_, SendFailed>(())
        };

        for _ in 0..3 {
            assert_eq!(limiter.attempt(action).await, Ok(true));
            clock.advance(1);
        }
        assert_eq!(limiter.attempt(action).await, Ok(false));
        assert!(limiter.is_blocked());
        assert_eq!(calls.load(Ordering::SeqCst), 3);

        // trying again while blocked changes nothing
        assert_eq!(limiter.attempt(action).await, Ok(false));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert!(limiter.is_blocked());
    }

    #[tokio::test]
    async fn action_error_propagates_and_still_counts() {
        let limiter =
            WindowLimiter::with_config(WindowLimiterConfig::new(3, 60_000), TestClock::new(0)).unwrap();

        let result = limiter
            .attempt(|| async { Err::<(), _>(SendFailed("Test error")) })
            .await;

        assert_eq!(result, Err(SendFailed("Test error")));
        assert_eq!(limiter.attempts_left(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn overlapping_attempts_cannot_share_the_last_slot() {
        let limiter =
            WindowLimiter::with_config(WindowLimiterConfig::new(1, 60_000), MonotonicClock::new())
                .unwrap();
        let calls = AtomicUsize::new(0);
        let counter = &calls;
        let slow_send = move || async move {
            counter.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(100)).await;
            Ok::<_, SendFailed>(())
        };

        let (first, second) = tokio::join!(limiter.attempt(slow_send), limiter.attempt(slow_send));

        assert_eq!(first, Ok(true));
        assert_eq!(second, Ok(false));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(limiter.is_blocked());
    }

    #[tokio::test]
    async fn status_snapshot_reflects_attempts() {
        let limiter =
            WindowLimiter::with_config(WindowLimiterConfig::new(2, 10_000), TestClock::new(0)).unwrap();
        limiter.attempt(|| async { Ok::<_, SendFailed>(()) }).await.unwrap();
        limiter.attempt(|| async { Ok::<_, SendFailed>(()) }).await.unwrap();
        limiter.attempt(|| async { Ok::<_, SendFailed>(()) }).await.unwrap();

        let status = limiter.status();
        assert!(status.is_blocked);
        assert_eq!(status.attempts_left, 0);
        assert_eq!(status.block_time_left, 10);
    }
}

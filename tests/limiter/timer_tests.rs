// tests/limiter/timer_tests.rs

#[cfg(test)]
mod tests {
    use crate::fixtures::test_clock::TestClock;
    use std::time::Duration;
    use tokio::time::sleep;
    use window_limiter::{MonotonicClock, WindowLimiter, WindowLimiterConfig};

    async fn ok() -> Result<(), ()> {
        Ok(())
    }

    fn limiter(limit: u32, window_ms: u64) -> WindowLimiter {
        WindowLimiter::with_config(WindowLimiterConfig::new(limit, window_ms), MonotonicClock::new())
            .unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn block_lifts_without_another_attempt() {
        let limiter = limiter(3, 60_000);
        for _ in 0..3 {
            assert!(limiter.attempt(ok).await.unwrap());
        }
        assert!(!limiter.attempt(ok).await.unwrap());
        assert!(limiter.is_blocked());

        sleep(Duration::from_millis(60_001)).await;

        assert!(!limiter.is_blocked());
        assert_eq!(limiter.attempts_left(), 3);
        assert_eq!(limiter.block_time_left(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn countdown_ticks_once_per_second() {
        let limiter = limiter(1, 60_000);
        assert!(limiter.attempt(ok).await.unwrap());
        assert!(!limiter.check_allowed());
        assert_eq!(limiter.block_time_left(), 60);

        sleep(Duration::from_millis(10_500)).await;
        assert_eq!(limiter.block_time_left(), 50);
        assert_eq!(
            limiter.block_message(),
            "Too many attempts. Please wait 50 seconds."
        );

        sleep(Duration::from_millis(45_000)).await;
        assert_eq!(limiter.block_time_left(), 5);
    }

    #[tokio::test(start_paused = true)]
    async fn single_slot_window_scenario() {
        let limiter = limiter(1, 1_000);

        assert!(limiter.attempt(ok).await.unwrap());

        sleep(Duration::from_millis(500)).await;
        assert!(!limiter.attempt(ok).await.unwrap());
        assert!(limiter.is_blocked());

        sleep(Duration::from_millis(501)).await;
        assert!(limiter.attempt(ok).await.unwrap());
    }

    #[tokio::test(start_paused = true)]
    async fn reset_cancels_pending_unblock() {
        let limiter = limiter(1, 5_000);
        assert!(limiter.attempt(ok).await.unwrap());
        assert!(!limiter.check_allowed());

        sleep(Duration::from_millis(1_000)).await;
        limiter.reset();
        assert!(!limiter.is_blocked());
        assert_eq!(limiter.attempts_left(), 1);
        assert_eq!(limiter.block_time_left(), 0);

        // block again; the first block's timer must not lift this one early
        assert!(limiter.attempt(ok).await.unwrap());
        assert!(!limiter.check_allowed());
        sleep(Duration::from_millis(4_500)).await;
        assert!(limiter.is_blocked());

        sleep(Duration::from_millis(600)).await;
        assert!(!limiter.is_blocked());
    }

    #[tokio::test(start_paused = true)]
    async fn rejected_attempts_do_not_rearm_timers() {
        let limiter = limiter(2, 2_000);
        assert!(limiter.attempt(ok).await.unwrap());
        assert!(limiter.attempt(ok).await.unwrap());
        assert!(!limiter.attempt(ok).await.unwrap());

        for _ in 0..3 {
            sleep(Duration::from_millis(500)).await;
            assert!(!limiter.attempt(ok).await.unwrap());
        }

        sleep(Duration::from_millis(501)).await;
        assert!(!limiter.is_blocked());
        assert!(limiter.attempt(ok).await.unwrap());
    }

    #[tokio::test(start_paused = true)]
    async fn dropped_limiter_leaves_no_running_timers() {
        let clock = TestClock::new(0);
        let limiter =
            WindowLimiter::with_config(WindowLimiterConfig::new(1, 3_000), clock.clone()).unwrap();
        assert!(limiter.attempt(ok).await.unwrap());
        assert!(!limiter.check_allowed());

        // let the countdown take its first tick
        sleep(Duration::from_millis(10)).await;
        drop(limiter);
        let reads = clock.reads();

        sleep(Duration::from_millis(10_000)).await;
        assert_eq!(clock.reads(), reads);
    }
}

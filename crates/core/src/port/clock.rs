// Clock & Sleeper Ports (for testability)
//
// Every place the engine reads time or waits goes through these, so tests
// drive the queue on a virtual clock instead of wall-clock sleeps.

use async_trait::async_trait;
use std::time::Duration;

/// Time source (allows mocking in tests)
pub trait Clock: Send + Sync {
    /// Current time in milliseconds since epoch
    fn now_millis(&self) -> i64;
}

/// Suspension point (allows mocking in tests)
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// System clock (production)
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }
}

/// Tokio timer (production)
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

pub mod mocks {
    use super::*;
    use std::sync::Mutex;

    /// Virtual clock: `sleep` advances `now_millis` instead of waiting,
    /// and every requested duration is recorded for assertions.
    pub struct TestClock {
        now: Mutex<i64>,
        sleeps: Mutex<Vec<Duration>>,
    }

    impl TestClock {
        pub fn new(start_millis: i64) -> Self {
            Self {
                now: Mutex::new(start_millis),
                sleeps: Mutex::new(Vec::new()),
            }
        }

        pub fn advance(&self, millis: i64) {
            *self.now.lock().unwrap() += millis;
        }

        /// Every duration passed to `sleep`, in order
        pub fn recorded_sleeps(&self) -> Vec<Duration> {
            self.sleeps.lock().unwrap().clone()
        }
    }

    impl Clock for TestClock {
        fn now_millis(&self) -> i64 {
            *self.now.lock().unwrap()
        }
    }

    #[async_trait]
    impl Sleeper for TestClock {
        async fn sleep(&self, duration: Duration) {
            self.sleeps.lock().unwrap().push(duration);
            *self.now.lock().unwrap() += duration.as_millis() as i64;
            // Yield so other tasks (e.g. a concurrent submit) get a turn
            tokio::task::yield_now().await;
        }
    }
}

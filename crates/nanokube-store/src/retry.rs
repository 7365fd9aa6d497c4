//! Exponential backoff for transient KV failures, per spec.md §4.1:
//! "callers retry transient failures with exponential backoff (base 100ms,
//! cap 5s)".
//!
//! Adapted from the teacher's `crates/kubelet/src/backoff/mod.rs`
//! `ExponentialBackoffStrategy` — same doubling-with-cap shape, generalized
//! here into a `retry` helper that wraps a fallible async closure instead
//! of being tied to pod-state backoff specifically.

use std::time::Duration;

pub struct ExponentialBackoff {
    base: Duration,
    cap: Duration,
    last: Duration,
}

impl ExponentialBackoff {
    pub fn new(base: Duration, cap: Duration) -> Self {
        ExponentialBackoff {
            base,
            cap,
            last: Duration::from_secs(0),
        }
    }

    /// spec.md's documented default: base 100ms, cap 5s.
    pub fn store_default() -> Self {
        Self::new(Duration::from_millis(100), Duration::from_secs(5))
    }

    pub fn reset(&mut self) {
        self.last = Duration::from_secs(0);
    }

    pub fn next_duration(&mut self) -> Duration {
        let next = if self.last == Duration::from_secs(0) {
            self.base
        } else {
            self.last * 2
        };
        let capped = if next > self.cap { self.cap } else { next };
        self.last = capped;
        capped
    }
}

/// Retries `f` up to `max_attempts` times, sleeping with exponential
/// backoff between attempts. Returns the last error if every attempt
/// fails.
pub async fn retry<T, E, F, Fut>(max_attempts: u32, mut f: F) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T, E>>,
{
    let mut backoff = ExponentialBackoff::store_default();
    let mut attempt = 0;
    loop {
        attempt += 1;
        match f().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if attempt >= max_attempts {
                    return Err(err);
                }
                tokio::time::sleep(backoff.next_duration()).await;
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn first_backoff_is_base_duration() {
        let mut backoff = ExponentialBackoff::store_default();
        assert_eq!(backoff.next_duration(), Duration::from_millis(100));
    }

    #[test]
    fn backoff_doubles_then_caps() {
        let mut backoff = ExponentialBackoff::store_default();
        assert_eq!(backoff.next_duration(), Duration::from_millis(100));
        assert_eq!(backoff.next_duration(), Duration::from_millis(200));
        assert_eq!(backoff.next_duration(), Duration::from_millis(400));
        assert_eq!(backoff.next_duration(), Duration::from_millis(800));
        assert_eq!(backoff.next_duration(), Duration::from_millis(1600));
        assert_eq!(backoff.next_duration(), Duration::from_millis(3200));
        assert_eq!(backoff.next_duration(), Duration::from_secs(5));
        assert_eq!(backoff.next_duration(), Duration::from_secs(5));
    }

    #[tokio::test]
    async fn retry_succeeds_after_transient_failures() {
        let attempts = std::sync::atomic::AtomicU32::new(0);
        let result: Result<u32, &str> = retry(5, || async {
            let n = attempts.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            if n < 2 {
                Err("transient")
            } else {
                Ok(42)
            }
        })
        .await;
        assert_eq!(result, Ok(42));
    }

    #[tokio::test]
    async fn retry_gives_up_after_max_attempts() {
        let result: Result<u32, &str> = retry(3, || async { Err("always fails") }).await;
        assert_eq!(result, Err("always fails"));
    }
}

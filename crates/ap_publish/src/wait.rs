use std::future::Future;
use std::time::Duration;
use thiserror::Error;
use tokio::time::{sleep, Instant};

#[derive(Debug, Error)]
#[error("Timed out after {elapsed:?} waiting for {what}")]
pub struct WaitTimeout {
    pub what: String,
    pub elapsed: Duration,
}

/// Poll `probe` every `interval` until it yields a value or `timeout` elapses.
/// The probe always runs at least once.
pub async fn wait_until<T, F, Fut>(
    what: &str,
    timeout: Duration,
    interval: Duration,
    mut probe: F,
) -> Result<T, WaitTimeout>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Option<T>>,
{
    let start = Instant::now();
    loop {
        if let Some(value) = probe().await {
            return Ok(value);
        }
        let elapsed = start.elapsed();
        if elapsed >= timeout {
            return Err(WaitTimeout {
                what: what.to_string(),
                elapsed,
            });
        }
        sleep(interval.min(timeout - elapsed)).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn test_returns_first_value() {
        let calls = AtomicUsize::new(0);
        let value = wait_until("third poll", Duration::from_secs(2), Duration::from_millis(5), || {
            let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
            async move { (n >= 3).then_some(n) }
        })
        .await
        .unwrap();
        assert_eq!(value, 3);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_times_out() {
        let err = wait_until("never", Duration::from_millis(30), Duration::from_millis(5), || async {
            None::<()>
        })
        .await
        .unwrap_err();
        assert_eq!(err.what, "never");
        assert!(err.elapsed >= Duration::from_millis(30));
        assert!(err.to_string().contains("waiting for never"));
    }

    #[tokio::test]
    async fn test_zero_timeout_probes_once() {
        let calls = AtomicUsize::new(0);
        let result = wait_until("once", Duration::ZERO, Duration::from_millis(5), || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { None::<u8> }
        })
        .await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}

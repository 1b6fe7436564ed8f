use std::future::Future;
use std::time::Duration;
use tracing::debug;
use crate::domain::ProbeError;

/// How long `block_on_bounded` waits for blocking tasks after the future completes.
pub const SHUTDOWN_GRACE: Duration = Duration::from_millis(500);

/// Runs `future` on a current-thread runtime. After the future finishes, the runtime
/// gives `spawn_blocking` work at most `grace` to end. A timed-out LDAP lookup would
/// otherwise keep the process alive until the directory answers.
pub fn block_on_bounded<F: Future>(future: F, grace: Duration) -> Result<F::Output, ProbeError> {
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| ProbeError::other(format!("failed to create runtime: {}", e)))?;

    let output = rt.block_on(future);
    debug!(?grace, "shutting down runtime");
    rt.shutdown_timeout(grace);
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[test]
    fn blocking_work_does_not_outlive_the_timeout() {
        let started = Instant::now();
        let result = block_on_bounded(
            async {
                let stuck = tokio::task::spawn_blocking(|| std::thread::sleep(Duration::from_secs(3)));
                tokio::time::timeout(Duration::from_millis(100), stuck).await
            },
            Duration::from_millis(100),
        )
        .unwrap();

        assert!(result.is_err());
        assert!(started.elapsed() < Duration::from_secs(1), "took {:?}", started.elapsed());
    }

    #[test]
    fn returns_the_future_output() {
        assert_eq!(block_on_bounded(async { 42 }, SHUTDOWN_GRACE).unwrap(), 42);
    }
}

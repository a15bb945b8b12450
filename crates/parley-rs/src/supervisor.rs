//! Restart loop around the transport.

use log::{error, info};
use parley_rs_config::ConfigError;
use std::future::Future;
use std::time::Duration;

/// Whether `err` stems from configuration. Those are never retried.
pub fn is_fatal(err: &anyhow::Error) -> bool {
    err.chain()
        .any(|cause| cause.downcast_ref::<ConfigError>().is_some())
}

/// Run `attempt` until it returns `Ok` or a fatal error. Any other error is
/// logged and the attempt is restarted after `restart_delay`. The closure
/// receives the 1-based attempt number.
pub async fn supervise<F, Fut>(restart_delay: Duration, mut attempt: F) -> anyhow::Result<()>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = anyhow::Result<()>>,
{
    let mut number = 0_u32;
    loop {
        number = number.saturating_add(1);
        match attempt(number).await {
            Ok(()) => {
                info!("run finished (attempt={})", number);
                return Ok(());
            }
            Err(err) if is_fatal(&err) => {
                error!("fatal error; not restarting (attempt={}, err={:#})", number, err);
                return Err(err);
            }
            Err(err) => {
                error!(
                    "run failed; restarting (attempt={}, delay_secs={}, err={:#})",
                    number,
                    restart_delay.as_secs(),
                    err
                );
                tokio::time::sleep(restart_delay).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{is_fatal, supervise};
    use anyhow::{Context, anyhow};
    use parley_rs_config::ConfigError;
    use pretty_assertions::assert_eq;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    #[test]
    fn config_errors_are_fatal_through_context() {
        let err = anyhow::Error::from(ConfigError::MissingSetting("TELEGRAM_BOT_TOKEN".into()))
            .context("startup");
        assert!(is_fatal(&err));
        assert!(!is_fatal(&anyhow!("connection reset")));
    }

    #[tokio::test]
    async fn transient_failures_are_restarted() {
        let calls = Arc::new(AtomicU32::new(0));
        let seen = calls.clone();
        let result = supervise(Duration::from_millis(1), move |attempt| {
            let seen = seen.clone();
            async move {
                seen.fetch_add(1, Ordering::SeqCst);
                if attempt < 3 {
                    Err(anyhow!("poll failed"))
                } else {
                    Ok(())
                }
            }
        })
        .await;
        assert!(result.is_ok());
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn fatal_errors_stop_immediately() {
        let calls = Arc::new(AtomicU32::new(0));
        let seen = calls.clone();
        let result = supervise(Duration::from_secs(60), move |_| {
            let seen = seen.clone();
            async move {
                seen.fetch_add(1, Ordering::SeqCst);
                Err::<(), ConfigError>(ConfigError::MissingSetting("TELEGRAM_BOT_TOKEN".into()))
                    .context("loading credentials")
            }
        })
        .await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}

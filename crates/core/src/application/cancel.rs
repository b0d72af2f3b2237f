// Cancel Token

use crate::error::{ClientError, Result};
use std::future::Future;
use tokio::sync::watch;

/// Caller-side abort signal accepted by every blocking operation.
///
/// Cancelling only aborts the in-flight call or wait on this side; it never
/// touches remote job state.
#[derive(Clone, Debug, Default)]
pub struct CancelToken {
    rx: Option<watch::Receiver<bool>>,
}

impl CancelToken {
    /// A token that is never cancelled
    pub fn none() -> Self {
        Self { rx: None }
    }

    /// Check if cancellation was requested
    pub fn is_cancelled(&self) -> bool {
        self.rx.as_ref().is_some_and(|rx| *rx.borrow())
    }

    /// Resolve once cancellation is requested.
    ///
    /// Never resolves for `none()` or when the handle is dropped without cancelling.
    pub async fn cancelled(&self) {
        let Some(rx) = &self.rx else {
            return std::future::pending().await;
        };
        let mut rx = rx.clone();
        loop {
            if *rx.borrow_and_update() {
                return;
            }
            if rx.changed().await.is_err() {
                return std::future::pending().await;
            }
        }
    }

    /// Drive `fut` unless cancellation wins first
    pub async fn run<T, F>(&self, operation: &'static str, fut: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        if self.is_cancelled() {
            return Err(ClientError::Cancelled { operation });
        }
        tokio::select! {
            biased;
            _ = self.cancelled() => Err(ClientError::Cancelled { operation }),
            res = fut => res,
        }
    }
}

/// Cancel sender
#[derive(Debug)]
pub struct CancelHandle {
    tx: watch::Sender<bool>,
}

impl CancelHandle {
    /// Signal cancellation to every token cloned from this channel
    pub fn cancel(&self) {
        let _ = self.tx.send(true);
    }
}

/// Create a cancel channel
pub fn cancel_channel() -> (CancelHandle, CancelToken) {
    let (tx, rx) = watch::channel(false);
    (CancelHandle { tx }, CancelToken { rx: Some(rx) })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_cancel_interrupts_pending_operation() {
        let (handle, token) = cancel_channel();

        let waiter = tokio::spawn({
            let token = token.clone();
            async move {
                token
                    .run("sleep", async {
                        tokio::time::sleep(Duration::from_secs(60)).await;
                        Ok(())
                    })
                    .await
            }
        });

        handle.cancel();
        let result = waiter.await.unwrap();
        assert!(matches!(
            result,
            Err(ClientError::Cancelled { operation: "sleep" })
        ));
        assert!(token.is_cancelled());
    }

    #[tokio::test(start_paused = true)]
    async fn test_none_token_never_fires() {
        let token = CancelToken::none();
        let raced = tokio::time::timeout(Duration::from_secs(5), token.cancelled()).await;
        assert!(raced.is_err());
        assert!(!token.is_cancelled());
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropped_handle_does_not_cancel() {
        let (handle, token) = cancel_channel();
        drop(handle);

        let raced = tokio::time::timeout(Duration::from_secs(5), token.cancelled()).await;
        assert!(raced.is_err());
        assert_eq!(token.run("noop", async { Ok(7) }).await.unwrap(), 7);
    }

    #[test]
    fn test_pre_cancelled_token_skips_future() {
        let (handle, token) = cancel_channel();
        tokio_test::assert_ok!(tokio_test::block_on(token.run("noop", async { Ok(()) })));

        handle.cancel();
        let polled = std::sync::atomic::AtomicBool::new(false);
        let result = tokio_test::block_on(token.run("noop", async {
            polled.store(true, std::sync::atomic::Ordering::SeqCst);
            Ok(())
        }));
        tokio_test::assert_err!(result);
        assert!(!polled.load(std::sync::atomic::Ordering::SeqCst));
    }
}

use std::future::{pending, Future};
use std::time::Duration;

use error_stack::Report;
use tokio::sync::watch;

use kernel::KernelError;

/// Bounds a service call with an optional deadline and an optional cancellation signal.
///
/// Store statements are atomic, so abandoning a call never leaves a half-applied write.
#[derive(Debug, Clone, Default)]
pub struct CallScope {
    timeout: Option<Duration>,
    cancellation: Option<watch::Receiver<bool>>,
}

#[derive(Debug)]
pub struct Canceller(watch::Sender<bool>);

impl Canceller {
    pub fn cancel(&self) {
        self.0.send_replace(true);
    }
}

impl CallScope {
    pub fn unbounded() -> Self {
        Self::default()
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            timeout: Some(timeout),
            cancellation: None,
        }
    }

    pub fn cancellable(self) -> (Self, Canceller) {
        let (sender, receiver) = watch::channel(false);
        let scope = Self {
            cancellation: Some(receiver),
            ..self
        };
        (scope, Canceller(sender))
    }

    pub async fn run<F, T>(&self, future: F) -> error_stack::Result<T, KernelError>
    where
        F: Future<Output = error_stack::Result<T, KernelError>>,
    {
        let timeout = self.timeout;
        let bounded = async move {
            match timeout {
                Some(limit) => match tokio::time::timeout(limit, future).await {
                    Ok(result) => result,
                    Err(_) => Err(Report::new(KernelError::Timeout)
                        .attach_printable(format!("Call exceeded {limit:?}"))),
                },
                None => future.await,
            }
        };

        match self.cancellation.clone() {
            None => bounded.await,
            Some(mut cancellation) => {
                tokio::select! {
                    biased;
                    _ = cancelled(&mut cancellation) => Err(Report::new(KernelError::Cancelled)
                        .attach_printable("Call cancelled before completion")),
                    result = bounded => result,
                }
            }
        }
    }
}

async fn cancelled(receiver: &mut watch::Receiver<bool>) {
    loop {
        if *receiver.borrow_and_update() {
            return;
        }
        if receiver.changed().await.is_err() {
            // Canceller dropped without firing.
            pending::<()>().await;
        }
    }
}

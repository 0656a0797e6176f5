//! Cancellable handles to in-flight requests.

use std::{
    future::Future,
    pin::Pin,
    task::{Context, Poll},
};

use tokio::task::JoinHandle;

use crate::client::error::ClientError;

/// A request running on the tokio runtime.
///
/// Awaiting the handle yields the request's result. [`RequestHandle::cancel`]
/// abandons the request: the task is aborted without waiting for the
/// exchange to finish, and awaiting the handle yields
/// [`ClientError::Cancelled`].
///
/// Dropping the handle detaches the request; it keeps running.
#[derive(Debug)]
pub struct RequestHandle<R> {
    /// Task driving the request
    task: JoinHandle<Result<R, ClientError>>,
}

impl<R: Send + 'static> RequestHandle<R> {
    /// Spawns `future` on the current tokio runtime.
    ///
    /// # Panics
    ///
    /// Panics when called outside a tokio runtime.
    pub fn spawn<F>(future: F) -> Self
    where
        F: Future<Output = Result<R, ClientError>> + Send + 'static,
    {
        RequestHandle {
            task: tokio::spawn(future),
        }
    }
}

impl RequestHandle<()> {
    /// Spawns `future` and hands its result to `callback` once it completes.
    ///
    /// The callback runs at most once, and never after [`RequestHandle::cancel`].
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use matrix_client::{client::{MatrixClient, RequestHandle}, endpoints::Homeserver};
    ///
    /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let client = MatrixClient::new(&Homeserver::from_url("https://matrix.org")?)?;
    /// let handle = RequestHandle::spawn_with_callback(
    ///     async move { client.login_flows().await },
    ///     |result| println!("{result:?}"),
    /// );
    /// handle.cancel();
    /// # Ok(())
    /// # }
    /// ```
    pub fn spawn_with_callback<F, R, C>(future: F, callback: C) -> Self
    where
        F: Future<Output = Result<R, ClientError>> + Send + 'static,
        R: Send + 'static,
        C: FnOnce(Result<R, ClientError>) + Send + 'static,
    {
        RequestHandle::spawn(async move {
            callback(future.await);
            Ok(())
        })
    }
}

impl<R> RequestHandle<R> {
    /// Aborts the request. Has no effect once it has completed.
    pub fn cancel(&self) {
        self.task.abort();
    }

    /// Whether the request has completed, failed or been cancelled.
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl<R> Future for RequestHandle<R> {
    type Output = Result<R, ClientError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.task).poll(cx).map(|joined| match joined {
            Ok(result) => result,
            Err(e) if e.is_cancelled() => Err(ClientError::Cancelled),
            Err(e) => Err(ClientError::TaskFailed(e.to_string())),
        })
    }
}

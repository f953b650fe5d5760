//! LifecyclePromise - キャッシュされる build / mount の shared future
//!
//! 作成と同時に tokio に spawn されるため、誰も await しなくても進行します。
//! clone はすべて同じ結果を受け取り、`ptr_eq` で同一性を比較できます。

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures::FutureExt;
use futures::future::{BoxFuture, Shared};

use crate::domain::LifecycleError;

pub type LifecycleResult = Result<(), LifecycleError>;

#[derive(Clone)]
pub struct LifecyclePromise {
    inner: Shared<BoxFuture<'static, LifecycleResult>>,
}

impl LifecyclePromise {
    /// Wraps the future without starting it; call [`detach`](Self::detach)
    /// once the promise has been cached.
    pub(crate) fn new<F>(future: F) -> Self
    where
        F: Future<Output = LifecycleResult> + Send + 'static,
    {
        Self {
            inner: future.boxed().shared(),
        }
    }

    /// Drives the promise on the runtime without an explicit waiter.
    pub(crate) fn detach(&self) {
        let driver = self.inner.clone();
        tokio::spawn(async move {
            let _ = driver.await;
        });
    }

    /// A promise that has already settled.
    pub(crate) fn settled(result: LifecycleResult) -> Self {
        Self::new(futures::future::ready(result))
    }

    /// True when both handles share the same underlying future.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Shared::ptr_eq(&self.inner, &other.inner)
    }

    /// The result, if the promise already settled.
    pub fn peek(&self) -> Option<LifecycleResult> {
        self.inner.peek().cloned()
    }
}

impl Future for LifecyclePromise {
    type Output = LifecycleResult;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        self.inner.poll_unpin(cx)
    }
}

impl std::fmt::Debug for LifecyclePromise {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LifecyclePromise")
            .field("settled", &self.peek())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn clones_share_identity_and_result() {
        let promise = LifecyclePromise::new(async { Err(LifecycleError::Cancelled) });
        let copy = promise.clone();
        let other = LifecyclePromise::settled(Ok(()));

        assert!(promise.ptr_eq(&copy));
        assert!(!promise.ptr_eq(&other));

        promise.detach();
        assert_eq!(copy.await, Err(LifecycleError::Cancelled));
        assert_eq!(promise.peek(), Some(Err(LifecycleError::Cancelled)));
    }

    #[tokio::test]
    async fn detached_promise_runs_without_waiters() {
        let (tx, rx) = tokio::sync::oneshot::channel();
        let promise = LifecyclePromise::new(async move {
            let _ = tx.send(());
            Ok(())
        });
        promise.detach();
        rx.await.unwrap();
    }
}

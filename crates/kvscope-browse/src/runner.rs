use std::future::Future;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use kvscope_types::RequestId;

/// Holds the single authoritative request of one kind.
///
/// Starting a request cancels the previous one in the same step, so two
/// requests are never authoritative at once.
#[derive(Debug, Default)]
pub struct RequestSlot {
    last_id: RequestId,
    active: Option<(RequestId, CancellationToken)>,
}

impl RequestSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cancel whatever is in flight and register a new request
    pub fn start(&mut self) -> (RequestId, CancellationToken) {
        if let Some((old_id, token)) = self.active.take() {
            tracing::debug!(%old_id, "superseding in-flight request");
            token.cancel();
        }

        self.last_id = self.last_id.next();
        let token = CancellationToken::new();
        self.active = Some((self.last_id, token.clone()));
        (self.last_id, token)
    }

    /// Mark `id` finished. Returns false if `id` is no longer authoritative.
    pub fn finish(&mut self, id: RequestId) -> bool {
        if self.is_current(id) {
            self.active = None;
            true
        } else {
            false
        }
    }

    pub fn is_current(&self, id: RequestId) -> bool {
        self.active.as_ref().is_some_and(|(active, _)| *active == id)
    }

    /// Cancel the in-flight request, if any. Returns true if one was cancelled.
    pub fn cancel(&mut self) -> bool {
        match self.active.take() {
            Some((_, token)) => {
                token.cancel();
                true
            }
            None => false,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }
}

/// Runs API calls on the runtime and delivers their results to the event loop
pub struct RequestRunner<M> {
    /// Completion channel back to the event loop
    tx: mpsc::UnboundedSender<M>,

    /// Cancelled on shutdown so detached work stops too
    shutdown: CancellationToken,

    /// Spawned task handles
    tasks: Vec<tokio::task::JoinHandle<()>>,
}

impl<M: Send + 'static> RequestRunner<M> {
    pub fn new(tx: mpsc::UnboundedSender<M>) -> Self {
        Self {
            tx,
            shutdown: CancellationToken::new(),
            tasks: Vec::new(),
        }
    }

    /// Spawn a cancellable request. Once `cancel` fires, the result is
    /// dropped even if the call itself completes.
    pub fn spawn<F>(&mut self, cancel: CancellationToken, task: F)
    where
        F: Future<Output = M> + Send + 'static,
    {
        let tx = self.tx.clone();
        let shutdown = self.shutdown.clone();

        self.track(tokio::spawn(async move {
            tokio::select! {
                biased;

                _ = cancel.cancelled() => {}
                _ = shutdown.cancelled() => {}

                message = task => {
                    if !cancel.is_cancelled() {
                        let _ = tx.send(message);
                    }
                }
            }
        }));
    }

    /// Spawn a request that always runs to completion (mutations)
    pub fn spawn_detached<F>(&mut self, task: F)
    where
        F: Future<Output = M> + Send + 'static,
    {
        self.spawn(CancellationToken::new(), task);
    }

    /// Stop every outstanding request
    pub fn stop(&mut self) {
        self.shutdown.cancel();
        for task in self.tasks.drain(..) {
            task.abort();
        }
        self.shutdown = CancellationToken::new();
    }

    fn track(&mut self, handle: tokio::task::JoinHandle<()>) {
        self.tasks.retain(|t| !t.is_finished());
        self.tasks.push(handle);
    }
}

impl<M> Drop for RequestRunner<M> {
    fn drop(&mut self) {
        self.shutdown.cancel();
        for task in self.tasks.drain(..) {
            task.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::sync::oneshot;

    #[test]
    fn test_slot_start_cancels_previous() {
        let mut slot = RequestSlot::new();
        let (first, first_token) = slot.start();
        let (second, second_token) = slot.start();

        assert!(first_token.is_cancelled());
        assert!(!second_token.is_cancelled());
        assert!(!slot.is_current(first));
        assert!(!slot.finish(first));
        assert!(slot.finish(second));
        assert!(!slot.is_active());
    }

    #[test]
    fn test_slot_cancel() {
        let mut slot = RequestSlot::new();
        let (_, token) = slot.start();
        assert!(slot.cancel());
        assert!(token.is_cancelled());
        assert!(!slot.cancel());
    }

    #[tokio::test]
    async fn test_runner_delivers_result() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut runner = RequestRunner::new(tx);
        runner.spawn(CancellationToken::new(), async { 7 });

        let value = tokio::time::timeout(Duration::from_secs(1), rx.recv())
            .await
            .unwrap();
        assert_eq!(value, Some(7));
    }

    #[tokio::test]
    async fn test_cancelled_request_delivers_nothing() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut runner = RequestRunner::new(tx);
        let token = CancellationToken::new();
        let (release_tx, release_rx) = oneshot::channel::<()>();

        runner.spawn(token.clone(), async move {
            let _ = release_rx.await;
            1
        });
        runner.spawn_detached(async { 2 });

        token.cancel();
        let _ = release_tx.send(());

        let value = tokio::time::timeout(Duration::from_secs(1), rx.recv())
            .await
            .unwrap();
        assert_eq!(value, Some(2));

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(rx.try_recv().is_err());
    }
}

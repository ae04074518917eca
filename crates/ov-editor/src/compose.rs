//! Debounced page recomposition.
//!
//! Every acknowledged mutation marks the page dirty. Recomposition runs
//! once the page has been quiet for the configured delay; a newer mark
//! supersedes any pending one, so a burst of edits costs one recompose.

use crate::backend::{Backend, PageRef};
use crate::sync::{Outcome, bounded};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::mpsc::UnboundedSender;

pub(crate) struct ComposeScheduler<B> {
    backend: Arc<B>,
    page: PageRef,
    delay: Duration,
    timeout: Duration,
    enabled: bool,
    generation: AtomicU64,
    outcomes: UnboundedSender<Outcome>,
    runtime: Handle,
}

impl<B: Backend> ComposeScheduler<B> {
    pub(crate) fn new(
        backend: Arc<B>,
        page: PageRef,
        delay: Duration,
        timeout: Duration,
        enabled: bool,
        outcomes: UnboundedSender<Outcome>,
        runtime: Handle,
    ) -> Self {
        Self {
            backend,
            page,
            delay,
            timeout,
            enabled,
            generation: AtomicU64::new(0),
            outcomes,
            runtime,
        }
    }

    /// Mark the page dirty and restart the quiet window.
    pub(crate) fn touch(self: &Arc<Self>) {
        if !self.enabled {
            return;
        }
        let mine = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let this = Arc::clone(self);
        self.runtime.spawn(async move {
            tokio::time::sleep(this.delay).await;
            if this.generation.load(Ordering::SeqCst) != mine {
                return;
            }
            this.run().await;
        });
    }

    /// Recompose right away, cancelling any pending window.
    pub(crate) fn flush(self: &Arc<Self>) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        let this = Arc::clone(self);
        self.runtime.spawn(async move { this.run().await });
    }

    async fn run(&self) {
        log::debug!("recomposing {}", self.page);
        let result = bounded(self.timeout, self.backend.recompose(&self.page)).await;
        // The engine may be gone already; nothing to report to then.
        let _ = self.outcomes.send(Outcome::Composed(result));
    }
}

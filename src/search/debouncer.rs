use super::hybrid::{HybridSearch, SearchResults};
use crate::error::ApiResult;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::trace;

/// A value produced by the work scheduled for one input generation
#[derive(Debug, Clone, PartialEq)]
pub struct Tagged<T> {
    pub generation: u64,
    pub value: T,
}

/// A cancellable timer that runs work after a period of inactivity.
///
/// Each `schedule` bumps the generation and resets the timer. Only the timer
/// that fires starts its task; the task then runs detached, so a later input
/// never cancels a request already on the wire. Results carry their generation
/// so that a slow, superseded response can be recognised and dropped.
#[derive(Debug)]
pub struct Debouncer {
    /// The duration to wait after the last event before triggering
    delay: Duration,
    /// Latest generation handed out
    generation: Arc<AtomicU64>,
    /// Timer for the pending generation, if it hasn't fired yet
    timer: Option<JoinHandle<()>>,
}

impl Debouncer {
    /// Create a new debouncer with the specified delay in milliseconds
    pub fn new(delay_ms: u64) -> Self {
        Self {
            delay: Duration::from_millis(delay_ms),
            generation: Arc::new(AtomicU64::new(0)),
            timer: None,
        }
    }

    /// Register an event; `task` runs once `delay` passes without another one
    pub fn schedule<F, Fut>(&mut self, task: F) -> u64
    where
        F: FnOnce(u64) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.cancel_timer();

        let delay = self.delay;
        self.timer = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            trace!(target: "search", "Debounce timer fired for generation {}", generation);
            tokio::spawn(task(generation));
        }));

        generation
    }

    /// True if no newer event has been registered since `generation`
    pub fn is_current(&self, generation: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == generation
    }

    pub fn latest(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// Check if a timer is still waiting to fire
    pub fn is_pending(&self) -> bool {
        self.timer.as_ref().map_or(false, |t| !t.is_finished())
    }

    /// Reset the debouncer, cancelling any timer that hasn't fired.
    /// Results of already started work become stale.
    pub fn reset(&mut self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.cancel_timer();
    }

    fn cancel_timer(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.cancel_timer();
    }
}

pub type SearchOutcome = Tagged<ApiResult<SearchResults>>;

/// Search-as-you-type on top of `HybridSearch`
pub struct DebouncedSearch {
    search: Arc<HybridSearch>,
    debouncer: Debouncer,
    results: mpsc::UnboundedSender<SearchOutcome>,
}

impl DebouncedSearch {
    /// Returns the search and the channel its outcomes arrive on
    pub fn new(
        search: Arc<HybridSearch>,
        delay_ms: u64,
    ) -> (Self, mpsc::UnboundedReceiver<SearchOutcome>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Self {
                search,
                debouncer: Debouncer::new(delay_ms),
                results: tx,
            },
            rx,
        )
    }

    /// The search input changed; returns the generation the eventual result will carry
    pub fn input(&mut self, term: &str, category: &str, page: u32) -> u64 {
        let search = self.search.clone();
        let results = self.results.clone();
        let term = term.to_string();
        let category = category.to_string();

        self.debouncer.schedule(move |generation| async move {
            let value = search.search(&term, &category, page).await;
            let _ = results.send(Tagged { generation, value });
        })
    }

    /// Unwrap an outcome unless a newer input has superseded it
    pub fn accept(&self, outcome: SearchOutcome) -> Option<ApiResult<SearchResults>> {
        if self.debouncer.is_current(outcome.generation) {
            Some(outcome.value)
        } else {
            trace!(
                target: "search",
                "Discarding stale results (generation {} < {})",
                outcome.generation,
                self.debouncer.latest()
            );
            None
        }
    }

    pub fn cancel(&mut self) {
        self.debouncer.reset();
    }

    pub fn is_pending(&self) -> bool {
        self.debouncer.is_pending()
    }
}

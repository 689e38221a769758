//! Page controller
//!
//! The controller owns a single worker task. Navigation calls are queued on
//! an unbounded channel and handled strictly one at a time: resolve against
//! the latest snapshot, fetch, reconcile, publish. Snapshots are broadcast
//! through a `watch` channel, so observers only ever see whole states.

use super::reconciler::{begin_fetch, reconcile};
use super::resolver::resolve;
use super::types::{Navigation, PageRequest, PageResponse, PagerState, Phase, Settled};
use crate::config::PagerConfig;
use crate::error::{Error, Result};
use crate::source::PageSource;
use futures::FutureExt;
use serde::Serialize;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;
use tokio::sync::{mpsc, oneshot, watch};
use tracing::{debug, info};

/// Shared, immutable controller state
pub type Snapshot<R> = Arc<PagerState<R>>;

enum Command<R> {
    Navigate {
        navigation: Navigation,
        reply: oneshot::Sender<Settled<R>>,
    },
    Flush {
        reply: oneshot::Sender<Snapshot<R>>,
    },
}

// ============================================================================
// Stats
// ============================================================================

#[derive(Debug, Default)]
struct Counters {
    dispatched: AtomicU64,
    loaded: AtomicU64,
    failed: AtomicU64,
    skipped: AtomicU64,
}

/// Navigation counters since the controller was created
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PagerStats {
    /// Fetches sent to the page source
    pub fetches_dispatched: u64,
    /// Fetches committed as the visible page
    pub pages_loaded: u64,
    /// Fetches that ended in the error phase
    pub fetches_failed: u64,
    /// Out-of-range navigations absorbed without a fetch
    pub navigations_skipped: u64,
}

// ============================================================================
// Pending
// ============================================================================

/// A queued navigation.
///
/// The navigation runs whether or not this is awaited; awaiting it reports
/// how it settled.
pub struct Pending<R> {
    reply: oneshot::Receiver<Settled<R>>,
}

impl<R> Future for Pending<R> {
    type Output = Settled<R>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        self.reply
            .poll_unpin(cx)
            .map(|settled| settled.unwrap_or(Settled::Cancelled))
    }
}

// ============================================================================
// Controller
// ============================================================================

/// Cursor-based pagination controller.
///
/// Created with [`PageController::initialize`], which immediately queues a
/// load of page 1. Dropping the controller disposes it.
///
/// ```rust,ignore
/// let source = HttpPageSource::<serde_json::Value>::new(config.source.clone())?;
/// let pager = PageController::from_config(source, &config)?;
///
/// let first = pager.idle().await;
/// if let Settled::Loaded(page) = pager.next_page().await {
///     println!("page {}/{}", page.current_page(), page.total_pages());
/// }
/// ```
pub struct PageController<R> {
    commands: mpsc::UnboundedSender<Command<R>>,
    state: watch::Receiver<Snapshot<R>>,
    shutdown: watch::Sender<bool>,
    generation: Arc<AtomicU64>,
    counters: Arc<Counters>,
}

impl<R: Clone + Send + Sync + 'static> PageController<R> {
    /// Start a controller over `source` and queue the initial load of page 1.
    ///
    /// Must be called inside a Tokio runtime.
    pub fn initialize<S>(source: S, page_size: u32) -> Result<Self>
    where
        S: PageSource<Record = R> + 'static,
    {
        Self::spawn(source, page_size, None)
    }

    /// Start a controller using the paging settings of a config
    pub fn from_config<S>(source: S, config: &PagerConfig) -> Result<Self>
    where
        S: PageSource<Record = R> + 'static,
    {
        config.validate()?;
        Self::spawn(source, config.page_size, config.fetch_timeout())
    }

    /// Start a controller whose fetches give up after `timeout`
    pub fn with_fetch_timeout<S>(source: S, page_size: u32, timeout: Duration) -> Result<Self>
    where
        S: PageSource<Record = R> + 'static,
    {
        Self::spawn(source, page_size, Some(timeout))
    }

    fn spawn<S>(source: S, page_size: u32, fetch_timeout: Option<Duration>) -> Result<Self>
    where
        S: PageSource<Record = R> + 'static,
    {
        if page_size == 0 {
            return Err(Error::invalid_value("page_size", "must be at least 1"));
        }
        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|e| Error::config(format!("PageController needs a Tokio runtime: {e}")))?;

        let (commands, command_rx) = mpsc::unbounded_channel();
        let (state_tx, state) = watch::channel(Arc::new(PagerState::new(page_size)));
        let (shutdown, shutdown_rx) = watch::channel(false);
        let generation = Arc::new(AtomicU64::new(0));
        let counters = Arc::new(Counters::default());

        let worker = Worker {
            source,
            commands: command_rx,
            state: state_tx,
            shutdown: shutdown_rx,
            epoch: generation.load(Ordering::Acquire),
            generation: Arc::clone(&generation),
            counters: Arc::clone(&counters),
            fetch_timeout,
            in_flight: false,
        };
        runtime.spawn(worker.run());

        let controller = Self {
            commands,
            state,
            shutdown,
            generation,
            counters,
        };

        info!("Page controller started (page size {page_size})");
        let (initial, _) = oneshot::channel();
        controller.dispatch(Navigation::GoTo(1), initial);

        Ok(controller)
    }
}

impl<R> PageController<R> {
    /// Navigate to page `page` (no-op outside `[1, total_pages]`)
    pub fn go_to_page(&self, page: u32) -> Pending<R> {
        self.navigate(Navigation::GoTo(page))
    }

    /// Navigate one page forward (no-op on the last page)
    pub fn next_page(&self) -> Pending<R> {
        self.navigate(Navigation::Next)
    }

    /// Navigate one page back (no-op on the first page)
    pub fn previous_page(&self) -> Pending<R> {
        self.navigate(Navigation::Previous)
    }

    /// Navigate to page 1
    pub fn first_page(&self) -> Pending<R> {
        self.navigate(Navigation::First)
    }

    /// Re-fetch the current page
    pub fn reload(&self) -> Pending<R> {
        self.navigate(Navigation::Reload)
    }

    /// Change the page size and reload from page 1 (no-op for zero)
    pub fn set_page_size(&self, page_size: u32) -> Pending<R> {
        self.navigate(Navigation::Resize(page_size))
    }

    /// Queue an arbitrary navigation
    pub fn navigate(&self, navigation: Navigation) -> Pending<R> {
        let (reply, rx) = oneshot::channel();
        self.dispatch(navigation, reply);
        Pending { reply: rx }
    }

    fn dispatch(&self, navigation: Navigation, reply: oneshot::Sender<Settled<R>>) {
        if self
            .commands
            .send(Command::Navigate { navigation, reply })
            .is_err()
        {
            debug!("Navigation {navigation:?} after disposal ignored");
        }
    }

    /// Wait until every navigation queued so far has settled, then return
    /// the current snapshot
    pub async fn idle(&self) -> Snapshot<R> {
        let (reply, rx) = oneshot::channel();
        if self.commands.send(Command::Flush { reply }).is_ok() {
            if let Ok(snapshot) = rx.await {
                return snapshot;
            }
        }
        self.snapshot()
    }

    /// Current snapshot
    pub fn snapshot(&self) -> Snapshot<R> {
        Arc::clone(&self.state.borrow())
    }

    /// Receive every snapshot published from now on
    pub fn subscribe(&self) -> watch::Receiver<Snapshot<R>> {
        let mut rx = self.state.clone();
        drop(rx.borrow_and_update());
        rx
    }

    /// Navigation counters
    pub fn stats(&self) -> PagerStats {
        PagerStats {
            fetches_dispatched: self.counters.dispatched.load(Ordering::Relaxed),
            pages_loaded: self.counters.loaded.load(Ordering::Relaxed),
            fetches_failed: self.counters.failed.load(Ordering::Relaxed),
            navigations_skipped: self.counters.skipped.load(Ordering::Relaxed),
        }
    }

    /// Whether [`Self::dispose`] has been called
    pub fn is_disposed(&self) -> bool {
        *self.shutdown.borrow()
    }

    /// Stop the controller.
    ///
    /// An in-flight fetch is dropped and its result, if it still arrives,
    /// is never applied. Queued navigations settle as `Cancelled`.
    pub fn dispose(&self) {
        if self.is_disposed() {
            return;
        }
        self.generation.fetch_add(1, Ordering::AcqRel);
        self.shutdown.send_replace(true);
        info!("Page controller disposed");
    }
}

impl<R> Drop for PageController<R> {
    fn drop(&mut self) {
        self.dispose();
    }
}

impl<R> std::fmt::Debug for PageController<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("PageController")
            .field("current_page", &state.current_page())
            .field("total_pages", &state.total_pages())
            .field("phase", &state.phase())
            .field("disposed", &self.is_disposed())
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Worker
// ============================================================================

struct Worker<S: PageSource> {
    source: S,
    commands: mpsc::UnboundedReceiver<Command<S::Record>>,
    state: watch::Sender<Snapshot<S::Record>>,
    shutdown: watch::Receiver<bool>,
    generation: Arc<AtomicU64>,
    epoch: u64,
    counters: Arc<Counters>,
    fetch_timeout: Option<Duration>,
    in_flight: bool,
}

impl<S: PageSource> Worker<S> {
    async fn run(mut self) {
        loop {
            // The only change ever sent on `shutdown` is disposal.
            let command = tokio::select! {
                biased;
                _ = self.shutdown.changed() => break,
                command = self.commands.recv() => match command {
                    Some(command) => command,
                    None => break,
                },
            };

            let keep_running = match command {
                Command::Navigate { navigation, reply } => {
                    self.navigate(navigation, reply).await
                }
                Command::Flush { reply } => {
                    let _ = reply.send(Arc::clone(&self.state.borrow()));
                    true
                }
            };

            if !keep_running {
                break;
            }
        }

        debug!("Page controller worker stopped");
    }

    /// Handle one navigation; returns false once the controller is disposed
    async fn navigate(
        &mut self,
        navigation: Navigation,
        reply: oneshot::Sender<Settled<S::Record>>,
    ) -> bool {
        let prior = Arc::clone(&self.state.borrow());

        let Some(request) = resolve(navigation, &prior) else {
            self.counters.skipped.fetch_add(1, Ordering::Relaxed);
            debug!(
                "Ignoring {navigation:?} at page {}/{}",
                prior.current_page(),
                prior.total_pages()
            );
            let _ = reply.send(Settled::Skipped);
            return true;
        };

        debug_assert!(!self.in_flight, "page fetch already in flight");
        self.in_flight = true;
        self.counters.dispatched.fetch_add(1, Ordering::Relaxed);

        let fetching = Arc::new(begin_fetch(&prior));
        self.state.send_replace(Arc::clone(&fetching));
        debug!("Dispatching fetch for page {} (size {})", request.page, request.size);

        let outcome = tokio::select! {
            biased;
            _ = self.shutdown.changed() => None,
            outcome = fetch(&self.source, &request, self.fetch_timeout) => Some(outcome),
        };
        self.in_flight = false;

        let Some(outcome) = outcome else {
            debug!("Disposed while fetching page {}", request.page);
            let _ = reply.send(Settled::Cancelled);
            return false;
        };

        if self.generation.load(Ordering::Acquire) != self.epoch {
            debug!("Discarding page {} fetched after disposal", request.page);
            let _ = reply.send(Settled::Cancelled);
            return false;
        }

        let next = Arc::new(reconcile(&fetching, &request, outcome));
        let settled = if next.phase() == Phase::Error {
            self.counters.failed.fetch_add(1, Ordering::Relaxed);
            Settled::Failed(Arc::clone(&next))
        } else {
            self.counters.loaded.fetch_add(1, Ordering::Relaxed);
            Settled::Loaded(Arc::clone(&next))
        };

        self.state.send_replace(next);
        let _ = reply.send(settled);
        true
    }
}

/// Run one fetch, bounded by the optional timeout
async fn fetch<S: PageSource>(
    source: &S,
    request: &PageRequest,
    timeout: Option<Duration>,
) -> Result<PageResponse<S::Record>> {
    match timeout {
        Some(limit) => tokio::time::timeout(limit, source.fetch_page(request))
            .await
            .unwrap_or_else(|_| {
                Err(Error::Timeout {
                    timeout_ms: limit.as_millis() as u64,
                })
            }),
        None => source.fetch_page(request).await,
    }
}

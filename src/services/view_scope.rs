//! Lifetime and ordering guard for asynchronous loads bound to one view.
//!
//! Each call to [`ViewScope::begin_fetch`] cancels the load started before it
//! and hands out a [`FetchTicket`]. Only the holder of the newest ticket may
//! publish results, so the last issued request always wins regardless of the
//! order in which responses arrive. Closing the scope cancels everything.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};

use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::error::{AppError, AppResult};

#[derive(Debug, Clone)]
pub struct FetchTicket {
    generation: u64,
    token: CancellationToken,
}

impl FetchTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}

/// The newest fetch. Generation and token change together.
#[derive(Debug)]
struct CurrentFetch {
    generation: u64,
    token: CancellationToken,
}

#[derive(Debug)]
pub struct ViewScope {
    name: &'static str,
    root: CancellationToken,
    current: Mutex<CurrentFetch>,
    closed: AtomicBool,
}

impl ViewScope {
    pub fn new(name: &'static str) -> Self {
        let root = CancellationToken::new();
        let current = CurrentFetch {
            generation: 0,
            token: root.child_token(),
        };
        Self {
            name,
            root,
            current: Mutex::new(current),
            closed: AtomicBool::new(false),
        }
    }

    /// Supersedes any in-flight load and returns the ticket for the new one.
    pub fn begin_fetch(&self) -> FetchTicket {
        let ticket = {
            let mut current = self.current();
            current.token.cancel();
            current.generation += 1;
            current.token = self.root.child_token();
            FetchTicket {
                generation: current.generation,
                token: current.token.clone(),
            }
        };
        debug!(
            target: "app::view",
            view = self.name,
            generation = ticket.generation,
            "fetch started"
        );
        ticket
    }

    /// True while `ticket` is the newest one and the view is still open.
    pub fn is_current(&self, ticket: &FetchTicket) -> bool {
        if self.is_closed() || ticket.token.is_cancelled() {
            return false;
        }
        self.current().generation == ticket.generation
    }

    /// Drives `future` until it completes or the ticket is cancelled.
    pub async fn run<F, T>(&self, ticket: &FetchTicket, future: F) -> AppResult<T>
    where
        F: Future<Output = AppResult<T>>,
    {
        tokio::select! {
            biased;
            () = ticket.token.cancelled() => {
                debug!(
                    target: "app::view",
                    view = self.name,
                    generation = ticket.generation,
                    "fetch superseded"
                );
                Err(AppError::cancelled())
            }
            result = future => result,
        }
    }

    pub fn close(&self) {
        if !self.closed.swap(true, Ordering::SeqCst) {
            self.root.cancel();
            debug!(target: "app::view", view = self.name, "view closed");
        }
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    fn current(&self) -> MutexGuard<'_, CurrentFetch> {
        self.current
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Drop for ViewScope {
    fn drop(&mut self) {
        self.root.cancel();
    }
}

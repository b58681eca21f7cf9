//! Latest-wins coordination for searches issued back to back.
//!
//! Starting a search cancels the one before it, and a result that arrives
//! after being superseded is dropped instead of replacing newer output.

use std::future::Future;
use std::sync::{Mutex, PoisonError};
use std::sync::atomic::{AtomicU64, Ordering};

use log::debug;
use tokio_util::sync::CancellationToken;

/// Handle for one in-flight search
#[derive(Debug, Clone)]
pub struct Ticket {
    id: u64,
    token: CancellationToken,
}

impl Ticket {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    pub async fn cancelled(&self) {
        self.token.cancelled().await
    }
}

#[derive(Debug, Default)]
pub struct SearchSession {
    latest: AtomicU64,
    in_flight: Mutex<Option<CancellationToken>>,
}

impl SearchSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new search, cancelling whichever one was in flight.
    pub fn begin(&self) -> Ticket {
        let token = CancellationToken::new();
        let previous = self
            .in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .replace(token.clone());
        if let Some(previous) = previous {
            previous.cancel();
        }

        let id = self.latest.fetch_add(1, Ordering::SeqCst) + 1;
        debug!("Search {id} started");
        Ticket { id, token }
    }

    pub fn is_current(&self, ticket: &Ticket) -> bool {
        !ticket.is_cancelled() && self.latest.load(Ordering::SeqCst) == ticket.id
    }

    /// Keep `value` only if `ticket` is still the latest search.
    pub fn accept<T>(&self, ticket: &Ticket, value: T) -> Option<T> {
        if self.is_current(ticket) {
            Some(value)
        } else {
            debug!("Discarding superseded result of search {}", ticket.id);
            None
        }
    }

    /// Cancel the in-flight search, if any.
    pub fn cancel(&self) {
        if let Some(token) = self.in_flight.lock().unwrap_or_else(PoisonError::into_inner).take() {
            token.cancel();
        }
    }

    /// Run `search` as the latest search. Returns `None` if it was cancelled
    /// or superseded before its result could be used.
    pub async fn run<F, T>(&self, search: F) -> Option<T>
    where
        F: Future<Output = T>,
    {
        let ticket = self.begin();
        let value = tokio::select! {
            _ = ticket.cancelled() => {
                debug!("Search {} cancelled", ticket.id);
                return None;
            }
            value = search => value,
        };
        self.accept(&ticket, value)
    }
}

//! "Load more" pagination state.
//!
//! ```text
//! Idle -> Loading(Initial) -> Loaded | Failed
//! Loaded -> Loading(More) -> Loaded (appended) | Failed (keeps items)
//! ```
//!
//! There is no total count: `has_more` is inferred from whether the last
//! batch was full-sized. Every request gets a [`Ticket`]; resetting bumps the
//! generation, so a response issued before the reset is discarded instead of
//! overwriting newer results.

use serde::Serialize;

use super::fetch::Page;
use crate::store::Cursor;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LoadKind {
    Initial,
    More,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase", tag = "state", content = "detail")]
pub enum LoadState {
    Idle,
    Loading(LoadKind),
    Loaded,
    Failed(String),
}

impl LoadState {
    #[must_use]
    pub const fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

/// Proof that a request was started at a given generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub struct Ticket {
    generation: u64,
    kind: LoadKind,
}

impl Ticket {
    #[must_use]
    pub const fn kind(&self) -> LoadKind {
        self.kind
    }
}

/// Accumulated pages of one query.
#[derive(Debug, Clone)]
pub struct PageTracker<T> {
    items: Vec<T>,
    cursor: Option<Cursor>,
    has_more: bool,
    generation: u64,
    state: LoadState,
}

impl<T> Default for PageTracker<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            cursor: None,
            has_more: false,
            generation: 0,
            state: LoadState::Idle,
        }
    }
}

impl<T> PageTracker<T> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop all pages and the cursor. In-flight requests become stale.
    pub fn reset(&mut self) {
        self.generation += 1;
        self.items.clear();
        self.cursor = None;
        self.has_more = false;
        self.state = LoadState::Idle;
    }

    /// Start loading page one, discarding anything loaded so far.
    pub fn begin_initial(&mut self) -> Ticket {
        self.reset();
        self.state = LoadState::Loading(LoadKind::Initial);
        Ticket {
            generation: self.generation,
            kind: LoadKind::Initial,
        }
    }

    /// Start loading the next page. `None` unless a page is loaded and
    /// more are available.
    pub fn begin_more(&mut self) -> Option<Ticket> {
        if self.state != LoadState::Loaded || !self.has_more {
            return None;
        }
        self.state = LoadState::Loading(LoadKind::More);
        Some(Ticket {
            generation: self.generation,
            kind: LoadKind::More,
        })
    }

    fn is_current(&self, ticket: Ticket) -> bool {
        ticket.generation == self.generation && self.state == LoadState::Loading(ticket.kind)
    }

    /// Record a successful response. Returns `false` if the ticket is stale
    /// and the page was discarded.
    pub fn complete(&mut self, ticket: Ticket, page: Page<T>) -> bool {
        if !self.is_current(ticket) {
            return false;
        }
        self.items.extend(page.items);
        if page.next_cursor.is_some() {
            self.cursor = page.next_cursor;
        }
        self.has_more = page.has_more;
        self.state = LoadState::Loaded;
        true
    }

    /// Record a failed response. Loaded items are kept.
    pub fn fail(&mut self, ticket: Ticket, error: impl Into<String>) -> bool {
        if !self.is_current(ticket) {
            return false;
        }
        self.state = LoadState::Failed(error.into());
        true
    }

    #[must_use]
    pub fn items(&self) -> &[T] {
        &self.items
    }

    #[must_use]
    pub fn into_items(self) -> Vec<T> {
        self.items
    }

    /// Cursor after the last loaded record.
    #[must_use]
    pub const fn cursor(&self) -> Option<&Cursor> {
        self.cursor.as_ref()
    }

    #[must_use]
    pub const fn has_more(&self) -> bool {
        self.has_more
    }

    #[must_use]
    pub const fn state(&self) -> &LoadState {
        &self.state
    }
}

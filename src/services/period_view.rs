//! A page whose content depends on the selected reporting period.
//!
//! The view keeps the last successfully loaded value. Changing the period
//! supersedes the previous load; a failed load is logged and the prior value
//! stays on screen. Nothing is published after [`PeriodView::close`].
//!
//! Selector changes and fetch tickets are issued under the state write lock,
//! and results are published under the same lock, so ticket order always
//! matches selector order and `selection` always names the period of `data`.

use std::sync::{Arc, Mutex, RwLock, RwLockWriteGuard};

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::{AppError, AppResult};
use crate::models::period::{PeriodSelection, PeriodToken};
use crate::models::session::UserSession;
use crate::services::period_selector::PeriodSelector;
use crate::services::view_scope::{FetchTicket, ViewScope};

#[async_trait]
pub trait PeriodLoader: Send + Sync {
    type Output: Clone + Send + Sync + 'static;

    fn name(&self) -> &'static str;

    async fn load(&self, session: &UserSession, selection: PeriodSelection)
        -> AppResult<Self::Output>;
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewState<T> {
    /// Period that `data` was loaded for.
    pub selection: PeriodSelection,
    pub picker_label: String,
    pub loading: bool,
    pub data: Option<T>,
}

/// What happened to one load request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    Applied,
    /// A newer request or a close made this one irrelevant.
    Superseded,
    /// The load failed; the previous data is still shown.
    KeptPrevious,
    /// A partial date pick; nothing was requested.
    Pending,
}

enum Request {
    Fetch(FetchTicket, PeriodSelection),
    Pending,
    Closed,
}

pub struct PeriodView<L: PeriodLoader> {
    loader: L,
    session: UserSession,
    scope: ViewScope,
    selector: Mutex<PeriodSelector>,
    state: RwLock<ViewState<L::Output>>,
}

impl<L: PeriodLoader> PeriodView<L> {
    pub fn new(loader: L, session: UserSession, initial: PeriodSelection) -> Arc<Self> {
        let selector = PeriodSelector::new(initial);
        let state = ViewState {
            selection: initial,
            picker_label: selector.picker_label(),
            loading: false,
            data: None,
        };
        Arc::new(Self {
            scope: ViewScope::new(loader.name()),
            loader,
            session,
            selector: Mutex::new(selector),
            state: RwLock::new(state),
        })
    }

    pub fn state(&self) -> ViewState<L::Output> {
        match self.state.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn selection(&self) -> PeriodSelection {
        self.with_selector(|selector| selector.value())
    }

    /// Loads data for the current selection.
    pub async fn refresh(&self) -> LoadOutcome {
        let request = self.request(|selector| Some(selector.value()));
        self.load(request).await
    }

    pub async fn select_preset(&self, token: PeriodToken) -> LoadOutcome {
        let request = self.request(|selector| Some(selector.select_preset(token)));
        self.load(request).await
    }

    pub async fn pick_date(&self, day: NaiveDate) -> LoadOutcome {
        let request = self.request(|selector| selector.pick_date(day));
        self.load(request).await
    }

    pub fn close(&self) {
        self.scope.close();
    }

    pub fn is_closed(&self) -> bool {
        self.scope.is_closed()
    }

    /// Applies a selector change and, when it yields a complete selection,
    /// supersedes the in-flight load with a new ticket.
    fn request(
        &self,
        change: impl FnOnce(&mut PeriodSelector) -> Option<PeriodSelection>,
    ) -> Request {
        let mut state = self.write_state();
        if self.scope.is_closed() {
            return Request::Closed;
        }

        let (picked, label) = self.with_selector(|selector| {
            let picked = change(selector);
            (picked, selector.picker_label())
        });
        state.picker_label = label;

        match picked {
            Some(selection) => {
                state.loading = true;
                Request::Fetch(self.scope.begin_fetch(), selection)
            }
            None => Request::Pending,
        }
    }

    async fn load(&self, request: Request) -> LoadOutcome {
        let (ticket, selection) = match request {
            Request::Fetch(ticket, selection) => (ticket, selection),
            Request::Pending => return LoadOutcome::Pending,
            Request::Closed => return LoadOutcome::Superseded,
        };

        let result = self
            .scope
            .run(&ticket, self.loader.load(&self.session, selection))
            .await;

        let mut state = self.write_state();
        if !self.scope.is_current(&ticket) {
            debug!(
                target: "app::view",
                view = self.loader.name(),
                generation = ticket.generation(),
                "discarding stale result"
            );
            return LoadOutcome::Superseded;
        }

        match result {
            Ok(data) => {
                state.selection = selection;
                state.data = Some(data);
                state.loading = false;
                LoadOutcome::Applied
            }
            Err(AppError::Cancelled) => LoadOutcome::Superseded,
            Err(error) => {
                warn!(
                    target: "app::view",
                    view = self.loader.name(),
                    error = %error,
                    "load failed, keeping previous data"
                );
                state.loading = false;
                LoadOutcome::KeptPrevious
            }
        }
    }

    fn with_selector<R>(&self, f: impl FnOnce(&mut PeriodSelector) -> R) -> R {
        let mut guard = self
            .selector
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        f(&mut guard)
    }

    fn write_state(&self) -> RwLockWriteGuard<'_, ViewState<L::Output>> {
        self.state
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl<L: PeriodLoader> Drop for PeriodView<L> {
    fn drop(&mut self) {
        self.scope.close();
    }
}

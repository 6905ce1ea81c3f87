// ============================================================================
// DASHBOARD VIEWMODEL - Freshness window + in-flight guard
// ============================================================================
// initiate_fetch decides synchronously (skip or mark in-flight) and returns
// the future doing the request, so two calls in the same tick cannot both
// get through. The in-flight flag is released on every exit path, including
// a dropped future.
// ============================================================================

use std::future::Future;
use std::rc::Rc;

use crate::error::ClientError;
use crate::models::{DashboardData, ExpenseForm, NewExpense};
use crate::services::api_client::ApiClient;
use crate::services::budget_service;
use crate::state::dashboard_state::Dashboard;
use crate::state::reactivity::ReactiveState;
use crate::state::session_state::SessionState;
use crate::utils::clock::Clock;
use crate::utils::constants::{ADD_EXPENSE_ERROR, CATEGORIES_LOAD_ERROR, DASHBOARD_LOAD_ERROR};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    InFlight,
    Fresh,
    SignedOut,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    Skipped(SkipReason),
    Refreshed,
    Failed(ClientError),
    /// The session changed while the request was in flight
    Discarded,
}

#[derive(Clone)]
pub struct DashboardViewModel {
    api: ApiClient,
    session: SessionState,
    clock: Rc<dyn Clock>,
    freshness_ms: f64,
    state: ReactiveState<Dashboard>,
}

/// Clears `in_flight` when dropped unless the fetch already did
struct InFlightGuard {
    state: ReactiveState<Dashboard>,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        if self.state.with(|d| d.in_flight) {
            self.state.update(|d| d.in_flight = false);
        }
    }
}

impl DashboardViewModel {
    pub fn new(
        api: ApiClient,
        session: SessionState,
        clock: Rc<dyn Clock>,
        freshness_ms: f64,
    ) -> Self {
        Self {
            api,
            session,
            clock,
            freshness_ms,
            state: ReactiveState::new(Dashboard::default()),
        }
    }

    pub fn state(&self) -> &ReactiveState<Dashboard> {
        &self.state
    }

    pub fn dashboard(&self) -> Dashboard {
        self.state.get()
    }

    pub fn subscribe<F>(&self, callback: F)
    where
        F: Fn() + 'static,
    {
        self.state.subscribe(callback);
    }

    /// At most one request in flight; without `force`, none within the
    /// freshness window of the last success
    pub fn initiate_fetch(&self, force: bool) -> impl Future<Output = FetchOutcome> + 'static {
        let decision = self.begin_fetch(force);
        let this = self.clone();
        async move {
            let (epoch, guard) = match decision {
                Ok(started) => started,
                Err(reason) => return FetchOutcome::Skipped(reason),
            };
            let result = budget_service::fetch_dashboard(&this.api).await;
            let outcome = this.finish_fetch(epoch, result);
            drop(guard);
            outcome
        }
    }

    fn begin_fetch(&self, force: bool) -> Result<(u64, InFlightGuard), SkipReason> {
        if !self.session.is_authenticated() {
            return Err(SkipReason::SignedOut);
        }
        let now = self.clock.now_ms();
        let skip = self.state.with(|d| {
            if d.in_flight {
                Some(SkipReason::InFlight)
            } else if !force && d.is_fresh(now, self.freshness_ms) {
                Some(SkipReason::Fresh)
            } else {
                None
            }
        });
        if let Some(reason) = skip {
            log::debug!("📊 [DASHBOARD] Fetch skipped: {:?}", reason);
            return Err(reason);
        }

        log::info!("📊 [DASHBOARD] Fetching (force={})", force);
        self.state.update(|d| {
            d.in_flight = true;
            d.error = None;
        });
        let guard = InFlightGuard {
            state: self.state.clone(),
        };
        Ok((self.session.epoch(), guard))
    }

    fn finish_fetch(&self, epoch: u64, result: Result<DashboardData, ClientError>) -> FetchOutcome {
        if self.session.epoch() != epoch {
            log::info!("📊 [DASHBOARD] Session changed during fetch, response dropped");
            return FetchOutcome::Discarded;
        }
        match result {
            Ok(data) => {
                let now = self.clock.now_ms();
                log::info!(
                    "✅ [DASHBOARD] Loaded ({} recent transactions)",
                    data.recent_transactions.len()
                );
                self.state.update(|d| {
                    d.data = Some(data);
                    d.last_fetch_ms = Some(now);
                    d.in_flight = false;
                    d.error = None;
                });
                FetchOutcome::Refreshed
            }
            Err(e) => {
                log::error!("❌ [DASHBOARD] Fetch failed: {}", e);
                self.state.update(|d| {
                    d.in_flight = false;
                    if !e.is_unauthorized() {
                        d.error = Some(DASHBOARD_LOAD_ERROR.to_string());
                    }
                });
                FetchOutcome::Failed(e)
            }
        }
    }

    /// Validates locally, posts, then forces a dashboard refresh
    pub fn add_expense(
        &self,
        form: &ExpenseForm,
    ) -> impl Future<Output = Result<(), ClientError>> + 'static {
        let prepared = self.begin_submit(form);
        let this = self.clone();
        async move {
            let (epoch, expense) = prepared?;
            let result = budget_service::add_expense(&this.api, &expense).await;

            if this.session.epoch() != epoch {
                this.state.update(|d| d.submitting = false);
                return Err(ClientError::Superseded);
            }

            match result {
                Ok(()) => {
                    log::info!("💸 [DASHBOARD] Expense added: {}", expense.description);
                    this.state.update(|d| {
                        d.submitting = false;
                        d.form_open = false;
                        d.form_error = None;
                        d.form.clear();
                    });
                    this.initiate_fetch(true).await;
                    Ok(())
                }
                Err(e) => {
                    log::error!("❌ [DASHBOARD] Adding expense failed: {}", e);
                    this.state.update(|d| {
                        d.submitting = false;
                        if !e.is_unauthorized() {
                            d.form_error = Some(ADD_EXPENSE_ERROR.to_string());
                        }
                    });
                    Err(e)
                }
            }
        }
    }

    fn begin_submit(&self, form: &ExpenseForm) -> Result<(u64, NewExpense), ClientError> {
        if self.state.with(|d| d.submitting) {
            return Err(ClientError::Superseded);
        }
        let expense = match form.to_new_expense() {
            Ok(expense) => expense,
            Err(form_error) => {
                self.state
                    .update(|d| d.form_error = Some(form_error.to_string()));
                return Err(form_error.into());
            }
        };
        self.state.update(|d| {
            d.submitting = true;
            d.form_error = None;
        });
        Ok((self.session.epoch(), expense))
    }

    /// Fills the category picker of the expense form
    pub fn load_categories(&self) -> impl Future<Output = Result<(), ClientError>> + 'static {
        let this = self.clone();
        async move {
            match budget_service::fetch_categories(&this.api).await {
                Ok(categories) => {
                    log::info!("🏷️ [DASHBOARD] {} categories", categories.len());
                    this.state.update(|d| d.categories = categories);
                    Ok(())
                }
                Err(e) => {
                    log::warn!("⚠️ [DASHBOARD] Categories unavailable: {}", e);
                    this.state
                        .update(|d| d.form_error = Some(CATEGORIES_LOAD_ERROR.to_string()));
                    Err(e)
                }
            }
        }
    }

    /// Opens the expense form, dated today unless a date is already typed in
    pub fn open_form(&self) {
        let today = chrono::DateTime::from_timestamp_millis(self.clock.now_ms() as i64)
            .map(|now| now.date_naive().format("%Y-%m-%d").to_string());
        self.state.update(|d| {
            d.form_open = true;
            d.form_error = None;
            if d.form.expense_date.is_empty() {
                if let Some(today) = today {
                    d.form.expense_date = today;
                }
            }
        });
    }

    pub fn close_form(&self) {
        self.state.update(|d| {
            d.form_open = false;
            d.form_error = None;
        });
    }

    /// Keystroke edits; no re-render
    pub fn edit_form<F>(&self, edit: F)
    where
        F: FnOnce(&mut ExpenseForm),
    {
        self.state.update_silently(|d| edit(&mut d.form));
    }

    pub fn dismiss_error(&self) {
        self.state.update(|d| d.error = None);
    }

    /// Drops everything cached for the previous user
    pub fn reset(&self) {
        self.state.update(Dashboard::reset);
    }
}

// ============================================================================
// DASHBOARD STATE - Cached snapshot, fetch guard and expense form
// ============================================================================

use crate::models::{Category, DashboardData, ExpenseForm};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dashboard {
    /// Last successful snapshot, replaced wholesale
    pub data: Option<DashboardData>,
    /// Completion time of the last successful fetch (ms)
    pub last_fetch_ms: Option<f64>,
    pub in_flight: bool,
    /// Dismissible banner
    pub error: Option<String>,

    pub categories: Vec<Category>,
    pub form: ExpenseForm,
    pub form_open: bool,
    pub form_error: Option<String>,
    pub submitting: bool,
}

impl Dashboard {
    pub fn is_fresh(&self, now_ms: f64, window_ms: f64) -> bool {
        self.last_fetch_ms
            .map(|last| now_ms - last < window_ms)
            .unwrap_or(false)
    }

    /// Spinner only for the very first load
    pub fn is_initial_load(&self) -> bool {
        self.in_flight && self.data.is_none()
    }

    /// Back to the signed-out state; an in-flight fetch keeps its flag
    pub fn reset(&mut self) {
        let in_flight = self.in_flight;
        *self = Self::default();
        self.in_flight = in_flight;
    }
}

// ============================================================================
// BUDGET SERVICE - dashboard, expenses and categories
// ============================================================================

use crate::error::ClientError;
use crate::models::{Category, DashboardData, NewExpense};
use crate::services::api_client::ApiClient;

/// `GET /budgets/dashboard`
pub async fn fetch_dashboard(api: &ApiClient) -> Result<DashboardData, ClientError> {
    api.get("/budgets/dashboard").await
}

/// `POST /budgets/expenses`. The created record is ignored; the dashboard
/// is refetched afterwards.
pub async fn add_expense(api: &ApiClient, expense: &NewExpense) -> Result<(), ClientError> {
    api.post_json_ack("/budgets/expenses", expense).await
}

/// `GET /categories`, enveloped or as a bare array
pub async fn fetch_categories(api: &ApiClient) -> Result<Vec<Category>, ClientError> {
    api.get("/categories").await
}

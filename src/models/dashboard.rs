use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Usage above this percentage is shown as a warning
pub const WARNING_USAGE_PERCENT: f64 = 70.0;
/// Usage above this percentage is shown as critical
pub const CRITICAL_USAGE_PERCENT: f64 = 90.0;

/// Aggregated dashboard returned by `GET /budgets/dashboard`.
/// Totals are computed server-side; the client only derives display values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardData {
    #[serde(default)]
    pub total_expenses: f64,
    #[serde(default)]
    pub monthly_budget: f64,
    #[serde(default)]
    pub budget_used: f64,
    #[serde(default)]
    pub budget_remaining: Option<f64>,
    #[serde(default)]
    pub recent_transactions: Vec<Transaction>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub amount: f64,
    #[serde(default, alias = "category")]
    pub category_name: Option<String>,
    #[serde(default, alias = "date")]
    pub expense_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UsageLevel {
    Healthy,
    Warning,
    Critical,
}

impl UsageLevel {
    pub fn css_class(&self) -> &'static str {
        match self {
            UsageLevel::Healthy => "bg-green-500",
            UsageLevel::Warning => "bg-yellow-500",
            UsageLevel::Critical => "bg-red-500",
        }
    }
}

impl DashboardData {
    /// Remaining budget; derived from the totals when the server leaves it out
    pub fn remaining(&self) -> f64 {
        self.budget_remaining
            .unwrap_or(self.monthly_budget - self.budget_used)
    }

    pub fn is_over_budget(&self) -> bool {
        self.budget_used > self.monthly_budget
    }

    /// Amount spent beyond the budget, zero when within it
    pub fn overspend(&self) -> f64 {
        (self.budget_used - self.monthly_budget).max(0.0)
    }

    /// Share of the monthly budget used, 0 when no budget is set
    pub fn usage_percent(&self) -> f64 {
        if self.monthly_budget > 0.0 {
            self.budget_used / self.monthly_budget * 100.0
        } else {
            0.0
        }
    }

    /// Width of the progress bar, capped at 100%
    pub fn progress_width(&self) -> f64 {
        self.usage_percent().clamp(0.0, 100.0)
    }

    pub fn usage_level(&self) -> UsageLevel {
        let percent = self.usage_percent();
        if percent > CRITICAL_USAGE_PERCENT {
            UsageLevel::Critical
        } else if percent > WARNING_USAGE_PERCENT {
            UsageLevel::Warning
        } else {
            UsageLevel::Healthy
        }
    }

    pub fn has_transactions(&self) -> bool {
        !self.recent_transactions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn over_budget_dashboard_shows_negative_remaining() {
        let data: DashboardData =
            serde_json::from_value(json!({"monthlyBudget": 1000, "budgetUsed": 1200})).unwrap();
        assert_eq!(data.remaining(), -200.0);
        assert!(data.is_over_budget());
        assert_eq!(data.overspend(), 200.0);
        assert_eq!(data.usage_level(), UsageLevel::Critical);
        assert_eq!(data.progress_width(), 100.0);
    }

    #[test]
    fn server_remaining_takes_precedence() {
        let data: DashboardData = serde_json::from_value(json!({
            "monthlyBudget": 1000,
            "budgetUsed": 200,
            "budgetRemaining": 750
        }))
        .unwrap();
        assert_eq!(data.remaining(), 750.0);
        assert!(!data.is_over_budget());
    }

    #[test]
    fn usage_levels_follow_thresholds() {
        let at = |used: f64| DashboardData {
            monthly_budget: 100.0,
            budget_used: used,
            ..DashboardData::default()
        };
        assert_eq!(at(70.0).usage_level(), UsageLevel::Healthy);
        assert_eq!(at(71.0).usage_level(), UsageLevel::Warning);
        assert_eq!(at(90.5).usage_level(), UsageLevel::Critical);
    }

    #[test]
    fn zero_budget_means_zero_usage() {
        let data = DashboardData {
            budget_used: 50.0,
            ..DashboardData::default()
        };
        assert_eq!(data.usage_percent(), 0.0);
        assert!(data.is_over_budget());
    }

    #[test]
    fn transactions_accept_short_field_names() {
        let data: DashboardData = serde_json::from_value(json!({
            "recentTransactions": [
                {"id": 1, "description": "Coffee", "amount": 3.5, "category": "GROCERIES", "date": "2025-03-14"},
                {"id": 2, "description": "Fuel", "amount": 40, "categoryName": "GAS", "expenseDate": "2025-03-15"}
            ]
        }))
        .unwrap();
        assert_eq!(data.recent_transactions.len(), 2);
        assert_eq!(data.recent_transactions[0].category_name.as_deref(), Some("GROCERIES"));
        assert_eq!(
            data.recent_transactions[1].expense_date,
            NaiveDate::from_ymd_opt(2025, 3, 15)
        );
    }
}

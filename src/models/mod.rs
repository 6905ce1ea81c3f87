pub mod api;
pub mod auth;
pub mod dashboard;
pub mod expense;

pub use api::ApiEnvelope;
pub use auth::{
    AuthPayload, LoginRequest, RegisterOutcome, RegisterPayload, RegisterRequest, User, UserPatch,
};
pub use dashboard::{DashboardData, Transaction, UsageLevel};
pub use expense::{Category, ExpenseForm, NewExpense};

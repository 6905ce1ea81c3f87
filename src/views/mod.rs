// ============================================================================
// VIEWS - Pure rendering; every action goes through AppContext
// ============================================================================

pub mod app;
pub mod dashboard;
pub mod expense_modal;
pub mod login;
pub mod navbar;

pub use app::render_app;
pub use login::LoginForm;

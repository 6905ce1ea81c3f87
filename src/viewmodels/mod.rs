pub mod dashboard_viewmodel;
pub mod session_viewmodel;

pub use dashboard_viewmodel::{DashboardViewModel, FetchOutcome, SkipReason};
pub use session_viewmodel::SessionViewModel;

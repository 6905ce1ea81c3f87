// ============================================================================
// STATE MODULE - Rc<RefCell> state with notifications
// ============================================================================

pub mod app_state;
pub mod dashboard_state;
pub mod reactivity;
pub mod session_state;

pub use app_state::{AppContext, Route, Screen};
pub use dashboard_state::Dashboard;
pub use reactivity::{EventSignal, ReactiveState, Subscribers};
pub use session_state::{Session, SessionState};

// ============================================================================
// APP STATE - Application context and route guards
// ============================================================================
// AppContext is built once at startup and passed explicitly to views. It is
// the only place that reacts to the gateway's unauthorized signal.
// ============================================================================

use std::rc::Rc;

use crate::error::ClientError;
use crate::models::User;
use crate::services::api_client::ApiClient;
use crate::state::reactivity::ReactiveState;
use crate::state::session_state::Session;
use crate::utils::clock::Clock;
use crate::viewmodels::{DashboardViewModel, SessionViewModel};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Login,
    Dashboard,
}

impl Route {
    pub fn path(&self) -> &'static str {
        match self {
            Route::Login => "/login",
            Route::Dashboard => "/",
        }
    }

    pub fn from_path(path: &str) -> Self {
        match path.trim_end_matches('/') {
            "/login" => Route::Login,
            _ => Route::Dashboard,
        }
    }
}

/// What actually gets rendered once the guards have run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Loading,
    Login,
    Dashboard,
}

impl Screen {
    /// Protected routes need a user; the login route redirects signed-in users
    pub fn resolve(route: Route, session: &Session) -> Screen {
        if session.loading {
            return Screen::Loading;
        }
        match (route, session.is_authenticated()) {
            (_, false) => Screen::Login,
            (Route::Login, true) | (Route::Dashboard, true) => Screen::Dashboard,
        }
    }
}

#[derive(Clone)]
pub struct AppContext {
    pub api: ApiClient,
    pub session: SessionViewModel,
    pub dashboard: DashboardViewModel,
    pub route: ReactiveState<Route>,
}

impl AppContext {
    pub fn new(api: ApiClient, clock: Rc<dyn Clock>, freshness_ms: f64, initial: Route) -> Self {
        let session = SessionViewModel::new(api.clone());
        let dashboard =
            DashboardViewModel::new(api.clone(), session.state().clone(), clock, freshness_ms);
        let route = ReactiveState::new(initial);

        let (on_session, on_dashboard, on_route) =
            (session.clone(), dashboard.clone(), route.clone());
        api.on_unauthorized(move || {
            log::warn!("🔒 [APP] Unauthorized, back to login");
            on_session.expire();
            on_dashboard.reset();
            if on_route.get() != Route::Login {
                on_route.set(Route::Login);
            }
        });

        Self {
            api,
            session,
            dashboard,
            route,
        }
    }

    pub fn screen(&self) -> Screen {
        Screen::resolve(self.route.get(), &self.session.session())
    }

    pub fn navigate(&self, route: Route) {
        if self.route.get() != route {
            log::info!("🧭 [APP] -> {}", route.path());
            self.route.set(route);
        }
    }

    pub async fn login(&self, identifier: &str, secret: &str) -> Result<User, ClientError> {
        let user = self.session.login(identifier, secret).await?;
        self.navigate(Route::Dashboard);
        Ok(user)
    }

    pub async fn logout(&self) {
        let notify = self.session.logout();
        self.dashboard.reset();
        self.navigate(Route::Login);
        notify.await;
    }

    /// Re-render hook: fires on any session, dashboard or route change
    pub fn subscribe<F>(&self, callback: F)
    where
        F: Fn() + 'static,
    {
        let callback: Rc<dyn Fn()> = Rc::new(callback);
        let on_session = callback.clone();
        self.session.subscribe(move || on_session());
        let on_dashboard = callback.clone();
        self.dashboard.subscribe(move || on_dashboard());
        self.route.subscribe(move || callback());
    }
}

// ============================================================================
// APP - Root component: wiring, render scheduling, background refresh
// ============================================================================

use std::cell::Cell;
use std::rc::Rc;

use gloo_timers::callback::{Interval, Timeout};
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;
use web_sys::Element;

use crate::config::CONFIG;
use crate::dom::{append_child, clear_children, current_path, get_element_by_id, replace_path};
use crate::services::{ApiClient, GlooTransport};
use crate::state::{AppContext, ReactiveState, Route, Screen};
use crate::utils::{LocalTokenStore, MirroredTokenStore, SystemClock, TOKEN_STORAGE_KEY};
use crate::views::{render_app, LoginForm};

thread_local! {
    static RENDER_PENDING: Cell<bool> = Cell::new(false);
}

/// Coalesces every change notified in the same tick into one render
fn schedule_render() {
    if RENDER_PENDING.with(|pending| pending.replace(true)) {
        return;
    }
    Timeout::new(0, || {
        RENDER_PENDING.with(|pending| pending.set(false));
        crate::rerender_app();
    })
    .forget();
}

pub struct App {
    ctx: AppContext,
    login: ReactiveState<LoginForm>,
    root: Element,
    last_screen: Cell<Option<Screen>>,
    _auto_refresh: Option<Interval>,
}

impl App {
    pub fn new() -> Result<Self, JsValue> {
        let root = get_element_by_id("app")
            .ok_or_else(|| JsValue::from_str("No #app element found"))?;

        log::info!("🌐 [APP] API base URL: {}", CONFIG.api_base_url());
        let api = ApiClient::new(
            CONFIG.api_base_url(),
            Rc::new(GlooTransport),
            Rc::new(MirroredTokenStore::new(LocalTokenStore::new(TOKEN_STORAGE_KEY))),
        );
        let ctx = AppContext::new(
            api,
            Rc::new(SystemClock),
            CONFIG.dashboard_cache_ms(),
            Route::from_path(&current_path()),
        );
        let login = ReactiveState::new(LoginForm::default());

        ctx.subscribe(schedule_render);
        login.subscribe(schedule_render);
        {
            let route = ctx.route.clone();
            ctx.route.subscribe(move || replace_path(route.get().path()));
        }

        let auto_refresh = match CONFIG.dashboard.auto_refresh_seconds {
            0 => None,
            seconds => {
                log::info!("⏱️ [APP] Dashboard auto-refresh every {}s", seconds);
                let dashboard = ctx.dashboard.clone();
                Some(Interval::new(seconds.saturating_mul(1000), move || {
                    let fetch = dashboard.initiate_fetch(false);
                    spawn_local(async move {
                        fetch.await;
                    });
                }))
            }
        };

        let session = ctx.session.clone();
        spawn_local(async move {
            session.initialize().await;
        });

        Ok(Self {
            ctx,
            login,
            root,
            last_screen: Cell::new(None),
            _auto_refresh: auto_refresh,
        })
    }

    pub fn render(&self) -> Result<(), JsValue> {
        let screen = self.ctx.screen();
        let previous = self.last_screen.replace(Some(screen));
        if screen == Screen::Dashboard && previous != Some(Screen::Dashboard) {
            self.enter_dashboard();
        }
        if previous != Some(screen) {
            log::debug!("🎬 [APP] Screen {:?}", screen);
        }

        clear_children(&self.root);
        let view = render_app(&self.ctx, &self.login)?;
        append_child(&self.root, &view)
    }

    /// First load when the dashboard is shown; cached data inside the window is reused
    fn enter_dashboard(&self) {
        self.ctx.navigate(Route::Dashboard);
        let fetch = self.ctx.dashboard.initiate_fetch(false);
        spawn_local(async move {
            fetch.await;
        });
    }
}

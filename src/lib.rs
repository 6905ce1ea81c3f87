// ============================================================================
// MONEYMAPPER WEB - Budget client in pure Rust (MVVM)
// ============================================================================
// - Views: functions that build DOM, no logic
// - ViewModels: session lifecycle and the dashboard fetch guard
// - Services: HTTP only, behind the authenticated gateway
// - State: Rc<RefCell> containers with subscribers
// - Models: wire types shared with the backend
// ============================================================================

pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod state;
pub mod utils;
pub mod viewmodels;

#[cfg(target_arch = "wasm32")]
mod app;
#[cfg(target_arch = "wasm32")]
mod dom;
#[cfg(target_arch = "wasm32")]
mod views;

#[cfg(test)]
mod testing;

#[cfg(target_arch = "wasm32")]
pub use browser::rerender_app;

#[cfg(target_arch = "wasm32")]
mod browser {
    use std::cell::RefCell;
    use wasm_bindgen::prelude::*;

    use crate::app::App;
    use crate::config::CONFIG;

    thread_local! {
        static APP: RefCell<Option<App>> = RefCell::new(None);
    }

    #[wasm_bindgen(start)]
    pub fn main() -> Result<(), JsValue> {
        console_error_panic_hook::set_once();
        if CONFIG.enable_logging {
            wasm_logger::init(wasm_logger::Config::new(CONFIG.log_level()));
        }
        log::info!("🚀 MoneyMapper ({})", CONFIG.environment);

        let app = App::new()?;
        app.render()?;
        APP.with(|cell| *cell.borrow_mut() = Some(app));
        Ok(())
    }

    /// Full re-render of the current screen
    pub fn rerender_app() {
        APP.with(|cell| {
            if let Some(app) = cell.borrow().as_ref() {
                if let Err(e) = app.render() {
                    log::error!("❌ [RERENDER] {:?}", e);
                }
            } else {
                log::warn!("⚠️ [RERENDER] App not initialised yet");
            }
        });
    }
}

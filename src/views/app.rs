use wasm_bindgen::prelude::*;
use web_sys::Element;

use crate::dom::ElementBuilder;
use crate::state::{AppContext, ReactiveState, Screen};
use crate::views::dashboard::render_dashboard;
use crate::views::login::{render_login, LoginForm};
use crate::views::navbar::render_navbar;

/// Top-level view for the screen chosen by the route guards
pub fn render_app(ctx: &AppContext, login: &ReactiveState<LoginForm>) -> Result<Element, JsValue> {
    let content = match ctx.screen() {
        Screen::Loading => ElementBuilder::new("div")?
            .class("app-loading")
            .child(ElementBuilder::new("div")?.class("spinner").text("Loading...").build())?
            .build(),
        Screen::Login => render_login(ctx, login)?,
        Screen::Dashboard => ElementBuilder::new("div")?
            .class("app-shell")
            .child(render_navbar(ctx)?)?
            .child(render_dashboard(ctx)?)?
            .build(),
    };

    Ok(ElementBuilder::new("div")?
        .class("app")
        .child(content)?
        .build())
}

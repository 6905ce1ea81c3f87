use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;
use web_sys::Element;

use crate::dom::{on_click, ElementBuilder};
use crate::state::AppContext;

pub fn render_navbar(ctx: &AppContext) -> Result<Element, JsValue> {
    let name = ctx
        .session
        .session()
        .user
        .map(|u| u.name)
        .unwrap_or_default();

    let logout = ElementBuilder::new("button")?
        .class("btn-link")
        .attr("type", "button")?
        .text("Logout")
        .build();
    {
        let ctx = ctx.clone();
        on_click(&logout, move |_| {
            let ctx = ctx.clone();
            spawn_local(async move { ctx.logout().await });
        })?;
    }

    let right = ElementBuilder::new("div")?
        .class("navbar-user")
        .child(ElementBuilder::new("span")?.class("navbar-name").text(&name).build())?
        .child(logout)?
        .build();

    Ok(ElementBuilder::new("nav")?
        .class("navbar")
        .child(ElementBuilder::new("span")?.class("navbar-brand").text("💰 MoneyMapper").build())?
        .child(right)?
        .build())
}

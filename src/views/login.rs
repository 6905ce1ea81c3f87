// ============================================================================
// LOGIN VIEW
// ============================================================================

use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;
use web_sys::Element;

use crate::dom::{on_submit, on_value, ElementBuilder};
use crate::state::{AppContext, ReactiveState};

/// Login form values kept across re-renders
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoginForm {
    pub identifier: String,
    pub password: String,
    pub error: Option<String>,
    pub submitting: bool,
}

pub fn render_login(ctx: &AppContext, form: &ReactiveState<LoginForm>) -> Result<Element, JsValue> {
    let values = form.get();

    let identifier = ElementBuilder::new("input")?
        .class("form-input")
        .attr("type", "text")?
        .attr("name", "username")?
        .attr("placeholder", "Username or email")?
        .attr("autocomplete", "username")?
        .attr("value", &values.identifier)?
        .flag("disabled", values.submitting)?
        .build();
    {
        let form = form.clone();
        on_value(&identifier, move |value| form.update_silently(|f| f.identifier = value))?;
    }

    let password = ElementBuilder::new("input")?
        .class("form-input")
        .attr("type", "password")?
        .attr("name", "password")?
        .attr("placeholder", "Password")?
        .attr("autocomplete", "current-password")?
        .attr("value", &values.password)?
        .flag("disabled", values.submitting)?
        .build();
    {
        let form = form.clone();
        on_value(&password, move |value| form.update_silently(|f| f.password = value))?;
    }

    let submit = ElementBuilder::new("button")?
        .class("btn-primary w-full")
        .attr("type", "submit")?
        .flag("disabled", values.submitting)?
        .text(if values.submitting { "Signing in..." } else { "Sign in" })
        .build();

    let mut fields = vec![
        field("Username or email", identifier)?,
        field("Password", password)?,
    ];
    if let Some(error) = &values.error {
        fields.push(
            ElementBuilder::new("div")?
                .class("form-error")
                .attr("role", "alert")?
                .text(error)
                .build(),
        );
    }
    fields.push(submit);

    let form_el = ElementBuilder::new("form")?
        .class("login-form")
        .children(fields)?
        .build();
    {
        let (ctx, form) = (ctx.clone(), form.clone());
        on_submit(&form_el, move || submit_login(&ctx, &form))?;
    }

    #[cfg_attr(not(feature = "dev-bypass"), allow(unused_mut))]
    let mut card = vec![
        ElementBuilder::new("h1")?.class("login-title").text("MoneyMapper").build(),
        ElementBuilder::new("p")?
            .class("login-subtitle")
            .text("Sign in to manage your budget")
            .build(),
        form_el,
    ];
    #[cfg(feature = "dev-bypass")]
    card.push(render_dev_bypass(ctx)?);

    ElementBuilder::new("div")?
        .class("login-screen")
        .child(ElementBuilder::new("div")?.class("login-card").children(card)?.build())
        .map(ElementBuilder::build)
}

fn field(label: &str, input: Element) -> Result<Element, JsValue> {
    Ok(ElementBuilder::new("label")?
        .class("form-group")
        .child(ElementBuilder::new("span")?.class("form-label").text(label).build())?
        .child(input)?
        .build())
}

fn submit_login(ctx: &AppContext, form: &ReactiveState<LoginForm>) {
    if form.with(|f| f.submitting) {
        return;
    }
    let (identifier, password) = form.with(|f| (f.identifier.clone(), f.password.clone()));
    form.update(|f| {
        f.submitting = true;
        f.error = None;
    });

    let (ctx, form) = (ctx.clone(), form.clone());
    spawn_local(async move {
        match ctx.login(&identifier, &password).await {
            Ok(_) => form.set(LoginForm::default()),
            Err(e) => form.update(|f| {
                f.submitting = false;
                f.error = Some(e.user_message());
            }),
        }
    });
}

#[cfg(feature = "dev-bypass")]
fn render_dev_bypass(ctx: &AppContext) -> Result<Element, JsValue> {
    use crate::dom::on_click;
    use crate::state::Route;

    let button = ElementBuilder::new("button")?
        .class("btn-secondary w-full")
        .attr("type", "button")?
        .text("Dev bypass")
        .build();
    let ctx = ctx.clone();
    on_click(&button, move |_| {
        ctx.session.dev_bypass();
        ctx.navigate(Route::Dashboard);
    })?;
    Ok(button)
}

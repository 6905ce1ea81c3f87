// ============================================================================
// EXPENSE MODAL - "Add Transaction" form
// ============================================================================

use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;
use web_sys::Element;

use crate::dom::{on_click, on_submit, on_value, ElementBuilder};
use crate::models::ExpenseForm;
use crate::state::{AppContext, Dashboard};

fn input<F>(
    ctx: &AppContext,
    kind: &str,
    value: &str,
    disabled: bool,
    assign: F,
) -> Result<Element, JsValue>
where
    F: Fn(&mut ExpenseForm, String) + 'static,
{
    let mut builder = ElementBuilder::new("input")?
        .class("form-input")
        .attr("type", kind)?
        .attr("value", value)?
        .flag("disabled", disabled)?;
    if kind == "number" {
        builder = builder.attr("step", "0.01")?.attr("min", "0.01")?;
    }
    let element = builder.build();

    let dashboard = ctx.dashboard.clone();
    on_value(&element, move |value| dashboard.edit_form(|form| assign(form, value)))?;
    Ok(element)
}

fn field(label: &str, control: Element) -> Result<Element, JsValue> {
    Ok(ElementBuilder::new("label")?
        .class("form-group")
        .child(ElementBuilder::new("span")?.class("form-label").text(label).build())?
        .child(control)?
        .build())
}

fn category_select(ctx: &AppContext, dashboard: &Dashboard) -> Result<Element, JsValue> {
    let mut options = vec![ElementBuilder::new("option")?
        .attr("value", "")?
        .text("Select a category")
        .build()];
    for category in &dashboard.categories {
        let id = category.id.to_string();
        options.push(
            ElementBuilder::new("option")?
                .attr("value", &id)?
                .flag("selected", dashboard.form.category_id == id)?
                .text(&category.name)
                .build(),
        );
    }

    let select = ElementBuilder::new("select")?
        .class("form-input")
        .flag("disabled", dashboard.submitting)?
        .children(options)?
        .build();
    let vm = ctx.dashboard.clone();
    on_value(&select, move |value| vm.edit_form(|form| form.category_id = value))?;
    Ok(select)
}

pub fn render_expense_modal(ctx: &AppContext, dashboard: &Dashboard) -> Result<Element, JsValue> {
    let form = &dashboard.form;
    let busy = dashboard.submitting;

    let mut fields = vec![
        field(
            "Description",
            input(ctx, "text", &form.description, busy, |f, v| f.description = v)?,
        )?,
        field("Amount", input(ctx, "number", &form.amount, busy, |f, v| f.amount = v)?)?,
        field(
            "Date",
            input(ctx, "date", &form.expense_date, busy, |f, v| f.expense_date = v)?,
        )?,
        field("Category", category_select(ctx, dashboard)?)?,
        field(
            "Memo (optional)",
            input(ctx, "text", &form.memo, busy, |f, v| f.memo = v)?,
        )?,
    ];

    if let Some(error) = &dashboard.form_error {
        fields.push(
            ElementBuilder::new("div")?
                .class("form-error")
                .attr("role", "alert")?
                .text(error)
                .build(),
        );
    }

    let cancel = ElementBuilder::new("button")?
        .class("btn-secondary")
        .attr("type", "button")?
        .flag("disabled", busy)?
        .text("Cancel")
        .build();
    {
        let vm = ctx.dashboard.clone();
        on_click(&cancel, move |_| vm.close_form())?;
    }

    let submit = ElementBuilder::new("button")?
        .class("btn-primary")
        .attr("type", "submit")?
        .flag("disabled", busy)?
        .text(if busy { "Adding..." } else { "Add Transaction" })
        .build();

    fields.push(
        ElementBuilder::new("div")?
            .class("modal-actions")
            .child(cancel)?
            .child(submit)?
            .build(),
    );

    let form_el = ElementBuilder::new("form")?
        .class("expense-form")
        .children(fields)?
        .build();
    {
        let vm = ctx.dashboard.clone();
        on_submit(&form_el, move || {
            let values = vm.state().with(|d| d.form.clone());
            let submission = vm.add_expense(&values);
            spawn_local(async move {
                let _ = submission.await;
            });
        })?;
    }

    let dialog = ElementBuilder::new("div")?
        .class("modal")
        .attr("role", "dialog")?
        .child(ElementBuilder::new("h2")?.class("modal-title").text("Add Transaction").build())?
        .child(form_el)?
        .build();

    Ok(ElementBuilder::new("div")?
        .class("modal-overlay")
        .child(dialog)?
        .build())
}

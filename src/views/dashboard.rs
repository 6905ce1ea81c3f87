// ============================================================================
// DASHBOARD VIEW - totals, budget usage and recent transactions
// ============================================================================

use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;
use web_sys::Element;

use crate::dom::{on_click, ElementBuilder};
use crate::models::{DashboardData, Transaction};
use crate::state::{AppContext, Dashboard};
use crate::utils::format::{format_currency, format_month_year, format_percent, format_short_date};
use crate::views::expense_modal::render_expense_modal;

pub fn render_dashboard(ctx: &AppContext) -> Result<Element, JsValue> {
    let dashboard = ctx.dashboard.dashboard();
    let mut sections = vec![render_header(ctx, &dashboard)?];

    if let Some(error) = &dashboard.error {
        sections.push(render_error_banner(ctx, error)?);
    }

    if dashboard.is_initial_load() {
        sections.push(
            ElementBuilder::new("div")?
                .class("spinner")
                .text("Loading your dashboard...")
                .build(),
        );
    } else if let Some(data) = &dashboard.data {
        sections.push(render_stat_cards(data)?);
        sections.push(render_usage(data)?);
        sections.push(render_transactions(&data.recent_transactions)?);
    }

    if dashboard.form_open {
        sections.push(render_expense_modal(ctx, &dashboard)?);
    }

    Ok(ElementBuilder::new("main")?
        .class("dashboard")
        .children(sections)?
        .build())
}

fn render_header(ctx: &AppContext, dashboard: &Dashboard) -> Result<Element, JsValue> {
    let name = ctx
        .session
        .session()
        .user
        .map(|u| u.name)
        .unwrap_or_default();
    let today = chrono::Utc::now().date_naive();

    let refresh = ElementBuilder::new("button")?
        .class("btn-secondary")
        .attr("type", "button")?
        .flag("disabled", dashboard.in_flight)?
        .text(if dashboard.in_flight { "Refreshing..." } else { "Refresh" })
        .build();
    {
        let ctx = ctx.clone();
        on_click(&refresh, move |_| {
            let fetch = ctx.dashboard.initiate_fetch(true);
            spawn_local(async move {
                fetch.await;
            });
        })?;
    }

    let add = ElementBuilder::new("button")?
        .class("btn-primary")
        .attr("type", "button")?
        .text("+ Add Transaction")
        .build();
    {
        let ctx = ctx.clone();
        on_click(&add, move |_| {
            ctx.dashboard.open_form();
            if ctx.dashboard.state().with(|d| d.categories.is_empty()) {
                let load = ctx.dashboard.load_categories();
                spawn_local(async move {
                    let _ = load.await;
                });
            }
        })?;
    }

    let titles = ElementBuilder::new("div")?
        .child(
            ElementBuilder::new("h1")?
                .class("dashboard-title")
                .text(&format!("Welcome back, {}!", name))
                .build(),
        )?
        .child(
            ElementBuilder::new("p")?
                .class("dashboard-subtitle")
                .text(&format!(
                    "Here's your financial overview for {}",
                    format_month_year(today)
                ))
                .build(),
        )?
        .build();

    Ok(ElementBuilder::new("header")?
        .class("dashboard-header")
        .child(titles)?
        .child(
            ElementBuilder::new("div")?
                .class("dashboard-actions")
                .child(refresh)?
                .child(add)?
                .build(),
        )?
        .build())
}

fn render_error_banner(ctx: &AppContext, error: &str) -> Result<Element, JsValue> {
    let retry = ElementBuilder::new("button")?
        .class("btn-link")
        .attr("type", "button")?
        .text("Try Again")
        .build();
    {
        let ctx = ctx.clone();
        on_click(&retry, move |_| {
            let fetch = ctx.dashboard.initiate_fetch(true);
            spawn_local(async move {
                fetch.await;
            });
        })?;
    }

    let dismiss = ElementBuilder::new("button")?
        .class("btn-icon")
        .attr("type", "button")?
        .attr("aria-label", "Dismiss")?
        .text("×")
        .build();
    {
        let ctx = ctx.clone();
        on_click(&dismiss, move |_| ctx.dashboard.dismiss_error())?;
    }

    Ok(ElementBuilder::new("div")?
        .class("alert alert-error")
        .attr("role", "alert")?
        .child(ElementBuilder::new("span")?.text(error).build())?
        .child(retry)?
        .child(dismiss)?
        .build())
}

fn stat_card(label: &str, value: f64, accent: &str) -> Result<Element, JsValue> {
    Ok(ElementBuilder::new("div")?
        .class("stat-card")
        .child(ElementBuilder::new("p")?.class("stat-label").text(label).build())?
        .child(
            ElementBuilder::new("p")?
                .class(&format!("stat-value {}", accent))
                .text(&format_currency(value))
                .build(),
        )?
        .build())
}

fn render_stat_cards(data: &DashboardData) -> Result<Element, JsValue> {
    let remaining = data.remaining();
    let remaining_accent = if remaining < 0.0 { "text-red-600" } else { "text-green-600" };

    Ok(ElementBuilder::new("section")?
        .class("stat-grid")
        .child(stat_card("Monthly Budget", data.monthly_budget, "text-blue-600")?)?
        .child(stat_card("Total Expenses", data.total_expenses, "text-gray-900")?)?
        .child(stat_card("Remaining", remaining, remaining_accent)?)?
        .build())
}

fn render_usage(data: &DashboardData) -> Result<Element, JsValue> {
    let bar = ElementBuilder::new("div")?
        .class(&format!("progress-bar {}", data.usage_level().css_class()))
        .attr("style", &format!("width: {:.1}%", data.progress_width()))?
        .build();

    let mut children = vec![
        ElementBuilder::new("div")?
            .class("usage-header")
            .child(ElementBuilder::new("span")?.text("Budget Usage").build())?
            .child(
                ElementBuilder::new("span")?
                    .text(&format_percent(data.usage_percent()))
                    .build(),
            )?
            .build(),
        ElementBuilder::new("div")?.class("progress-track").child(bar)?.build(),
    ];
    if data.is_over_budget() {
        children.push(
            ElementBuilder::new("p")?
                .class("over-budget")
                .text(&format!(
                    "You're {} over budget this month!",
                    format_currency(data.overspend())
                ))
                .build(),
        );
    }

    Ok(ElementBuilder::new("section")?
        .class("usage-card")
        .children(children)?
        .build())
}

fn render_transaction(transaction: &Transaction) -> Result<Element, JsValue> {
    let mut meta = transaction
        .category_name
        .clone()
        .unwrap_or_else(|| "Uncategorized".to_string());
    if let Some(date) = transaction.expense_date {
        meta = format!("{} • {}", meta, format_short_date(date));
    }

    let details = ElementBuilder::new("div")?
        .child(
            ElementBuilder::new("p")?
                .class("transaction-description")
                .text(&transaction.description)
                .build(),
        )?
        .child(ElementBuilder::new("p")?.class("transaction-meta").text(&meta).build())?
        .build();

    Ok(ElementBuilder::new("li")?
        .class("transaction")
        .child(details)?
        .child(
            ElementBuilder::new("span")?
                .class("transaction-amount")
                .text(&format!("-{}", format_currency(transaction.amount)))
                .build(),
        )?
        .build())
}

fn render_transactions(transactions: &[Transaction]) -> Result<Element, JsValue> {
    let body = if transactions.is_empty() {
        ElementBuilder::new("p")?
            .class("empty-state")
            .text("No transactions yet")
            .build()
    } else {
        let items = transactions
            .iter()
            .map(render_transaction)
            .collect::<Result<Vec<_>, _>>()?;
        ElementBuilder::new("ul")?
            .class("transaction-list")
            .children(items)?
            .build()
    };

    Ok(ElementBuilder::new("section")?
        .class("transactions-card")
        .child(
            ElementBuilder::new("h2")?
                .class("section-title")
                .text("Recent Transactions")
                .build(),
        )?
        .child(body)?
        .build())
}

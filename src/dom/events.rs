// ============================================================================
// EVENT HANDLING
// ============================================================================
// Listeners on elements are leaked with closure.forget(); the browser drops
// them with the element on the next full render.
// ============================================================================

use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Element, Event, HtmlInputElement, HtmlSelectElement, MouseEvent};

fn listen<F>(element: &Element, event_type: &str, handler: F) -> Result<(), JsValue>
where
    F: FnMut(Event) + 'static,
{
    let closure = Closure::wrap(Box::new(handler) as Box<dyn FnMut(Event)>);
    element.add_event_listener_with_callback(event_type, closure.as_ref().unchecked_ref())?;
    closure.forget();
    Ok(())
}

pub fn on_click<F>(element: &Element, mut handler: F) -> Result<(), JsValue>
where
    F: FnMut(MouseEvent) + 'static,
{
    listen(element, "click", move |event| {
        if let Ok(mouse) = event.dyn_into::<MouseEvent>() {
            handler(mouse);
        }
    })
}

/// Calls `handler` with the field's current value on every keystroke/change
pub fn on_value<F>(element: &Element, mut handler: F) -> Result<(), JsValue>
where
    F: FnMut(String) + 'static,
{
    let event_type = if element.dyn_ref::<HtmlSelectElement>().is_some() {
        "change"
    } else {
        "input"
    };
    listen(element, event_type, move |event| {
        let target = match event.target() {
            Some(target) => target,
            None => return,
        };
        if let Some(input) = target.dyn_ref::<HtmlInputElement>() {
            handler(input.value());
        } else if let Some(select) = target.dyn_ref::<HtmlSelectElement>() {
            handler(select.value());
        }
    })
}

/// Form submission with the browser's navigation suppressed
pub fn on_submit<F>(form: &Element, mut handler: F) -> Result<(), JsValue>
where
    F: FnMut() + 'static,
{
    listen(form, "submit", move |event| {
        event.prevent_default();
        handler();
    })
}

//! DOM side of the calculator.
//!
//! `CsvCalc` owns one component scope: it fetches the CSV, clones the row
//! template once per data row, and listens for `change` events on quantity
//! inputs inside the scope. Totals are computed by the [`Ledger`]; the page
//! only receives the results.

use std::cell::RefCell;
use std::rc::Rc;

use js_sys::Reflect;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Element, Event, Response};

use crate::csv::parse_document;
use crate::error::{CsvCalcError, Result};
use crate::ledger::{Ledger, QuantityUpdate, RowRecord};
use crate::numeric::format_number;
use crate::options::CalcOptions;
use crate::template::{
    cell_selector, parse_cell_marker, selector, RowInstance, TemplateBinding, CELL_ATTR, ID_ATTR,
    INPUT_ATTR, PRICE_ATTR, REPEAT_ATTR, SUM_ATTR, TOTAL_ATTR,
};

fn js_error(context: &str, value: &JsValue) -> CsvCalcError {
    CsvCalcError::Dom(format!("{context}: {value:?}"))
}

/// State shared between the handle, the fetch task and the change listener.
pub(crate) struct State {
    root: Element,
    options: CalcOptions,
    /// Rendered row clones, in CSV order.
    rows: Vec<Element>,
    ledger: Ledger,
}

/// A calculator attached to one element.
#[wasm_bindgen]
pub struct CsvCalc {
    state: Rc<RefCell<State>>,
    change_closure: Option<Closure<dyn FnMut(Event)>>,
}

impl CsvCalc {
    /// Attach the change listener to `root`. Nothing is rendered yet.
    pub(crate) fn attach(root: Element, options: CalcOptions) -> Result<CsvCalc> {
        let state = Rc::new(RefCell::new(State {
            root: root.clone(),
            options,
            rows: Vec::new(),
            ledger: Ledger::default(),
        }));

        let handler_state = Rc::clone(&state);
        let closure = Closure::wrap(Box::new(move |event: Event| {
            handle_change(&handler_state, &event);
        }) as Box<dyn FnMut(Event)>);
        root.add_event_listener_with_callback("change", closure.as_ref().unchecked_ref())
            .map_err(|e| js_error("addEventListener", &e))?;

        Ok(CsvCalc {
            state,
            change_closure: Some(closure),
        })
    }
}

#[wasm_bindgen]
impl CsvCalc {
    /// Attach to `element` without loading anything; call `fetch` or
    /// `load_text` to render rows.
    #[wasm_bindgen(constructor)]
    pub fn new(element: Element, options: JsValue) -> std::result::Result<CsvCalc, JsValue> {
        let options = crate::options_from_js(options)?;
        Ok(Self::attach(element, options)?)
    }

    /// Fetch `file` and render it once the response arrives.
    ///
    /// The returned promise resolves to `undefined` when the attempt is over.
    /// It never rejects: failures are logged and leave the scope without rows.
    #[wasm_bindgen]
    pub fn fetch(&self, file: String) -> js_sys::Promise {
        let state = Rc::clone(&self.state);
        wasm_bindgen_futures::future_to_promise(async move {
            match fetch_text(&file).await {
                Ok(text) => {
                    if let Err(e) = render(&state, &text) {
                        tracing::warn!(file = %file, error = %e, "render failed");
                    }
                }
                Err(e) => tracing::warn!(file = %file, error = %e, "csv fetch failed"),
            }
            Ok(JsValue::UNDEFINED)
        })
    }

    /// Render already-loaded CSV text.
    #[wasm_bindgen]
    pub fn load_text(&self, text: &str) -> std::result::Result<(), JsValue> {
        render(&self.state, text).map_err(JsValue::from)
    }

    /// Number of rendered rows.
    #[wasm_bindgen]
    pub fn row_count(&self) -> usize {
        self.state.borrow().rows.len()
    }

    /// Last computed sum of row `index`, if it has one.
    #[wasm_bindgen]
    pub fn row_sum(&self, index: usize) -> Option<f64> {
        self.state.borrow().ledger.row_sum(index)
    }

    /// Current grand total.
    #[wasm_bindgen]
    pub fn total(&self) -> f64 {
        self.state.borrow().ledger.total()
    }

    /// Stop listening for quantity changes. Rendered rows stay in place.
    #[wasm_bindgen]
    pub fn detach(&mut self) {
        if let Some(closure) = self.change_closure.take() {
            let root = self.state.borrow().root.clone();
            let _ = root
                .remove_event_listener_with_callback("change", closure.as_ref().unchecked_ref());
        }
    }
}

impl Drop for CsvCalc {
    fn drop(&mut self) {
        self.detach();
    }
}

async fn fetch_text(url: &str) -> Result<String> {
    let window =
        web_sys::window().ok_or_else(|| CsvCalcError::Fetch("no window available".into()))?;
    let response = JsFuture::from(window.fetch_with_str(url))
        .await
        .map_err(|e| CsvCalcError::Fetch(format!("{url}: {e:?}")))?;
    let response: Response = response
        .dyn_into()
        .map_err(|_| CsvCalcError::Fetch(format!("{url}: not a Response")))?;
    if !response.ok() {
        return Err(CsvCalcError::Fetch(format!(
            "{url}: HTTP {}",
            response.status()
        )));
    }
    let body = response
        .text()
        .map_err(|e| CsvCalcError::Fetch(format!("{url}: {e:?}")))?;
    let text = JsFuture::from(body)
        .await
        .map_err(|e| CsvCalcError::Fetch(format!("{url}: {e:?}")))?;
    text.as_string()
        .ok_or_else(|| CsvCalcError::Fetch(format!("{url}: body is not text")))
}

fn read_binding(template: &Element) -> Result<TemplateBinding> {
    let id = template
        .query_selector(&selector(ID_ATTR))
        .map_err(|e| js_error("querySelector", &e))?;
    Ok(TemplateBinding {
        id_column: id
            .and_then(|el| el.get_attribute(CELL_ATTR))
            .and_then(|v| parse_cell_marker(&v)),
    })
}

/// Call `f` on every element under `scope` matching `sel`.
fn for_each_match(scope: &Element, sel: &str, mut f: impl FnMut(&Element)) -> Result<()> {
    let list = scope
        .query_selector_all(sel)
        .map_err(|e| js_error("querySelectorAll", &e))?;
    for i in 0..list.length() {
        if let Some(el) = list.item(i).and_then(|n| n.dyn_into::<Element>().ok()) {
            f(&el);
        }
    }
    Ok(())
}

/// Combined text of every `attr` element in `row`, or `None` if there is none.
fn slot_text(row: &Element, attr: &str) -> Result<Option<String>> {
    let mut text: Option<String> = None;
    for_each_match(row, &selector(attr), |el| {
        text.get_or_insert_with(String::new)
            .push_str(&el.text_content().unwrap_or_default());
    })?;
    Ok(text)
}

/// Store the rendered text of slot `attr` in its own attribute.
fn capture_slot(row: &Element, attr: &str) -> Result<Option<String>> {
    let Some(text) = slot_text(row, attr)? else {
        return Ok(None);
    };
    for_each_match(row, &selector(attr), |el| {
        let _ = el.set_attribute(attr, &text);
    })?;
    Ok(Some(text))
}

/// Fill `clone` with one row and return its ledger record.
fn apply_instance(clone: &Element, row: &RowInstance) -> Result<RowRecord> {
    for (n, field) in row.fields.iter().enumerate() {
        for_each_match(clone, &cell_selector(n), |el| el.set_text_content(Some(field)))?;
    }
    // Read back after field injection, before anything else touches the row.
    let id = capture_slot(clone, ID_ATTR)?;
    let price = capture_slot(clone, PRICE_ATTR)?;
    if let Some(name) = &row.input_name {
        for_each_match(clone, &selector(INPUT_ATTR), |el| {
            let _ = el.set_attribute("name", name);
        })?;
    }
    Ok(RowRecord::new(id, price.unwrap_or_default()))
}

/// Parse `text` and render one clone of the template per row.
fn render(state: &Rc<RefCell<State>>, text: &str) -> Result<()> {
    let mut s = state.borrow_mut();

    let Some(template) = s
        .root
        .query_selector(&selector(REPEAT_ATTR))
        .map_err(|e| js_error("querySelector", &e))?
    else {
        tracing::warn!("no row template found, nothing rendered");
        return Ok(());
    };
    let parent = template
        .parent_node()
        .ok_or_else(|| CsvCalcError::Dom("row template is detached".into()))?;

    let options = s.options;
    let binding = read_binding(&template)?;
    let doc = parse_document(text, &options);
    let instances = binding.materialize(&doc);

    let mut rows = Vec::with_capacity(instances.len());
    let mut records = Vec::with_capacity(instances.len());
    for instance in &instances {
        let clone: Element = template
            .clone_node_with_deep(true)
            .map_err(|e| js_error("cloneNode", &e))?
            .dyn_into()
            .map_err(|_| CsvCalcError::Dom("cloned template is not an element".into()))?;
        parent
            .insert_before(&clone, Some(&template))
            .map_err(|e| js_error("insertBefore", &e))?;
        records.push(apply_instance(&clone, instance)?);
        rows.push(clone);
    }
    template.remove();

    tracing::debug!(rows = rows.len(), "rows rendered");
    s.ledger = Ledger::new(records, options.only_integer);
    s.rows.extend(rows);
    Ok(())
}

fn handle_change(state: &Rc<RefCell<State>>, event: &Event) {
    let Some(target) = event.target().and_then(|t| t.dyn_into::<Element>().ok()) else {
        return;
    };
    if !target.has_attribute(INPUT_ATTR) {
        return;
    }

    let mut s = state.borrow_mut();
    let Some(index) = s.rows.iter().position(|row| row.contains(Some(target.as_ref()))) else {
        return;
    };
    let raw = Reflect::get(&target, &JsValue::from_str("value"))
        .ok()
        .and_then(|v| v.as_string())
        .unwrap_or_default();
    let Some(update) = s.ledger.apply_quantity(index, &raw) else {
        return;
    };

    let _ = Reflect::set(
        &target,
        &JsValue::from_str("value"),
        &JsValue::from_str(&update.display),
    );
    if let Err(e) = write_totals(&s, index, &update) {
        tracing::warn!(error = %e, "failed to write totals");
    }
}

fn write_totals(s: &State, index: usize, update: &QuantityUpdate) -> Result<()> {
    if let (Some(sum), Some(row)) = (update.row_sum, s.rows.get(index)) {
        let text = format_number(sum);
        for_each_match(row, &selector(SUM_ATTR), |el| {
            el.set_text_content(Some(&text));
            let _ = el.set_attribute(SUM_ATTR, &text);
        })?;
    }
    if let Some(total) = update.total {
        let text = format_number(total);
        for_each_match(&s.root, &selector(TOTAL_ATTR), |el| {
            el.set_text_content(Some(&text));
            let _ = el.set_attribute(TOTAL_ATTR, &text);
        })?;
    }
    Ok(())
}

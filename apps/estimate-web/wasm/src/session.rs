//! Stateful estimate session
//!
//! Holds the form state in Rust and wires the page's events to the core
//! command handlers. JavaScript only constructs the session and calls
//! `mount()`.

use crate::dom;
use crate::export;
use crate::storage::LocalStorage;
use estimate_core::{CommandOutcome, EstimateError, FormCommand, FormConfig, FormSession};
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::{future_to_promise, spawn_local};
use web_sys::{Document, Element, Event, EventTarget, HtmlInputElement};

fn to_js(e: EstimateError) -> JsValue {
    JsValue::from_str(&e.to_string())
}

struct Inner {
    document: Document,
    session: RefCell<FormSession<LocalStorage>>,
    listeners: RefCell<Vec<Closure<dyn FnMut(Event)>>>,
    exporting: ExportLock,
}

impl Inner {
    fn config(&self) -> FormConfig {
        self.session.borrow().config().clone()
    }

    fn dispatch(&self, command: FormCommand) -> Result<CommandOutcome, JsValue> {
        let outcome = self.session.borrow_mut().dispatch(command).map_err(to_js)?;
        self.render(&outcome)?;
        Ok(outcome)
    }

    fn render(&self, outcome: &CommandOutcome) -> Result<(), JsValue> {
        if outcome.form_changed {
            dom::write_form(&self.document, self.session.borrow().state())?;
        }
        dom::write_totals(&self.document, &outcome.totals)?;
        if let Some(status) = &outcome.status {
            dom::write_status(&self.document, status)?;
        }
        Ok(())
    }

    /// Copy every field and cell from the page into the session. Catches
    /// edits that never fired an input event (autofill, paste into a
    /// blurred field).
    fn sync_from_page(&self) -> Result<(), JsValue> {
        let config = self.config();
        let mut session = self.session.borrow_mut();
        for id in &config.header_fields {
            if let Some(value) = dom::field_value(&self.document, id) {
                session
                    .dispatch(FormCommand::EditField {
                        id: id.clone(),
                        value,
                    })
                    .map_err(to_js)?;
            }
        }
        for (row, column, value) in dom::read_cells(&self.document)? {
            session
                .dispatch(FormCommand::EditCell { row, column, value })
                .map_err(to_js)?;
        }
        Ok(())
    }

    fn recalculate(&self) -> Result<(), JsValue> {
        self.sync_from_page()?;
        self.dispatch(FormCommand::Recalculate).map(|_| ())
    }

    fn refresh_status(&self) -> Result<(), JsValue> {
        let status = self.session.borrow().status_label().map_err(to_js)?;
        dom::write_status(&self.document, &status)
    }

    fn on_input(&self, event: &Event) -> Result<(), JsValue> {
        let Some(target) = event.target().and_then(|t| t.dyn_into::<Element>().ok()) else {
            return Ok(());
        };

        if let Some((row, column)) = dom::cell_position(&target) {
            let value = target
                .dyn_ref::<HtmlInputElement>()
                .map(|input| input.value())
                .unwrap_or_default();
            self.dispatch(FormCommand::EditCell { row, column, value })?;
            return Ok(());
        }

        let id = target.id();
        if self.config().header_fields.contains(&id) {
            let value = dom::field_value(&self.document, &id).unwrap_or_default();
            self.dispatch(FormCommand::EditField { id, value })?;
        }
        Ok(())
    }

    fn save(&self) -> Result<(), JsValue> {
        self.sync_from_page()?;
        let outcome = self.dispatch(FormCommand::Save)?;
        if let Some(notice) = outcome.notice {
            alert(&notice);
        }
        Ok(())
    }

    fn reset(&self) -> Result<(), JsValue> {
        let window = web_sys::window().ok_or("No window")?;
        let confirmed = window.confirm_with_message("Clear all fields?")?;
        self.dispatch(FormCommand::Reset { confirmed })?;
        Ok(())
    }

    /// Run one export unless another is still in flight. Every failure is
    /// logged and shown to the user.
    async fn export(self: Rc<Self>) -> Result<(), JsValue> {
        let Some(_busy) = self.exporting.try_acquire() else {
            web_sys::console::log_1(&"Export already in progress".into());
            return Ok(());
        };

        match Rc::clone(&self).run_export().await {
            Ok(()) => Ok(()),
            Err((stage, e)) => {
                web_sys::console::error_2(&stage.log_label().into(), &e);
                alert(stage.notice());
                Err(e)
            }
        }
    }

    /// recalculate → blur → assign number → rasterize → assemble →
    /// download → advance counter → refresh status
    async fn run_export(self: Rc<Self>) -> Result<(), (ExportStage, JsValue)> {
        use ExportStage::*;

        self.recalculate().map_err(|e| (Prepare, e))?;
        let plan = self
            .session
            .borrow_mut()
            .begin_export()
            .map_err(|e| (Prepare, to_js(e)))?;
        let config = self.config();
        dom::set_field_value(&self.document, &config.estimate_field, &plan.estimate_value);
        dom::blur_active(&self.document);

        let area = dom::html_element(&self.document, dom::PRINT_AREA).map_err(|e| (Prepare, e))?;
        let title = format!("Estimate {}", plan.estimate_value);

        let bytes = export::render_pdf(&area, &config.pdf, &title)
            .await
            .map_err(|e| (Render, e))?;
        export::download(&self.document, &bytes, &plan.filename).map_err(|e| (Download, e))?;

        let completed = self.session.borrow_mut().complete_export(&plan);
        let outcome = completed.map_err(|e| (Record, to_js(e)))?;
        self.render(&outcome).map_err(|e| (Record, e))?;
        web_sys::console::log_1(&format!("Exported {}", plan.filename).into());
        Ok(())
    }

    fn listen<F>(
        self: &Rc<Self>,
        target: &EventTarget,
        event: &str,
        handler: F,
    ) -> Result<(), JsValue>
    where
        F: Fn(&Rc<Self>, &Event) -> Result<(), JsValue> + 'static,
    {
        let inner = Rc::downgrade(self);
        let closure = Closure::wrap(Box::new(move |event: Event| {
            let Some(inner) = inner.upgrade() else {
                return;
            };
            if let Err(e) = handler(&inner, &event) {
                web_sys::console::error_1(&e);
            }
        }) as Box<dyn FnMut(Event)>);
        target.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())?;
        self.listeners.borrow_mut().push(closure);
        Ok(())
    }
}

/// Where an export stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ExportStage {
    Prepare,
    Render,
    Download,
    /// The file was downloaded but the counter or page update failed
    Record,
}

impl ExportStage {
    fn log_label(self) -> &'static str {
        match self {
            ExportStage::Prepare => "Export preparation failed:",
            ExportStage::Render => "PDF generation failed:",
            ExportStage::Download => "PDF download failed:",
            ExportStage::Record => "Recording the export failed:",
        }
    }

    fn notice(self) -> &'static str {
        match self {
            ExportStage::Prepare | ExportStage::Render => {
                "Could not generate the PDF. Please try again."
            }
            ExportStage::Download => "Could not save the PDF. Please try again.",
            ExportStage::Record => {
                "The PDF was saved, but the estimate number could not be updated."
            }
        }
    }
}

/// Set while an export is running
#[derive(Default)]
struct ExportLock(Cell<bool>);

impl ExportLock {
    fn try_acquire(&self) -> Option<ExportLockGuard<'_>> {
        if self.0.replace(true) {
            None
        } else {
            Some(ExportLockGuard(&self.0))
        }
    }
}

struct ExportLockGuard<'a>(&'a Cell<bool>);

impl Drop for ExportLockGuard<'_> {
    fn drop(&mut self) {
        self.0.set(false);
    }
}

fn alert(message: &str) {
    if let Some(window) = web_sys::window() {
        let _ = window.alert_with_message(message);
    }
}

/// The estimate form, mounted on the current page
#[wasm_bindgen]
pub struct EstimateSession {
    inner: Rc<Inner>,
}

#[wasm_bindgen]
impl EstimateSession {
    /// Create a session. `config` may be `undefined` or a partial
    /// configuration object; missing keys keep their defaults.
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue) -> Result<EstimateSession, JsValue> {
        let config: FormConfig = if config.is_undefined() || config.is_null() {
            FormConfig::default()
        } else {
            serde_wasm_bindgen::from_value(config)
                .map_err(|e| JsValue::from_str(&format!("Invalid config: {}", e)))?
        };

        let store = LocalStorage::open()?;
        Ok(Self {
            inner: Rc::new(Inner {
                document: dom::document()?,
                session: RefCell::new(FormSession::new(config, store)),
                listeners: RefCell::new(Vec::new()),
                exporting: ExportLock::default(),
            }),
        })
    }

    /// Render rows, restore the saved snapshot, wire events, and show the
    /// initial totals and status. Call once per page load.
    pub fn mount(&self) -> Result<(), JsValue> {
        let inner = &self.inner;
        let config = inner.config();

        dom::render_rows(&inner.document, config.row_count)?;

        // A broken snapshot must not stop the page from working
        if let Err(e) = inner.dispatch(FormCommand::Load) {
            web_sys::console::warn_2(&"Could not restore saved estimate:".into(), &e);
        }

        inner.listen(&inner.document, "input", |inner, event| inner.on_input(event))?;
        inner.listen(&inner.document, "focusout", |inner, _| inner.recalculate())?;

        let reset = dom::html_element(&inner.document, dom::RESET_BUTTON)?;
        inner.listen(&reset, "click", |inner, _| inner.reset())?;

        let save = dom::html_element(&inner.document, dom::SAVE_BUTTON)?;
        inner.listen(&save, "click", |inner, _| inner.save())?;

        let generate = dom::html_element(&inner.document, dom::GENERATE_BUTTON)?;
        inner.listen(&generate, "click", |inner, _| {
            let inner = Rc::clone(inner);
            // Failures are logged and alerted inside `export`
            spawn_local(async move {
                let _ = inner.export().await;
            });
            Ok(())
        })?;

        inner.recalculate()?;
        inner.refresh_status()?;
        web_sys::console::log_1(&"Estimate form ready".into());
        Ok(())
    }

    /// Recompute and display totals from the current page contents
    pub fn recalculate(&self) -> Result<(), JsValue> {
        self.inner.recalculate()
    }

    pub fn save(&self) -> Result<(), JsValue> {
        self.inner.save()
    }

    pub fn reset(&self) -> Result<(), JsValue> {
        self.inner.reset()
    }

    /// Export the form as a PDF; resolves once the download was triggered
    #[wasm_bindgen(js_name = generatePdf)]
    pub fn generate_pdf(&self) -> js_sys::Promise {
        let inner = Rc::clone(&self.inner);
        future_to_promise(async move {
            inner.export().await?;
            Ok(JsValue::UNDEFINED)
        })
    }

    /// Current estimate counter value
    #[wasm_bindgen(js_name = currentNumber)]
    pub fn current_number(&self) -> Result<f64, JsValue> {
        let n = self
            .inner
            .session
            .borrow()
            .counter()
            .current_number()
            .map_err(to_js)?;
        Ok(n as f64)
    }

    /// Snapshot of the form state as JSON
    #[wasm_bindgen(js_name = getSnapshot)]
    pub fn get_snapshot(&self) -> Result<JsValue, JsValue> {
        let session = self.inner.session.borrow();
        let snapshot = estimate_core::FormSnapshot::capture(session.state(), session.config());
        serde_wasm_bindgen::to_value(&snapshot)
            .map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_export_lock_rejects_second_export() {
        let lock = ExportLock::default();
        let first = lock.try_acquire();
        assert!(first.is_some());
        assert!(lock.try_acquire().is_none());

        drop(first);
        assert!(lock.try_acquire().is_some());
    }

    #[test]
    fn test_every_stage_has_a_user_notice() {
        for stage in [
            ExportStage::Prepare,
            ExportStage::Render,
            ExportStage::Download,
            ExportStage::Record,
        ] {
            assert!(!stage.notice().is_empty());
            assert!(stage.log_label().ends_with(':'));
        }
    }

    #[test]
    fn test_record_failure_says_file_was_saved() {
        assert!(ExportStage::Record.notice().contains("PDF was saved"));
        assert_ne!(ExportStage::Record.notice(), ExportStage::Render.notice());
    }
}

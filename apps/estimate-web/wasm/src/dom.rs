//! DOM reads and writes for the estimate page
//!
//! Pure plumbing: no form logic lives here. Element ids match `index.html`.

use estimate_core::{Column, FormState, RowTemplate, TotalsDisplay};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, HtmlElement, HtmlInputElement, HtmlTextAreaElement};

pub const ROWS_CONTAINER: &str = "rows";
pub const PRINT_AREA: &str = "print-area";
pub const SUBTOTAL_ID: &str = "f_subtotal";
pub const TAX_ID: &str = "f_tax";
pub const TOTAL_ID: &str = "f_total";
pub const STATUS_ID: &str = "estDisplay";
pub const RESET_BUTTON: &str = "resetForm";
pub const SAVE_BUTTON: &str = "saveLocal";
pub const GENERATE_BUTTON: &str = "generatePdf";

pub fn document() -> Result<Document, JsValue> {
    let window = web_sys::window().ok_or("No window")?;
    Ok(window.document().ok_or("No document")?)
}

fn element(document: &Document, id: &str) -> Result<Element, JsValue> {
    document
        .get_element_by_id(id)
        .ok_or_else(|| JsValue::from_str(&format!("Missing element #{}", id)))
}

pub fn html_element(document: &Document, id: &str) -> Result<HtmlElement, JsValue> {
    element(document, id)?
        .dyn_into::<HtmlElement>()
        .map_err(|_| JsValue::from_str(&format!("#{} is not an HTML element", id)))
}

/// Append `count` line-item rows to `#rows`.
///
/// Rows are only rendered into an empty container; a second call on the
/// same page is a no-op and returns 0.
pub fn render_rows(document: &Document, count: usize) -> Result<usize, JsValue> {
    let container = element(document, ROWS_CONTAINER)?;
    if container.child_element_count() > 0 {
        web_sys::console::warn_1(&"Rows already rendered; skipping".into());
        return Ok(0);
    }

    for cells in RowTemplate::rows(count) {
        let row = document.create_element("div")?;
        row.set_class_name(RowTemplate::ROW_CLASS);
        for cell in cells {
            let input = document.create_element("input")?;
            input.set_class_name(&cell.class);
            input.set_attribute("data-row", &cell.row_number.to_string())?;
            input.set_attribute("data-col", &cell.column.index().to_string())?;
            if let Some(kind) = cell.input_type {
                input.set_attribute("type", kind)?;
            }
            if let Some(step) = cell.step {
                input.set_attribute("step", step)?;
            }
            row.append_child(&input)?;
        }
        container.append_child(&row)?;
    }

    Ok(count)
}

/// Decode `data-row` (1-based) and `data-col` into a 0-based row and column
pub fn parse_cell_position(row: Option<&str>, col: Option<&str>) -> Option<(usize, Column)> {
    let row: usize = row?.trim().parse().ok()?;
    let col: usize = col?.trim().parse().ok()?;
    let column = Column::from_index(col)?;
    row.checked_sub(1).map(|r| (r, column))
}

pub fn cell_position(element: &Element) -> Option<(usize, Column)> {
    parse_cell_position(
        element.get_attribute("data-row").as_deref(),
        element.get_attribute("data-col").as_deref(),
    )
}

fn cell_inputs(document: &Document) -> Result<Vec<HtmlInputElement>, JsValue> {
    let selector = format!("#{} input.{}", ROWS_CONTAINER, RowTemplate::CELL_CLASS);
    let list = document.query_selector_all(&selector)?;
    Ok((0..list.length())
        .filter_map(|i| list.item(i))
        .filter_map(|node| node.dyn_into::<HtmlInputElement>().ok())
        .collect())
}

/// Every rendered cell with its position and current text
pub fn read_cells(document: &Document) -> Result<Vec<(usize, Column, String)>, JsValue> {
    Ok(cell_inputs(document)?
        .into_iter()
        .filter_map(|input| cell_position(&input).map(|(row, col)| (row, col, input.value())))
        .collect())
}

/// Value of an `<input>` or `<textarea>` by id
pub fn field_value(document: &Document, id: &str) -> Option<String> {
    let el = document.get_element_by_id(id)?;
    if let Some(input) = el.dyn_ref::<HtmlInputElement>() {
        return Some(input.value());
    }
    el.dyn_ref::<HtmlTextAreaElement>().map(|area| area.value())
}

pub fn set_field_value(document: &Document, id: &str, value: &str) {
    let Some(el) = document.get_element_by_id(id) else {
        return;
    };
    if let Some(input) = el.dyn_ref::<HtmlInputElement>() {
        input.set_value(value);
    } else if let Some(area) = el.dyn_ref::<HtmlTextAreaElement>() {
        area.set_value(value);
    }
}

pub fn write_totals(document: &Document, totals: &TotalsDisplay) -> Result<(), JsValue> {
    element(document, SUBTOTAL_ID)?.set_text_content(Some(&totals.subtotal));
    element(document, TAX_ID)?.set_text_content(Some(&totals.tax));
    element(document, TOTAL_ID)?.set_text_content(Some(&totals.total));
    Ok(())
}

pub fn write_status(document: &Document, status: &str) -> Result<(), JsValue> {
    element(document, STATUS_ID)?.set_text_content(Some(status));
    Ok(())
}

/// Push every field and cell of `state` into the page
pub fn write_form(document: &Document, state: &FormState) -> Result<(), JsValue> {
    for (id, value) in state.fields() {
        set_field_value(document, id, value);
    }
    for input in cell_inputs(document)? {
        if let Some((row, column)) = cell_position(&input) {
            if let Some(item) = state.rows().get(row) {
                input.set_value(item.get(column));
            }
        }
    }
    Ok(())
}

/// Drop focus so no caret shows up in the raster
pub fn blur_active(document: &Document) {
    if let Some(active) = document.active_element() {
        if let Ok(el) = active.dyn_into::<HtmlElement>() {
            let _ = el.blur();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_cell_position() {
        assert_eq!(
            parse_cell_position(Some("1"), Some("6")),
            Some((0, Column::Price))
        );
        assert_eq!(
            parse_cell_position(Some("25"), Some("0")),
            Some((24, Column::ItemNo))
        );
    }

    #[test]
    fn test_parse_cell_position_rejects_bad_attrs() {
        assert_eq!(parse_cell_position(Some("0"), Some("1")), None);
        assert_eq!(parse_cell_position(Some("3"), Some("7")), None);
        assert_eq!(parse_cell_position(None, Some("1")), None);
        assert_eq!(parse_cell_position(Some("x"), Some("1")), None);
    }
}

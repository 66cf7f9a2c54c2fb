//! Rasterize the printable region and hand the PDF to the browser
//!
//! Rasterization goes through the page's `html2canvas` global; the PDF
//! itself is assembled in Rust by `estimate_core::pdf`.

use estimate_core::{assemble_pdf, PdfOptions, RasterImage};
use js_sys::{Array, Object, Reflect, Uint8Array};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Blob, BlobPropertyBag, Document, HtmlAnchorElement, HtmlCanvasElement, HtmlElement, Url};

#[wasm_bindgen]
extern "C" {
    /// `html2canvas(element, options) -> Promise<HTMLCanvasElement>`
    #[wasm_bindgen(js_name = html2canvas, catch)]
    fn html2canvas(element: &HtmlElement, options: &JsValue) -> Result<js_sys::Promise, JsValue>;
}

/// Render `element` to a JPEG at the configured oversampling factor
pub async fn rasterize(element: &HtmlElement, options: &PdfOptions) -> Result<RasterImage, JsValue> {
    let opts = Object::new();
    Reflect::set(&opts, &"scale".into(), &options.scale.into())?;
    Reflect::set(&opts, &"useCORS".into(), &true.into())?;
    Reflect::set(&opts, &"backgroundColor".into(), &"#ffffff".into())?;

    let canvas = JsFuture::from(html2canvas(element, &opts)?).await?;
    let canvas: HtmlCanvasElement = canvas
        .dyn_into()
        .map_err(|_| JsValue::from_str("Rasterizer did not return a canvas"))?;

    let data_url = canvas
        .to_data_url_with_type_and_encoder_options("image/jpeg", &options.image_quality.into())?;

    RasterImage::from_data_url(&data_url).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Rasterize and assemble; nothing is written anywhere yet
pub async fn render_pdf(
    element: &HtmlElement,
    options: &PdfOptions,
    title: &str,
) -> Result<Vec<u8>, JsValue> {
    let image = rasterize(element, options).await?;
    assemble_pdf(&image, options, Some(title)).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Offer `bytes` as a file download
pub fn download(document: &Document, bytes: &[u8], filename: &str) -> Result<(), JsValue> {
    let parts = Array::of1(&Uint8Array::from(bytes));
    let props = BlobPropertyBag::new();
    props.set_type("application/pdf");
    let blob = Blob::new_with_u8_array_sequence_and_options(&parts, &props)?;

    let url = Url::create_object_url_with_blob(&blob)?;
    let anchor: HtmlAnchorElement = document
        .create_element("a")?
        .dyn_into()
        .map_err(|_| JsValue::from_str("Failed to create download link"))?;
    anchor.set_href(&url);
    anchor.set_download(filename);
    anchor.click();
    Url::revoke_object_url(&url)?;

    Ok(())
}

//! Service-worker handlers for offline use of the estimate page
//!
//! `sw.js` registers the event listeners synchronously (browsers require
//! that) and forwards each event here once the module is loaded:
//!
//! ```javascript
//! importScripts('./sw-pkg/estimate_sw.js');
//! const ready = wasm_bindgen('./sw-pkg/estimate_sw_bg.wasm');
//! self.addEventListener('install', e => e.waitUntil(ready.then(() => wasm_bindgen.install())));
//! self.addEventListener('activate', e => e.waitUntil(ready.then(() => wasm_bindgen.activate())));
//! self.addEventListener('fetch', e => e.respondWith(ready.then(() => wasm_bindgen.respond(e.request))));
//! ```
//!
//! The cache is seeded only at install; fetches never add to it.

use estimate_core::CacheManifest;
use js_sys::Array;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Cache, Request, Response, ServiceWorkerGlobalScope};

#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

fn scope() -> Result<ServiceWorkerGlobalScope, JsValue> {
    js_sys::global()
        .dyn_into::<ServiceWorkerGlobalScope>()
        .map_err(|_| JsValue::from_str("Not running in a service worker"))
}

/// Name of the cache this build writes to
#[wasm_bindgen(js_name = cacheName)]
pub fn cache_name() -> String {
    CacheManifest::default().cache_name
}

/// Pre-cache every manifest asset as one batch. If any asset fails to
/// fetch, the freshly opened cache is dropped and the install fails.
#[wasm_bindgen]
pub async fn install() -> Result<(), JsValue> {
    let scope = scope()?;
    let manifest = CacheManifest::default();
    let storage = scope.caches()?;

    let cache: Cache = JsFuture::from(storage.open(&manifest.cache_name))
        .await?
        .dyn_into()?;
    let assets: Array = manifest
        .assets
        .iter()
        .map(|path| JsValue::from_str(path))
        .collect();

    if let Err(e) = JsFuture::from(cache.add_all_with_str_sequence(&assets)).await {
        JsFuture::from(storage.delete(&manifest.cache_name)).await?;
        let err = manifest.precache_failed(describe(&e));
        web_sys::console::error_1(&err.to_string().into());
        return Err(JsValue::from_str(&err.to_string()));
    }

    JsFuture::from(scope.skip_waiting()?).await?;

    web_sys::console::log_1(
        &format!(
            "Cached {} assets in {}",
            manifest.assets.len(),
            manifest.cache_name
        )
        .into(),
    );
    Ok(())
}

fn describe(error: &JsValue) -> String {
    error
        .dyn_ref::<js_sys::Error>()
        .map(|e| String::from(e.message()))
        .or_else(|| error.as_string())
        .unwrap_or_else(|| "unknown error".to_string())
}

/// Delete caches from older versions, then take over open pages
#[wasm_bindgen]
pub async fn activate() -> Result<(), JsValue> {
    let scope = scope()?;
    let manifest = CacheManifest::default();
    let storage = scope.caches()?;

    let keys: Array = JsFuture::from(storage.keys()).await?.dyn_into()?;
    let existing: Vec<String> = keys.iter().filter_map(|k| k.as_string()).collect();

    for name in manifest.stale_caches(existing.iter().map(String::as_str)) {
        JsFuture::from(storage.delete(&name)).await?;
        web_sys::console::log_1(&format!("Deleted stale cache {}", name).into());
    }

    JsFuture::from(scope.clients().claim()).await?;
    Ok(())
}

/// Cache first, network otherwise
#[wasm_bindgen]
pub async fn respond(request: Request) -> Result<Response, JsValue> {
    let scope = scope()?;

    let cached = JsFuture::from(scope.caches()?.match_with_request(&request)).await?;
    if !cached.is_undefined() && !cached.is_null() {
        return cached.dyn_into();
    }

    JsFuture::from(scope.fetch_with_request(&request))
        .await?
        .dyn_into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_name_is_versioned() {
        assert!(cache_name().starts_with("estimate-pwa-v"));
    }

    #[test]
    fn test_failed_install_reports_cache() {
        let message = CacheManifest::default()
            .precache_failed("network down")
            .to_string();
        assert!(message.contains(&cache_name()));
        assert!(message.ends_with("network down"));
    }
}

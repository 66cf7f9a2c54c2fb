//! Offline asset cache manifest
//!
//! The service worker pre-caches a fixed asset list at install, deletes
//! caches from older versions at activate, and answers fetches cache-first.
//! Fetches never add to the cache.

use crate::error::EstimateError;
use serde::{Deserialize, Serialize};

/// Bump the version suffix to force old caches out on the next activate
pub const CACHE_NAME: &str = "estimate-pwa-v1";

/// Assets available offline
pub const PRECACHE_ASSETS: &[&str] = &[
    "/",
    "/index.html",
    "/style.css",
    "/bootstrap.js",
    "/pkg/estimate_wasm.js",
    "/pkg/estimate_wasm_bg.wasm",
    "/manifest.json",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheManifest {
    pub cache_name: String,
    pub assets: Vec<String>,
}

impl Default for CacheManifest {
    fn default() -> Self {
        Self {
            cache_name: CACHE_NAME.to_string(),
            assets: PRECACHE_ASSETS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl CacheManifest {
    /// Cache names left over from previous versions
    pub fn stale_caches<'a, I>(&self, existing: I) -> Vec<String>
    where
        I: IntoIterator<Item = &'a str>,
    {
        existing
            .into_iter()
            .filter(|name| *name != self.cache_name)
            .map(str::to_string)
            .collect()
    }

    /// Error for an install whose batch fetch failed. The caller drops the
    /// cache so nothing from the failed install survives.
    pub fn precache_failed(&self, reason: impl Into<String>) -> EstimateError {
        let reason = reason.into();
        tracing::warn!(cache = %self.cache_name, %reason, "precache failed");
        EstimateError::Precache {
            cache: self.cache_name.clone(),
            assets: self.assets.len(),
            reason,
        }
    }
}

//! Form configuration
//!
//! Every tunable the page depends on lives in [`FormConfig`]. The defaults
//! describe the shipped 25-row form; the page can pass a partial JSON object
//! to override individual keys, missing keys keep their defaults.

use crate::error::EstimateError;
use crate::offline::CacheManifest;
use crate::pdf::PdfOptions;
use serde::{Deserialize, Serialize};

/// Sales tax applied to the subtotal (8.875%)
pub const TAX_RATE: f64 = 0.08875;

/// Number of line-item rows rendered at load
pub const DEFAULT_ROW_COUNT: usize = 25;

/// Storage key holding the estimate counter
pub const COUNTER_KEY: &str = "estNumber";

/// Storage key holding the `{fields, rows}` snapshot
pub const SNAPSHOT_KEY: &str = "savedEstimate.v2";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormConfig {
    /// Line-item rows rendered into `#rows`
    pub row_count: usize,
    pub tax_rate: f64,
    /// Element ids starting with this prefix are persisted
    pub field_prefix: String,
    /// Editable header inputs present on the form
    pub header_fields: Vec<String>,
    /// Display-only ids that share the prefix but are recomputed, never saved
    pub derived_fields: Vec<String>,
    /// Input holding the estimate number
    pub estimate_field: String,
    pub counter_key: String,
    pub snapshot_key: String,
    pub pdf: PdfOptions,
    pub offline: CacheManifest,
}

impl Default for FormConfig {
    fn default() -> Self {
        Self {
            row_count: DEFAULT_ROW_COUNT,
            tax_rate: TAX_RATE,
            field_prefix: "f_".to_string(),
            header_fields: ["f_name", "f_date", "f_address", "f_note", "f_est"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            derived_fields: ["f_subtotal", "f_tax", "f_total"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            estimate_field: "f_est".to_string(),
            counter_key: COUNTER_KEY.to_string(),
            snapshot_key: SNAPSHOT_KEY.to_string(),
            pdf: PdfOptions::default(),
            offline: CacheManifest::default(),
        }
    }
}

impl FormConfig {
    /// Parse a (possibly partial) JSON override
    pub fn from_json(json: &str) -> Result<Self, EstimateError> {
        serde_json::from_str(json).map_err(|e| EstimateError::Serialization(e.to_string()))
    }

    /// True when `id` names a field that belongs in a snapshot
    pub fn is_persisted_field(&self, id: &str) -> bool {
        id.starts_with(&self.field_prefix) && !self.derived_fields.iter().any(|d| d == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_shipped_form() {
        let config = FormConfig::default();
        assert_eq!(config.row_count, 25);
        assert_eq!(config.tax_rate, 0.08875);
        assert_eq!(config.counter_key, "estNumber");
        assert!(config.header_fields.contains(&config.estimate_field));
    }

    #[test]
    fn test_partial_override_keeps_defaults() {
        let config = FormConfig::from_json(r#"{"row_count":14}"#).unwrap();
        assert_eq!(config.row_count, 14);
        assert_eq!(config.tax_rate, TAX_RATE);
        assert_eq!(config.snapshot_key, SNAPSHOT_KEY);
    }

    #[test]
    fn test_invalid_override_is_error() {
        assert!(FormConfig::from_json("{row_count:").is_err());
    }

    #[test]
    fn test_derived_fields_are_not_persisted() {
        let config = FormConfig::default();
        assert!(config.is_persisted_field("f_name"));
        assert!(!config.is_persisted_field("f_total"));
        assert!(!config.is_persisted_field("estDisplay"));
    }
}

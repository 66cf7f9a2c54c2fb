//! Saved-form snapshots
//!
//! A snapshot is one JSON object, `{ "fields": {...}, "rows": [[...]] }`,
//! stored under a single key and fully overwritten on each save. Restoring
//! is positional and tolerant: rows and cells past the current form's
//! capacity are dropped, unknown fields are skipped, and a corrupt blob
//! leaves the form as it was.

use crate::config::FormConfig;
use crate::error::EstimateError;
use crate::form::FormState;
use crate::store::KvStore;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Confirmation shown after a successful save
pub const SAVED_NOTICE: &str = "Saved locally!";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FormSnapshot {
    #[serde(default)]
    pub fields: BTreeMap<String, String>,
    #[serde(default)]
    pub rows: Vec<Vec<String>>,
}

/// What a restore actually touched
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RestoreReport {
    pub fields: usize,
    pub rows: usize,
    pub skipped_fields: usize,
    pub skipped_rows: usize,
    pub skipped_cells: usize,
}

impl FormSnapshot {
    /// Persisted header fields plus every row's cells
    pub fn capture(state: &FormState, config: &FormConfig) -> Self {
        let fields = state
            .fields()
            .iter()
            .filter(|(id, _)| config.is_persisted_field(id))
            .map(|(id, value)| (id.clone(), value.clone()))
            .collect();

        let rows = state.rows().iter().map(|row| row.cells().to_vec()).collect();

        Self { fields, rows }
    }

    pub fn apply(&self, state: &mut FormState, config: &FormConfig) -> RestoreReport {
        let mut report = RestoreReport::default();

        for (id, value) in &self.fields {
            if config.is_persisted_field(id) && state.set_field(id, value.as_str()) {
                report.fields += 1;
            } else {
                report.skipped_fields += 1;
            }
        }

        for (index, cells) in self.rows.iter().enumerate() {
            match state.row_mut(index) {
                Some(row) => {
                    report.skipped_cells += row.fill_from(cells);
                    report.rows += 1;
                }
                None => report.skipped_rows += 1,
            }
        }

        report
    }

    pub fn to_json(&self) -> Result<String, EstimateError> {
        serde_json::to_string(self).map_err(|e| EstimateError::Serialization(e.to_string()))
    }

    pub fn from_json(json: &str) -> Result<Self, EstimateError> {
        serde_json::from_str(json).map_err(|e| EstimateError::Serialization(e.to_string()))
    }
}

/// Result of reading the snapshot key at startup
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status")]
pub enum LoadOutcome {
    /// Nothing saved yet
    Empty,
    /// Saved data could not be parsed; the form was left untouched
    Corrupt,
    Restored(RestoreReport),
}

pub struct SnapshotStore<S: KvStore> {
    store: S,
    key: String,
}

impl<S: KvStore> SnapshotStore<S> {
    pub fn new(store: S, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
        }
    }

    /// Serialize the whole form, then write it in one `set`
    pub fn save(&self, state: &FormState, config: &FormConfig) -> Result<(), EstimateError> {
        let snapshot = FormSnapshot::capture(state, config);
        let json = snapshot.to_json()?;
        self.store.set(&self.key, &json)?;
        tracing::info!(
            key = %self.key,
            fields = snapshot.fields.len(),
            rows = snapshot.rows.len(),
            "form snapshot saved"
        );
        Ok(())
    }

    pub fn load(
        &self,
        state: &mut FormState,
        config: &FormConfig,
    ) -> Result<LoadOutcome, EstimateError> {
        let Some(json) = self.store.get(&self.key)? else {
            return Ok(LoadOutcome::Empty);
        };

        match FormSnapshot::from_json(&json) {
            Ok(snapshot) => {
                let report = snapshot.apply(state, config);
                tracing::debug!(?report, "form snapshot restored");
                Ok(LoadOutcome::Restored(report))
            }
            Err(e) => {
                tracing::warn!(key = %self.key, error = %e, "ignoring unreadable snapshot");
                Ok(LoadOutcome::Corrupt)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SNAPSHOT_KEY;
    use crate::layout::Column;
    use crate::store::MemoryStore;
    use pretty_assertions::assert_eq;

    fn setup() -> (FormConfig, MemoryStore, SnapshotStore<MemoryStore>) {
        let store = MemoryStore::new();
        (
            FormConfig::default(),
            store.clone(),
            SnapshotStore::new(store, SNAPSHOT_KEY),
        )
    }

    #[test]
    fn test_load_absent_is_empty() {
        let (config, _, snapshots) = setup();
        let mut form = FormState::new(&config);
        assert_eq!(snapshots.load(&mut form, &config).unwrap(), LoadOutcome::Empty);
        assert_eq!(form, FormState::new(&config));
    }

    #[test]
    fn test_save_then_load_roundtrip() {
        let (config, _, snapshots) = setup();
        let mut form = FormState::new(&config);
        form.set_field("f_name", "Grace Hopper");
        form.set_field("f_address", "12 Main St\nApt 4");
        form.set_cell(0, Column::ItemNo, "A-100");
        form.set_cell(0, Column::Price, "99.95");
        form.set_cell(24, Column::Name, "Last row");
        snapshots.save(&form, &config).unwrap();

        let mut restored = FormState::new(&config);
        let outcome = snapshots.load(&mut restored, &config).unwrap();
        assert!(matches!(outcome, LoadOutcome::Restored(r) if r.rows == 25));
        assert_eq!(restored, form);
    }

    #[test]
    fn test_corrupt_snapshot_leaves_form_untouched() {
        let (config, store, snapshots) = setup();
        store.set(SNAPSHOT_KEY, "{not json").unwrap();
        let mut form = FormState::new(&config);
        assert_eq!(snapshots.load(&mut form, &config).unwrap(), LoadOutcome::Corrupt);
        assert_eq!(form, FormState::new(&config));
    }

    #[test]
    fn test_capture_skips_derived_fields() {
        let mut config = FormConfig::default();
        config.header_fields.push("f_total".to_string());
        let mut form = FormState::new(&config);
        form.set_field("f_total", "123.00");
        let snapshot = FormSnapshot::capture(&form, &config);
        assert!(!snapshot.fields.contains_key("f_total"));
        assert!(snapshot.fields.contains_key("f_name"));
    }

    #[test]
    fn test_restore_into_smaller_form_drops_overflow() {
        let (config, _, snapshots) = setup();
        let mut form = FormState::new(&config);
        form.set_cell(20, Column::Price, "5");
        snapshots.save(&form, &config).unwrap();

        let small = FormConfig {
            row_count: 14,
            ..FormConfig::default()
        };
        let mut restored = FormState::new(&small);
        let outcome = snapshots.load(&mut restored, &small).unwrap();
        assert_eq!(
            outcome,
            LoadOutcome::Restored(RestoreReport {
                fields: 5,
                rows: 14,
                skipped_fields: 0,
                skipped_rows: 11,
                skipped_cells: 0,
            })
        );
        assert_eq!(restored.row_count(), 14);
    }

    #[test]
    fn test_unknown_fields_and_extra_cells_are_skipped() {
        let (config, store, snapshots) = setup();
        store
            .set(
                SNAPSHOT_KEY,
                r#"{"fields":{"f_name":"Ada","f_legacy":"x","other":"y"},
                    "rows":[["1","2","3","4","5","6","7","8"]]}"#,
            )
            .unwrap();
        let mut form = FormState::new(&config);
        let outcome = snapshots.load(&mut form, &config).unwrap();
        assert_eq!(
            outcome,
            LoadOutcome::Restored(RestoreReport {
                fields: 1,
                rows: 1,
                skipped_fields: 2,
                skipped_rows: 0,
                skipped_cells: 1,
            })
        );
        assert_eq!(form.field("f_name"), Some("Ada"));
        assert_eq!(form.rows()[0].price(), "7");
    }

    #[test]
    fn test_missing_sections_default() {
        let snapshot = FormSnapshot::from_json("{}").unwrap();
        assert_eq!(snapshot, FormSnapshot::default());
    }
}

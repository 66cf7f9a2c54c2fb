//! Command handlers for the estimate form
//!
//! UI events are translated into [`FormCommand`]s and applied by a
//! [`FormSession`], which owns the form state and the storage-backed
//! counter and snapshot components. Each handler returns a
//! [`CommandOutcome`] describing what the page must re-render.

use crate::config::FormConfig;
use crate::counter::{export_filename, EstimateCounter, EstimateNumber};
use crate::error::EstimateError;
use crate::form::FormState;
use crate::layout::Column;
use crate::snapshot::{LoadOutcome, SnapshotStore, SAVED_NOTICE};
use crate::store::KvStore;
use crate::totals::TotalsDisplay;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum FormCommand {
    /// A cell changed; `row` is 0-based
    EditCell {
        row: usize,
        column: Column,
        value: String,
    },
    EditField {
        id: String,
        value: String,
    },
    /// Recompute totals without changing anything
    Recalculate,
    Save,
    Load,
    /// Clear every field and row. Ignored unless the user confirmed.
    Reset {
        confirmed: bool,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommandOutcome {
    /// Always the current totals
    pub totals: TotalsDisplay,
    /// New status-line text, when it changed
    pub status: Option<String>,
    /// Message to show the user in a blocking notice
    pub notice: Option<String>,
    /// The whole form must be written back to the page
    pub form_changed: bool,
    pub cancelled: bool,
}

/// Everything the exporter needs once rasterization starts
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportPlan {
    pub filename: String,
    /// Value of the estimate-number field used for this export
    pub estimate_value: String,
    /// Set when the number was filled in automatically
    pub assigned: Option<EstimateNumber>,
}

pub struct FormSession<S: KvStore + Clone> {
    config: FormConfig,
    state: FormState,
    counter: EstimateCounter<S>,
    snapshots: SnapshotStore<S>,
    /// Number written into the estimate field by a pending export
    auto_assigned: Option<EstimateNumber>,
}

impl<S: KvStore + Clone> FormSession<S> {
    pub fn new(config: FormConfig, store: S) -> Self {
        let state = FormState::new(&config);
        let counter = EstimateCounter::new(store.clone(), config.counter_key.clone());
        let snapshots = SnapshotStore::new(store, config.snapshot_key.clone());
        Self {
            config,
            state,
            counter,
            snapshots,
            auto_assigned: None,
        }
    }

    pub fn config(&self) -> &FormConfig {
        &self.config
    }

    pub fn state(&self) -> &FormState {
        &self.state
    }

    pub fn counter(&self) -> &EstimateCounter<S> {
        &self.counter
    }

    pub fn totals(&self) -> TotalsDisplay {
        self.state.totals(self.config.tax_rate).display()
    }

    pub fn status_label(&self) -> Result<String, EstimateError> {
        self.counter.status_label()
    }

    fn outcome(&self) -> CommandOutcome {
        CommandOutcome {
            totals: self.totals(),
            status: None,
            notice: None,
            form_changed: false,
            cancelled: false,
        }
    }

    pub fn dispatch(&mut self, command: FormCommand) -> Result<CommandOutcome, EstimateError> {
        match command {
            FormCommand::EditCell { row, column, value } => {
                if !self.state.set_cell(row, column, value) {
                    tracing::debug!(row, ?column, "edit for a row outside the form ignored");
                }
                Ok(self.outcome())
            }
            FormCommand::EditField { id, value } => {
                let keeps_auto = self
                    .auto_assigned
                    .is_some_and(|n| n.formatted() == value.trim());
                if id == self.config.estimate_field && !keeps_auto {
                    self.auto_assigned = None;
                }
                if !self.state.set_field(&id, value) {
                    tracing::debug!(%id, "edit for an unknown field ignored");
                }
                Ok(self.outcome())
            }
            FormCommand::Recalculate => Ok(self.outcome()),
            FormCommand::Save => {
                self.snapshots.save(&self.state, &self.config)?;
                Ok(CommandOutcome {
                    notice: Some(SAVED_NOTICE.to_string()),
                    ..self.outcome()
                })
            }
            FormCommand::Load => {
                let loaded = self.snapshots.load(&mut self.state, &self.config)?;
                if matches!(loaded, LoadOutcome::Restored(_)) {
                    self.auto_assigned = None;
                }
                Ok(CommandOutcome {
                    form_changed: matches!(loaded, LoadOutcome::Restored(_)),
                    ..self.outcome()
                })
            }
            FormCommand::Reset { confirmed: false } => Ok(CommandOutcome {
                cancelled: true,
                ..self.outcome()
            }),
            FormCommand::Reset { confirmed: true } => {
                self.state.clear();
                self.auto_assigned = None;
                tracing::info!("form reset");
                Ok(CommandOutcome {
                    form_changed: true,
                    status: Some(self.counter.status_label()?),
                    ..self.outcome()
                })
            }
        }
    }

    /// Prepare an export: fill the estimate number if the field is blank
    /// (manual values are kept) and work out the filename. The counter is
    /// not touched until [`FormSession::complete_export`]; a retry after a
    /// failed export reuses the number already filled in.
    pub fn begin_export(&mut self) -> Result<ExportPlan, EstimateError> {
        let field = self.config.estimate_field.clone();
        let current = self.state.field(&field).unwrap_or_default().trim().to_string();

        let auto = self.auto_assigned;
        let (estimate_value, assigned) = match auto {
            Some(number) if number.formatted() == current => (current, Some(number)),
            _ if current.is_empty() => {
                let number = self.counter.peek_next()?;
                let formatted = number.formatted();
                self.state.set_field(&field, formatted.as_str());
                self.auto_assigned = Some(number);
                (formatted, Some(number))
            }
            _ => (current, None),
        };

        Ok(ExportPlan {
            filename: export_filename(&estimate_value),
            estimate_value,
            assigned,
        })
    }

    /// Record a successful export: advance the counter and refresh the
    /// status. An automatically filled number is cleared from the form so
    /// the next export takes a fresh one.
    pub fn complete_export(&mut self, plan: &ExportPlan) -> Result<CommandOutcome, EstimateError> {
        let number = self.counter.next_number()?;
        tracing::info!(file = %plan.filename, number = number.0, "estimate exported");

        let form_changed = plan.assigned.is_some();
        if form_changed {
            let field = self.config.estimate_field.clone();
            self.state.set_field(&field, "");
            self.auto_assigned = None;
        }

        Ok(CommandOutcome {
            status: Some(self.counter.status_label()?),
            form_changed,
            ..self.outcome()
        })
    }
}

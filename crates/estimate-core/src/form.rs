//! In-memory form state
//!
//! The page adapter mirrors the DOM into a [`FormState`], command handlers
//! mutate it, and the adapter writes the result back.

use crate::config::FormConfig;
use crate::layout::{Column, LineItem};
use crate::totals::Totals;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct FormState {
    fields: BTreeMap<String, String>,
    rows: Vec<LineItem>,
}

impl FormState {
    /// Blank form with the configured header fields and row count
    pub fn new(config: &FormConfig) -> Self {
        Self {
            fields: config
                .header_fields
                .iter()
                .map(|id| (id.clone(), String::new()))
                .collect(),
            rows: vec![LineItem::new(); config.row_count],
        }
    }

    pub fn field(&self, id: &str) -> Option<&str> {
        self.fields.get(id).map(String::as_str)
    }

    /// Set a header field. Ids the form does not have are ignored and
    /// reported with `false`.
    pub fn set_field(&mut self, id: &str, value: impl Into<String>) -> bool {
        match self.fields.get_mut(id) {
            Some(slot) => {
                *slot = value.into();
                true
            }
            None => false,
        }
    }

    pub fn fields(&self) -> &BTreeMap<String, String> {
        &self.fields
    }

    pub fn rows(&self) -> &[LineItem] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn row_mut(&mut self, index: usize) -> Option<&mut LineItem> {
        self.rows.get_mut(index)
    }

    /// Set one cell by 0-based row index; out-of-range rows are ignored
    pub fn set_cell(&mut self, row: usize, column: Column, value: impl Into<String>) -> bool {
        match self.rows.get_mut(row) {
            Some(item) => {
                item.set(column, value);
                true
            }
            None => false,
        }
    }

    pub fn prices(&self) -> impl Iterator<Item = &str> {
        self.rows.iter().map(LineItem::price)
    }

    pub fn totals(&self, tax_rate: f64) -> Totals {
        Totals::compute(self.prices(), tax_rate)
    }

    /// Blank every field and cell, keeping the shape
    pub fn clear(&mut self) {
        for value in self.fields.values_mut() {
            value.clear();
        }
        for row in self.rows.iter_mut() {
            row.clear();
        }
    }
}

//! Line-item table schema
//!
//! Rows are identified only by position. Each rendered cell carries its
//! column class plus `data-row` / `data-col` attributes so the adapter can
//! query the whole table back by class or attribute.

use serde::{Deserialize, Serialize};

/// The seven line-item columns, in display order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Column {
    ItemNo,
    Style,
    Size,
    General,
    Extension,
    Name,
    Price,
}

impl Column {
    pub const ALL: [Column; 7] = [
        Column::ItemNo,
        Column::Style,
        Column::Size,
        Column::General,
        Column::Extension,
        Column::Name,
        Column::Price,
    ];

    /// Number of cells in a row
    pub const COUNT: usize = 7;

    /// CSS class used to find cells of this column
    pub fn class_name(self) -> &'static str {
        match self {
            Column::ItemNo => "itemno",
            Column::Style => "style",
            Column::Size => "size",
            Column::General => "general",
            Column::Extension => "ext",
            Column::Name => "itemname",
            Column::Price => "price",
        }
    }

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Column> {
        Self::ALL.get(index).copied()
    }

    pub fn is_numeric(self) -> bool {
        matches!(self, Column::Price)
    }
}

/// One row of the estimate table
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    cells: [String; Column::COUNT],
}

impl LineItem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, column: Column) -> &str {
        &self.cells[column.index()]
    }

    pub fn set(&mut self, column: Column, value: impl Into<String>) {
        self.cells[column.index()] = value.into();
    }

    pub fn price(&self) -> &str {
        self.get(Column::Price)
    }

    pub fn cells(&self) -> &[String] {
        &self.cells
    }

    pub fn is_blank(&self) -> bool {
        self.cells.iter().all(|c| c.trim().is_empty())
    }

    pub fn clear(&mut self) {
        for cell in self.cells.iter_mut() {
            cell.clear();
        }
    }

    /// Copy cells positionally, ignoring anything past the seventh.
    /// Returns how many cells were dropped.
    pub fn fill_from(&mut self, values: &[String]) -> usize {
        for (cell, value) in self.cells.iter_mut().zip(values) {
            cell.clone_from(value);
        }
        values.len().saturating_sub(Column::COUNT)
    }
}

/// Everything the renderer needs to build one `<input>`
#[derive(Debug, Clone, PartialEq)]
pub struct CellSpec {
    pub column: Column,
    /// 1-based, as written to `data-row`
    pub row_number: usize,
    pub class: String,
    pub input_type: Option<&'static str>,
    pub step: Option<&'static str>,
}

/// Builds cell specs for rendered rows
#[derive(Debug, Clone, Copy, Default)]
pub struct RowTemplate;

impl RowTemplate {
    /// Class on every row container
    pub const ROW_CLASS: &'static str = "table-row";

    /// Class shared by every cell
    pub const CELL_CLASS: &'static str = "cell";

    pub fn cells(row_number: usize) -> Vec<CellSpec> {
        Column::ALL
            .iter()
            .map(|&column| CellSpec {
                column,
                row_number,
                class: format!("{} {}", Self::CELL_CLASS, column.class_name()),
                input_type: column.is_numeric().then_some("number"),
                step: column.is_numeric().then_some("0.01"),
            })
            .collect()
    }

    /// Specs for `count` rows, numbered from 1
    pub fn rows(count: usize) -> Vec<Vec<CellSpec>> {
        (1..=count).map(Self::cells).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_order_and_classes() {
        let classes: Vec<_> = Column::ALL.iter().map(|c| c.class_name()).collect();
        assert_eq!(
            classes,
            vec!["itemno", "style", "size", "general", "ext", "itemname", "price"]
        );
    }

    #[test]
    fn test_from_index_roundtrip() {
        for column in Column::ALL {
            assert_eq!(Column::from_index(column.index()), Some(column));
        }
        assert_eq!(Column::from_index(7), None);
    }

    #[test]
    fn test_only_price_is_numeric() {
        let cells = RowTemplate::cells(3);
        assert_eq!(cells.len(), Column::COUNT);
        for cell in &cells {
            assert_eq!(cell.row_number, 3);
            assert_eq!(cell.input_type.is_some(), cell.column == Column::Price);
        }
        assert_eq!(cells[6].class, "cell price");
        assert_eq!(cells[6].step, Some("0.01"));
    }

    #[test]
    fn test_rows_numbered_from_one() {
        let rows = RowTemplate::rows(14);
        assert_eq!(rows.len(), 14);
        assert_eq!(rows[0][0].row_number, 1);
        assert_eq!(rows[13][0].row_number, 14);
    }

    #[test]
    fn test_fill_from_drops_extra_cells() {
        let mut item = LineItem::new();
        let values: Vec<String> = (0..9).map(|i| i.to_string()).collect();
        assert_eq!(item.fill_from(&values), 2);
        assert_eq!(item.get(Column::ItemNo), "0");
        assert_eq!(item.price(), "6");
    }

    #[test]
    fn test_fill_from_short_row_keeps_rest() {
        let mut item = LineItem::new();
        item.set(Column::Price, "10");
        assert_eq!(item.fill_from(&["A1".to_string()]), 0);
        assert_eq!(item.get(Column::ItemNo), "A1");
        assert_eq!(item.price(), "10");
    }

    #[test]
    fn test_clear() {
        let mut item = LineItem::new();
        item.set(Column::Name, "Sofa");
        assert!(!item.is_blank());
        item.clear();
        assert!(item.is_blank());
    }
}

//! Estimate form core
//!
//! Everything the estimate page does that is not DOM plumbing: the
//! line-item schema, totals, the persisted estimate counter, form
//! snapshots, command handlers, PDF assembly from a rasterized form, and
//! the offline-cache policy used by the service worker.
//!
//! Storage is reached only through [`KvStore`], so every component runs
//! natively against [`MemoryStore`] in tests and against `localStorage` in
//! the browser.

pub mod command;
pub mod config;
pub mod counter;
pub mod error;
pub mod form;
pub mod layout;
pub mod offline;
pub mod pdf;
pub mod snapshot;
pub mod store;
pub mod totals;

pub use command::{CommandOutcome, ExportPlan, FormCommand, FormSession};
pub use config::{FormConfig, TAX_RATE};
pub use counter::{export_filename, EstimateCounter, EstimateNumber};
pub use error::EstimateError;
pub use form::FormState;
pub use layout::{CellSpec, Column, LineItem, RowTemplate};
pub use offline::{CacheManifest, CACHE_NAME, PRECACHE_ASSETS};
pub use pdf::{assemble_pdf, fit_to_page, PdfOptions, Placement, RasterImage};
pub use snapshot::{FormSnapshot, LoadOutcome, SnapshotStore};
pub use store::{KvStore, MemoryStore};
pub use totals::{format_money, parse_price, Totals, TotalsDisplay};

//! Persisted estimate-number counter
//!
//! The counter only moves forward, once per successful export. A missing or
//! unreadable value counts as 0, meaning no estimate has been generated yet.

use crate::error::EstimateError;
use crate::store::KvStore;
use serde::Serialize;
use std::fmt;

/// Prefix used in formatted numbers and filenames
pub const ESTIMATE_PREFIX: &str = "EST";

/// An assigned estimate number
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct EstimateNumber(pub u64);

impl EstimateNumber {
    /// `EST0007`; numbers past 9999 simply grow wider
    pub fn formatted(self) -> String {
        format!("{}{:04}", ESTIMATE_PREFIX, self.0)
    }
}

impl fmt::Display for EstimateNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}", self.0)
    }
}

/// Download filename for an estimate-number field value.
///
/// A purely numeric value is a raw counter and gets the `EST` prefix;
/// anything else is used as typed, minus characters that are unsafe in a
/// filename.
pub fn export_filename(estimate_value: &str) -> String {
    let value = estimate_value.trim();
    let stem = if !value.is_empty() && value.chars().all(|c| c.is_ascii_digit()) {
        format!("{}{}", ESTIMATE_PREFIX, value)
    } else {
        value
            .chars()
            .map(|c| match c {
                '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '-',
                c if c.is_whitespace() || c.is_control() => '-',
                c => c,
            })
            .collect()
    };
    format!("Estimate-{}.pdf", stem)
}

pub struct EstimateCounter<S: KvStore> {
    store: S,
    key: String,
}

impl<S: KvStore> EstimateCounter<S> {
    pub fn new(store: S, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
        }
    }

    /// Last number handed out, 0 when none
    pub fn current_number(&self) -> Result<u64, EstimateError> {
        let raw = self.store.get(&self.key)?;
        Ok(raw.and_then(|v| v.trim().parse::<u64>().ok()).unwrap_or(0))
    }

    /// The number the next export will receive, without persisting it
    pub fn peek_next(&self) -> Result<EstimateNumber, EstimateError> {
        Ok(EstimateNumber(self.current_number()?.saturating_add(1)))
    }

    /// Advance the counter and persist it
    pub fn next_number(&self) -> Result<EstimateNumber, EstimateError> {
        let next = self.peek_next()?;
        self.store.set(&self.key, &next.0.to_string())?;
        tracing::info!(number = next.0, "estimate counter advanced");
        Ok(next)
    }

    /// Text for the status element
    pub fn status_label(&self) -> Result<String, EstimateError> {
        Ok(match self.current_number()? {
            0 => "No estimate generated yet".to_string(),
            n => format!("Estimate #{}", EstimateNumber(n)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::COUNTER_KEY;
    use crate::store::MemoryStore;

    fn counter() -> (MemoryStore, EstimateCounter<MemoryStore>) {
        let store = MemoryStore::new();
        (store.clone(), EstimateCounter::new(store, COUNTER_KEY))
    }

    #[test]
    fn test_fresh_counter_is_zero() {
        let (_, counter) = counter();
        assert_eq!(counter.current_number().unwrap(), 0);
        assert_eq!(counter.status_label().unwrap(), "No estimate generated yet");
    }

    #[test]
    fn test_next_number_sequence() {
        let (store, counter) = counter();
        for expected in 1..=5 {
            assert_eq!(counter.next_number().unwrap(), EstimateNumber(expected));
        }
        assert_eq!(store.get(COUNTER_KEY).unwrap().as_deref(), Some("5"));
    }

    #[test]
    fn test_peek_does_not_persist() {
        let (store, counter) = counter();
        assert_eq!(counter.peek_next().unwrap(), EstimateNumber(1));
        assert_eq!(store.get(COUNTER_KEY).unwrap(), None);
    }

    #[test]
    fn test_unparseable_value_reads_as_zero() {
        let (store, counter) = counter();
        store.set(COUNTER_KEY, "not-a-number").unwrap();
        assert_eq!(counter.current_number().unwrap(), 0);
        assert_eq!(counter.next_number().unwrap(), EstimateNumber(1));
    }

    #[test]
    fn test_status_label_is_zero_padded() {
        let (store, counter) = counter();
        store.set(COUNTER_KEY, "7").unwrap();
        assert_eq!(counter.status_label().unwrap(), "Estimate #0007");
    }

    #[test]
    fn test_formatted_number() {
        assert_eq!(EstimateNumber(7).formatted(), "EST0007");
        assert_eq!(EstimateNumber(12345).formatted(), "EST12345");
    }

    #[test]
    fn test_export_filename() {
        assert_eq!(export_filename("EST0007"), "Estimate-EST0007.pdf");
        assert_eq!(export_filename("42"), "Estimate-EST42.pdf");
        assert_eq!(export_filename("Job 12/B"), "Estimate-Job-12-B.pdf");
    }
}

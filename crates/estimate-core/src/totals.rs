//! Subtotal / tax / total calculation
//!
//! Prices are summed at full `f64` precision and rounded to cents only when
//! formatted for display. Malformed price text counts as zero.

use serde::Serialize;

/// Parse a currency-like string.
///
/// Every character outside `[0-9.-]` is stripped first, so `"$1,234.50"`
/// reads as `1234.5`. Anything that still fails to parse (or is not finite)
/// is `0.0`.
pub fn parse_price(input: &str) -> f64 {
    let cleaned: String = input
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect();

    match cleaned.parse::<f64>() {
        Ok(value) if value.is_finite() => value,
        _ => 0.0,
    }
}

/// Format a value with exactly two decimals
pub fn format_money(value: f64) -> String {
    format!("{:.2}", value)
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Totals {
    pub subtotal: f64,
    pub tax: f64,
    pub total: f64,
}

impl Totals {
    pub fn compute<I, S>(prices: I, tax_rate: f64) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let subtotal = prices
            .into_iter()
            .map(|p| parse_price(p.as_ref()))
            .fold(0.0, |acc, v| acc + v);
        let tax = subtotal * tax_rate;
        let total = subtotal + tax;

        tracing::debug!(subtotal, tax, total, "recalculated totals");

        Self {
            subtotal,
            tax,
            total,
        }
    }

    pub fn display(&self) -> TotalsDisplay {
        TotalsDisplay {
            subtotal: format_money(self.subtotal),
            tax: format_money(self.tax),
            total: format_money(self.total),
        }
    }
}

/// The three strings written into `#f_subtotal`, `#f_tax`, `#f_total`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TotalsDisplay {
    pub subtotal: String,
    pub tax: String,
    pub total: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TAX_RATE;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_plain_number() {
        assert_eq!(parse_price("19.99"), 19.99);
        assert_eq!(parse_price("-5"), -5.0);
    }

    #[test]
    fn test_parse_strips_currency_noise() {
        assert_eq!(parse_price("$1,234.50abc"), 1234.5);
        assert_eq!(parse_price("  42 USD "), 42.0);
    }

    #[test]
    fn test_parse_garbage_is_zero() {
        assert_eq!(parse_price(""), 0.0);
        assert_eq!(parse_price("abc"), 0.0);
        assert_eq!(parse_price("1.2.3"), 0.0);
        assert_eq!(parse_price("-"), 0.0);
        assert_eq!(parse_price("5-3"), 0.0);
    }

    #[test]
    fn test_no_prices_is_all_zero() {
        let display = Totals::compute(Vec::<String>::new(), TAX_RATE).display();
        assert_eq!(
            display,
            TotalsDisplay {
                subtotal: "0.00".into(),
                tax: "0.00".into(),
                total: "0.00".into(),
            }
        );
    }

    #[test]
    fn test_blank_cells_are_zero() {
        let display = Totals::compute(["", " ", "n/a"], TAX_RATE).display();
        assert_eq!(display.total, "0.00");
    }

    #[test]
    fn test_known_totals() {
        let totals = Totals::compute(["100", "50.00", ""], TAX_RATE);
        let display = totals.display();
        assert_eq!(display.subtotal, "150.00");
        assert_eq!(display.tax, "13.31");
        assert_eq!(display.total, "163.31");
    }

    #[test]
    fn test_recompute_is_idempotent() {
        let prices = ["12.34", "$5", "x"];
        let first = Totals::compute(prices, TAX_RATE).display();
        let second = Totals::compute(prices, TAX_RATE).display();
        assert_eq!(first, second);
    }

    #[test]
    fn test_format_money_two_decimals() {
        assert_eq!(format_money(3.0), "3.00");
        assert_eq!(format_money(0.1 + 0.2), "0.30");
    }
}

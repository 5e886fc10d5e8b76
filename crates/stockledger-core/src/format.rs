//! Plain-text rendering of a ledger.
//!
//! Produces the inventory table (one block per stocked item, batches in FEFO
//! order) and the movement history table.

use std::fmt::Write;

use crate::{BatchList, Ledger, MovementLog};

/// Formatter configuration.
#[derive(Debug, Clone)]
pub struct FormatConfig {
    /// Width of numeric columns (default: 6).
    pub number_width: usize,
    /// Width of the item column in the history table (default: 11).
    pub item_width: usize,
    /// Indentation for table rows.
    pub indent: String,
}

impl Default for FormatConfig {
    fn default() -> Self {
        Self {
            number_width: 6,
            item_width: 11,
            indent: "  ".to_string(),
        }
    }
}

impl FormatConfig {
    /// Create a new config with the specified numeric column width.
    #[must_use]
    pub fn with_number_width(number_width: usize) -> Self {
        Self {
            number_width,
            ..Default::default()
        }
    }

    /// Create a new config with the specified indent width.
    #[must_use]
    pub fn with_indent(indent_width: usize) -> Self {
        Self {
            indent: " ".repeat(indent_width),
            ..Default::default()
        }
    }
}

/// Render the inventory and the movement history.
pub fn format_ledger(ledger: &Ledger, config: &FormatConfig) -> String {
    let mut out = format_inventory(ledger, config);
    out.push('\n');
    out.push_str(&format_history(ledger.movements(), config));
    out
}

/// Render every stocked item with its batches.
pub fn format_inventory(ledger: &Ledger, config: &FormatConfig) -> String {
    let mut out = String::from("===== INVENTORY =====\n");
    for (item, batches) in ledger.inventory() {
        out.push_str(&format_item(item, batches, config));
    }
    out
}

fn format_item(item: &str, batches: &BatchList, config: &FormatConfig) -> String {
    let width = config.number_width;
    let indent = &config.indent;
    let mut out = String::new();

    writeln!(out, "* Item: {item}").ok();
    writeln!(
        out,
        "{indent}{:>width$} {:>width$}  expiry",
        "amount", "price"
    )
    .ok();
    writeln!(out, "{indent}{}", "-".repeat(2 * width + 10)).ok();
    for batch in batches {
        writeln!(
            out,
            "{indent}{:>width$} {:>width$}  {}",
            batch.amount, batch.unit_price, batch.expiry
        )
        .ok();
    }
    out
}

/// Render the movement log in append order.
pub fn format_history(history: &MovementLog, config: &FormatConfig) -> String {
    let width = config.number_width;
    let item_width = config.item_width;
    let indent = &config.indent;
    let mut out = String::from("===== HISTORY =====\n");

    writeln!(
        out,
        "{indent}{:^item_width$} {:>width$} {:>width$}  tag",
        "item", "amount", "price"
    )
    .ok();
    writeln!(out, "{indent}{}", "-".repeat(item_width + 2 * width + 14)).ok();
    for movement in history {
        writeln!(
            out,
            "{indent}{:^item_width$} {:>width$} {:>width$}  {}",
            movement.item.as_str(),
            movement.amount,
            movement.unit_price,
            movement.tag
        )
        .ok();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Expiry;

    fn expiry(key: &str) -> Expiry {
        key.parse().unwrap()
    }

    fn ledger() -> Ledger {
        let mut ledger = Ledger::new();
        ledger.store("corn", 70, 15, expiry("20220315"), "UniCORN & co.").unwrap();
        ledger.store("peas", 64, 7, expiry("20211101"), "Discount Peas").unwrap();
        ledger
    }

    #[test]
    fn test_format_inventory() {
        let out = format_inventory(&ledger(), &FormatConfig::default());
        let lines: Vec<&str> = out.lines().collect();

        assert_eq!(lines[0], "===== INVENTORY =====");
        assert_eq!(lines[1], "* Item: corn");
        assert_eq!(lines[2], "  amount  price  expiry");
        assert_eq!(lines[4], "      70     15  20220315");
        assert_eq!(lines[5], "* Item: peas");
    }

    #[test]
    fn test_format_history() {
        let ledger = ledger();
        let out = format_history(ledger.movements(), &FormatConfig::default());
        let lines: Vec<&str> = out.lines().collect();

        assert_eq!(lines.len(), 5);
        assert_eq!(lines[3], "     corn         70     15  UniCORN & co.");
    }

    #[test]
    fn test_format_ledger_contains_both_tables() {
        let out = format_ledger(&ledger(), &FormatConfig::with_indent(4));
        assert!(out.contains("===== INVENTORY ====="));
        assert!(out.contains("===== HISTORY ====="));
        assert!(out.lines().any(|line| line == "        70     15  20220315"));
    }
}

//! Reports on a replayed ledger, as text or JSON.

use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Write;
use stockledger_core::analytics::supplier_volumes;
use stockledger_core::{format_ledger, FormatConfig, Inconsistency, Ledger, LedgerSnapshot};

use crate::script::Outcome;

/// JSON output structure for a replay.
#[derive(Debug, Serialize)]
pub struct JsonReport {
    /// What each operation did, in script order.
    pub outcomes: Vec<Outcome>,
    /// Remaining batches per item and the full movement log.
    pub ledger: LedgerSnapshot,
    /// Weighted average unit price of the stock per item.
    pub average_prices: BTreeMap<String, Decimal>,
    /// Inbound units per item per supplier.
    pub supplier_volumes: BTreeMap<String, BTreeMap<String, i128>>,
    /// Top supplier(s) of every item.
    pub best_suppliers: BTreeSet<String>,
    /// Differences between stock and movement log.
    pub inconsistencies: BTreeSet<Inconsistency>,
}

impl JsonReport {
    /// Collect the report for `ledger`.
    pub fn new(ledger: &Ledger, outcomes: Vec<Outcome>) -> Self {
        Self {
            outcomes,
            ledger: ledger.snapshot(),
            average_prices: ledger
                .average_prices()
                .into_iter()
                .map(|(item, price)| (item.to_string(), price))
                .collect(),
            supplier_volumes: supplier_volumes(ledger)
                .into_iter()
                .map(|(item, tags)| {
                    let tags = tags
                        .into_iter()
                        .map(|(tag, volume)| (tag.to_string(), volume))
                        .collect();
                    (item.to_string(), tags)
                })
                .collect(),
            best_suppliers: ledger.best_suppliers(),
            inconsistencies: ledger.find_inconsistencies(),
        }
    }
}

/// Render the text report: tables, analytics, then inconsistencies.
pub fn render_text(ledger: &Ledger, inconsistencies: &BTreeSet<Inconsistency>) -> String {
    let config = FormatConfig::default();
    let mut out = format_ledger(ledger, &config);

    out.push_str("\n===== AVERAGE PRICES =====\n");
    for (item, price) in ledger.average_prices() {
        writeln!(out, "{}{item}: {}", config.indent, price.round_dp(2)).ok();
    }

    out.push_str("\n===== BEST SUPPLIERS =====\n");
    for tag in ledger.best_suppliers() {
        writeln!(out, "{}{tag}", config.indent).ok();
    }

    if !inconsistencies.is_empty() {
        out.push_str("\n===== INCONSISTENCIES =====\n");
        for inconsistency in inconsistencies {
            writeln!(out, "{}{inconsistency}", config.indent).ok();
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::script::{demo_script, replay};

    #[test]
    fn test_render_text_sections() {
        let (ledger, _) = replay(&demo_script()).unwrap();
        let out = render_text(&ledger, &ledger.find_inconsistencies());

        assert!(out.contains("===== INVENTORY ====="));
        assert!(out.contains("===== HISTORY ====="));
        assert!(out.lines().any(|line| line == "  rice: 80.88"));
        assert!(out.lines().any(|line| line == "  RICE Unlimited"));
        assert!(!out.contains("INCONSISTENCIES"));
    }

    #[test]
    fn test_render_text_lists_inconsistencies() {
        let (ledger, _) = replay(&demo_script()).unwrap();
        let found = BTreeSet::from([Inconsistency::new("peas", 1, -1)]);
        let out = render_text(&ledger, &found);

        assert!(out.contains("===== INCONSISTENCIES ====="));
        assert!(out.lines().any(|line| line == "  peas @ 1: -1"));
    }

    #[test]
    fn test_json_report() {
        let (ledger, outcomes) = replay(&demo_script()).unwrap();
        let report = JsonReport::new(&ledger, outcomes);
        let value = serde_json::to_value(&report).unwrap();

        assert_eq!(value["outcomes"].as_array().map(Vec::len), Some(7));
        assert_eq!(value["supplier_volumes"]["rice"]["ACME Rice Ltd."], 142);
        let corn: Decimal = value["average_prices"]["corn"]
            .as_str()
            .unwrap()
            .parse()
            .unwrap();
        assert_eq!(corn, Decimal::from(15));
        assert!(value["inconsistencies"].as_array().unwrap().is_empty());
    }
}

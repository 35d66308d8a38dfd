use std::fmt::Write;

use quote_core::QuoteBreakdown;

/// Renders an itemized quote as plain text.
pub fn breakdown(rule_set: &str, quote: &QuoteBreakdown) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Quote ({rule_set})");
    for (label, amount) in quote.line_items() {
        let _ = writeln!(out, "  {label:<22} ${amount}");
    }
    let _ = writeln!(out, "  {:-<22} {:-<6}", "", "");
    let _ = writeln!(out, "  {:<22} ${}", "Total", quote.total);
    if let Some(note) = &quote.foreign_income_note {
        let _ = writeln!(out, "  Foreign income: {note}");
    }
    out
}

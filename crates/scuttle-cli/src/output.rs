//! Shared output helpers for human and JSON rendering.

use std::io::{self, Write};

use serde::Serialize;

/// Shared width for human separators.
pub const PRETTY_RULE_WIDTH: usize = 60;

/// Write a section heading followed by a separator.
pub fn pretty_section(w: &mut dyn Write, heading: &str) -> io::Result<()> {
    writeln!(w, "{heading}")?;
    writeln!(w, "{:-<width$}", "", width = PRETTY_RULE_WIDTH)
}

/// Render a left-aligned key/value line in human output.
pub fn pretty_kv(w: &mut dyn Write, key: &str, value: impl AsRef<str>) -> io::Result<()> {
    writeln!(w, "{:<12} {}", format!("{key}:"), value.as_ref())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Human,
    Json,
}

/// Print `value` as pretty JSON on stdout.
pub fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kv_pads_the_key() {
        let mut buf = Vec::new();
        pretty_kv(&mut buf, "Seed", "7").unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), "Seed:        7\n");
    }

    #[test]
    fn section_underlines_heading() {
        let mut buf = Vec::new();
        pretty_section(&mut buf, "Order").unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.starts_with("Order\n---"));
        assert_eq!(text.lines().nth(1).unwrap().len(), PRETTY_RULE_WIDTH);
    }
}

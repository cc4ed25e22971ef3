//! Manual availability-column selection.
//!
//! Used only when the resolver cannot pick a column and the session is
//! interactive. Reading and writing go through generic handles so the
//! prompt can be driven from tests.

use anyhow::{bail, Context, Result};
use pmsdash_core::{ColumnHeader, ColumnResolver};
use std::io::{BufRead, Write};

/// Print every header with its 0-based index
pub fn list_headers(headers: &[ColumnHeader], out: &mut impl Write) -> Result<()> {
    for (i, header) in headers.iter().enumerate() {
        let marker = if ColumnResolver::is_date_like(header) { "  (date)" } else { "" };
        writeln!(out, "  [{i:>3}] {header}{marker}")?;
    }
    Ok(())
}

/// List the headers and read a column index from `input`.
///
/// A non-numeric answer or an index past the last header is an error;
/// the caller aborts the run.
pub fn ask_column(
    headers: &[ColumnHeader],
    input: &mut impl BufRead,
    out: &mut impl Write,
) -> Result<usize> {
    writeln!(out, "WARNING: Could not automatically identify the availability column.")?;
    writeln!(out, "Available columns are:")?;
    list_headers(headers, out)?;
    write!(out, "Enter the index number of the availability column: ")?;
    out.flush()?;

    let mut line = String::new();
    let read = input.read_line(&mut line).context("Failed to read column index")?;
    if read == 0 {
        bail!("No column index given");
    }
    let answer = line.trim();
    let index: usize = answer
        .parse()
        .with_context(|| format!("Invalid column index: {answer:?}"))?;
    if index >= headers.len() {
        bail!(
            "Column index {index} is out of range; expected 0 to {}",
            headers.len().saturating_sub(1)
        );
    }
    Ok(index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn headers() -> Vec<ColumnHeader> {
        vec![
            ColumnHeader::text("Region"),
            ColumnHeader::text("Availability"),
            ColumnHeader::text("31-05-2025"),
        ]
    }

    #[test]
    fn reads_a_valid_index() {
        let mut out = Vec::new();
        let index = ask_column(&headers(), &mut Cursor::new("1\n"), &mut out).unwrap();
        assert_eq!(index, 1);

        let shown = String::from_utf8(out).unwrap();
        assert!(shown.contains("[  0] Region"));
        assert!(shown.contains("[  2] 31-05-2025  (date)"));
    }

    #[test]
    fn rejects_out_of_range_index() {
        let err = ask_column(&headers(), &mut Cursor::new("3\n"), &mut Vec::new()).unwrap_err();
        assert!(err.to_string().contains("out of range"));
    }

    #[test]
    fn rejects_non_numeric_answer() {
        let err = ask_column(&headers(), &mut Cursor::new("Availability\n"), &mut Vec::new())
            .unwrap_err();
        assert!(err.to_string().contains("Invalid column index"));
    }

    #[test]
    fn rejects_closed_input() {
        let err = ask_column(&headers(), &mut Cursor::new(""), &mut Vec::new()).unwrap_err();
        assert!(err.to_string().contains("No column index"));
    }
}

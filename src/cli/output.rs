//! Rendering of admin results for the terminal.
//!
//! Human output is a column table for lists and sectioned fieldsets for a single
//! record. With `--json` every result is written as pretty-printed JSON instead.

use crate::{
    admin::{Detail, Table},
    errors::Result,
};
use serde::Serialize;
use std::io::{self, Write};

/// Shared width for separators.
pub const PRETTY_RULE_WIDTH: usize = 72;

/// Column the value starts at in key/value lines.
const KEY_WIDTH: usize = 28;

/// Gap between table columns.
const COLUMN_GAP: &str = "  ";

/// Writes a horizontal separator.
pub fn pretty_rule(w: &mut dyn Write) -> io::Result<()> {
    writeln!(w, "{:-<width$}", "", width = PRETTY_RULE_WIDTH)
}

/// Writes a section heading followed by a separator.
pub fn pretty_section(w: &mut dyn Write, heading: &str) -> io::Result<()> {
    writeln!(w, "{heading}")?;
    pretty_rule(w)
}

/// Writes a left-aligned key/value line.
pub fn pretty_kv(w: &mut dyn Write, key: &str, value: impl AsRef<str>) -> io::Result<()> {
    writeln!(w, "{:<KEY_WIDTH$} {}", format!("{key}:"), value.as_ref())
}

fn write_json<T: Serialize + ?Sized>(w: &mut dyn Write, value: &T) -> Result<()> {
    serde_json::to_writer_pretty(&mut *w, value)?;
    writeln!(w)?;
    Ok(())
}

fn pretty_table(w: &mut dyn Write, table: &Table) -> io::Result<()> {
    let mut widths: Vec<usize> = std::iter::once("id")
        .chain(table.columns.iter().copied())
        .map(str::len)
        .collect();
    for row in &table.rows {
        widths[0] = widths[0].max(row.id.to_string().len());
        for (i, cell) in row.cells.iter().enumerate() {
            if let Some(width) = widths.get_mut(i + 1) {
                *width = (*width).max(cell.chars().count());
            }
        }
    }

    let header: Vec<&str> = std::iter::once("id")
        .chain(table.columns.iter().copied())
        .collect();
    write_line(w, &header, &widths)?;
    let total = widths.iter().sum::<usize>() + COLUMN_GAP.len() * widths.len().saturating_sub(1);
    writeln!(w, "{:-<total$}", "")?;
    for row in &table.rows {
        let id = row.id.to_string();
        let cells: Vec<&str> = std::iter::once(id.as_str())
            .chain(row.cells.iter().map(String::as_str))
            .collect();
        write_line(w, &cells, &widths)?;
    }
    Ok(())
}

fn write_line(w: &mut dyn Write, cells: &[&str], widths: &[usize]) -> io::Result<()> {
    let padded: Vec<String> = cells
        .iter()
        .zip(widths)
        .map(|(cell, &width)| format!("{cell:<width$}"))
        .collect();
    writeln!(w, "{}", padded.join(COLUMN_GAP).trim_end())
}

/// Renders a list view.
pub fn table(w: &mut dyn Write, json: bool, verbose_name: &str, table: &Table) -> Result<()> {
    if json {
        return write_json(w, table);
    }
    if table.rows.is_empty() {
        writeln!(w, "No {} records.", verbose_name.to_lowercase())?;
        return Ok(());
    }
    pretty_table(w, table)?;
    Ok(())
}

/// Renders one record's fieldsets followed by its inline tables.
pub fn detail(w: &mut dyn Write, json: bool, detail: &Detail) -> Result<()> {
    if json {
        return write_json(w, detail);
    }
    pretty_section(w, &detail.title)?;
    for fieldset in &detail.fieldsets {
        writeln!(w)?;
        pretty_section(w, fieldset.name)?;
        for field in &fieldset.fields {
            pretty_kv(w, field.label, &field.value)?;
        }
    }
    for inline in &detail.inlines {
        writeln!(w)?;
        pretty_section(w, inline.name)?;
        if inline.table.rows.is_empty() {
            writeln!(w, "(none)")?;
        } else {
            pretty_table(w, &inline.table)?;
        }
    }
    Ok(())
}

/// Reports a created or updated record. JSON output is the stored record itself.
pub fn saved<T: Serialize>(
    w: &mut dyn Write,
    json: bool,
    verb: &str,
    verbose_name: &str,
    id: i64,
    model: &T,
) -> Result<()> {
    if json {
        return write_json(w, model);
    }
    writeln!(w, "{verb} {verbose_name} #{id}")?;
    Ok(())
}

#[derive(Serialize)]
struct Done<'a> {
    ok: bool,
    message: &'a str,
}

/// Reports an action that returns no record.
pub fn done(w: &mut dyn Write, json: bool, message: &str) -> Result<()> {
    if json {
        return write_json(w, &Done { ok: true, message });
    }
    writeln!(w, "{message}")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::admin::{Fieldset, Inline, Row};

    fn sample_table() -> Table {
        Table {
            columns: vec!["vehicle_id", "make"],
            rows: vec![
                Row {
                    id: 1,
                    cells: vec!["VH-01".to_string(), "Ford".to_string()],
                },
                Row {
                    id: 12,
                    cells: vec!["VH-02".to_string(), "Mercedes-Benz".to_string()],
                },
            ],
        }
    }

    #[test]
    fn test_table_columns_are_aligned() {
        let mut out = Vec::new();
        table(&mut out, false, "Vehicle", &sample_table()).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "id  vehicle_id  make");
        assert!(lines[1].starts_with("----"));
        assert_eq!(lines[2], "1   VH-01       Ford");
        assert_eq!(lines[3], "12  VH-02       Mercedes-Benz");
    }

    #[test]
    fn test_empty_table_message() {
        let mut out = Vec::new();
        let empty = Table {
            columns: vec!["crew_id"],
            rows: Vec::new(),
        };
        table(&mut out, false, "Moving crew", &empty).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "No moving crew records.\n");
    }

    #[test]
    fn test_detail_sections_and_json() {
        let sample = Detail {
            title: "Crew CR-01 - Leader: Test lead".to_string(),
            fieldsets: vec![Fieldset::new("Crew").field("crew_id", "CR-01")],
            inlines: vec![Inline {
                name: "Vehicles",
                table: Table {
                    columns: vec!["vehicle_id"],
                    rows: Vec::new(),
                },
            }],
        };

        let mut out = Vec::new();
        detail(&mut out, false, &sample).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("Crew CR-01 - Leader: Test lead\n"));
        assert!(text.contains("crew_id:"));
        assert!(text.contains("Vehicles\n"));
        assert!(text.contains("(none)"));

        let mut out = Vec::new();
        detail(&mut out, true, &sample).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(value["fieldsets"][0]["fields"][0]["value"], "CR-01");
    }

    #[test]
    fn test_done_json() {
        let mut out = Vec::new();
        done(&mut out, true, "Added driver 3 to crew 1").unwrap();
        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(value["ok"], true);
    }
}

//! Records table

use crate::shared::escape_xml;
use crate::telemetry::reading::Row;

pub const TABLE_ID: &str = "recordsTable";

/// Column headers; rows may have more or fewer cells than this
const HEADERS: [&str; 4] = ["Timestamp", "Plant 1", "Field 3", "Plant 2"];

/// Append-only display table: one body row per record, one cell per field
#[derive(Debug, Clone, Default)]
pub struct RecordsTable {
    body: Vec<Vec<String>>,
}

impl RecordsTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add rows after whatever is already there, in the order given
    pub fn append(&mut self, records: &[Row]) {
        self.body
            .extend(records.iter().map(|r| r.fields().to_vec()));
    }

    #[cfg(test)]
    pub fn body(&self) -> &[Vec<String>] {
        &self.body
    }

    pub fn len(&self) -> usize {
        self.body.len()
    }

    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }

    pub fn to_html(&self) -> String {
        let mut html = format!("<table id=\"{}\">\n<thead><tr>", TABLE_ID);
        for h in HEADERS {
            html.push_str(&format!("<th>{}</th>", h));
        }
        html.push_str("</tr></thead>\n<tbody>\n");
        for row in &self.body {
            html.push_str("<tr>");
            for cell in row {
                html.push_str(&format!("<td>{}</td>", escape_xml(cell)));
            }
            html.push_str("</tr>\n");
        }
        html.push_str("</tbody>\n</table>\n");
        html
    }

    /// Column-aligned plain text for terminals
    pub fn to_text(&self) -> String {
        let columns = self
            .body
            .iter()
            .map(Vec::len)
            .max()
            .unwrap_or(0)
            .max(HEADERS.len());

        let mut widths = vec![0usize; columns];
        for (i, h) in HEADERS.iter().enumerate() {
            widths[i] = h.chars().count();
        }
        for row in &self.body {
            for (i, cell) in row.iter().enumerate() {
                widths[i] = widths[i].max(cell.chars().count());
            }
        }

        let mut out = String::new();
        let header: Vec<String> = HEADERS.iter().map(|h| h.to_string()).collect();
        push_line(&mut out, &header, &widths);
        for row in &self.body {
            push_line(&mut out, row, &widths);
        }
        out
    }
}

fn push_line(out: &mut String, cells: &[String], widths: &[usize]) {
    let line: Vec<String> = cells
        .iter()
        .zip(widths)
        .map(|(c, w)| format!("{:<width$}", c, width = *w))
        .collect();
    out.push_str(line.join("  ").trim_end());
    out.push('\n');
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(lines: &[&[&str]]) -> Vec<Row> {
        lines.iter().map(|l| Row::from(*l)).collect()
    }

    #[test]
    fn test_append_keeps_order_and_duplicates() {
        let mut table = RecordsTable::new();
        let batch = rows(&[&["t2", "1", "x", "2"], &["t1", "3"]]);
        table.append(&batch);
        table.append(&batch);

        assert_eq!(table.len(), 4);
        assert_eq!(table.body()[0][0], "t2");
        assert_eq!(table.body()[1], vec!["t1", "3"]);
        assert_eq!(table.body()[2][0], "t2");
    }

    #[test]
    fn test_html_one_cell_per_field() {
        let mut table = RecordsTable::new();
        table.append(&rows(&[&["<t>", "1", "x", "2", "extra"]]));
        let html = table.to_html();

        assert!(html.starts_with("<table id=\"recordsTable\">"));
        assert!(html.contains("<tr><td>&lt;t&gt;</td><td>1</td><td>x</td><td>2</td><td>extra</td></tr>"));
    }

    #[test]
    fn test_text_is_aligned() {
        let mut table = RecordsTable::new();
        table.append(&rows(&[&["2024-01-01T00:00", "15000", "x", "25000"]]));
        let text = table.to_text();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("Timestamp         Plant 1"));
        assert!(lines[1].starts_with("2024-01-01T00:00  15000  "));
    }
}

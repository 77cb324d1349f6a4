//! Plain HTML rendering of query results.

use crate::row::DataRow;
use crate::types::Value;

const NULL_CELL: &str = "<em>&lt;NULL&gt;</em>";

/// Render rows as an HTML table.
///
/// The header comes from the first row's fields; an empty slice renders an empty table. Cell
/// text is escaped and spaces become `&nbsp;` so fixed-width values keep their alignment.
pub fn to_html(rows: &[DataRow]) -> String {
    let mut lines = vec!["<table>".to_string()];
    if let Some(first) = rows.first() {
        let header: String = first
            .fields()
            .iter()
            .map(|name| format!("<th>{}</th>", escape(name)))
            .collect();
        lines.push(format!("<tr>{header}</tr>"));
    }
    for row in rows {
        let cells: String = row.values().iter().map(cell).collect();
        lines.push(format!("<tr>{cells}</tr>"));
    }
    lines.push("</table>".to_string());
    lines.join("\n")
}

fn cell(value: &Value) -> String {
    match value {
        Value::Null => format!("<td>{NULL_CELL}</td>"),
        other => format!("<td>{}</td>", escape(&other.to_string())),
    }
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            ' ' => out.push_str("&nbsp;"),
            c => out.push(c),
        }
    }
    out
}

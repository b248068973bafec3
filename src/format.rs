// Result formatting
// Turns a QueryResult into text for display; the engine itself only produces the mapping

use crate::error::Result;
use crate::query::{QueryResult, RowSet};
use clap::ValueEnum;

/// How row sets are rendered
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// One JSON object per row, keys in column order
    #[default]
    Json,
    /// A box-drawn grid
    Table,
}

impl OutputFormat {
    /// Render a result; non-row results render their message in every format
    pub fn render(self, result: &QueryResult) -> Result<String> {
        match (self, result) {
            (_, QueryResult::Rows(set)) if set.is_empty() => Ok("No results.".to_string()),
            (OutputFormat::Json, QueryResult::Rows(set)) => json_lines(set),
            (OutputFormat::Table, QueryResult::Rows(set)) => Ok(grid(set)),
            (_, other) => Ok(other.to_string()),
        }
    }
}

pub(crate) fn json_lines(set: &RowSet) -> Result<String> {
    let lines = set
        .records()
        .map(|record| serde_json::to_string(&record))
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(lines.join("\n"))
}

fn grid(set: &RowSet) -> String {
    // Column widths are the widest of the header and every value
    let mut widths: Vec<usize> = set.columns.iter().map(|c| c.chars().count()).collect();
    for row in &set.rows {
        for (i, value) in row.iter().enumerate() {
            widths[i] = widths[i].max(value.to_string().chars().count());
        }
    }

    let mut result = String::new();
    border(&mut result, &widths, ('┌', '┬', '┐'));
    line(&mut result, set.columns.iter().map(String::as_str), &widths);
    border(&mut result, &widths, ('├', '┼', '┤'));
    for row in &set.rows {
        let cells: Vec<String> = row.iter().map(|v| v.to_string()).collect();
        line(&mut result, cells.iter().map(String::as_str), &widths);
    }
    border(&mut result, &widths, ('└', '┴', '┘'));

    result.push_str(&format!("{} row(s) returned", set.len()));
    result
}

fn border(out: &mut String, widths: &[usize], (left, mid, right): (char, char, char)) {
    out.push(left);
    for (i, width) in widths.iter().enumerate() {
        out.push_str(&"─".repeat(width + 2));
        if i < widths.len() - 1 {
            out.push(mid);
        }
    }
    out.push(right);
    out.push('\n');
}

fn line<'a>(out: &mut String, cells: impl Iterator<Item = &'a str>, widths: &[usize]) {
    out.push('│');
    for (cell, width) in cells.zip(widths) {
        out.push_str(&format!(" {:<width$} ", cell, width = width));
        out.push('│');
    }
    out.push('\n');
}

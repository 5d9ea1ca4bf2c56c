//! Plain-text table rendering for terminal output.

use std::borrow::Cow;
use std::fmt::Write as _;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Align {
    #[default]
    Left,
    Right,
}

#[derive(Debug, Clone)]
pub struct Column {
    pub header: String,
    pub align: Align,
}

impl Column {
    pub fn left(header: impl Into<String>) -> Self {
        Self {
            header: header.into(),
            align: Align::Left,
        }
    }

    pub fn right(header: impl Into<String>) -> Self {
        Self {
            header: header.into(),
            align: Align::Right,
        }
    }
}

/// Renders a header, a dashed separator and one line per row.
///
/// Cells beyond the number of columns are dropped; trailing spaces are trimmed.
pub fn render_table(columns: &[Column], rows: &[Vec<String>]) -> String {
    let mut widths = columns
        .iter()
        .map(|column| display_width(&column.header).max(3))
        .collect::<Vec<_>>();
    for row in rows {
        for (idx, cell) in row.iter().enumerate().take(columns.len()) {
            widths[idx] = widths[idx].max(display_width(&sanitize_cell(cell)));
        }
    }

    let mut output = String::new();
    let headers = columns
        .iter()
        .map(|column| column.header.clone())
        .collect::<Vec<_>>();
    let _ = writeln!(output, "{}", format_row(&headers, columns, &widths));
    let separator = widths.iter().map(|w| "-".repeat(*w)).collect::<Vec<_>>();
    let _ = writeln!(output, "{}", format_row(&separator, columns, &widths));
    for row in rows {
        let _ = writeln!(output, "{}", format_row(row, columns, &widths));
    }
    output
}

pub fn print_table(columns: &[Column], rows: &[Vec<String>]) {
    print!("{}", render_table(columns, rows));
}

fn format_row(values: &[String], columns: &[Column], widths: &[usize]) -> String {
    let cells = values
        .iter()
        .zip(columns.iter().zip(widths))
        .map(|(value, (column, width))| {
            let cell = sanitize_cell(value);
            let padding = width.saturating_sub(display_width(&cell));
            match column.align {
                Align::Left => format!("{cell}{}", " ".repeat(padding)),
                Align::Right => format!("{}{cell}", " ".repeat(padding)),
            }
        })
        .collect::<Vec<_>>();
    cells.join("  ").trim_end().to_string()
}

fn display_width(value: &str) -> usize {
    value.chars().count()
}

fn sanitize_cell(value: &str) -> Cow<'_, str> {
    if value.contains(['\n', '\r', '\t']) {
        Cow::Owned(value.replace(['\n', '\r', '\t'], " "))
    } else {
        Cow::Borrowed(value)
    }
}

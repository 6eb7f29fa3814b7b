//! Report tables
//!
//! Columns holding plain integers (indices, frames, clips, health) are
//! right-aligned so values line up by magnitude.

use prettytable::format::consts::FORMAT_NO_LINESEP_WITH_TITLE;
use prettytable::{Cell, Row, Table};

/// Empty table with bold, centered titles
pub fn create_table(headers: &[&str]) -> Table {
    let mut table = Table::new();
    table.set_format(*FORMAT_NO_LINESEP_WITH_TITLE);
    table.set_titles(Row::new(headers.iter().map(|h| Cell::new(h).style_spec("bc")).collect()));
    table
}

/// Appends a row, right-aligning integer cells
pub fn add_table_row(table: &mut Table, cells: Vec<String>) {
    table.add_row(Row::new(cells.iter().map(|s| report_cell(s)).collect()));
}

fn report_cell(text: &str) -> Cell {
    let cell = Cell::new(text);
    if is_integer(text) { cell.style_spec("r") } else { cell }
}

fn is_integer(text: &str) -> bool {
    let digits = text.strip_prefix('-').unwrap_or(text);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integer_cells() {
        assert!(is_integer("42"));
        assert!(is_integer("-762"));
        assert!(!is_integer("-"));
        assert!(!is_integer("2560, 0, 1656"));
        assert!(!is_integer("Door1"));
    }

    #[test]
    fn test_rows_keep_their_text() {
        let mut table = create_table(&["#", "Type"]);
        add_table_row(&mut table, vec!["3".to_string(), "Wolf".to_string()]);

        assert_eq!(table.len(), 1);
        let rendered = table.to_string();
        assert!(rendered.contains("Wolf"));
        assert!(rendered.contains('3'));
    }
}

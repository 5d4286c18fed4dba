use comfy_table::{Attribute, Cell, CellAlignment, Color, Table, presets};
use crossterm::style::Stylize;

/// Borderless table with a dashed line under the header
#[must_use]
pub fn new_table() -> Table {
    let mut table = Table::new();
    table.load_preset(presets::ASCII_HORIZONTAL_ONLY);
    table.remove_style(comfy_table::TableComponent::TopBorder);
    table.remove_style(comfy_table::TableComponent::BottomBorder);
    table
}

/// Borderless table without header
#[must_use]
pub fn new_plain_table() -> Table {
    let mut table = Table::new();
    table.load_preset(presets::NOTHING);
    table
}

#[must_use]
pub fn header(title: &str) -> Cell {
    Cell::new(title).add_attribute(Attribute::Bold)
}

#[must_use]
pub fn number_cell(value: usize) -> Cell {
    use num_format::{Locale, ToFormattedString};
    Cell::new(value.to_formatted_string(&Locale::en))
        .set_alignment(CellAlignment::Right)
        .add_attribute(Attribute::Italic)
}

#[must_use]
pub fn highlighted_cell(value: &str) -> Cell {
    Cell::new(value)
        .add_attribute(Attribute::Bold)
        .fg(Color::Green)
}

pub fn one_column_table<'a>(head: &str, items: impl Iterator<Item = &'a str>) -> Table {
    let mut table = new_table();
    table.set_header(vec![header(head)]);
    for item in items {
        table.add_row(vec![item]);
    }
    table
}

pub fn print_warning(message: &str) {
    eprintln!(" {} {message}", "warning:".dark_yellow().bold());
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(&["Debug", "Release"], &["Debug", "Release"] ; "two rows")]
    #[test_case(&[], &[] ; "header only")]
    fn one_column_table_tests(items: &[&str], expected: &[&str]) {
        // Arrange

        // Act
        let table = one_column_table("Configuration", items.iter().copied());

        // Assert
        let printed = table.to_string();
        assert!(printed.contains("Configuration"));
        for e in expected {
            assert!(printed.contains(e));
        }
        assert_eq!(table.row_iter().count(), expected.len());
    }

    #[test]
    fn number_cell_grouped() {
        // Arrange
        let mut table = new_plain_table();

        // Act
        table.add_row(vec![number_cell(12_345)]);

        // Assert
        assert!(table.to_string().contains("12,345"));
    }
}

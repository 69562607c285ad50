//! Conversion between the log tree and its flat, spreadsheet-shaped form.

mod flat_row;
mod flatten;
mod unflatten;

pub use flat_row::FlatRow;
pub use flatten::flatten;
pub use unflatten::unflatten;

use crate::model::LogBook;

/// Header row followed by one row per leaf path.
pub fn to_sheet(book: &LogBook) -> Vec<Vec<String>> {
    std::iter::once(FlatRow::header_cells())
        .chain(flatten(book).iter().map(FlatRow::to_cells))
        .collect()
}

/// Inverse of [`to_sheet`]. The first row is taken as the header and ignored.
pub fn book_from_sheet(sheet: &[Vec<String>]) -> LogBook {
    let rows: Vec<FlatRow> = sheet
        .iter()
        .skip(1)
        .map(|cells| FlatRow::from_cells(cells.as_slice()))
        .collect();
    unflatten(&rows)
}

use crate::models::{Cell, Column, Table};

/// How a column's values are shown.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ColumnFormat {
    Text,
    /// `DD/MM/YYYY`
    Date,
    /// Two decimal places.
    Number,
    /// Two decimal places followed by `%`.
    Percentage,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct DisplayColumn {
    pub column: Column,
    pub label: &'static str,
    pub format: ColumnFormat,
}

impl DisplayColumn {
    pub fn of(column: Column) -> Self {
        let (label, format) = match column {
            Column::Moje => ("Moje", ColumnFormat::Text),
            Column::OwnerName => ("Owner Name", ColumnFormat::Text),
            Column::SNo => ("Survey No", ColumnFormat::Text),
            Column::BNo => ("Block No", ColumnFormat::Text),
            Column::Fp => ("F.P", ColumnFormat::Text),
            Column::Op => ("O.P", ColumnFormat::Text),
            Column::PlotNumber => ("Plot No", ColumnFormat::Text),
            Column::FlatShopPlot => ("Type", ColumnFormat::Text),
            Column::DastavejNumber => ("Dastavej No", ColumnFormat::Text),
            Column::IndexNumber => ("Index Number", ColumnFormat::Text),
            Column::Date => ("Date", ColumnFormat::Date),
            Column::AreaSqMt => ("Area (Sq.Mt)", ColumnFormat::Number),
            Column::BhagSqMt => ("Bhag (Sq.Mt)", ColumnFormat::Number),
            Column::Percentage => ("Percentage", ColumnFormat::Percentage),
            Column::Aakar => ("Aakar", ColumnFormat::Number),
        };
        DisplayColumn {
            column,
            label,
            format,
        }
    }
}

/// The columns to render, in table order. Index Number stays searchable in
/// the table but is never shown.
pub fn project(table: &Table) -> Vec<DisplayColumn> {
    table
        .columns
        .iter()
        .filter(|c| **c != Column::IndexNumber)
        .map(|c| DisplayColumn::of(*c))
        .collect()
}

/// Missing values render as an empty string. The result is not escaped.
pub fn format_cell(cell: Cell<'_>, format: ColumnFormat) -> String {
    match (cell, format) {
        (Cell::Text(Some(v)), _) => v.to_string(),
        (Cell::Date(Some(d)), _) => d.format("%d/%m/%Y").to_string(),
        (Cell::Number(Some(n)), ColumnFormat::Percentage) => format!("{n:.2}%"),
        (Cell::Number(Some(n)), _) => format!("{n:.2}"),
        (Cell::Text(None) | Cell::Number(None) | Cell::Date(None), _) => {
            String::new()
        }
    }
}

use crate::loader::{LoadError, Loader};
use chrono::NaiveDate;
use regex::Regex;
use std::sync::OnceLock;

#[derive(Clone)]
pub struct AppState {
    pub loader: Loader,
}

/// The fixed set of columns in the "Property Details" sheet.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Column {
    Moje,
    OwnerName,
    SNo,
    BNo,
    Fp,
    Op,
    PlotNumber,
    FlatShopPlot,
    DastavejNumber,
    IndexNumber,
    Date,
    AreaSqMt,
    BhagSqMt,
    Percentage,
    Aakar,
}

impl Column {
    pub const ALL: [Column; 15] = [
        Column::Moje,
        Column::OwnerName,
        Column::SNo,
        Column::BNo,
        Column::Fp,
        Column::Op,
        Column::PlotNumber,
        Column::FlatShopPlot,
        Column::DastavejNumber,
        Column::IndexNumber,
        Column::Date,
        Column::AreaSqMt,
        Column::BhagSqMt,
        Column::Percentage,
        Column::Aakar,
    ];

    /// The header text as it appears in row 0 of the sheet.
    pub fn header(&self) -> &'static str {
        match self {
            Column::Moje => "Moje",
            Column::OwnerName => "Owner Name",
            Column::SNo => "S.No",
            Column::BNo => "B.No",
            Column::Fp => "F.P",
            Column::Op => "O.P",
            Column::PlotNumber => "Plot Number",
            Column::FlatShopPlot => "Flat/Shop/Plot",
            Column::DastavejNumber => "Dastavej Number",
            Column::IndexNumber => "Index Number",
            Column::Date => "Date",
            Column::AreaSqMt => "Area Sq.Mt",
            Column::BhagSqMt => "Bhag Sq.Mt",
            Column::Percentage => "Percentage",
            Column::Aakar => "Aakar",
        }
    }

    /// Stable, URL-safe identifier used in sort links.
    pub fn slug(&self) -> &'static str {
        match self {
            Column::Moje => "moje",
            Column::OwnerName => "owner-name",
            Column::SNo => "s-no",
            Column::BNo => "b-no",
            Column::Fp => "f-p",
            Column::Op => "o-p",
            Column::PlotNumber => "plot-number",
            Column::FlatShopPlot => "flat-shop-plot",
            Column::DastavejNumber => "dastavej-number",
            Column::IndexNumber => "index-number",
            Column::Date => "date",
            Column::AreaSqMt => "area-sq-mt",
            Column::BhagSqMt => "bhag-sq-mt",
            Column::Percentage => "percentage",
            Column::Aakar => "aakar",
        }
    }

    pub fn from_header(header: &str) -> Option<Self> {
        let header = header.trim();
        Self::ALL.into_iter().find(|c| c.header() == header)
    }

    pub fn from_slug(slug: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.slug() == slug)
    }
}

/// One row of the sheet. `None` marks a value that was absent or could not
/// be coerced to the column's type.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PropertyRecord {
    pub moje: Option<String>,
    pub owner_name: Option<String>,
    pub s_no: Option<String>,
    pub b_no: Option<String>,
    pub fp: Option<String>,
    pub op: Option<String>,
    pub plot_number: Option<String>,
    pub flat_shop_plot: Option<String>,
    pub dastavej_number: Option<String>,
    pub index_number: Option<String>,
    pub date: Option<NaiveDate>,
    pub area_sq_mt: Option<f64>,
    pub bhag_sq_mt: Option<f64>,
    pub percentage: Option<f64>,
    pub aakar: Option<f64>,
}

/// A borrowed view of one value, tagged with its kind.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Cell<'a> {
    Text(Option<&'a str>),
    Number(Option<f64>),
    Date(Option<NaiveDate>),
}

impl Cell<'_> {
    pub fn is_missing(&self) -> bool {
        match self {
            Cell::Text(v) => v.is_none(),
            Cell::Number(v) => v.is_none(),
            Cell::Date(v) => v.is_none(),
        }
    }
}

impl PropertyRecord {
    pub fn cell(&self, column: Column) -> Cell<'_> {
        match column {
            Column::Moje => Cell::Text(self.moje.as_deref()),
            Column::OwnerName => Cell::Text(self.owner_name.as_deref()),
            Column::SNo => Cell::Text(self.s_no.as_deref()),
            Column::BNo => Cell::Text(self.b_no.as_deref()),
            Column::Fp => Cell::Text(self.fp.as_deref()),
            Column::Op => Cell::Text(self.op.as_deref()),
            Column::PlotNumber => Cell::Text(self.plot_number.as_deref()),
            Column::FlatShopPlot => {
                Cell::Text(self.flat_shop_plot.as_deref())
            }
            Column::DastavejNumber => {
                Cell::Text(self.dastavej_number.as_deref())
            }
            Column::IndexNumber => Cell::Text(self.index_number.as_deref()),
            Column::Date => Cell::Date(self.date),
            Column::AreaSqMt => Cell::Number(self.area_sq_mt),
            Column::BhagSqMt => Cell::Number(self.bhag_sq_mt),
            Column::Percentage => Cell::Number(self.percentage),
            Column::Aakar => Cell::Number(self.aakar),
        }
    }

    /// Builds a record from one source row, given where each known column
    /// sits in the header.
    fn from_row(row: &[String], positions: &[(Column, usize)]) -> Self {
        let mut record = PropertyRecord::default();
        for &(column, idx) in positions {
            let raw = row.get(idx).map(String::as_str);
            let text = || raw.map(str::to_string);
            let number = || raw.and_then(parse_number);
            match column {
                Column::Moje => record.moje = text(),
                Column::OwnerName => record.owner_name = text(),
                Column::SNo => record.s_no = text(),
                Column::BNo => record.b_no = text(),
                Column::Fp => record.fp = text(),
                Column::Op => record.op = text(),
                Column::PlotNumber => record.plot_number = text(),
                Column::FlatShopPlot => record.flat_shop_plot = text(),
                Column::DastavejNumber => record.dastavej_number = text(),
                Column::IndexNumber => record.index_number = text(),
                Column::Date => record.date = raw.and_then(parse_date),
                Column::AreaSqMt => record.area_sq_mt = number(),
                Column::BhagSqMt => record.bhag_sq_mt = number(),
                Column::Percentage => record.percentage = number(),
                Column::Aakar => record.aakar = number(),
            }
        }
        record
    }
}

/// The loaded sheet. `columns` keeps the header's order; `records` keeps the
/// source row order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Table {
    pub columns: Vec<Column>,
    pub records: Vec<PropertyRecord>,
}

impl Table {
    /// Treats `rows[0]` as the header and every following row as data.
    pub fn from_rows(rows: Vec<Vec<String>>) -> Result<Self, LoadError> {
        let mut rows = rows.into_iter();
        let header = rows.next().ok_or(LoadError::EmptySheet)?;

        let mut positions: Vec<(Column, usize)> = Vec::new();
        for (idx, name) in header.iter().enumerate() {
            if let Some(column) = Column::from_header(name) {
                if !positions.iter().any(|(c, _)| *c == column) {
                    positions.push((column, idx));
                }
            }
        }

        let missing: Vec<String> = Column::ALL
            .iter()
            .filter(|c| !positions.iter().any(|(p, _)| p == *c))
            .map(|c| c.header().to_string())
            .collect();
        if !missing.is_empty() {
            return Err(LoadError::MissingColumns(missing));
        }

        let records = rows
            .map(|row| PropertyRecord::from_row(&row, &positions))
            .collect();

        Ok(Table {
            columns: positions.iter().map(|(c, _)| *c).collect(),
            records,
        })
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Empty, non-numeric, and non-finite text are all missing.
pub fn parse_number(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Strict `DD/MM/YYYY`. Impossible calendar dates like 31/02 are missing.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    static SHAPE: OnceLock<Regex> = OnceLock::new();
    let shape = SHAPE.get_or_init(|| {
        Regex::new(r"^\d{2}/\d{2}/\d{4}$").expect("date shape regex is valid")
    });
    let raw = raw.trim();
    if !shape.is_match(raw) {
        return None;
    }
    NaiveDate::parse_from_str(raw, "%d/%m/%Y").ok()
}

#[cfg(test)]
pub mod tests {
    use super::*;

    pub fn header() -> Vec<String> {
        Column::ALL.iter().map(|c| c.header().to_string()).collect()
    }

    /// A row in `Column::ALL` order with only the given cells filled in.
    pub fn row(cells: &[(Column, &str)]) -> Vec<String> {
        Column::ALL
            .iter()
            .map(|c| {
                cells
                    .iter()
                    .find(|(col, _)| col == c)
                    .map(|(_, v)| v.to_string())
                    .unwrap_or_default()
            })
            .collect()
    }

    pub fn sample_table() -> Table {
        Table::from_rows(vec![
            header(),
            row(&[
                (Column::Moje, "Plot A"),
                (Column::OwnerName, "Ramesh Patel"),
                (Column::AreaSqMt, "120.5"),
                (Column::Date, "15/08/2021"),
                (Column::IndexNumber, "IDX-1"),
            ]),
            row(&[
                (Column::Moje, "Vastrapur"),
                (Column::OwnerName, "John SMITH"),
                (Column::AreaSqMt, "abc"),
                (Column::Percentage, "12.5"),
            ]),
            row(&[
                (Column::Moje, "Bopal"),
                (Column::OwnerName, "Smithson Trust"),
                (Column::AreaSqMt, "98"),
                (Column::Date, "31/02/2024"),
            ]),
        ])
        .expect("sample table loads")
    }

    #[test]
    fn test_preserves_row_count_and_order() {
        let table = sample_table();
        assert_eq!(table.len(), 3);
        let mojes: Vec<_> =
            table.records.iter().map(|r| r.moje.as_deref()).collect();
        assert_eq!(mojes, vec![Some("Plot A"), Some("Vastrapur"), Some("Bopal")]);
        assert_eq!(table.columns, Column::ALL.to_vec());
    }

    #[test]
    fn test_numeric_coercion() {
        let table = sample_table();
        assert_eq!(table.records[0].area_sq_mt, Some(120.5));
        assert_eq!(table.records[1].area_sq_mt, None);
        assert_eq!(table.records[2].area_sq_mt, Some(98.0));
        assert_eq!(table.records[1].percentage, Some(12.5));
        // blank numeric cells are missing, not zero
        assert_eq!(table.records[0].aakar, None);
    }

    #[test]
    fn test_parse_number() {
        assert_eq!(parse_number(" 42 "), Some(42.0));
        assert_eq!(parse_number("-1.5e2"), Some(-150.0));
        assert_eq!(parse_number(""), None);
        assert_eq!(parse_number("1,234"), None);
        assert_eq!(parse_number("NaN"), None);
        assert_eq!(parse_number("inf"), None);
    }

    #[test]
    fn test_date_coercion() {
        let table = sample_table();
        assert_eq!(
            table.records[0].date,
            NaiveDate::from_ymd_opt(2021, 8, 15)
        );
        assert_eq!(table.records[1].date, None);
        assert_eq!(table.records[2].date, None);
    }

    #[test]
    fn test_parse_date() {
        assert_eq!(parse_date("01/02/2024"), NaiveDate::from_ymd_opt(2024, 2, 1));
        assert_eq!(parse_date("29/02/2024"), NaiveDate::from_ymd_opt(2024, 2, 29));
        assert_eq!(parse_date("29/02/2023"), None);
        assert_eq!(parse_date("1/2/2024"), None);
        assert_eq!(parse_date("2024-02-01"), None);
        assert_eq!(parse_date("01/13/2024"), None);
        assert_eq!(parse_date(""), None);
    }

    #[test]
    fn test_header_order_is_kept() {
        let mut header = header();
        header.reverse();
        header.push("Notes".into());
        let table = Table::from_rows(vec![header]).expect("loads");
        let mut expected = Column::ALL.to_vec();
        expected.reverse();
        assert_eq!(table.columns, expected);
        assert!(table.is_empty());
    }

    #[test]
    fn test_columns_are_found_by_name_not_position() {
        let mut header = header();
        header.swap(0, 1);
        let mut data = row(&[
            (Column::Moje, "Plot A"),
            (Column::OwnerName, "Ramesh"),
        ]);
        data.swap(0, 1);
        let table = Table::from_rows(vec![header, data]).expect("loads");
        assert_eq!(table.records[0].moje.as_deref(), Some("Plot A"));
        assert_eq!(table.records[0].owner_name.as_deref(), Some("Ramesh"));
    }

    #[test]
    fn test_short_rows_are_missing_not_empty() {
        let table = Table::from_rows(vec![
            header(),
            vec!["Plot A".into(), "".into()],
        ])
        .expect("loads");
        let record = &table.records[0];
        assert_eq!(record.moje.as_deref(), Some("Plot A"));
        assert_eq!(record.owner_name.as_deref(), Some(""));
        assert_eq!(record.s_no, None);
        assert_eq!(record.aakar, None);
    }

    #[test]
    fn test_empty_sheet() {
        assert!(matches!(
            Table::from_rows(vec![]),
            Err(LoadError::EmptySheet)
        ));
    }

    #[test]
    fn test_missing_columns() {
        let header: Vec<String> = header()
            .into_iter()
            .filter(|h| h != "Aakar" && h != "Moje")
            .collect();
        match Table::from_rows(vec![header]) {
            Err(LoadError::MissingColumns(cols)) => {
                assert_eq!(cols, vec!["Moje".to_string(), "Aakar".to_string()])
            }
            other => panic!("expected missing columns, got {other:?}"),
        }
    }

    #[test]
    fn test_column_lookup() {
        assert_eq!(Column::from_header(" Owner Name "), Some(Column::OwnerName));
        assert_eq!(Column::from_header("owner name"), None);
        for column in Column::ALL {
            assert_eq!(Column::from_slug(column.slug()), Some(column));
        }
    }
}

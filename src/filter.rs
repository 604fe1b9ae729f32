//! Narrowing and ordering the loaded table for one render. Both operations
//! take the table by reference and hand back a new one.

use crate::models::{Cell, Column, PropertyRecord, Table};
use std::cmp::Ordering;

/// Keeps the rows whose Moje or Owner Name contains `term`, ignoring case.
/// An absent or empty term keeps every row.
pub fn filter(table: &Table, term: Option<&str>) -> Table {
    let term = match term {
        Some(t) if !t.is_empty() => t.to_lowercase(),
        _ => return table.clone(),
    };
    let contains = |value: &Option<String>| {
        value
            .as_deref()
            .is_some_and(|v| v.to_lowercase().contains(&term))
    };
    Table {
        columns: table.columns.clone(),
        records: table
            .records
            .iter()
            .filter(|r| contains(&r.moje) || contains(&r.owner_name))
            .cloned()
            .collect(),
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Asc => "asc",
            Direction::Desc => "desc",
        }
    }

    pub fn flip(&self) -> Self {
        match self {
            Direction::Asc => Direction::Desc,
            Direction::Desc => Direction::Asc,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct SortOrder {
    pub column: Column,
    pub direction: Direction,
}

impl SortOrder {
    /// `None` when the slug names no column. Any direction other than
    /// `desc` sorts ascending.
    pub fn parse(slug: &str, direction: Option<&str>) -> Option<Self> {
        let column = Column::from_slug(slug)?;
        let direction = match direction {
            Some("desc") => Direction::Desc,
            _ => Direction::Asc,
        };
        Some(SortOrder { column, direction })
    }
}

/// Stable sort on one column. Missing values go last in either direction.
pub fn sort(table: &Table, order: SortOrder) -> Table {
    let mut records = table.records.clone();
    records.sort_by(|a, b| compare(a, b, order));
    Table {
        columns: table.columns.clone(),
        records,
    }
}

fn compare(a: &PropertyRecord, b: &PropertyRecord, order: SortOrder) -> Ordering {
    let (a, b) = (a.cell(order.column), b.cell(order.column));
    match (a.is_missing(), b.is_missing()) {
        (true, true) => return Ordering::Equal,
        (true, false) => return Ordering::Greater,
        (false, true) => return Ordering::Less,
        (false, false) => {}
    }
    let ord = match (a, b) {
        (Cell::Text(Some(a)), Cell::Text(Some(b))) => {
            a.to_lowercase().cmp(&b.to_lowercase())
        }
        (Cell::Number(Some(a)), Cell::Number(Some(b))) => a.total_cmp(&b),
        (Cell::Date(Some(a)), Cell::Date(Some(b))) => a.cmp(&b),
        // both cells come from the same column
        _ => Ordering::Equal,
    };
    match order.direction {
        Direction::Asc => ord,
        Direction::Desc => ord.reverse(),
    }
}

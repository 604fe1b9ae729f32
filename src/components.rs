use super::{
    display::{self, ColumnFormat},
    filter::{Direction, SortOrder},
    models::Table,
    routes::Route,
};
use ammonia::{clean, clean_text};
use std::fmt::Write;

pub const TITLE: &str = "Property Management System";

pub trait Component {
    /// Render the component to a HTML string. By convention, the
    /// implementation should sanitize all string properties at render-time
    fn render(&self) -> String;
}

pub struct Page<'a> {
    pub title: &'a str,
    pub children: Box<dyn Component + 'a>,
}

impl Component for Page<'_> {
    fn render(&self) -> String {
        let styles = include_str!("./styles.css");
        format!(
            r#"
            <!DOCTYPE html>
            <html>
                <head>
                    <meta charset="utf-8" />
                    <meta name="viewport" content="width=device-width, initial-scale=1.0" />
                    <title>{title}</title>
                    <style>
                        {styles}
                    </style>
                </head>
                <body>
                    {body_html}
                    <script src="https://unpkg.com/htmx.org@1.9.6"></script>
                </body>
            </html>
            "#,
            title = clean(self.title),
            body_html = self.children.render()
        )
    }
}

/// Page chrome around the records area: heading, search box, and the
/// refresh button. `records` is already-rendered HTML.
pub struct Dashboard<'a> {
    pub search: &'a str,
    pub sort: Option<SortOrder>,
    pub records: String,
}
impl Component for Dashboard<'_> {
    fn render(&self) -> String {
        let records_route = Route::Records;
        let search = clean_text(self.search);
        let sort_state = SortState {
            sort: self.sort,
            out_of_band: false,
        }
        .render();
        let records = &self.records;
        format!(
            r##"
            <main>
                <h1>{TITLE}</h1>
                <form
                    id="controls"
                    class="controls"
                    action="{records_route}"
                    method="get"
                    hx-get="{records_route}"
                    hx-target="#records"
                    hx-swap="innerHTML"
                    hx-trigger="submit, input changed delay:300ms from:#search, search from:#search"
                >
                    <input
                        type="search"
                        id="search"
                        name="search"
                        value="{search}"
                        placeholder="Search by Moje (Property Name) or Owner Name"
                        autocomplete="off"
                    />
                    {sort_state}
                    <button type="submit">Refresh Data</button>
                </form>
                <div id="records">
                    {records}
                </div>
            </main>
            "##
        )
    }
}

/// Hidden inputs carrying the active sort, so searching and refreshing keep
/// the ordering. Record fragments re-send it out-of-band.
struct SortState {
    sort: Option<SortOrder>,
    out_of_band: bool,
}
impl Component for SortState {
    fn render(&self) -> String {
        let inputs = match self.sort {
            Some(order) => format!(
                r#"
                <input type="hidden" name="sort" value="{slug}" />
                <input type="hidden" name="dir" value="{dir}" />
                "#,
                slug = order.column.slug(),
                dir = order.direction.as_str()
            ),
            None => "".to_string(),
        };
        let oob = if self.out_of_band {
            r#" hx-swap-oob="true""#
        } else {
            ""
        };
        format!(r#"<div id="sort-state"{oob}>{inputs}</div>"#)
    }
}

pub struct RecordTable<'a> {
    pub table: &'a Table,
    /// Row count before filtering.
    pub total: usize,
    pub search: &'a str,
    pub sort: Option<SortOrder>,
}
impl Component for RecordTable<'_> {
    fn render(&self) -> String {
        let columns = display::project(self.table);
        let colspan = columns.len().max(1);

        let header = columns.iter().fold(String::new(), |mut acc, col| {
            let active = self.sort.filter(|o| o.column == col.column);
            let next_dir = match active {
                Some(o) => o.direction.flip(),
                None => Direction::Asc,
            };
            let indicator = match active.map(|o| o.direction) {
                Some(Direction::Asc) => " &#9650;",
                Some(Direction::Desc) => " &#9660;",
                None => "",
            };
            let href = clean_text(&Route::Records.with_query(&[
                ("search", self.search),
                ("sort", col.column.slug()),
                ("dir", next_dir.as_str()),
            ]));
            let _ = write!(
                acc,
                r##"<th class="{align}"><a href="{href}" hx-get="{href}" hx-target="#records" hx-swap="innerHTML">{label}{indicator}</a></th>"##,
                align = align_class(col.format),
                label = clean_text(col.label),
            );
            acc
        });

        let body = if self.table.is_empty() {
            format!(
                r#"<tr><td class="empty" colspan="{colspan}">No matching records</td></tr>"#
            )
        } else {
            self.table.records.iter().fold(String::new(), |mut acc, record| {
                acc.push_str("<tr>");
                for col in &columns {
                    let cell = record.cell(col.column);
                    let class = if cell.is_missing() {
                        format!("{} missing", align_class(col.format))
                    } else {
                        align_class(col.format).to_string()
                    };
                    let _ = write!(
                        acc,
                        r#"<td class="{class}">{value}</td>"#,
                        value = clean_text(&display::format_cell(cell, col.format))
                    );
                }
                acc.push_str("</tr>");
                acc
            })
        };

        let shown = self.table.len();
        let total = self.total;
        let count = if shown == total {
            format!("{total} records")
        } else {
            format!("Showing {shown} of {total} records")
        };
        let sort_state = SortState {
            sort: self.sort,
            out_of_band: true,
        }
        .render();

        format!(
            r#"
            <p class="count">{count}</p>
            <div class="table-wrap">
                <table>
                    <thead><tr>{header}</tr></thead>
                    <tbody>{body}</tbody>
                </table>
            </div>
            {sort_state}
            "#
        )
    }
}

fn align_class(format: ColumnFormat) -> &'static str {
    match format {
        ColumnFormat::Number | ColumnFormat::Percentage => "num",
        ColumnFormat::Text | ColumnFormat::Date => "text",
    }
}

pub struct LoadFailure<'a> {
    pub message: &'a str,
}
impl Component for LoadFailure<'_> {
    fn render(&self) -> String {
        let message = clean_text(self.message);
        format!(
            r#"<div class="error" role="alert">Error loading data: {message}</div>"#
        )
    }
}

use super::{
    components::{self, Component},
    filter::{filter, sort, SortOrder},
    htmx,
    loader::Loader,
    models::AppState,
};
use axum::{
    extract::{Query, State},
    http::HeaderMap,
    response::IntoResponse,
};
use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
pub struct RecordsQuery {
    search: Option<String>,
    sort: Option<String>,
    dir: Option<String>,
}

impl RecordsQuery {
    fn search(&self) -> &str {
        self.search.as_deref().unwrap_or("")
    }
    fn sort_order(&self) -> Option<SortOrder> {
        SortOrder::parse(self.sort.as_deref()?, self.dir.as_deref())
    }
}

pub async fn root(
    State(AppState { loader }): State<AppState>,
    Query(query): Query<RecordsQuery>,
) -> impl IntoResponse {
    let records = render_records(&loader, &query).await;
    full_page(&query, records)
}

/// The records fragment that htmx swaps in on search, sort, and refresh.
/// Without htmx (a bookmarked or no-js request) the whole page comes back.
pub async fn list_records(
    State(AppState { loader }): State<AppState>,
    Query(query): Query<RecordsQuery>,
    headers: HeaderMap,
) -> impl IntoResponse {
    let records = render_records(&loader, &query).await;
    if htmx::is_htmx_request(&headers) {
        records
    } else {
        full_page(&query, records)
    }
}

pub async fn pong() -> impl IntoResponse {
    "pong"
}

fn full_page(query: &RecordsQuery, records: String) -> String {
    components::Page {
        title: components::TITLE,
        children: Box::new(components::Dashboard {
            search: query.search(),
            sort: query.sort_order(),
            records,
        }),
    }
    .render()
}

/// One render cycle: a fresh load, then filter and sort. A failed load
/// renders the failure message in place of the table.
async fn render_records(loader: &Loader, query: &RecordsQuery) -> String {
    match loader.load().await {
        Ok(table) => {
            let filtered = filter(&table, Some(query.search()));
            let sort_order = query.sort_order();
            let view = match sort_order {
                Some(order) => sort(&filtered, order),
                None => filtered,
            };
            components::RecordTable {
                table: &view,
                total: table.len(),
                search: query.search(),
                sort: sort_order,
            }
            .render()
        }
        Err(e) => components::LoadFailure {
            message: &e.to_string(),
        }
        .render(),
    }
}

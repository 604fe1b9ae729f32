//! Fetches the property sheet and turns it into a [Table].
//!
//! The network side sits behind [SheetSource] so the rest of the app can be
//! exercised against canned rows. [GoogleSheets] is the real implementation,
//! talking to the Sheets REST API `values` endpoint.

use super::{config::Credentials, models::Table};
use async_trait::async_trait;
use reqwest::{StatusCode, Url};
use serde::Deserialize;
use std::{sync::Arc, time::Duration};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Every way a load can fail. The `Display` text is what the user sees.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("authentication with the spreadsheet service failed: {0}")]
    Auth(String),
    #[error("spreadsheet or sheet not found: {0}")]
    NotFound(String),
    #[error("spreadsheet service unavailable: {0}")]
    Unavailable(String),
    #[error("unexpected response from the spreadsheet service: {0}")]
    Malformed(String),
    #[error("the sheet is empty; expected a header row")]
    EmptySheet,
    #[error("the header row is missing columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),
}

#[async_trait]
pub trait SheetSource: Send + Sync {
    /// All rows of the sheet as text, header first.
    async fn fetch_rows(&self) -> Result<Vec<Vec<String>>, LoadError>;
}

/// Runs one load per call; nothing is cached between calls.
#[derive(Clone)]
pub struct Loader {
    source: Arc<dyn SheetSource>,
}

impl Loader {
    pub fn new(source: impl SheetSource + 'static) -> Self {
        Self {
            source: Arc::new(source),
        }
    }

    pub async fn load(&self) -> Result<Table, LoadError> {
        debug!("loading property sheet");
        let result = self
            .source
            .fetch_rows()
            .await
            .and_then(Table::from_rows);
        match &result {
            Ok(table) => info!(rows = table.len(), "property sheet loaded"),
            Err(e) => warn!(error = %e, "property sheet failed to load"),
        }
        result
    }
}

pub struct GoogleSheets {
    client: reqwest::Client,
    endpoint: Url,
    spreadsheet_id: String,
    sheet_name: String,
    credentials: Credentials,
}

/// Body of a successful `values.get` call. `values` is omitted entirely
/// when the sheet has no content.
#[derive(Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<String>>,
}

#[derive(Deserialize)]
struct ApiErrorBody {
    error: ApiError,
}

#[derive(Deserialize)]
struct ApiError {
    message: String,
}

impl GoogleSheets {
    pub fn new(
        endpoint: &str,
        spreadsheet_id: &str,
        sheet_name: &str,
        credentials: Credentials,
        timeout: Duration,
    ) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("pms/", env!("CARGO_PKG_VERSION")))
            .build()?;
        let endpoint = Url::parse(endpoint)?;
        if endpoint.cannot_be_a_base() {
            anyhow::bail!("sheets endpoint {endpoint} cannot be a base url");
        }
        Ok(Self {
            client,
            endpoint,
            spreadsheet_id: spreadsheet_id.to_string(),
            sheet_name: sheet_name.to_string(),
            credentials,
        })
    }

    fn values_url(&self) -> Url {
        let mut url = self.endpoint.clone();
        // A1 notation: a bare sheet name selects the whole sheet. Quoting
        // keeps names with spaces from being read as a range.
        let range = format!("'{}'", self.sheet_name.replace('\'', "''"));
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .push("spreadsheets")
                .push(&self.spreadsheet_id)
                .push("values")
                .push(&range);
        }
        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("majorDimension", "ROWS")
                .append_pair("valueRenderOption", "FORMATTED_VALUE");
            if let Credentials::ApiKey(key) = &self.credentials {
                query.append_pair("key", key);
            }
        }
        url
    }
}

#[async_trait]
impl SheetSource for GoogleSheets {
    async fn fetch_rows(&self) -> Result<Vec<Vec<String>>, LoadError> {
        let mut request = self.client.get(self.values_url());
        if let Credentials::AccessToken(token) = &self.credentials {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| LoadError::Unavailable(e.to_string()))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| LoadError::Unavailable(e.to_string()))?;

        if !status.is_success() {
            return Err(status_error(status, &body));
        }

        let range: ValueRange = serde_json::from_str(&body)
            .map_err(|e| LoadError::Malformed(e.to_string()))?;
        Ok(range.values)
    }
}

fn status_error(status: StatusCode, body: &str) -> LoadError {
    let detail = match serde_json::from_str::<ApiErrorBody>(body) {
        Ok(b) => format!("{status}: {}", b.error.message),
        Err(_) => status.to_string(),
    };
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            LoadError::Auth(detail)
        }
        StatusCode::NOT_FOUND => LoadError::NotFound(detail),
        _ => LoadError::Unavailable(detail),
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use crate::models::{self, Column};
    use axum::{
        extract::{Path, Query},
        http::{HeaderMap, StatusCode},
        response::IntoResponse,
        routing::get,
        Router,
    };
    use std::{collections::HashMap, net::TcpListener};

    /// Canned rows, or a canned failure built fresh on every fetch.
    pub enum FakeSheet {
        Rows(Vec<Vec<String>>),
        Fails(fn() -> LoadError),
    }

    #[async_trait]
    impl SheetSource for FakeSheet {
        async fn fetch_rows(&self) -> Result<Vec<Vec<String>>, LoadError> {
            match self {
                FakeSheet::Rows(rows) => Ok(rows.clone()),
                FakeSheet::Fails(make) => Err(make()),
            }
        }
    }

    #[tokio::test]
    async fn test_load_builds_table() {
        let loader = Loader::new(FakeSheet::Rows(vec![
            models::tests::header(),
            models::tests::row(&[
                (Column::Moje, "Plot A"),
                (Column::OwnerName, "Ramesh Patel"),
                (Column::AreaSqMt, "120.5"),
            ]),
        ]));
        let table = loader.load().await.expect("loads");
        assert_eq!(table.len(), 1);
        assert_eq!(table.records[0].area_sq_mt, Some(120.5));
    }

    #[tokio::test]
    async fn test_load_surfaces_source_failure() {
        let loader = Loader::new(FakeSheet::Fails(|| {
            LoadError::Auth("token expired".into())
        }));
        let err = loader.load().await.expect_err("fails");
        assert_eq!(
            err.to_string(),
            "authentication with the spreadsheet service failed: token expired"
        );
    }

    #[tokio::test]
    async fn test_load_surfaces_parse_failure() {
        let loader = Loader::new(FakeSheet::Rows(vec![]));
        assert!(matches!(loader.load().await, Err(LoadError::EmptySheet)));
    }

    /// Serves a tiny imitation of the Sheets API on an ephemeral port and
    /// returns its base url.
    async fn serve_fake_api() -> String {
        async fn values(
            Path((id, range)): Path<(String, String)>,
            Query(params): Query<HashMap<String, String>>,
            headers: HeaderMap,
        ) -> impl IntoResponse {
            let authorized = params.get("key").map(String::as_str)
                == Some("good-key")
                || headers.get("authorization").and_then(|v| v.to_str().ok())
                    == Some("Bearer good-token");
            if !authorized {
                return (
                    StatusCode::FORBIDDEN,
                    r#"{"error":{"code":403,"message":"The caller does not have permission","status":"PERMISSION_DENIED"}}"#.to_string(),
                );
            }
            match (id.as_str(), range.as_str()) {
                ("sheet-1", "'Property Details'") => (
                    StatusCode::OK,
                    serde_json::json!({
                        "range": "'Property Details'!A1:O2",
                        "majorDimension": "ROWS",
                        "values": [
                            ["Moje", "Owner Name"],
                            ["Plot A", "Ramesh Patel"],
                        ],
                    })
                    .to_string(),
                ),
                ("blank", _) => (
                    StatusCode::OK,
                    r#"{"range":"'Property Details'!A1:Z1000","majorDimension":"ROWS"}"#.to_string(),
                ),
                ("garbled", _) => (StatusCode::OK, "<html>".to_string()),
                ("flaky", _) => (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "upstream down".to_string(),
                ),
                _ => (
                    StatusCode::NOT_FOUND,
                    r#"{"error":{"code":404,"message":"Requested entity was not found.","status":"NOT_FOUND"}}"#.to_string(),
                ),
            }
        }

        let app = Router::new()
            .route("/v4/spreadsheets/:id/values/:range", get(values));
        let listener =
            TcpListener::bind("127.0.0.1:0").expect("bind ephemeral port");
        let addr = listener.local_addr().expect("local addr");
        let server = axum::Server::from_tcp(listener)
            .expect("server from listener")
            .serve(app.into_make_service());
        tokio::spawn(server);
        format!("http://{addr}/v4")
    }

    fn client(endpoint: &str, id: &str, creds: Credentials) -> GoogleSheets {
        GoogleSheets::new(
            endpoint,
            id,
            "Property Details",
            creds,
            Duration::from_secs(5),
        )
        .expect("client builds")
    }

    #[tokio::test]
    async fn test_fetch_with_api_key() {
        let endpoint = serve_fake_api().await;
        let rows = client(
            &endpoint,
            "sheet-1",
            Credentials::ApiKey("good-key".into()),
        )
        .fetch_rows()
        .await
        .expect("fetches");
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1], vec!["Plot A", "Ramesh Patel"]);
    }

    #[tokio::test]
    async fn test_fetch_with_access_token() {
        let endpoint = serve_fake_api().await;
        let rows = client(
            &endpoint,
            "sheet-1",
            Credentials::AccessToken("good-token".into()),
        )
        .fetch_rows()
        .await
        .expect("fetches");
        assert_eq!(rows[0], vec!["Moje", "Owner Name"]);
    }

    #[tokio::test]
    async fn test_fetch_maps_statuses() {
        let endpoint = serve_fake_api().await;
        let key = || Credentials::ApiKey("good-key".into());

        let err = client(&endpoint, "sheet-1", Credentials::ApiKey("bad".into()))
            .fetch_rows()
            .await
            .expect_err("forbidden");
        assert!(matches!(err, LoadError::Auth(_)));
        assert!(err.to_string().contains("does not have permission"));

        let err = client(&endpoint, "nope", key())
            .fetch_rows()
            .await
            .expect_err("not found");
        assert!(matches!(err, LoadError::NotFound(_)));

        let err = client(&endpoint, "flaky", key())
            .fetch_rows()
            .await
            .expect_err("unavailable");
        assert!(matches!(err, LoadError::Unavailable(_)));

        let err = client(&endpoint, "garbled", key())
            .fetch_rows()
            .await
            .expect_err("malformed");
        assert!(matches!(err, LoadError::Malformed(_)));
    }

    #[tokio::test]
    async fn test_fetch_blank_sheet_has_no_rows() {
        let endpoint = serve_fake_api().await;
        let rows = client(&endpoint, "blank", Credentials::ApiKey("good-key".into()))
            .fetch_rows()
            .await
            .expect("fetches");
        assert!(rows.is_empty());
    }

    #[tokio::test]
    async fn test_unreachable_source_is_unavailable() {
        let addr = TcpListener::bind("127.0.0.1:0")
            .and_then(|l| l.local_addr())
            .expect("ephemeral addr");
        // the listener is dropped, so the port refuses connections
        let err = client(
            &format!("http://{addr}/v4"),
            "sheet-1",
            Credentials::ApiKey("good-key".into()),
        )
        .fetch_rows()
        .await
        .expect_err("unreachable");
        assert!(matches!(err, LoadError::Unavailable(_)));
    }

    #[test]
    fn test_values_url() {
        let sheets = client(
            "https://sheets.googleapis.com/v4",
            "abc123",
            Credentials::ApiKey("k".into()),
        );
        assert_eq!(
            sheets.values_url().as_str(),
            "https://sheets.googleapis.com/v4/spreadsheets/abc123/values/'Property%20Details'?majorDimension=ROWS&valueRenderOption=FORMATTED_VALUE&key=k"
        );
    }
}

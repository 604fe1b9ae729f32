use super::{controllers, middleware, models};
use axum::{middleware::from_fn, routing::get, Router};
use reqwest::Url;
use std::fmt::Display;
use tower_http::trace::TraceLayer;

pub enum Route {
    Root,
    Records,
    Ping,
}

impl Route {
    pub fn as_string(&self) -> String {
        match self {
            Self::Root => "/".into(),
            Self::Records => "/records".into(),
            Self::Ping => "/ping".into(),
        }
    }

    /// The route's path followed by the url-encoded query. Pairs with an
    /// empty value are left out.
    pub fn with_query(&self, pairs: &[(&str, &str)]) -> String {
        let path = self.as_string();
        let pairs = pairs.iter().filter(|(_, v)| !v.is_empty());
        match Url::parse_with_params("http://localhost", pairs) {
            Ok(url) => match url.query() {
                Some(q) if !q.is_empty() => format!("{path}?{q}"),
                _ => path,
            },
            Err(_) => path,
        }
    }
}

impl Display for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_string())
    }
}

#[rustfmt::skip]
pub fn get_routes() -> Router<models::AppState> {
    Router::new()
        .route(&Route::Root.as_string(), get(controllers::root))
        .route(&Route::Records.as_string(), get(controllers::list_records))
        .route(&Route::Ping.as_string(), get(controllers::pong))
}

pub fn app(state: models::AppState) -> Router {
    get_routes()
        .layer(from_fn(middleware::html_headers))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

use axum::{
    Router,
    extract::{
        Json, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::{StatusCode, header},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::core::{RawInput, TaxTables, calculate, parse_number, states, validate};

const INDEX_HTML: &str = include_str!("../../web/index.html");
const STYLES_CSS: &str = include_str!("../../web/styles.css");
const APP_JS: &str = include_str!("../../web/app.js");

type SharedTables = Arc<TaxTables>;

/// A form value as sent by the page: JSON number or raw text.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
enum FieldValue {
    Number(f64),
    Text(String),
}

impl FieldValue {
    fn as_number(&self) -> Option<f64> {
        match self {
            FieldValue::Number(value) => Some(*value).filter(|v| v.is_finite()),
            FieldValue::Text(text) => parse_number(text),
        }
    }

    fn into_text(self) -> String {
        match self {
            FieldValue::Number(value) => value.to_string(),
            FieldValue::Text(text) => text,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct CalculatePayload {
    age: Option<FieldValue>,
    net_worth: Option<FieldValue>,
    state_id: Option<FieldValue>,
    withdrawal_rate: Option<FieldValue>,
}

impl From<CalculatePayload> for RawInput {
    fn from(payload: CalculatePayload) -> Self {
        RawInput {
            age: payload.age.as_ref().and_then(FieldValue::as_number),
            net_worth: payload.net_worth.as_ref().and_then(FieldValue::as_number),
            state_id: payload
                .state_id
                .map(FieldValue::into_text)
                .unwrap_or_default(),
            withdrawal_rate: payload
                .withdrawal_rate
                .as_ref()
                .and_then(FieldValue::as_number),
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorsResponse {
    errors: Vec<String>,
}

pub fn router(tables: Arc<TaxTables>) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/index.html", get(index_handler))
        .route("/styles.css", get(styles_handler))
        .route("/app.js", get(app_js_handler))
        .route("/api/states", get(states_handler))
        .route(
            "/api/calculate",
            get(calculate_get_handler).post(calculate_post_handler),
        )
        .route("/calculate", post(calculate_post_handler))
        .fallback(not_found_handler)
        .with_state(tables)
}

pub async fn run_http_server(port: u16, tables: TaxTables) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let app = router(Arc::new(tables));

    let listener = TcpListener::bind(addr).await?;
    info!("withdrawal estimator listening on http://{addr}");
    info!("local access: http://127.0.0.1:{port}/");

    axum::serve(listener, app).await
}

async fn index_handler() -> impl IntoResponse {
    with_cache_control(Html(INDEX_HTML))
}

async fn styles_handler() -> impl IntoResponse {
    with_cache_control((
        [(header::CONTENT_TYPE, "text/css; charset=utf-8")],
        STYLES_CSS,
    ))
}

async fn app_js_handler() -> impl IntoResponse {
    with_cache_control((
        [(
            header::CONTENT_TYPE,
            "application/javascript; charset=utf-8",
        )],
        APP_JS,
    ))
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

async fn states_handler() -> Response {
    json_response(StatusCode::OK, states())
}

async fn calculate_get_handler(
    State(tables): State<SharedTables>,
    payload: Result<Query<CalculatePayload>, QueryRejection>,
) -> Response {
    match payload {
        Ok(Query(payload)) => calculate_handler_impl(&tables, payload),
        Err(rejection) => malformed_request_response(rejection.body_text()),
    }
}

async fn calculate_post_handler(
    State(tables): State<SharedTables>,
    payload: Result<Json<CalculatePayload>, JsonRejection>,
) -> Response {
    match payload {
        Ok(Json(payload)) => calculate_handler_impl(&tables, payload),
        Err(rejection) => malformed_request_response(rejection.body_text()),
    }
}

/// Bodies and query strings that never reach validation still answer with
/// the `errors` shape the page renders.
fn malformed_request_response(detail: String) -> Response {
    warn!(%detail, "malformed calculation request");
    error_response(
        StatusCode::BAD_REQUEST,
        &format!("Invalid request: {detail}"),
    )
}

fn calculate_handler_impl(tables: &TaxTables, payload: CalculatePayload) -> Response {
    let raw = RawInput::from(payload);
    match validate(&raw) {
        Ok(input) => json_response(StatusCode::OK, calculate(&input, tables)),
        Err(errors) => {
            let fields: Vec<&str> = errors.errors().iter().map(|e| e.field()).collect();
            warn!(?fields, %errors, "rejected calculation request");
            json_response(
                StatusCode::BAD_REQUEST,
                ErrorsResponse {
                    errors: errors.messages(),
                },
            )
        }
    }
}

fn with_cache_control<R: IntoResponse>(response: R) -> Response {
    let mut response = response.into_response();
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        "no-store".parse().expect("valid header"),
    );
    response
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    with_cache_control((status, Json(body)))
}

fn error_response(status: StatusCode, msg: &str) -> Response {
    json_response(
        status,
        ErrorsResponse {
            errors: vec![msg.to_string()],
        },
    )
}

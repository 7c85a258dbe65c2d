use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::Value;
use tracing::{debug, warn};

use crate::broker::orchestrator::TokenBroker;
use crate::broker::result::TokenResult;
use crate::helpers::time::now_i64;
use crate::observability::metrics::get_metrics;
use crate::server::server::AppState;

#[derive(Clone)]
pub struct TokenState {
    pub broker: TokenBroker,
    path: String,
}

impl TokenState {
    pub fn new(broker: TokenBroker, path: &str) -> Self {
        Self {
            broker,
            path: path.to_owned(),
        }
    }

    pub fn router(&self) -> Router<AppState> {
        debug!("served path: {}", self.path);
        Router::new().route(&self.path, get(request_token).post(request_token))
    }
}

/// Accepts `{"username": .., "password": ..}` on GET or POST, whatever the
/// content type, and answers with the broker's result as JSON.
async fn request_token(State(state): State<AppState>, body: Bytes) -> Response {
    let (username, password) = match parse_credentials(&body) {
        Ok(credentials) => credentials,
        Err(description) => {
            warn!("malformed token request: {}", description);
            let result = TokenResult::malformed(description);
            get_metrics()
                .await
                .broker_requests
                .with_label_values(&["malformed"])
                .inc();
            return (StatusCode::BAD_REQUEST, Json(result)).into_response();
        }
    };

    let result = state
        .token_state
        .broker
        .handle(&username, &password, now_i64())
        .await;
    (StatusCode::OK, Json(result)).into_response()
}

fn parse_credentials(body: &[u8]) -> Result<(String, String), String> {
    let value: Value = serde_json::from_slice(body)
        .map_err(|_| "request body must be a JSON object".to_owned())?;
    let field = |name: &str| {
        value
            .get(name)
            .and_then(Value::as_str)
            .map(str::to_owned)
            .ok_or_else(|| format!("missing or non-string field '{}'", name))
    };
    Ok((field("username")?, field("password")?))
}

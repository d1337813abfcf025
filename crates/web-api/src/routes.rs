use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use domain::{ChatRequest, Intent, Reply, Username, INTENT_HEADER};
use serde::Deserialize;
use tower_http::trace::TraceLayer;

use crate::{error::ApiError, state::AppState, stream::chat_stream};

#[derive(Debug, Deserialize)]
pub struct SendMessagePayload {
    pub username: String,
    #[serde(default)]
    pub message: String,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .nest("/api/v1", api_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/messages", post(send_message))
        .route("/stream", get(chat_stream))
        .route("/sessions", get(list_sessions))
}

async fn health() -> StatusCode {
    StatusCode::OK
}

async fn send_message(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<SendMessagePayload>,
) -> Result<Json<Reply>, ApiError> {
    let tag = headers
        .get(INTENT_HEADER)
        .map(|value| value.to_str())
        .transpose()
        .map_err(|_| ApiError::bad_request("message-type header is not valid UTF-8"))?;

    let intent = Intent::from_tag(tag, payload.message)?;
    let username = Username::parse(payload.username)?;

    let reply = state
        .dispatcher
        .dispatch(ChatRequest::new(username, intent))
        .await?;

    Ok(Json(reply))
}

async fn list_sessions(State(state): State<AppState>) -> Json<Vec<String>> {
    let usernames = state
        .registry
        .snapshot()
        .await
        .into_iter()
        .map(String::from)
        .collect();
    Json(usernames)
}

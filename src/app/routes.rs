use std::time::Duration;

use axum::{
    body::Bytes,
    extract::State,
    http::{header::CONTENT_TYPE, Method, Uri},
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse, Response,
    },
    routing::{get, post},
    Json, Router,
};
use futures::stream::{self, Stream};
use tower_http::cors::{Any, CorsLayer};

use crate::adapters::assets::{content_type, resolve_request_path};
use crate::app::state::AppState;
use crate::domain::model::{Accepted, Status, VoteRequest, VoteUrl};
use crate::utils::error::{PollError, Result};

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::OPTIONS])
        .max_age(Duration::from_secs(60 * 60));

    Router::new()
        .route("/api/vote", post(submit_vote))
        .route("/api/results", get(stream_results).layer(cors))
        .route("/api/status", get(status))
        .route("/api/reset", post(reset))
        .route("/api/vote-url", get(vote_url))
        .fallback(serve_asset)
        .with_state(state)
}

pub async fn submit_vote(State(state): State<AppState>, body: Bytes) -> Result<Json<Accepted>> {
    let request: VoteRequest = serde_json::from_slice(&body)
        .map_err(|e| PollError::invalid_input(format!("Unreadable vote: {}", e)))?;

    let choice = request.choice.unwrap_or_default();
    // votes without an id all share the empty id, so only the first one counts
    let voter_id = request.voter_id.unwrap_or_default();

    let reset_token = state.poll.submit(&choice, &voter_id)?;
    Ok(Json(Accepted::new(reset_token)))
}

/// Server-sent events: the current snapshot at once, then one per change.
pub async fn stream_results(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = std::result::Result<Event, axum::Error>>> {
    let subscription = state.poll.subscribe();

    // axum drops this stream when the client goes away, which drops the
    // subscription and takes it out of the hub
    let events = stream::unfold(subscription, |mut subscription| async move {
        subscription
            .recv()
            .await
            .map(|snapshot| (Event::default().json_data(&snapshot), subscription))
    });

    Sse::new(events).keep_alive(KeepAlive::default())
}

pub async fn status(State(state): State<AppState>) -> Json<Status> {
    Json(Status {
        reset_token: state.poll.reset_token(),
    })
}

pub async fn reset(State(state): State<AppState>) -> Json<Accepted> {
    Json(Accepted::new(state.poll.reset()))
}

pub async fn vote_url(State(state): State<AppState>) -> Json<VoteUrl> {
    Json(VoteUrl {
        url: state.vote_url(),
    })
}

pub async fn serve_asset(State(state): State<AppState>, uri: Uri) -> Result<Response> {
    let path = resolve_request_path(uri.path()).ok_or_else(|| PollError::NotFound {
        path: uri.path().to_string(),
    })?;

    let data = state.assets.read_asset(&path).await?;
    Ok(([(CONTENT_TYPE, content_type(&path))], data).into_response())
}

//! The seven handlers of the request contract.
//!
//! Each one is a function of (method, raw body, caller session token) to
//! (status, headers, JSON body). Caller identity is threaded in through the
//! [`SESSION_HEADER`] request header rather than read from any ambient state;
//! successful Register and Login hand the minted token back in the same
//! header. Every handler starts with the simulated round-trip delay.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::{header::CONTENT_TYPE, HeaderMap, Method, StatusCode},
    response::{IntoResponse, Response},
    Json,
};

use crate::{
    error::ApiError,
    protocol::{AuthResponse, Choice, Credentials, LogoutResponse, MyVoteResponse, VoteRequest},
    session::current_user,
    state::AppState,
    tally::Tally,
    utils::{parse_body, sanitize_user, simulate_latency},
};

/// Header carrying the opaque session token in both directions.
pub const SESSION_HEADER: &str = "x-session-token";

fn session_token(headers: &HeaderMap) -> Option<String> {
    let raw = headers.get(SESSION_HEADER)?.to_str().ok()?;
    if raw.is_empty() {
        None
    } else {
        Some(raw.to_owned())
    }
}

fn require_post(method: &Method) -> Result<(), ApiError> {
    if *method == Method::POST {
        Ok(())
    } else {
        Err(ApiError::BadRequest("POST required".to_owned()))
    }
}

fn auth_ok(username: String, token: String) -> Response {
    (
        StatusCode::OK,
        [(SESSION_HEADER, token)],
        Json(AuthResponse { username }),
    )
        .into_response()
}

pub async fn register_handler(
    State(state): State<Arc<AppState>>,
    method: Method,
    body: Bytes,
) -> Result<Response, ApiError> {
    simulate_latency(&state.config).await;
    require_post(&method)?;

    let creds: Credentials = parse_body(&body);
    let username = sanitize_user(creds.username.as_deref().unwrap_or_default());
    if username.is_empty() {
        return Err(ApiError::BadRequest("Username required".to_owned()));
    }
    let password = creds.password.unwrap_or_default();
    if password.trim().is_empty() {
        return Err(ApiError::BadRequest("Password required".to_owned()));
    }

    state.db.users().create(&username, &password)?;
    // Independent second write: if it failed there would be a user without a
    // session, and the caller would simply log in next.
    let session = state.db.sessions().set(&username);

    Ok(auth_ok(username, session.token))
}

pub async fn login_handler(
    State(state): State<Arc<AppState>>,
    method: Method,
    body: Bytes,
) -> Result<Response, ApiError> {
    simulate_latency(&state.config).await;
    require_post(&method)?;

    let creds: Credentials = parse_body(&body);
    let username = sanitize_user(creds.username.as_deref().unwrap_or_default());
    if username.is_empty() {
        return Err(ApiError::BadRequest("Username required".to_owned()));
    }
    let password = creds.password.unwrap_or_default();
    if password.trim().is_empty() {
        return Err(ApiError::BadRequest("Password required".to_owned()));
    }

    // One generic message whether the user is unknown or the password is
    // wrong, so the response never leaks which field missed.
    let matches = state
        .db
        .users()
        .get(&username)
        .map(|user| user.password == password)
        .unwrap_or(false);
    if !matches {
        return Err(ApiError::BadRequest("Invalid credentials".to_owned()));
    }

    let session = state.db.sessions().set(&username);
    Ok(auth_ok(username, session.token))
}

pub async fn logout_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Json<LogoutResponse> {
    simulate_latency(&state.config).await;

    if let Some(token) = session_token(&headers) {
        state.db.sessions().clear(&token);
    }

    Json(LogoutResponse { ok: true })
}

pub async fn me_handler(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    simulate_latency(&state.config).await;

    match current_user(&state.db, session_token(&headers).as_deref()) {
        Some(username) => (StatusCode::OK, Json(AuthResponse { username })).into_response(),
        // Anonymous is an explicit no-content, distinct from an error.
        None => (
            StatusCode::NO_CONTENT,
            [(CONTENT_TYPE, "application/json")],
        )
            .into_response(),
    }
}

pub async fn vote_handler(
    State(state): State<Arc<AppState>>,
    method: Method,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Tally>, ApiError> {
    simulate_latency(&state.config).await;
    require_post(&method)?;

    // Gate before body validation: an anonymous caller gets 401 even with a
    // broken body.
    let username = current_user(&state.db, session_token(&headers).as_deref())
        .ok_or(ApiError::Unauthorized)?;

    let req: VoteRequest = parse_body(&body);
    let choice = req
        .choice
        .as_deref()
        .and_then(Choice::parse)
        .ok_or_else(|| ApiError::BadRequest("Invalid vote".to_owned()))?;

    state.db.votes().upsert(&username, choice);
    Ok(Json(state.db.votes().summary()))
}

pub async fn my_vote_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<MyVoteResponse>, ApiError> {
    simulate_latency(&state.config).await;

    let username = current_user(&state.db, session_token(&headers).as_deref())
        .ok_or(ApiError::Unauthorized)?;

    Ok(Json(MyVoteResponse {
        vote: state.db.votes().get_by_user(&username),
    }))
}

pub async fn results_handler(State(state): State<Arc<AppState>>) -> Json<Tally> {
    simulate_latency(&state.config).await;

    Json(state.db.votes().summary())
}

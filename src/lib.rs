//! # Bayroumeter
//!
//! Minimal identity + single-question-poll backend: users register or log in,
//! cast "yes" or "no", and read the aggregate tally.
//!
//!
//!
//! # Architecture
//!
//! - **Store** (`store`): one in-process arena of JSON blobs keyed by
//!   container name, standing in for a managed document database. Individual
//!   load/save calls are serialized; `update` gives atomic read-modify-write.
//! - **Containers** (`database`): users, votes, and sessions, each a thin
//!   domain API over its own storage key, persisted as one JSON object.
//! - **Handlers** (`routes`): seven stateless operations mapping
//!   (method, body, session token) to (status, headers, JSON body).
//! - **Tally** (`tally`): read-time aggregation over the full votes map.
//!
//! A randomized delay runs before every handler to model the round-trip a
//! real deployment would pay; tune or zero it with `BM_LATENCY_FLOOR_MS` and
//! `BM_LATENCY_JITTER_MS`.
//!
//!
//!
//! # Request contract
//!
//! | Route | Method | Success | Failure |
//! |---|---|---|---|
//! | `/api/register` | POST | 200 `{username}` + token header | 400, 409 |
//! | `/api/login` | POST | 200 `{username}` + token header | 400 |
//! | `/api/logout` | any | 200 `{ok:true}` | — |
//! | `/api/me` | any | 200 `{username}` | 204 when anonymous |
//! | `/api/vote` | POST | 200 tally | 400, 401 |
//! | `/api/my-vote` | any | 200 `{vote}` | 401 |
//! | `/api/results` | any | 200 tally | — |
//!
//! The session token travels in the `x-session-token` header both ways; error
//! bodies are `{"error": message}`.

use std::{sync::Arc, time::Duration};

use axum::{
    http::{header::CONTENT_TYPE, HeaderName, Method},
    routing::any,
    Router,
};

use signal::{
    ctrl_c,
    unix::{signal, SignalKind},
};
use tokio::{net::TcpListener, signal};
use tower_http::cors::CorsLayer;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

pub mod config;
pub mod database;
pub mod error;
pub mod protocol;
pub mod routes;
pub mod session;
pub mod state;
pub mod store;
pub mod tally;
pub mod utils;

use routes::{
    login_handler, logout_handler, me_handler, my_vote_handler, register_handler, results_handler,
    vote_handler,
};
use state::AppState;

/// Build the router over `state`. Routes accept any method and check it
/// inside the handler, so a wrong method yields the contract's 400 rather
/// than a bare 405.
pub fn app(state: Arc<AppState>) -> Router {
    let session_header = HeaderName::from_static(routes::SESSION_HEADER);

    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE, session_header.clone()])
        .expose_headers([session_header])
        .max_age(Duration::from_secs(60 * 60));

    Router::new()
        .route("/api/register", any(register_handler))
        .route("/api/login", any(login_handler))
        .route("/api/logout", any(logout_handler))
        .route("/api/me", any(me_handler))
        .route("/api/vote", any(vote_handler))
        .route("/api/my-vote", any(my_vote_handler))
        .route("/api/results", any(results_handler))
        .layer(cors)
        .with_state(state)
}

pub async fn start_server() {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    info!("Initializing state...");
    let state = AppState::new();

    info!("Starting server...");
    let address = format!("0.0.0.0:{}", state.config.port);
    let app = app(state);

    info!("Binding to {address}");
    let listener = TcpListener::bind(&address).await.unwrap();
    info!("Server running on {address}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .unwrap();

    println!("Server shutting down...");
}

async fn shutdown_signal() {
    let ctrl_c = async {
        ctrl_c().await.expect("Failed to install Ctrl+C handler");

        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        signal(SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;

        info!("Received terminate signal, shutting down");
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

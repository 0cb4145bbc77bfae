use crate::engine::{Engine, EngineHandle};
use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
};
use serde::Deserialize;
use std::sync::Arc;
use sunny_domain::{Action, GoogleAccountService, WorkspaceStoreService};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub fn router(
    store: Arc<dyn WorkspaceStoreService>,
    google: Arc<dyn GoogleAccountService>,
) -> Router {
    let engine = Engine::start(store, google);
    let holder = AppStateHolder { engine };

    let api = Router::new()
        .route("/health", get(health))
        .route("/app", get(get_app))
        .route("/action", post(post_action));

    Router::new()
        .nest("/api", api)
        .route("/integrations", get(integrations_page))
        .with_state(holder)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

async fn health() -> &'static str {
    "ok"
}

#[derive(Clone)]
struct AppStateHolder {
    engine: EngineHandle,
}

async fn get_app(State(holder): State<AppStateHolder>) -> impl IntoResponse {
    match holder.engine.app_snapshot().await {
        Ok(snapshot) => Json(snapshot).into_response(),
        Err(err) => (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()).into_response(),
    }
}

async fn post_action(
    State(holder): State<AppStateHolder>,
    Json(action): Json<sunny_api::ClientAction>,
) -> impl IntoResponse {
    match holder.engine.apply_client_action(action).await {
        Ok(rev) => Json(serde_json::json!({ "rev": rev })).into_response(),
        Err(message) => (StatusCode::INTERNAL_SERVER_ERROR, message).into_response(),
    }
}

#[derive(Debug, Deserialize)]
struct OAuthCallbackQuery {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    state: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// Landing for the provider redirect. Callback parameters are handed to the
/// engine, then the URL is cleaned so a reload cannot re-trigger them.
async fn integrations_page(
    State(holder): State<AppStateHolder>,
    Query(query): Query<OAuthCallbackQuery>,
) -> Response {
    if let Some(error_code) = query.error {
        let _ = holder
            .engine
            .dispatch_action(Action::GoogleAuthorizationFailed { error_code })
            .await;
        return Redirect::to("/integrations").into_response();
    }

    if let (Some(code), Some(state)) = (query.code, query.state) {
        let _ = holder
            .engine
            .dispatch_action(Action::GoogleCallbackReceived { code, state })
            .await;
        return Redirect::to("/integrations").into_response();
    }

    (StatusCode::OK, "integrations").into_response()
}

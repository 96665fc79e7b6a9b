use axum::{
    Router,
    extract::rejection::{JsonRejection, QueryRejection},
    http::{HeaderValue, Method, StatusCode, header},
    response::{IntoResponse, Json, Response},
    routing::{get, post, put},
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::normalize_path::NormalizePathLayer;
use tower_http::set_header::response::SetResponseHeaderLayer;

use crate::auth::Auth;
use crate::source_store::{SourceStore, StoreError};

pub mod auth_handlers;
pub mod dto;
pub mod extract;
pub mod jwt;
pub mod source_handlers;

// ---------- shared state ----------

#[derive(Clone)]
pub struct AdminState {
    pub auth: Arc<Auth>,
    pub sources: SourceStore,
    pub jwt_secret: String,
    pub jwt_expiry_hours: u64,
}

// ---------- error type ----------

/// A JSON error response: `{"error": "..."}` with an HTTP status.
#[derive(Debug)]
pub struct ApiErr(StatusCode, String);

impl ApiErr {
    pub fn new(status: StatusCode, msg: impl Into<String>) -> Self {
        Self(status, msg.into())
    }

    pub fn internal(e: impl std::fmt::Display) -> Self {
        Self(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self(StatusCode::NOT_FOUND, msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self(StatusCode::CONFLICT, msg.into())
    }
}

impl From<StoreError> for ApiErr {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound => ApiErr::not_found("Source not found"),
            StoreError::Conflict(msg) => ApiErr::conflict(msg),
            StoreError::Validation(msg) => ApiErr::new(StatusCode::UNPROCESSABLE_ENTITY, msg),
            StoreError::Json(e) => ApiErr::new(StatusCode::UNPROCESSABLE_ENTITY, e.to_string()),
            other => {
                tracing::error!(error = %other, "source store failure");
                ApiErr::internal(other)
            }
        }
    }
}

impl From<JsonRejection> for ApiErr {
    fn from(rejection: JsonRejection) -> Self {
        ApiErr::new(rejection.status(), rejection.body_text())
    }
}

impl From<QueryRejection> for ApiErr {
    fn from(rejection: QueryRejection) -> Self {
        ApiErr::new(rejection.status(), rejection.body_text())
    }
}

impl IntoResponse for ApiErr {
    fn into_response(self) -> Response {
        let body = serde_json::json!({ "error": self.1 });
        (self.0, Json(body)).into_response()
    }
}

// ---------- router ----------

pub fn admin_router(state: AdminState, cors_allowed_origins: &[String]) -> Router {
    let allowed_origins: Vec<HeaderValue> = cors_allowed_origins
        .iter()
        .filter_map(|s| s.parse().ok())
        .collect();

    let cors = if allowed_origins.is_empty() {
        CorsLayer::new() // no origins allowed = same-origin only
    } else {
        CorsLayer::new()
            .allow_origin(allowed_origins)
            .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
            .allow_credentials(true)
    };

    Router::new()
        .route("/health", get(|| async { StatusCode::OK }))
        .nest("/api/v1", api_v1())
        .layer(cors)
        .layer(SetResponseHeaderLayer::if_not_present(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
        .layer(NormalizePathLayer::trim_trailing_slash())
        .with_state(state)
}

fn api_v1() -> Router<AdminState> {
    Router::new()
        // auth
        .route("/auth/login", post(auth_handlers::login))
        .route("/auth/me", get(auth_handlers::me))
        // sources
        .route(
            "/sources",
            get(source_handlers::list_sources).post(source_handlers::create_source),
        )
        .route("/sources/check-name", get(source_handlers::check_name))
        .route(
            "/sources/{id}",
            get(source_handlers::get_source)
                .put(source_handlers::update_source)
                .delete(source_handlers::delete_source),
        )
        .route("/sources/{id}/archive", put(source_handlers::archive_source))
        .route(
            "/sources/{id}/unarchive",
            put(source_handlers::unarchive_source),
        )
}

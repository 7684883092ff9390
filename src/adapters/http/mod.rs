//! JSON-over-HTTP adapter
//!
//! Every route forwards to a command on [`DomainLogic`] and maps the command error taxonomy to
//! status codes.

use axum::{
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use serde_json::json;
use tower_http::trace::TraceLayer;
use tracing::error;

use crate::{
    commands::{self, DomainLogic},
    ports::database::DatabasePort,
};

mod members;
mod sports;
mod subscriptions;

pub fn router<D>(domain: DomainLogic<D>) -> Router
where
    D: DatabasePort + Send + Sync + 'static,
{
    Router::new()
        .route("/health", get(health))
        .route("/members", post(members::create::<D>).get(members::list::<D>))
        .route(
            "/members/{id}",
            get(members::find_one::<D>)
                .put(members::update::<D>)
                .patch(members::update::<D>)
                .delete(members::remove::<D>),
        )
        .route("/sports", post(sports::create::<D>).get(sports::list::<D>))
        .route(
            "/sports/{id}",
            get(sports::find_one::<D>)
                .put(sports::update::<D>)
                .patch(sports::update::<D>)
                .delete(sports::remove::<D>),
        )
        .route("/subscriptions", post(subscriptions::create::<D>))
        .route("/subscriptions/{id}", delete(subscriptions::remove::<D>))
        .layer(TraceLayer::new_for_http())
        .with_state(domain)
}

async fn health() -> StatusCode {
    StatusCode::OK
}

/// Error body returned by every route
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl From<commands::Error> for ApiError {
    fn from(err: commands::Error) -> Self {
        let (status, message) = match err {
            commands::Error::NotFound(message) => (StatusCode::NOT_FOUND, message.into_owned()),
            commands::Error::Conflict(message) => (StatusCode::CONFLICT, message.into_owned()),
            commands::Error::InvalidInput(message) => {
                (StatusCode::BAD_REQUEST, message.into_owned())
            }
            commands::Error::Unexpected(err) => {
                // Store internals stay out of the response
                error!(error = ?err, "unexpected database error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };
        Self { status, message }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: rejection.body_text(),
        }
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: rejection.body_text(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = json!({
            "statusCode": self.status.as_u16(),
            "error": self.status.canonical_reason().unwrap_or_default(),
            "message": self.message,
        });
        (self.status, Json(body)).into_response()
    }
}

mod admin;
pub mod error;
mod middleware;
mod models;
mod public;
mod requester;

pub use admin::{AdminState, build_admin_router};
pub use error::ApiError;
pub use public::{HttpState, build_router};
pub use requester::Requester;

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::application::error::ErrorReport;
use crate::application::repos::RepoError;

fn db_health_response(result: Result<(), RepoError>) -> Response {
    match result {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => {
            let mut response = StatusCode::SERVICE_UNAVAILABLE.into_response();
            ErrorReport::from_error(
                "infra::http::db_health",
                StatusCode::SERVICE_UNAVAILABLE,
                &err,
            )
            .attach(&mut response);
            response
        }
    }
}

/// Unwraps a JSON body, turning axum's plain-text rejection into the shared
/// error shape.
fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    payload.map(|Json(body)| body).map_err(|rejection| {
        ApiError::bad_request("Invalid request body", Some(rejection.body_text()))
    })
}

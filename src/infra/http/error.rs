//! JSON error responses shared by the public and admin routers.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use crate::application::authors::AuthorError;
use crate::application::comments::CommentError;
use crate::application::error::ErrorReport;
use crate::application::feed::FeedError;
use crate::application::follow::FollowError;
use crate::application::groups::GroupError;
use crate::application::posts::PostError;
use crate::application::repos::RepoError;
use crate::domain::error::DomainError;
use crate::domain::validation::FieldError;

pub mod codes {
    pub const BAD_REQUEST: &str = "bad_request";
    pub const UNAUTHORIZED: &str = "unauthorized";
    pub const FORBIDDEN: &str = "forbidden";
    pub const NOT_FOUND: &str = "not_found";
    pub const VALIDATION: &str = "validation_failed";
    pub const DUPLICATE: &str = "duplicate";
    pub const INVALID_INPUT: &str = "invalid_input";
    pub const INTEGRITY: &str = "integrity_error";
    pub const DB_TIMEOUT: &str = "db_timeout";
    pub const REPO: &str = "repo_error";
}

#[derive(Debug, Serialize)]
pub struct ApiErrorBody {
    pub error: ApiErrorMessage,
}

#[derive(Debug, Serialize)]
pub struct ApiErrorMessage {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<Vec<FieldError>>,
}

#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    code: &'static str,
    message: &'static str,
    hint: Option<String>,
    fields: Option<Vec<FieldError>>,
}

impl ApiError {
    pub fn new(
        status: StatusCode,
        code: &'static str,
        message: &'static str,
        hint: Option<String>,
    ) -> Self {
        Self {
            status,
            code,
            message,
            hint,
            fields: None,
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn bad_request(message: &'static str, hint: Option<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, codes::BAD_REQUEST, message, hint)
    }

    pub fn unauthorized(hint: Option<String>) -> Self {
        Self::new(
            StatusCode::UNAUTHORIZED,
            codes::UNAUTHORIZED,
            "Authentication required",
            hint,
        )
    }

    pub fn forbidden() -> Self {
        Self::new(
            StatusCode::FORBIDDEN,
            codes::FORBIDDEN,
            "Only the author may change this post",
            None,
        )
    }

    pub fn not_found(hint: Option<String>) -> Self {
        Self::new(
            StatusCode::NOT_FOUND,
            codes::NOT_FOUND,
            "Resource not found",
            hint,
        )
    }

    pub fn validation(fields: Vec<FieldError>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            code: codes::VALIDATION,
            message: "Validation failed",
            hint: None,
            fields: Some(fields),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let detail = match (&self.hint, &self.fields) {
            (Some(hint), _) => hint.clone(),
            (None, Some(fields)) => fields
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join("; "),
            (None, None) => self.message.to_string(),
        };
        let body = ApiErrorBody {
            error: ApiErrorMessage {
                code: self.code.to_string(),
                message: self.message.to_string(),
                hint: self.hint,
                fields: self.fields,
            },
        };
        let mut response = (self.status, Json(body)).into_response();
        ErrorReport::from_message(
            "infra::http::error",
            self.status,
            format!("{}: {detail}", self.code),
        )
        .attach(&mut response);
        response
    }
}

pub(crate) fn repo_to_api(err: RepoError) -> ApiError {
    match err {
        RepoError::Duplicate { constraint } => ApiError::new(
            StatusCode::CONFLICT,
            codes::DUPLICATE,
            "Duplicate record",
            Some(constraint),
        ),
        RepoError::NotFound => ApiError::not_found(None),
        RepoError::InvalidInput { message } => ApiError::new(
            StatusCode::BAD_REQUEST,
            codes::INVALID_INPUT,
            "Invalid input",
            Some(message),
        ),
        RepoError::Integrity { message } => ApiError::new(
            StatusCode::CONFLICT,
            codes::INTEGRITY,
            "Integrity constraint violated",
            Some(message),
        ),
        RepoError::Timeout => ApiError::new(
            StatusCode::SERVICE_UNAVAILABLE,
            codes::DB_TIMEOUT,
            "Database timeout",
            None,
        ),
        RepoError::Persistence(message) => ApiError::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            codes::REPO,
            "Persistence error",
            Some(message),
        ),
    }
}

fn domain_to_api(err: DomainError) -> ApiError {
    match err {
        DomainError::NotFound { entity } => ApiError::not_found(Some(format!("{entity} not found"))),
        DomainError::Validation { errors } => ApiError::validation(errors),
    }
}

impl From<RepoError> for ApiError {
    fn from(err: RepoError) -> Self {
        repo_to_api(err)
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        domain_to_api(err)
    }
}

impl From<FeedError> for ApiError {
    fn from(err: FeedError) -> Self {
        match err {
            FeedError::Unauthenticated => ApiError::unauthorized(Some(
                "the subscription feed needs a signed-in author".to_string(),
            )),
            FeedError::Domain(err) => domain_to_api(err),
            FeedError::Repo(err) => repo_to_api(err),
        }
    }
}

impl From<FollowError> for ApiError {
    fn from(err: FollowError) -> Self {
        match err {
            FollowError::Unauthenticated => ApiError::unauthorized(None),
            FollowError::Domain(err) => domain_to_api(err),
            FollowError::Repo(err) => repo_to_api(err),
        }
    }
}

impl From<PostError> for ApiError {
    fn from(err: PostError) -> Self {
        match err {
            PostError::Unauthenticated => ApiError::unauthorized(None),
            PostError::NotAuthor => ApiError::forbidden(),
            PostError::Domain(err) => domain_to_api(err),
            PostError::Repo(err) => repo_to_api(err),
        }
    }
}

impl From<CommentError> for ApiError {
    fn from(err: CommentError) -> Self {
        match err {
            CommentError::Unauthenticated => ApiError::unauthorized(None),
            CommentError::Domain(err) => domain_to_api(err),
            CommentError::Repo(err) => repo_to_api(err),
        }
    }
}

impl From<GroupError> for ApiError {
    fn from(err: GroupError) -> Self {
        match err {
            GroupError::Domain(err) => domain_to_api(err),
            GroupError::Repo(err) => repo_to_api(err),
        }
    }
}

impl From<AuthorError> for ApiError {
    fn from(err: AuthorError) -> Self {
        match err {
            AuthorError::Domain(err) => domain_to_api(err),
            AuthorError::Repo(err) => repo_to_api(err),
        }
    }
}

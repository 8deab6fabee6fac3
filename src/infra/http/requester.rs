//! Identity of the author making a request.
//!
//! Authentication happens upstream; the proxy forwards the author id in the
//! configured header. No header, or an id that names no author, means an
//! anonymous visitor; routes that need an author reject those with 401.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use tracing::debug;

use crate::application::authors::AuthorError;
use crate::domain::error::DomainError;

use super::error::ApiError;
use super::public::HttpState;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Requester(pub Option<i64>);

impl Requester {
    pub fn id(&self) -> Option<i64> {
        self.0
    }
}

impl FromRequestParts<HttpState> for Requester {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &HttpState,
    ) -> Result<Self, Self::Rejection> {
        let Some(raw) = parts.headers.get(&state.identity_header) else {
            return Ok(Self(None));
        };

        let id = raw
            .to_str()
            .ok()
            .and_then(|value| value.trim().parse::<i64>().ok())
            .ok_or_else(|| {
                ApiError::bad_request(
                    "Malformed identity header",
                    Some(format!(
                        "`{}` must carry a numeric author id",
                        state.identity_header
                    )),
                )
            })?;

        match state.authors.find_by_id(id).await {
            Ok(author) => Ok(Self(Some(author.id))),
            Err(AuthorError::Domain(DomainError::NotFound { .. })) => {
                debug!(
                    target: "inkwell::http::requester",
                    author_id = id,
                    "identity names no author; treating as anonymous"
                );
                Ok(Self(None))
            }
            Err(err) => Err(err.into()),
        }
    }
}

//! Utilities for deriving and checking group slugs.
//!
//! Slugs are derived from human-readable titles with the `slug` crate, which
//! transliterates non-ASCII input into Latin letters, so Cyrillic titles
//! still yield readable slugs. Callers supply their own uniqueness predicate so the
//! derivation stays free of persistence concerns.

use std::future::Future;

use slug::slugify;
use thiserror::Error;

const MAX_SUFFIX_ATTEMPTS: usize = 32;

/// Longest slug accepted for a group.
pub const MAX_SLUG_LEN: usize = 50;

/// Errors that can occur while generating a slug.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SlugError {
    #[error("slug source text is empty")]
    EmptyInput,
    #[error("failed to derive slug from `{input}`")]
    Unrepresentable { input: String },
    #[error("exhausted attempts to find a unique slug for `{base}`")]
    Exhausted { base: String },
}

/// Errors that can occur while generating a slug via an async uniqueness check.
#[derive(Debug, Error)]
pub enum SlugAsyncError<E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    #[error(transparent)]
    Slug(#[from] SlugError),
    #[error(transparent)]
    Predicate(E),
}

/// Derive a base slug from the provided human-readable text.
pub fn derive_slug(input: &str) -> Result<String, SlugError> {
    if input.trim().is_empty() {
        return Err(SlugError::EmptyInput);
    }

    let mut candidate = slugify(input);
    if candidate.len() > MAX_SLUG_LEN {
        candidate.truncate(MAX_SLUG_LEN);
        let trimmed = candidate.trim_end_matches('-').len();
        candidate.truncate(trimmed);
    }

    if candidate.is_empty() {
        return Err(SlugError::Unrepresentable {
            input: input.to_string(),
        });
    }

    Ok(candidate)
}

/// Whether `slug` is acceptable as a group slug supplied verbatim.
pub fn is_valid_slug(slug: &str) -> bool {
    !slug.is_empty()
        && slug.len() <= MAX_SLUG_LEN
        && slug
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-')
}

/// Produce a slug that does not collide according to the awaited predicate.
///
/// `is_unique` must resolve to `true` when the candidate is free. Collisions
/// are retried with a monotonic suffix (`-2`, `-3`, …).
pub async fn generate_unique_slug_async<F, Fut, E>(
    input: &str,
    mut is_unique: F,
) -> Result<String, SlugAsyncError<E>>
where
    F: FnMut(&str) -> Fut,
    Fut: Future<Output = Result<bool, E>>,
    E: std::error::Error + Send + Sync + 'static,
{
    let base = derive_slug(input)?;

    if is_unique(&base).await.map_err(SlugAsyncError::Predicate)? {
        return Ok(base);
    }

    for attempt in 2..=MAX_SUFFIX_ATTEMPTS + 1 {
        let candidate = suffixed(&base, attempt);
        if is_unique(&candidate)
            .await
            .map_err(SlugAsyncError::Predicate)?
        {
            return Ok(candidate);
        }
    }

    Err(SlugAsyncError::Slug(SlugError::Exhausted { base }))
}

/// Appends `-{attempt}`, shortening `base` so the result stays within
/// [`MAX_SLUG_LEN`].
fn suffixed(base: &str, attempt: usize) -> String {
    let suffix = format!("-{attempt}");
    let room = MAX_SLUG_LEN.saturating_sub(suffix.len());
    let stem = base.get(..room).unwrap_or(base).trim_end_matches('-');
    format!("{stem}{suffix}")
}

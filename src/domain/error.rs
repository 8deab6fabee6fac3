use thiserror::Error;

use crate::domain::validation::FieldError;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("domain entity `{entity}` not found")]
    NotFound { entity: &'static str },
    #[error("domain validation failed: {}", summarize(.errors))]
    Validation { errors: Vec<FieldError> },
}

impl DomainError {
    pub fn not_found(entity: &'static str) -> Self {
        Self::NotFound { entity }
    }

    pub fn validation(errors: Vec<FieldError>) -> Self {
        Self::Validation { errors }
    }

    /// Shorthand for a single failing field.
    pub fn invalid_field(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            errors: vec![FieldError::new(field, message)],
        }
    }
}

fn summarize(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_message_lists_every_field() {
        let error = DomainError::validation(vec![
            FieldError::new("text", "must not be blank"),
            FieldError::new("group", "unknown group `nope`"),
        ]);
        assert_eq!(
            error.to_string(),
            "domain validation failed: text: must not be blank; group: unknown group `nope`"
        );
    }
}

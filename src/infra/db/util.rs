use crate::application::repos::RepoError;

/// Classifies driver errors by the Postgres SQLSTATE where one is available.
pub fn map_sqlx_error(err: sqlx::Error) -> RepoError {
    match err {
        sqlx::Error::RowNotFound => RepoError::NotFound,
        sqlx::Error::PoolTimedOut => RepoError::Timeout,
        sqlx::Error::Database(db) => {
            let message = db.message().to_string();
            match db.code().as_deref() {
                // unique_violation
                Some("23505") => RepoError::Duplicate {
                    constraint: db.constraint().unwrap_or("unknown").to_string(),
                },
                // foreign_key_violation, invalid_text_representation
                Some("23503") | Some("22P02") => RepoError::InvalidInput { message },
                // query_canceled
                Some("57014") => RepoError::Timeout,
                Some(code) if code.starts_with("23") => RepoError::Integrity { message },
                _ => RepoError::from_persistence(message),
            }
        }
        other => RepoError::from_persistence(other),
    }
}

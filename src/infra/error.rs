use thiserror::Error;

/// Failures while wiring the process: listeners, the pool and tracing.
#[derive(Debug, Error)]
pub enum InfraError {
    #[error("listener error: {0}")]
    Listener(#[from] std::io::Error),
    #[error("postgres error: {0}")]
    Postgres(#[from] sqlx::Error),
    #[error("`{key}` must be set for this command")]
    MissingSetting { key: &'static str },
    #[error("tracing subscriber: {0}")]
    Telemetry(String),
}

impl InfraError {
    pub fn telemetry(message: impl Into<String>) -> Self {
        Self::Telemetry(message.into())
    }
}

use std::sync::Once;

use metrics::{Unit, describe_counter};
use tracing_error::ErrorLayer;
use tracing_subscriber::{
    EnvFilter, fmt,
    layer::{Layer, SubscriberExt},
    util::SubscriberInitExt,
};

use crate::cache::{
    METRIC_FEED_CACHE_CLEAR, METRIC_FEED_CACHE_EXPIRED, METRIC_FEED_CACHE_HIT,
    METRIC_FEED_CACHE_MISS, METRIC_FEED_CACHE_STORE,
};
use crate::config::{LogFormat, LoggingSettings};

use super::error::InfraError;

static METRIC_DESCRIPTIONS: Once = Once::new();

/// Install a global tracing subscriber using the provided logging settings.
pub fn init(logging: &LoggingSettings) -> Result<(), InfraError> {
    describe_metrics();

    let env_filter = EnvFilter::builder()
        .with_default_directive(logging.level.into())
        .from_env_lossy();

    let fmt_layer = match logging.format {
        LogFormat::Json => fmt::layer()
            .json()
            .with_current_span(true)
            .with_span_list(true)
            .with_target(true)
            .boxed(),
        LogFormat::Compact => fmt::layer().compact().with_target(true).boxed(),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(ErrorLayer::default())
        .with(fmt_layer)
        .try_init()
        .map_err(|err| {
            InfraError::telemetry(format!("failed to install tracing subscriber: {err}"))
        })
}

fn describe_metrics() {
    METRIC_DESCRIPTIONS.call_once(|| {
        describe_counter!(
            METRIC_FEED_CACHE_HIT,
            Unit::Count,
            "Feed pages served from the page cache."
        );
        describe_counter!(
            METRIC_FEED_CACHE_MISS,
            Unit::Count,
            "Feed page lookups that had to be composed from the store."
        );
        describe_counter!(
            METRIC_FEED_CACHE_EXPIRED,
            Unit::Count,
            "Cached feed pages dropped because their TTL elapsed."
        );
        describe_counter!(
            METRIC_FEED_CACHE_STORE,
            Unit::Count,
            "Feed pages written to the page cache."
        );
        describe_counter!(
            METRIC_FEED_CACHE_CLEAR,
            Unit::Count,
            "Explicit full clears of the page cache."
        );
    });
}

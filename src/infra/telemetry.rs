use std::sync::Once;

use metrics::{Unit, describe_counter};
use tracing_error::ErrorLayer;
use tracing_subscriber::{
    EnvFilter, fmt,
    layer::{Layer, SubscriberExt},
    util::SubscriberInitExt,
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
            "kontur_cache_object_hit_total",
            Unit::Count,
            "Total number of object-cache hits."
        );
        describe_counter!(
            "kontur_cache_object_miss_total",
            Unit::Count,
            "Total number of object-cache misses."
        );
        describe_counter!(
            "kontur_cache_queryset_hit_total",
            Unit::Count,
            "Total number of queryset-cache hits."
        );
        describe_counter!(
            "kontur_cache_queryset_miss_total",
            Unit::Count,
            "Total number of queryset-cache misses."
        );
        describe_counter!(
            "kontur_cache_view_hit_total",
            Unit::Count,
            "Total number of view-cache hits."
        );
        describe_counter!(
            "kontur_cache_view_miss_total",
            Unit::Count,
            "Total number of view-cache misses."
        );
        describe_counter!(
            "kontur_cache_view_keys_invalidated_total",
            Unit::Count,
            "Total number of cached view entries dropped by invalidation."
        );
        describe_counter!(
            "kontur_cache_full_clear_total",
            Unit::Count,
            "Total number of full cache clears due to missing pattern support."
        );
    });
}

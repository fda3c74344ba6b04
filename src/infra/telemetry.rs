use std::sync::Once;

use metrics::{Unit, describe_counter, describe_histogram};
use tracing_error::ErrorLayer;
use tracing_subscriber::{
    EnvFilter, fmt,
    layer::{Layer, SubscriberExt},
    util::SubscriberInitExt,
};

use crate::cache::{
    METRIC_CACHE_HIT_TOTAL, METRIC_CACHE_REFRESH_COALESCED_TOTAL, METRIC_CACHE_REFRESH_MS,
    METRIC_CACHE_REFRESH_TOTAL, METRIC_CACHE_UNKNOWN_PAGE_TOTAL,
};
use crate::config::{LogFormat, LoggingSettings};

use super::error::InfraError;

static METRIC_DESCRIPTIONS: Once = Once::new();

/// Install a global tracing subscriber using the provided logging settings.
///
/// Logs go to stderr so command output on stdout stays machine readable.
pub fn init(logging: &LoggingSettings) -> Result<(), InfraError> {
    describe_metrics();

    let env_filter = EnvFilter::builder()
        .with_default_directive(logging.level.into())
        .from_env_lossy();

    let fmt_layer = match logging.format {
        LogFormat::Json => fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_current_span(true)
            .with_span_list(true)
            .with_target(true)
            .boxed(),
        LogFormat::Compact => fmt::layer()
            .compact()
            .with_writer(std::io::stderr)
            .with_target(true)
            .boxed(),
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

pub fn describe_metrics() {
    METRIC_DESCRIPTIONS.call_once(|| {
        describe_counter!(
            METRIC_CACHE_HIT_TOTAL,
            Unit::Count,
            "Total number of reads served from a fresh content snapshot."
        );
        describe_counter!(
            METRIC_CACHE_REFRESH_TOTAL,
            Unit::Count,
            "Total number of content snapshot refreshes, by mode and result."
        );
        describe_counter!(
            METRIC_CACHE_REFRESH_COALESCED_TOTAL,
            Unit::Count,
            "Total number of callers that joined an in-flight refresh."
        );
        describe_histogram!(
            METRIC_CACHE_REFRESH_MS,
            Unit::Milliseconds,
            "Content snapshot refresh latency in milliseconds."
        );
        describe_counter!(
            METRIC_CACHE_UNKNOWN_PAGE_TOTAL,
            Unit::Count,
            "Total number of reads for page ids outside the catalog."
        );
    });
}

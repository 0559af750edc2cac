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
            "pageless_script_served_total",
            Unit::Count,
            "Total number of generated scripts served with a body."
        );
        describe_counter!(
            "pageless_script_not_modified_total",
            Unit::Count,
            "Total number of script requests answered with 304 Not Modified."
        );
        describe_counter!(
            "pageless_script_unknown_hash_total",
            Unit::Count,
            "Total number of script requests for an unknown or malformed hash."
        );
        describe_counter!(
            "pageless_batch_served_total",
            Unit::Count,
            "Total number of post batches served to scrolling clients."
        );
        describe_counter!(
            "pageless_registry_evict_total",
            Unit::Count,
            "Total number of script registry evictions due to capacity."
        );
    });
}

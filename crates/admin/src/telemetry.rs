//! Sentry and tracing setup for the admin binary.

use std::borrow::Cow;

use sentry::integrations::tracing::{self as sentry_tracing, EventFilter};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::AdminConfig;

const DEFAULT_FILTER: &str = "neobazaar_admin=info,neobazaar_backend=info,tower_http=info";

/// Client options built from the admin configuration.
#[must_use]
pub fn sentry_options(config: &AdminConfig) -> sentry::ClientOptions {
    sentry::ClientOptions {
        release: sentry::release_name!(),
        environment: config.sentry_environment.clone().map(Cow::Owned),
        sample_rate: config.sentry_sample_rate,
        traces_sample_rate: config.sentry_traces_sample_rate,
        attach_stacktrace: true,
        ..Default::default()
    }
}

/// Initialize Sentry first, then the subscriber that forwards to it.
///
/// `LOG_FORMAT=json` switches the log output to flattened JSON lines.
/// The returned guard must outlive the server.
pub fn init(config: &AdminConfig) -> Option<sentry::ClientInitGuard> {
    let guard = config
        .sentry_dsn
        .as_deref()
        .map(|dsn| sentry::init((dsn, sentry_options(config))));

    let json_logs = std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));
    let json_layer =
        json_logs.then(|| tracing_subscriber::fmt::layer().json().flatten_event(true));
    let text_layer = (!json_logs).then(tracing_subscriber::fmt::layer);

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_FILTER.into()))
        .with(json_layer)
        .with(text_layer)
        .with(sentry_tracing::layer().event_filter(|metadata| match *metadata.level() {
            tracing::Level::ERROR | tracing::Level::WARN => EventFilter::Event,
            tracing::Level::INFO | tracing::Level::DEBUG => EventFilter::Breadcrumb,
            _ => EventFilter::Ignore,
        }))
        .init();

    guard
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_sentry_options_carry_sample_rates() {
        let config = AdminConfig {
            host: "127.0.0.1".parse().unwrap(),
            port: 3001,
            base_url: "http://localhost:3001".to_string(),
            backend: None,
            admin_email: None,
            sentry_dsn: None,
            sentry_environment: Some("staging".to_string()),
            sentry_sample_rate: 0.5,
            sentry_traces_sample_rate: 0.1,
        };
        let options = sentry_options(&config);
        assert!((options.sample_rate - 0.5).abs() < f32::EPSILON);
        assert!((options.traces_sample_rate - 0.1).abs() < f32::EPSILON);
        assert_eq!(options.environment.as_deref(), Some("staging"));
        assert!(options.attach_stacktrace);
    }
}

//! Error tracking and log output for the storefront binary.
//!
//! Sentry must be initialized before the tracing subscriber so the Sentry
//! layer sees a bound client. Keep the returned guard alive for the whole
//! process; dropping it flushes pending events.

use std::borrow::Cow;

use sentry::integrations::tracing::{self as sentry_tracing, EventFilter};
use tracing::{Level, Metadata};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::StorefrontConfig;

const DEFAULT_FILTER: &str = "neobazaar_storefront=info,neobazaar_backend=info,tower_http=debug";

/// Log line format, chosen with `LOG_FORMAT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Text,
    /// One JSON object per event, for log shippers.
    Json,
}

impl LogFormat {
    /// `json` (any case) selects JSON; anything else is text.
    #[must_use]
    pub fn parse(value: Option<&str>) -> Self {
        match value {
            Some(v) if v.trim().eq_ignore_ascii_case("json") => Self::Json,
            _ => Self::Text,
        }
    }
}

/// Start Sentry (when a DSN is set) and install the global subscriber.
pub fn init(config: &StorefrontConfig) -> Option<sentry::ClientInitGuard> {
    let guard = config.sentry_dsn.as_deref().map(|dsn| {
        sentry::init((
            dsn,
            sentry::ClientOptions {
                release: sentry::release_name!(),
                environment: config.sentry_environment.clone().map(Cow::Owned),
                attach_stacktrace: true,
                ..Default::default()
            },
        ))
    });

    let format = LogFormat::parse(std::env::var("LOG_FORMAT").ok().as_deref());
    let json = (format == LogFormat::Json)
        .then(|| tracing_subscriber::fmt::layer().json().flatten_event(true));
    let text = (format == LogFormat::Text).then(tracing_subscriber::fmt::layer);

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_FILTER.into()))
        .with(json)
        .with(text)
        .with(sentry_tracing::layer().event_filter(event_filter))
        .init();

    if guard.is_some() {
        tracing::info!("Sentry initialized");
    }
    guard
}

/// Warnings and errors become Sentry events; info and debug become breadcrumbs.
fn event_filter(metadata: &Metadata<'_>) -> EventFilter {
    match *metadata.level() {
        Level::ERROR | Level::WARN => EventFilter::Event,
        Level::INFO | Level::DEBUG => EventFilter::Breadcrumb,
        _ => EventFilter::Ignore,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_format_parse() {
        assert_eq!(LogFormat::parse(Some("JSON")), LogFormat::Json);
        assert_eq!(LogFormat::parse(Some(" json ")), LogFormat::Json);
        assert_eq!(LogFormat::parse(Some("pretty")), LogFormat::Text);
        assert_eq!(LogFormat::parse(None), LogFormat::Text);
    }
}

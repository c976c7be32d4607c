//! Logging initialization. Logs go to stderr so command output on stdout
//! stays clean.

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Filter directive: `RUST_LOG` wins, then `--verbose`, then the configured level.
pub fn filter_directive(configured: &str, verbose: bool) -> String {
    match std::env::var("RUST_LOG") {
        Ok(env) if !env.trim().is_empty() => env,
        _ if verbose => "debug".to_string(),
        _ => configured.to_string(),
    }
}

/// Installs the global subscriber. Call once, from `main`.
pub fn init_logging(configured: &str, verbose: bool) {
    let filter = EnvFilter::try_new(filter_directive(configured, verbose))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbose_overrides_configured_level() {
        if std::env::var("RUST_LOG").is_ok() {
            return;
        }
        assert_eq!(filter_directive("warn", true), "debug");
        assert_eq!(filter_directive("warn", false), "warn");
    }
}

//! Tracing subscriber setup.

use tracing_subscriber::EnvFilter;

/// Environment variable that overrides the configured filter.
pub const LOG_ENV: &str = "STRATA_LOG";

/// Pick the filter directive: `STRATA_LOG` when set, else `configured`.
pub fn filter_directive(configured: &str) -> String {
    match std::env::var(LOG_ENV) {
        Ok(value) if !value.trim().is_empty() => value,
        _ => configured.to_string(),
    }
}

/// Install a global fmt subscriber writing to stderr.
///
/// An invalid directive falls back to `info`. Calling this more than once
/// is harmless; later calls leave the first subscriber in place.
pub fn init(configured: &str) {
    let directive = filter_directive(configured);
    let filter = EnvFilter::try_new(&directive).unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_overrides_configured_filter() {
        std::env::remove_var(LOG_ENV);
        assert_eq!(filter_directive("strata=debug"), "strata=debug");

        std::env::set_var(LOG_ENV, "warn");
        assert_eq!(filter_directive("strata=debug"), "warn");
        std::env::remove_var(LOG_ENV);
    }

    #[test]
    fn test_init_twice() {
        init("not a [valid directive");
        init("info");
    }
}

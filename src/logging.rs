//! Logging setup shared by the binaries.

use tracing_subscriber::EnvFilter;

/// Default directive: everything at info, or only warnings in quiet mode.
pub fn default_directive(quiet: bool) -> &'static str {
    if quiet {
        "warn"
    } else {
        "info"
    }
}

/// Installs the process-wide `tracing` subscriber.
///
/// `RUST_LOG` takes precedence over the quiet flag when set.
pub fn init(quiet: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(quiet)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quiet_hides_info() {
        assert_eq!(default_directive(true), "warn");
        assert_eq!(default_directive(false), "info");
    }
}

//! Diagnostic logging setup.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Environment variable holding the log filter directives
pub const LOG_ENV: &str = "PIPEBOARD_LOG";

fn default_directive(verbose: bool) -> &'static str {
    if verbose { "pipeboard=debug" } else { "warn" }
}

/// Install the global subscriber. `PIPEBOARD_LOG` wins over `-v`.
pub fn init(verbose: bool) {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose)));

    // A second init (tests) is harmless; keep the first subscriber.
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr)
                .with_ansi(crate::ui::stderr_supports_color()),
        )
        .try_init();
}

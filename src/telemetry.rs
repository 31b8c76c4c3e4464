//! Tracing setup.
//!
//! LOG_LEVEL takes tracing-subscriber filter directives ("debug",
//! "info,quiz=trace", …). LOG_FORMAT=json switches the fmt layer to
//! structured output for log shippers; anything else stays human-readable.
//! Tower's TraceLayer adds per-request spans on top of this.

use tracing_subscriber::EnvFilter;

/// Applied when LOG_LEVEL is unset: chatty for our own targets, quieter for
/// the HTTP stack.
const DEFAULT_DIRECTIVES: &str =
    "info,quiz=debug,zhongkuai_backend=debug,tower_http=info,axum=info";

pub fn init_tracing() {
    let filter = EnvFilter::try_from_env("LOG_LEVEL")
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVES));

    // Target, file, and line disambiguate sources in mixed output.
    let fmt = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(true)
        .with_line_number(true);

    if matches!(std::env::var("LOG_FORMAT").as_deref(), Ok("json")) {
        fmt.json().init();
    } else {
        fmt.init();
    }
}

//! Telemetry initialization for the binary.
//!
//! Events go to stderr as JSON lines so stdout stays a clean response
//! document. Filtering follows `RUST_LOG` (default `info`); set
//! `RUST_LOG=regdoc=debug` to see merge decisions.
//!
//! `REGDOC_LOG=off` disables the subscriber entirely.

use tracing_subscriber::EnvFilter;

/// Install the global subscriber, unless disabled by `REGDOC_LOG=off`.
pub fn init() {
    match std::env::var("REGDOC_LOG").ok().as_deref() {
        Some("off") => {}
        _ => init_stderr(),
    }
}

/// JSON spans/events to stderr via tracing-subscriber's JSON formatter.
fn init_stderr() {
    use tracing_subscriber::layer::SubscriberExt as _;
    use tracing_subscriber::util::SubscriberInitExt as _;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(std::io::stderr)
                .with_span_events(tracing_subscriber::fmt::format::FmtSpan::CLOSE),
        )
        .init();
}

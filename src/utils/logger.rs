use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn default_filter(directive: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directive))
}

/// `unit_selector` at `level`; other crates stay at `warn` unless we are
/// debugging ourselves.
fn filter_directive(level: &str) -> String {
    let level = level.trim().to_lowercase();
    let others = match level.as_str() {
        "debug" | "trace" => "info",
        _ => "warn",
    };
    format!("unit_selector={},{}", level, others)
}

pub fn init_cli_logger(level: &str) {
    let filter = default_filter(&filter_directive(level));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .with_writer(std::io::stderr)
                .compact(),
        )
        .init();
}

/// JSON lines on stderr, for when the CLI runs under a log collector.
pub fn init_json_logger(level: &str) {
    let filter = default_filter(&filter_directive(level));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr)
                .json(),
        )
        .init();
}

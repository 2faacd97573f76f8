use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Install the stderr log subscriber.
///
/// `RUST_LOG` sets the filter (default `warn`); `LEDGR_LOG_FORMAT=json` switches to JSON lines.
/// Stdout is left for decoded output.
pub fn init() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let json = std::env::var("LEDGR_LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let result = if json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().compact().with_writer(std::io::stderr))
            .try_init()
    };

    if let Err(err) = result {
        eprintln!("log init skipped: {err}");
    }
}

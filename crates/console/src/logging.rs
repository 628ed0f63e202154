use tracing::debug;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Install the global subscriber.
///
/// `RUST_LOG` wins; otherwise `fallback` (usually the `[log] filter`
/// setting); otherwise `warn`. Returns `false` when a subscriber was already
/// installed, in which case that one stays in charge.
pub fn init(fallback: Option<&str>) -> bool {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(fallback.unwrap_or("warn")))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    match tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_file(true).with_line_number(true))
        .try_init()
    {
        Ok(()) => true,
        Err(err) => {
            debug!(%err, "tracing subscriber already installed");
            false
        }
    }
}

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Compact stderr logging. Default level is `warn,lead_pulse=info`;
/// override with `RUST_LOG`. `verbose` lifts the crate to debug.
pub fn init(verbose: bool) {
    let default = if verbose {
        "warn,lead_pulse=debug"
    } else {
        "warn,lead_pulse=info"
    };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact();

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stderr_layer)
        .init();

    tracing::debug!("tracing initialized");
}

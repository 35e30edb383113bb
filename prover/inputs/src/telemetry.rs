use std::sync::Once;

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

static INIT: Once = Once::new();

/// Installs a stdout subscriber filtered by `RUST_LOG` (default `info`).
/// Safe to call repeatedly, e.g. from every test.
pub fn setup_logger() {
    INIT.call_once(|| {
        let env_filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
        let stdout_layer = fmt::Layer::new().with_writer(std::io::stdout).with_ansi(true);

        // Another subscriber may already be installed by the embedding binary.
        let _ = tracing_subscriber::registry()
            .with(env_filter)
            .with(stdout_layer)
            .try_init();
    });
}

use std::sync::Once;

use tracing_subscriber::EnvFilter;

static INIT: Once = Once::new();

/// Install the tracing subscriber for library consumers and tests.
///
/// Filter defaults to `info` and can be overridden with `RUST_LOG`.
/// Safe to call more than once; only the first call installs anything.
pub fn init() {
    INIT.call_once(|| {
        let _ = tracing_log::LogTracer::init();
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
        let subscriber = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .finish();
        let _ = tracing::subscriber::set_global_default(subscriber);
        tracing::info!(
            target: "stitchdesk",
            event = "logging_init",
            build = env!("STITCHDESK_GIT_HASH")
        );
    });
}

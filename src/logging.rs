/// Initialize structured logging with tracing.
/// This should be called once at host startup.
pub fn init_logging() {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let subscriber = tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(true)
                .with_file(true)
                .with_line_number(true)
                .json() // JSON output for structured logging
        );

    // Keep an already-installed subscriber.
    if tracing::subscriber::set_global_default(subscriber).is_ok() {
        tracing::info!("Structured logging initialized");
    }
}

//! quill - Local CLI conversational assistant

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() {
    // Initialize logging; diagnostics go to stderr so they never interleave
    // with the chat transcript on stdout.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "quill=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    tracing::debug!("starting quill v{}", env!("CARGO_PKG_VERSION"));

    // Run CLI
    if let Err(err) = quill::cli::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}

use std::io;
use tracing::Level;
use tracing_appender::rolling;
use tracing_subscriber::filter::FilterFn;
use tracing_subscriber::fmt;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

pub const LOG_DIRECTORY: &str = "logs";
pub const LOG_FILE: &str = "overview-gap.log";

// Used when RUST_LOG is not set
const DEFAULT_CONSOLE_FILTER: &str = "info,embedding_request=warn,llm_request=info";
const DEFAULT_FILE_FILTER: &str = "info,gap=debug,embedding_request=debug,llm_request=debug";

pub fn configure_logging() {
    // Connection-pool chatter from the HTTP stack stays out of the console
    let custom_filter = FilterFn::new(|metadata| {
        !(metadata.level() == &Level::WARN && metadata.target().starts_with("hyper"))
    });

    // Console log configuration (stderr)
    let console_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_CONSOLE_FILTER));
    let console_log = fmt::layer()
        .with_writer(io::stderr)
        .with_filter(console_filter)
        .with_filter(custom_filter);

    // File log configuration
    let file_appender = rolling::daily(LOG_DIRECTORY, LOG_FILE);
    let file_log = fmt::layer()
        .with_writer(file_appender)
        .with_ansi(false)
        .with_filter(EnvFilter::new(DEFAULT_FILE_FILTER));

    tracing_subscriber::Registry::default()
        .with(console_log)
        .with(file_log)
        .init();
}

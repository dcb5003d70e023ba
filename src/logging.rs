//! Logging setup
//!
//! Structured JSON logs go to stderr so stdout carries only status lines.

use anyhow::Result;
use tracing::Subscriber;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Filter from `RUST_LOG`, falling back to `log_level`
pub fn env_filter(log_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level))
}

/// JSON subscriber writing to `writer`
pub fn json_subscriber<W>(filter: EnvFilter, writer: W) -> impl Subscriber + Send + Sync + 'static
where
    W: for<'a> MakeWriter<'a> + Send + Sync + 'static,
{
    let console_layer = fmt::layer()
        .json()
        .with_writer(writer)
        .with_filter(filter);

    tracing_subscriber::registry().with(console_layer)
}

/// Initialize the global tracing subscriber
pub fn init_tracing(log_level: &str) -> Result<()> {
    json_subscriber(env_filter(log_level), std::io::stderr).try_init()?;

    Ok(())
}


#[cfg(test)]
mod tests {
    use super::capture::CapturedLogs;
    use super::*;

    #[test]
    fn test_json_subscriber_respects_level() {
        let logs = CapturedLogs::default();
        let subscriber = json_subscriber(EnvFilter::new("warn"), logs.clone());

        tracing::subscriber::with_default(subscriber, || {
            tracing::info!("below threshold");
            tracing::warn!(database = "LodeRunnerDB", "at threshold");
        });

        let contents = logs.contents();
        assert!(!contents.contains("below threshold"));
        assert!(contents.contains("at threshold"));
        assert!(contents.contains("\"level\":\"WARN\""));
    }
}

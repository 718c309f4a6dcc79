use tracing_subscriber::{fmt::format::Format, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_FILTER: &str = "printvault=info";

/// Initialize tracing for the CLI.
///
/// `RUST_LOG` overrides the default filter. `LOG_FORMAT=json` switches to one JSON object
/// per event. Logs go to stderr so stdout stays parseable.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_FILTER.into());
    let json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        let console_fmt = tracing_subscriber::fmt::layer()
            .event_format(Format::default().compact().with_target(false))
            .with_writer(std::io::stderr);
        tracing_subscriber::registry()
            .with(filter)
            .with(console_fmt)
            .init();
    }
}

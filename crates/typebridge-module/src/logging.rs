use tracing_subscriber::{filter::LevelFilter, fmt, prelude::*, EnvFilter};

/// Log filter of the module process, in `EnvFilter` syntax.
pub const LOG_ENV: &str = "TYPEBRIDGE_LOG";

/// `json` switches the module logs to JSON objects.
pub const LOG_STYLE_ENV: &str = "TYPEBRIDGE_LOG_STYLE";

/// Installs a subscriber writing to stderr. Stdout is left to the module.
///
/// Does nothing when a subscriber is already installed.
pub fn init() {
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .with_env_var(LOG_ENV)
        .from_env_lossy();

    let json = std::env::var(LOG_STYLE_ENV).is_ok_and(|style| style.eq_ignore_ascii_case("json"));

    let result = if json {
        tracing_subscriber::registry()
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .with(filter)
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(fmt::layer().with_writer(std::io::stderr))
            .with(filter)
            .try_init()
    };

    if let Err(error) = result {
        tracing::debug!(%error, "keeping the installed subscriber");
    }
}

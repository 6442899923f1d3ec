// src/logging.rs

//! Logger initialization.

/// Default filter string for the chosen verbosity.
pub fn default_filter(debug: bool) -> &'static str {
    if debug { "debug" } else { "info" }
}

/// Initialize logging; `debug` raises the default filter, `RUST_LOG`
/// still overrides it.
pub fn init(debug: bool) {
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(default_filter(debug)),
    )
    .format_timestamp_secs()
    .init();
}

//! Log filter construction for the command line tool

use tracing_subscriber::EnvFilter;

/// Filter taken from `RUST_LOG`, falling back to `debug` when verbose and
/// `info` otherwise.
pub fn env_filter(verbose: bool) -> EnvFilter {
    filter_from(std::env::var(EnvFilter::DEFAULT_ENV).ok().as_deref(), verbose)
}

fn filter_from(directives: Option<&str>, verbose: bool) -> EnvFilter {
    let default_level = if verbose { "debug" } else { "info" };
    directives
        .filter(|d| !d.trim().is_empty())
        .and_then(|d| EnvFilter::try_new(d).ok())
        .unwrap_or_else(|| EnvFilter::new(default_level))
}

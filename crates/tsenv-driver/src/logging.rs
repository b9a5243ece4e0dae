//! Tracing setup
//!
//! The subscriber is installed only when `TSENV_LOG` or `RUST_LOG` is set,
//! or when `--verbose` asks for it. Output goes to stderr so JSON written
//! to stdout stays clean.

use tracing_subscriber::EnvFilter;

pub const LOG_VAR: &str = "TSENV_LOG";

/// Filter from `TSENV_LOG`, then `RUST_LOG`; `verbose` supplies `debug`
/// when neither is set.
fn build_filter(verbose: bool) -> Option<EnvFilter> {
    if let Ok(value) = std::env::var(LOG_VAR) {
        return Some(EnvFilter::builder().parse_lossy(value));
    }
    if std::env::var("RUST_LOG").is_ok() {
        return Some(EnvFilter::from_default_env());
    }
    verbose.then(|| EnvFilter::new("debug"))
}

pub fn init_tracing(verbose: bool) {
    let Some(filter) = build_filter(verbose) else {
        return;
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

use anyhow::{Result, anyhow};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

const QUIET_TARGETS: [&str; 4] = ["hyper", "reqwest", "h2", "rustls"];

/// Builds the filter: `RUST_LOG` if set, otherwise `level` with noisy HTTP crates held at warn.
pub fn build_filter(level: &str) -> Result<EnvFilter> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }

    let mut directives = vec![level.to_string()];
    directives.extend(QUIET_TARGETS.iter().map(|target| format!("{target}=warn")));
    EnvFilter::try_new(directives.join(",")).map_err(|e| anyhow!("invalid log level '{level}': {e}"))
}

pub fn init_tracing(level: &str, json: bool) -> Result<()> {
    let filter = build_filter(level)?;
    let registry = tracing_subscriber::registry().with(filter);

    if json {
        registry
            .with(fmt::layer().json().with_target(true))
            .try_init()
            .map_err(|e| anyhow!("failed to install tracing subscriber: {e}"))
    } else {
        registry
            .with(fmt::layer().with_target(true).compact())
            .try_init()
            .map_err(|e| anyhow!("failed to install tracing subscriber: {e}"))
    }
}

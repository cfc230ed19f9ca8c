use std::{fs, path::Path};

use crate::errors::Result;

/// Creates `path` and its parents when missing.
pub fn ensure_dir(path: &Path) -> Result<()> {
    if !path.exists() {
        fs::create_dir_all(path)?;
    }
    Ok(())
}

/// Initializes the global tracing subscriber with sensible defaults.
pub(crate) fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter =
        EnvFilter::from_default_env().add_directive("finance_core=info".parse().unwrap());

    fmt().with_env_filter(filter).init();
}

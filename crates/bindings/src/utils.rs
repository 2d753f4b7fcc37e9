//! Utility functions exposed to Python.

use pyo3::exceptions::PyRuntimeError;
use pyo3::prelude::*;
use tracing_subscriber::EnvFilter;

/// Returns the builder version string.
#[pyfunction]
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

/// Installs a stderr log subscriber for build-phase tracing.
///
/// # Arguments
///
/// * `filter` - An `EnvFilter` directive such as `"memhier_core=debug"`. When
///   omitted, `RUST_LOG` is used, falling back to `info`.
///
/// # Returns
///
/// `RuntimeError` if the directive is malformed or a subscriber is already installed.
#[pyfunction]
#[pyo3(signature = (filter=None))]
pub fn init_logging(filter: Option<&str>) -> PyResult<()> {
    let filter = match filter {
        Some(directive) => EnvFilter::try_new(directive),
        None => EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new("info")),
    }
    .map_err(|e| PyRuntimeError::new_err(e.to_string()))?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| PyRuntimeError::new_err(e.to_string()))
}

//! Python bindings for the memory-hierarchy topology builder.
//!
//! This crate exposes the builder to Python via PyO3. It provides:
//! 1. **System:** `PySystem`, assembled from a configuration dict and queried for
//!    its components, connections, memory ranges and bound processes.
//! 2. **Utilities:** Version string and log setup.
//!
//! Build errors surface as `ValueError` carrying the `BuildError` message.

use pyo3::prelude::*;

/// Python dict to Rust `Config` conversion.
pub mod conversion;
/// System binding (`PySystem`).
pub mod system;
/// Utility functions (version, logging).
pub mod utils;

/// Registers all classes and functions onto the given Python module.
///
/// # Arguments
///
/// * `m` - The Python module to register types and functions on.
///
/// # Returns
///
/// `Ok(())` on success, or a `PyErr` if registration fails.
pub fn register_builder_module(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<system::PySystem>()?;

    m.add_function(wrap_pyfunction!(utils::version, m)?)?;
    m.add_function(wrap_pyfunction!(utils::init_logging, m)?)?;

    Ok(())
}

#[pymodule]
#[pyo3(name = "_core")]
fn memhier(m: &Bound<'_, PyModule>) -> PyResult<()> {
    register_builder_module(m)?;
    Ok(())
}

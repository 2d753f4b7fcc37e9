//! Python↔Rust configuration conversion.
//!
//! Converts Python dicts into the core `Config` type via JSON serialization, so the
//! same schema is used from Python and from configuration files.

use memhier_core::BuildError;
use memhier_core::config::Config;
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;

/// Converts a Python dict to a builder `Config`.
///
/// The dict is serialized with Python's `json.dumps` and then deserialized into
/// `Config`. Keys must match the Rust config structure (`system`, `cpu`, `cache`,
/// `workload`); unknown keys are rejected.
///
/// # Arguments
///
/// * `py` - Python interpreter handle.
/// * `dict` - A Python dict, e.g. `{"system": {"num_cpus": 2}, "workload": {"cmd": "..."}}`.
///
/// # Returns
///
/// The deserialized `Config`, or a `ValueError` if the dict is invalid.
pub fn py_dict_to_config(py: Python<'_>, dict: &Bound<'_, PyAny>) -> PyResult<Config> {
    let json = py.import("json")?;
    let dumps = json.getattr("dumps")?;
    let json_str: String = dumps.call1((dict,))?.extract()?;

    Config::from_json(&json_str).map_err(build_error)
}

/// Maps a build failure onto a Python `ValueError`.
pub fn build_error(err: BuildError) -> PyErr {
    PyValueError::new_err(err.to_string())
}

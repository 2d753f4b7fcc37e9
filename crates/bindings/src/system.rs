//! System Python binding.
//!
//! Assembles a `SystemDescription` from a config dict and exposes the validated graph
//! read-only. Python scripts inspect or serialize it; running it is left to an engine.

use std::str::FromStr;

use memhier_core::config::MemMode;
use memhier_core::params::ComponentClass;
use memhier_core::soc::SystemAssembler;
use memhier_core::{Config, RootHandle, SystemDescription};
use pyo3::prelude::*;

use crate::conversion::{build_error, py_dict_to_config};

/// Python-exposed assembled system.
#[pyclass(frozen, name = "System")]
#[derive(Debug)]
pub struct PySystem {
    inner: SystemDescription,
    root: RootHandle,
}

impl PySystem {
    fn assemble(config: Config) -> PyResult<Self> {
        let (inner, root) = SystemAssembler::new(config).assemble().map_err(build_error)?;
        Ok(Self { inner, root })
    }

    /// Returns the wrapped description.
    pub const fn description(&self) -> &SystemDescription {
        &self.inner
    }
}

#[pymethods]
impl PySystem {
    /// Assembles a system from a config dict.
    ///
    /// Raises `ValueError` with the build error message on any failure.
    #[new]
    fn new(py: Python<'_>, config_dict: &Bound<'_, PyAny>) -> PyResult<Self> {
        Self::assemble(py_dict_to_config(py, config_dict)?)
    }

    /// Assembles a system from a JSON configuration string.
    #[staticmethod]
    fn from_json(json: &str) -> PyResult<Self> {
        Self::assemble(Config::from_json(json).map_err(build_error)?)
    }

    /// Assembles a system from a JSON configuration file.
    #[staticmethod]
    fn from_file(path: &str) -> PyResult<Self> {
        Self::assemble(Config::from_file(path).map_err(build_error)?)
    }

    #[getter]
    fn num_cpus(&self) -> usize {
        self.inner.num_cpus()
    }

    #[getter]
    fn full_system(&self) -> bool {
        self.root.full_system()
    }

    #[getter]
    fn mem_mode(&self) -> &'static str {
        match self.inner.mem_mode() {
            MemMode::Timing => "timing",
            MemMode::Atomic => "atomic",
        }
    }

    /// Number of components of a class, by class name (`"L2Cache"`) or path
    /// segment (`"l2cache"`).
    fn count(&self, class: &str) -> PyResult<usize> {
        let class = ComponentClass::from_str(class).map_err(build_error)?;
        Ok(self.inner.count(class))
    }

    /// Component paths in creation order.
    fn components(&self) -> Vec<String> {
        self.inner
            .components()
            .iter()
            .map(|c| c.id().to_string())
            .collect()
    }

    /// `(requestor, responder)` port paths in creation order.
    fn connections(&self) -> Vec<(String, String)> {
        self.inner
            .connections()
            .connections()
            .iter()
            .map(|c| (c.requestor.to_string(), c.responder.to_string()))
            .collect()
    }

    /// `(start, size)` of every memory range.
    fn mem_ranges(&self) -> Vec<(u64, u64)> {
        self.inner
            .mem_ranges()
            .iter()
            .map(|r| (r.start().val(), r.size()))
            .collect()
    }

    /// `(cpu, pid, argv)` for every bound process.
    fn processes(&self) -> Vec<(usize, u32, Vec<String>)> {
        self.inner
            .processes()
            .iter()
            .map(|(cpu, p)| (cpu, p.pid(), p.argv()))
            .collect()
    }

    /// Pretty-printed JSON description of the whole graph.
    fn to_json(&self) -> PyResult<String> {
        self.inner.to_json().map_err(build_error)
    }

    fn __repr__(&self) -> String {
        format!(
            "System(cpus={}, components={}, connections={})",
            self.inner.num_cpus(),
            self.inner.components().len(),
            self.inner.connections().len()
        )
    }
}

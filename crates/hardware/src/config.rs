//! Configuration surface for the topology builder.
//!
//! This module defines the options a configuration script supplies. It provides:
//! 1. **Structures:** System, CPU, cache and workload sections, each defaulting
//!    missing keys.
//! 2. **Enums:** CPU model, memory type and L2 placement.
//! 3. **Overrides:** `Config::overrides_for` projects the sections onto the sparse
//!    per-class `Overrides` consumed by the parameter resolver.
//!
//! Configuration is supplied as JSON (from the Python API or a file on disk) or built
//! in code starting from `Config::default()`. Unknown keys are rejected so that a
//! misspelled option fails loudly instead of silently falling back to a default.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::common::error::BuildError;
use crate::params::{ComponentClass, Overrides};
use crate::soc::topology::CacheHierarchy;

pub use crate::soc::topology::L2Sharing;

/// Default values for configuration keys that are not parameter overrides.
mod defaults {
    /// Number of CPUs in the system.
    pub const NUM_CPUS: usize = 1;

    /// L1 caches are enabled unless disabled explicitly.
    pub const CACHES: bool = true;

    /// The L2 level is enabled unless disabled explicitly.
    pub const L2CACHE: bool = true;
}

/// CPU model instantiated for every core.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum CpuType {
    /// Single-issue in-order CPU using timing memory accesses.
    #[default]
    #[serde(rename = "TimingSimpleCPU")]
    TimingSimple,
    /// Single-issue CPU using atomic (latency-estimated) memory accesses.
    #[serde(rename = "AtomicSimpleCPU")]
    AtomicSimple,
    /// Out-of-order CPU.
    #[serde(rename = "O3CPU", alias = "DerivO3CPU")]
    O3,
}

impl CpuType {
    /// Returns the memory access mode the system must run in for this CPU model.
    pub const fn mem_mode(self) -> MemMode {
        match self {
            Self::TimingSimple | Self::O3 => MemMode::Timing,
            Self::AtomicSimple => MemMode::Atomic,
        }
    }
}

/// System-wide memory access mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MemMode {
    /// Requests travel the hierarchy with timing.
    Timing,
    /// Requests complete immediately with an estimated latency.
    Atomic,
}

/// Memory technology behind the memory controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum MemoryType {
    /// DDR3-1600 with an 8x8 device configuration.
    #[default]
    #[serde(rename = "DDR3_1600_8x8")]
    Ddr3_1600,
    /// DDR4-2400 with an 8x8 device configuration.
    #[serde(rename = "DDR4_2400_8x8")]
    Ddr4_2400,
    /// Fixed-latency memory.
    SimpleMemory,
}

/// Root configuration.
///
/// # Examples
///
/// ```
/// use memhier_core::config::{Config, CpuType};
///
/// let config = Config::from_json(
///     r#"{
///         "system": { "num_cpus": 2 },
///         "cpu": { "cpu_type": "AtomicSimpleCPU" },
///         "cache": { "l1_d": { "size": "64kB", "assoc": 4 } },
///         "workload": { "cmd": "/bin/ls;/bin/echo hi" }
///     }"#,
/// )
/// .unwrap();
///
/// assert_eq!(config.system.num_cpus, 2);
/// assert_eq!(config.cpu.cpu_type, CpuType::AtomicSimple);
/// assert_eq!(config.cache.l1_d.assoc, Some(4));
/// assert!(config.cache.l2cache);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Core count, clock/voltage domain and memory.
    pub system: SystemConfig,
    /// CPU model and clock.
    pub cpu: CpuConfig,
    /// Cache hierarchy shape and per-level geometry.
    pub cache: CacheConfig,
    /// Workload command lines.
    pub workload: WorkloadConfig,
}

impl Config {
    /// Parses a configuration from JSON.
    ///
    /// # Returns
    ///
    /// The configuration, or `BuildError::InvalidConfig` with the serde diagnostic.
    pub fn from_json(json: &str) -> Result<Self, BuildError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads and parses a JSON configuration file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, BuildError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path)
            .map_err(|e| BuildError::InvalidConfig(format!("{}: {e}", path.display())))?;
        Self::from_json(&json)
    }

    /// Sets the number of CPUs.
    #[must_use]
    pub const fn with_num_cpus(mut self, num_cpus: usize) -> Self {
        self.system.num_cpus = num_cpus;
        self
    }

    /// Sets the workload command string.
    #[must_use]
    pub fn with_cmd(mut self, cmd: impl Into<String>) -> Self {
        self.workload.cmd = cmd.into();
        self
    }

    /// Sets the per-process options string.
    #[must_use]
    pub fn with_options(mut self, options: impl Into<String>) -> Self {
        self.workload.options = options.into();
        self
    }

    /// Returns the cache hierarchy selected by the `caches` / `l2cache` flags.
    pub fn hierarchy(&self) -> Result<CacheHierarchy, BuildError> {
        CacheHierarchy::from_flags(self.cache.caches, self.cache.l2cache)
    }

    /// Projects the configuration onto the overrides for one component class.
    ///
    /// The system clock and voltage apply to every clocked component except the
    /// CPU clock, which has its own key; `block_size` applies to every cache level.
    pub fn overrides_for(&self, class: ComponentClass) -> Overrides {
        let system = &self.system;
        let clocked = |clock: Option<&String>| Overrides {
            clock: clock.cloned(),
            voltage: system.sys_voltage.clone(),
            ..Overrides::default()
        };
        let cache = |level: &CacheLevelConfig| Overrides {
            size: level.size.clone(),
            assoc: level.assoc,
            block_size: self.cache.block_size,
            ..Overrides::default()
        };

        match class {
            ComponentClass::Cpu => clocked(self.cpu.cpu_clock.as_ref()),
            ComponentClass::L1InstructionCache => cache(&self.cache.l1_i),
            ComponentClass::L1DataCache => cache(&self.cache.l1_d),
            ComponentClass::L2Cache => cache(&self.cache.l2),
            ComponentClass::InterconnectBus | ComponentClass::InterruptController => {
                clocked(system.sys_clock.as_ref())
            }
            ComponentClass::MemoryController => Overrides {
                size: system.mem_size.clone(),
                ..clocked(system.sys_clock.as_ref())
            },
            ComponentClass::System => Overrides::default(),
        }
    }
}

/// System-level settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SystemConfig {
    /// Number of CPUs; must be at least one.
    pub num_cpus: usize,
    /// System clock domain frequency (`"1GHz"`).
    pub sys_clock: Option<String>,
    /// System voltage domain (`"1.0V"`).
    pub sys_voltage: Option<String>,
    /// Size of the memory range backed by the memory controller (`"512MB"`).
    pub mem_size: Option<String>,
    /// Memory technology.
    pub mem_type: MemoryType,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            num_cpus: defaults::NUM_CPUS,
            sys_clock: None,
            sys_voltage: None,
            mem_size: None,
            mem_type: MemoryType::default(),
        }
    }
}

/// CPU settings shared by every core.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CpuConfig {
    /// CPU model.
    pub cpu_type: CpuType,
    /// Core clock frequency (`"2GHz"`).
    pub cpu_clock: Option<String>,
}

/// Cache hierarchy settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CacheConfig {
    /// Place split L1 caches in front of each CPU.
    pub caches: bool,
    /// Place an L2 level below the L1 caches; requires `caches`.
    pub l2cache: bool,
    /// Per-core or shared L2.
    pub l2_sharing: L2Sharing,
    /// Block size in bytes for every cache level.
    pub block_size: Option<u32>,
    /// L1 instruction cache geometry.
    pub l1_i: CacheLevelConfig,
    /// L1 data cache geometry.
    pub l1_d: CacheLevelConfig,
    /// L2 cache geometry.
    pub l2: CacheLevelConfig,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            caches: defaults::CACHES,
            l2cache: defaults::L2CACHE,
            l2_sharing: L2Sharing::default(),
            block_size: None,
            l1_i: CacheLevelConfig::default(),
            l1_d: CacheLevelConfig::default(),
            l2: CacheLevelConfig::default(),
        }
    }
}

/// Geometry overrides for one cache level.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CacheLevelConfig {
    /// Capacity (`"32kB"`).
    pub size: Option<String>,
    /// Associativity.
    pub assoc: Option<u32>,
}

/// Workload command lines.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WorkloadConfig {
    /// `;`-separated invocations, one per CPU.
    pub cmd: String,
    /// `;`-separated extra arguments, appended positionally to the invocations.
    pub options: String,
}

//! Build error taxonomy.
//!
//! Every stage of the builder reports failures through `BuildError`. It provides:
//! 1. **Parameter errors:** Bad values, units or ranges found while resolving options.
//! 2. **Structural errors:** Duplicate or unknown components, unknown ports, and
//!    write-once port violations found while creating and wiring components.
//! 3. **Closure errors:** Topologies in which some CPU cannot reach memory.
//! 4. **Workload errors:** Workload/CPU count mismatches.
//!
//! All errors are synchronous and deterministic; retrying without changing the
//! input reproduces them.

use std::fmt;

use thiserror::Error;

use super::addr::AddrRange;
use crate::soc::component::{ComponentId, PortName};
use crate::soc::interconnect::PortRef;

/// Names the configuration field an `InvalidParameter` error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamField {
    /// Capacity of a cache or memory.
    Size,
    /// Cache associativity.
    Associativity,
    /// Cache block (line) size in bytes.
    BlockSize,
    /// Clock frequency.
    Clock,
    /// Supply voltage.
    Voltage,
    /// Component class requested from the factory.
    Class,
    /// Number of CPUs in the system.
    CoreCount,
    /// Cache hierarchy flags (`caches`, `l2cache`).
    CacheHierarchy,
    /// Workload command string.
    Workload,
    /// Per-process argument string.
    WorkloadOptions,
}

impl ParamField {
    /// Returns the configuration key for this field.
    pub const fn key(self) -> &'static str {
        match self {
            Self::Size => "size",
            Self::Associativity => "assoc",
            Self::BlockSize => "block_size",
            Self::Clock => "clock",
            Self::Voltage => "voltage",
            Self::Class => "class",
            Self::CoreCount => "num_cpus",
            Self::CacheHierarchy => "l2cache",
            Self::Workload => "cmd",
            Self::WorkloadOptions => "options",
        }
    }

    /// Returns whether the field is a component parameter produced by resolution,
    /// as opposed to a system-shape or workload setting.
    pub const fn is_resolved(self) -> bool {
        matches!(
            self,
            Self::Size | Self::Associativity | Self::BlockSize | Self::Clock | Self::Voltage
        )
    }
}

impl fmt::Display for ParamField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Errors raised while assembling a system description.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    /// A resolved value violates its domain constraint, or could not be parsed.
    #[error("invalid parameter `{field}` = {value:?} for {component}: {reason}")]
    InvalidParameter {
        /// Component class or identity the parameter belongs to.
        component: String,
        /// The offending field.
        field: ParamField,
        /// The raw value as supplied.
        value: String,
        /// Why the value was rejected.
        reason: String,
    },

    /// The same identity was created twice within one build.
    #[error("duplicate component identity {0}")]
    DuplicateComponent(ComponentId),

    /// Wiring referenced a component that was never created.
    #[error("unknown component {0}")]
    UnknownComponent(ComponentId),

    /// Wiring referenced a port that the component's class does not declare.
    #[error("{component} has no port named `{port}`")]
    UnknownPort {
        /// Component that was addressed.
        component: ComponentId,
        /// The missing port name.
        port: PortName,
    },

    /// The two ends of a connection cannot be joined.
    #[error("cannot connect {requestor} to {responder}: {reason}")]
    IncompatiblePorts {
        /// Requesting side of the attempted connection.
        requestor: PortRef,
        /// Responding side of the attempted connection.
        responder: PortRef,
        /// Why the pair was rejected.
        reason: &'static str,
    },

    /// A point-to-point port already carries a connection.
    #[error("port {component}.{port} is already connected")]
    AlreadyConnected {
        /// Component that owns the port.
        component: ComponentId,
        /// The port that was connected twice.
        port: PortName,
    },

    /// A memory controller was given a second backing range.
    #[error("{component} is already bound to address range {range}")]
    AlreadyBound {
        /// The memory controller.
        component: ComponentId,
        /// The range bound first.
        range: AddrRange,
    },

    /// The closure check found a component cut off from the hierarchy.
    #[error("disconnected topology at {component}: {reason}")]
    DisconnectedTopology {
        /// The component that failed the check.
        component: ComponentId,
        /// What was missing.
        reason: String,
    },

    /// The number of workload invocations differs from the number of CPUs.
    #[error("workload has {found} invocation(s) but the system has {expected} CPU(s)")]
    WorkloadCountMismatch {
        /// Number of CPUs.
        expected: usize,
        /// Number of invocations parsed from the workload string.
        found: usize,
    },

    /// The configuration document itself could not be read or deserialized.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl BuildError {
    /// Convenience constructor for `InvalidParameter`.
    pub fn invalid_parameter(
        component: impl fmt::Display,
        field: ParamField,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidParameter {
            component: component.to_string(),
            field,
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Returns whether the error stems from options that cannot be resolved into
    /// parameters at all.
    ///
    /// Such errors abort the build outright; every other kind is a precondition
    /// violation the caller can correct and retry.
    pub const fn is_fatal(&self) -> bool {
        match self {
            Self::InvalidParameter { field, .. } => field.is_resolved(),
            Self::InvalidConfig(_) => true,
            _ => false,
        }
    }
}

impl From<serde_json::Error> for BuildError {
    fn from(err: serde_json::Error) -> Self {
        Self::InvalidConfig(err.to_string())
    }
}

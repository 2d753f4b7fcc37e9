//! System-on-Chip construction.
//!
//! This module organizes the stages that turn resolved parameters into a wired
//! system graph: component descriptors and their ports, the factory that creates
//! them, the interconnect that records connections, the topology that wires a
//! memory hierarchy, and the assembler that runs the whole build.

/// System assembler and the assembled `SystemDescription`.
pub mod builder;

/// Component identities, ports and descriptors.
pub mod component;

/// Component factory with identity uniqueness.
pub mod factory;

/// Connections and memory-range bindings.
pub mod interconnect;

/// Memory-hierarchy wiring and closure check.
pub mod topology;

pub use builder::{RootHandle, SystemAssembler, SystemDescription};
pub use component::{
    ComponentDescriptor, ComponentId, ComponentSet, Port, PortKind, PortName, PortRole,
};
pub use factory::ComponentFactory;
pub use interconnect::{Connection, ConnectionId, ConnectionSet, PortRef, RangeBinding};
pub use topology::{CacheHierarchy, L2Sharing, Topology};

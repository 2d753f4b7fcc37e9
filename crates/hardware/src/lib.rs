//! Memory-hierarchy topology builder.
//!
//! This crate assembles the component graph of a cycle-level architecture simulator
//! and hands it, validated, to an external simulation engine. It provides:
//! 1. **Parameters:** Per-class default tables and override resolution for cache
//!    geometry, clocks and voltages.
//! 2. **Components:** Typed descriptors with fixed port lists, created by a factory
//!    that enforces identity uniqueness.
//! 3. **Topology:** Per-core wiring of CPU, L1, L2, bus, interrupt controller and
//!    memory controller ports, followed by a closure check.
//! 4. **Workloads:** Parsing of `;`-separated command strings into per-CPU processes.
//! 5. **Assembly:** An atomic build producing an immutable `SystemDescription` and a
//!    `RootHandle` for the engine.

/// Common types (addresses, units, constants, errors).
pub mod common;
/// Builder configuration (system, CPU, cache and workload sections).
pub mod config;
/// Component classes, default tables and parameter resolution.
pub mod params;
/// Workload binding and engine handoff.
pub mod sim;
/// Component graph construction (factory, interconnect, topology, assembler).
pub mod soc;

/// Error raised by every build stage.
pub use crate::common::BuildError;
/// Root configuration type; use `Config::default()` or deserialize from JSON.
pub use crate::config::Config;
/// Assembler entry point and its outputs.
pub use crate::soc::{RootHandle, SystemAssembler, SystemDescription};

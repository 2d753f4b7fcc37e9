//! Workload binding and engine handoff.
//!
//! Binds parsed workloads to CPUs and defines the boundary with the external
//! simulation engine that consumes an assembled system.

/// Handoff of an assembled system to a simulation engine.
pub mod simulator;

/// Workload parsing and per-CPU process binding.
pub mod workload;

pub use simulator::{EngineError, ExitEvent, Simulation, SimulationEngine};
pub use workload::{Invocation, ProcessDescriptor, WorkloadBinding, WorkloadSpec, bind};

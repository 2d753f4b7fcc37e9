//! Handoff to the external simulation engine.
//!
//! The builder never steps cycles. An engine implements `SimulationEngine`, and
//! `Simulation` pairs an assembled system with its root handle, checks that the two
//! belong together, and moves both into the engine.

use serde::Serialize;
use thiserror::Error;
use tracing::info;

use crate::soc::builder::{RootHandle, SystemDescription};

/// Why and when an engine stopped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExitEvent {
    /// Simulated tick at which the engine exited.
    pub tick: u64,
    /// Human-readable exit cause (e.g. `"exiting with last active thread context"`).
    pub cause: String,
}

impl ExitEvent {
    /// Creates an exit event.
    pub fn new(tick: u64, cause: impl Into<String>) -> Self {
        Self {
            tick,
            cause: cause.into(),
        }
    }
}

impl std::fmt::Display for ExitEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Exiting @ tick {} because {}", self.tick, self.cause)
    }
}

/// Failures at or after the handoff.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// The root handle was produced for a different system description.
    #[error("root handle does not match the system description")]
    RootMismatch,
    /// The engine reported a failure of its own.
    #[error("engine failure: {0}")]
    Engine(String),
}

/// The external consumer of an assembled system.
pub trait SimulationEngine {
    /// Takes ownership of the system and runs it to completion.
    ///
    /// # Arguments
    ///
    /// * `system` - The immutable, validated system description.
    /// * `root` - The root handle produced alongside it.
    ///
    /// # Returns
    ///
    /// The exit event reported by the engine.
    fn run(
        &mut self,
        system: SystemDescription,
        root: RootHandle,
    ) -> Result<ExitEvent, EngineError>;
}

/// An assembled system waiting to be handed to an engine.
#[derive(Debug)]
pub struct Simulation {
    system: SystemDescription,
    root: RootHandle,
}

impl Simulation {
    /// Pairs a system description with its root handle.
    pub const fn new(system: SystemDescription, root: RootHandle) -> Self {
        Self { system, root }
    }

    /// Returns the system description.
    pub const fn system(&self) -> &SystemDescription {
        &self.system
    }

    /// Verifies the root handle and moves the system into `engine`.
    ///
    /// # Returns
    ///
    /// The engine's exit event, or `EngineError::RootMismatch` without calling the
    /// engine when the handle belongs to another description.
    pub fn run<E: SimulationEngine + ?Sized>(
        self,
        engine: &mut E,
    ) -> Result<ExitEvent, EngineError> {
        if !self.root.matches(&self.system) {
            return Err(EngineError::RootMismatch);
        }
        info!(cpus = self.system.num_cpus(), "handing system to engine");
        let exit = engine.run(self.system, self.root)?;
        info!(tick = exit.tick, cause = %exit.cause, "engine exited");
        Ok(exit)
    }
}

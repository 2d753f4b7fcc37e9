//! Component classes known to the builder.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::common::error::{BuildError, ParamField};

/// A kind of hardware component the factory can instantiate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ComponentClass {
    /// A processor core issuing instruction and data requests.
    Cpu,
    /// Per-core level-one instruction cache.
    L1InstructionCache,
    /// Per-core level-one data cache.
    L1DataCache,
    /// Level-two cache, private to a core or shared by all of them.
    L2Cache,
    /// The system memory bus (crossbar).
    InterconnectBus,
    /// The controller backing the system memory range.
    MemoryController,
    /// Per-core interrupt controller.
    InterruptController,
    /// The system root, owner of the functional access port used by the loader.
    System,
}

impl ComponentClass {
    /// Every class, in the order the assembler resolves them.
    pub const ALL: [Self; 8] = [
        Self::Cpu,
        Self::L1InstructionCache,
        Self::L1DataCache,
        Self::L2Cache,
        Self::InterconnectBus,
        Self::MemoryController,
        Self::InterruptController,
        Self::System,
    ];

    /// Returns the class name as written in configurations and diagnostics.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Cpu => "Cpu",
            Self::L1InstructionCache => "L1InstructionCache",
            Self::L1DataCache => "L1DataCache",
            Self::L2Cache => "L2Cache",
            Self::InterconnectBus => "InterconnectBus",
            Self::MemoryController => "MemoryController",
            Self::InterruptController => "InterruptController",
            Self::System => "System",
        }
    }

    /// Returns the attribute name an instance of this class takes in a system path
    /// (`icache` in `system.cpu0.icache`).
    pub const fn path_segment(self) -> &'static str {
        match self {
            Self::Cpu => "cpu",
            Self::L1InstructionCache => "icache",
            Self::L1DataCache => "dcache",
            Self::L2Cache => "l2cache",
            Self::InterconnectBus => "membus",
            Self::MemoryController => "mem_ctrl",
            Self::InterruptController => "interrupts",
            Self::System => "system",
        }
    }

    /// Returns whether the class is a cache level.
    pub const fn is_cache(self) -> bool {
        matches!(
            self,
            Self::L1InstructionCache | Self::L1DataCache | Self::L2Cache
        )
    }

    /// Returns whether every instance of the class belongs to one core.
    ///
    /// The bus, memory controller and system root are system-wide; an L2 may be either, so it is
    /// reported as not strictly per-core.
    pub const fn is_per_core(self) -> bool {
        matches!(
            self,
            Self::Cpu | Self::L1InstructionCache | Self::L1DataCache | Self::InterruptController
        )
    }

    /// Returns whether the class can only exist once per system.
    pub const fn is_system_wide(self) -> bool {
        matches!(
            self,
            Self::InterconnectBus | Self::MemoryController | Self::System
        )
    }
}

impl fmt::Display for ComponentClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ComponentClass {
    type Err = BuildError;

    /// Parses either the class name (`L2Cache`) or its path segment (`l2cache`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|class| class.name() == s || class.path_segment() == s)
            .ok_or_else(|| {
                BuildError::invalid_parameter(
                    "class",
                    ParamField::Class,
                    s,
                    "unknown component class",
                )
            })
    }
}

//! Default parameter table.
//!
//! Values follow the stock gem5 learning configurations: 32 KiB two-way L1 caches,
//! a 1 MiB two-way L2, 64-byte blocks, a 1 GHz system clock domain at 1.0 V and a
//! 512 MiB memory range. Fields a class does not have are `None`.

use super::class::ComponentClass;
use super::resolver::ParameterSet;
use crate::common::constants::{KIB, MIB};
use crate::common::units::{Capacity, Frequency, Voltage};

/// L1 instruction cache capacity (32 KiB).
pub const L1I_SIZE: u64 = 32 * KIB;

/// L1 data cache capacity (32 KiB).
pub const L1D_SIZE: u64 = 32 * KIB;

/// L2 cache capacity (1 MiB).
pub const L2_SIZE: u64 = MIB;

/// Associativity shared by every cache level.
pub const ASSOC: u32 = 2;

/// Cache block size in bytes.
///
/// gem5 sets this once per system (`cache_line_size`), so all levels agree.
pub const BLOCK_SIZE: u32 = 64;

/// Core clock (2 GHz).
pub const CPU_CLOCK_HZ: u64 = 2_000_000_000;

/// System clock domain shared by the bus, memory controller and interrupt
/// controllers (1 GHz).
pub const SYS_CLOCK_HZ: u64 = 1_000_000_000;

/// Supply voltage of every voltage domain.
pub const VOLTAGE: f64 = 1.0;

/// Size of the system memory range backed by the memory controller (512 MiB).
pub const MEM_SIZE: u64 = 512 * MIB;

const fn cache(class: ComponentClass, size: u64) -> ParameterSet {
    ParameterSet::new(
        class,
        Some(Capacity::from_bytes(size)),
        Some(ASSOC),
        Some(BLOCK_SIZE),
        None,
        None,
    )
}

const fn clocked(class: ComponentClass, size: Option<Capacity>, hz: u64) -> ParameterSet {
    ParameterSet::new(
        class,
        size,
        None,
        None,
        Some(Frequency::from_hz(hz)),
        Some(Voltage::from_volts(VOLTAGE)),
    )
}

/// Returns the default parameter set for `class`.
///
/// # Arguments
///
/// * `class` - The component class to look up.
///
/// # Returns
///
/// The documented defaults; every field the class has is populated.
pub const fn table(class: ComponentClass) -> ParameterSet {
    match class {
        ComponentClass::Cpu => clocked(class, None, CPU_CLOCK_HZ),
        ComponentClass::L1InstructionCache => cache(class, L1I_SIZE),
        ComponentClass::L1DataCache => cache(class, L1D_SIZE),
        ComponentClass::L2Cache => cache(class, L2_SIZE),
        ComponentClass::InterconnectBus | ComponentClass::InterruptController => {
            clocked(class, None, SYS_CLOCK_HZ)
        }
        ComponentClass::MemoryController => {
            clocked(class, Some(Capacity::from_bytes(MEM_SIZE)), SYS_CLOCK_HZ)
        }
        ComponentClass::System => ParameterSet::new(class, None, None, None, None, None),
    }
}

//! Build-wide constants.

/// First synthetic process identifier handed to a bound workload.
///
/// Workload `i` receives `PID_BASE + i`, keeping simulated PIDs clear of the low
/// identifiers a host reserves for itself.
pub const PID_BASE: u32 = 100;

/// Separator between executable invocations in a workload string.
pub const WORKLOAD_DELIMITER: char = ';';

/// Base address of the system memory range.
pub const MEM_BASE: u64 = 0;

/// One kibibyte; gem5 capacity strings treat `kB` as binary.
pub const KIB: u64 = 1 << 10;

/// One mebibyte.
pub const MIB: u64 = 1 << 20;

/// One gibibyte.
pub const GIB: u64 = 1 << 30;

/// One tebibyte.
pub const TIB: u64 = 1 << 40;

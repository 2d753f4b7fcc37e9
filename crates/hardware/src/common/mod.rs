//! Common types shared by every stage of the topology builder.
//!
//! This module provides the small vocabulary that the resolver, factory, wiring and
//! workload stages all speak. It includes:
//! 1. **Addresses:** Physical addresses and the address ranges backed by memory controllers.
//! 2. **Units:** Capacities, clock frequencies and voltages parsed from gem5-style strings.
//! 3. **Constants:** Build-wide constants such as the synthetic PID base.
//! 4. **Error Handling:** The `BuildError` taxonomy raised by every build stage.

/// Address and address-range types.
pub mod addr;

/// Build-wide constants.
pub mod constants;

/// Error taxonomy for build failures.
pub mod error;

/// Capacity, frequency and voltage quantities.
pub mod units;

pub use addr::{AddrRange, PhysAddr};
pub use error::{BuildError, ParamField};
pub use units::{Capacity, Frequency, UnitError, Voltage};

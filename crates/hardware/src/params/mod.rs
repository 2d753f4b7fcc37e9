//! Parameter resolution.
//!
//! Turns the sparse options of a configuration into fully resolved, validated
//! parameter sets, one per component class. It provides:
//! 1. **Classes:** The closed set of component classes the builder can instantiate.
//! 2. **Defaults:** One default table per class, kept in a single place.
//! 3. **Resolution:** Field-by-field merging of overrides over defaults with
//!    domain validation.

/// Component classes.
pub mod class;

/// Per-class default parameter table.
pub mod defaults;

/// Override merging and validation.
pub mod resolver;

pub use class::ComponentClass;
pub use resolver::{Overrides, ParameterSet, resolve};

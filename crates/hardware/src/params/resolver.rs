//! Field-by-field parameter resolution.
//!
//! `resolve` merges a sparse set of overrides over the class's default table. It
//! performs:
//! 1. **Applicability:** An override for a field the class does not have is rejected
//!    instead of silently ignored.
//! 2. **Parsing:** Capacity, clock and voltage strings are parsed into typed units.
//! 3. **Validation:** Associativity, block size and set geometry are checked against
//!    their domain constraints.
//!
//! Resolution is pure: the same class and overrides always yield the same result.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::class::ComponentClass;
use super::defaults;
use crate::common::error::{BuildError, ParamField};
use crate::common::units::{Capacity, Frequency, Voltage};

/// User-supplied values for one component class; `None` means "use the default".
///
/// Capacity, clock and voltage are kept as raw strings (`"64kB"`, `"2GHz"`, `"1.0V"`)
/// and only parsed during resolution so parse failures carry the offending text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Overrides {
    /// Capacity string.
    pub size: Option<String>,
    /// Number of ways.
    pub assoc: Option<u32>,
    /// Block size in bytes.
    pub block_size: Option<u32>,
    /// Clock frequency string.
    pub clock: Option<String>,
    /// Voltage string.
    pub voltage: Option<String>,
}

impl Overrides {
    /// Sets the capacity override.
    pub fn with_size(mut self, size: impl Into<String>) -> Self {
        self.size = Some(size.into());
        self
    }

    /// Sets the associativity override.
    pub const fn with_assoc(mut self, assoc: u32) -> Self {
        self.assoc = Some(assoc);
        self
    }

    /// Sets the block size override.
    pub const fn with_block_size(mut self, block_size: u32) -> Self {
        self.block_size = Some(block_size);
        self
    }

    /// Sets the clock override.
    pub fn with_clock(mut self, clock: impl Into<String>) -> Self {
        self.clock = Some(clock.into());
        self
    }

    /// Sets the voltage override.
    pub fn with_voltage(mut self, voltage: impl Into<String>) -> Self {
        self.voltage = Some(voltage.into());
        self
    }

    /// Returns whether no field is overridden.
    pub const fn is_empty(&self) -> bool {
        self.size.is_none()
            && self.assoc.is_none()
            && self.block_size.is_none()
            && self.clock.is_none()
            && self.voltage.is_none()
    }
}

/// Resolved, validated parameters for one component class.
///
/// Fields that do not apply to the class are `None`; fields that do are always
/// populated. The set is immutable once built.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ParameterSet {
    class: ComponentClass,
    #[serde(skip_serializing_if = "Option::is_none")]
    size: Option<Capacity>,
    #[serde(skip_serializing_if = "Option::is_none")]
    assoc: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    block_size: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    clock: Option<Frequency>,
    #[serde(skip_serializing_if = "Option::is_none")]
    voltage: Option<Voltage>,
}

impl ParameterSet {
    pub(crate) const fn new(
        class: ComponentClass,
        size: Option<Capacity>,
        assoc: Option<u32>,
        block_size: Option<u32>,
        clock: Option<Frequency>,
        voltage: Option<Voltage>,
    ) -> Self {
        Self {
            class,
            size,
            assoc,
            block_size,
            clock,
            voltage,
        }
    }

    /// Returns the class these parameters were resolved for.
    pub const fn class(&self) -> ComponentClass {
        self.class
    }

    /// Returns the capacity (caches and memory controller).
    pub const fn size(&self) -> Option<Capacity> {
        self.size
    }

    /// Returns the associativity (caches).
    pub const fn assoc(&self) -> Option<u32> {
        self.assoc
    }

    /// Returns the block size in bytes (caches).
    pub const fn block_size(&self) -> Option<u32> {
        self.block_size
    }

    /// Returns the clock frequency (CPU, bus, memory and interrupt controllers).
    pub const fn clock(&self) -> Option<Frequency> {
        self.clock
    }

    /// Returns the supply voltage (CPU, bus, memory and interrupt controllers).
    pub const fn voltage(&self) -> Option<Voltage> {
        self.voltage
    }

    /// Returns the number of sets for a cache, `size / (assoc * block_size)`.
    pub fn num_sets(&self) -> Option<u64> {
        let size = self.size?.bytes();
        let way_bytes = u64::from(self.assoc?) * u64::from(self.block_size?);
        size.checked_div(way_bytes)
    }
}

/// Resolves the parameters of `class`, taking each field from `overrides` when
/// present and from the class defaults otherwise.
///
/// # Arguments
///
/// * `class` - The component class being resolved.
/// * `overrides` - Sparse user-supplied values.
///
/// # Returns
///
/// The validated `ParameterSet`, or `BuildError::InvalidParameter` naming the class,
/// field and offending value.
pub fn resolve(class: ComponentClass, overrides: &Overrides) -> Result<ParameterSet, BuildError> {
    let base = defaults::table(class);

    let size = merge(class, ParamField::Size, base.size, overrides.size.as_deref(), parse_unit)?;
    let assoc = merge(
        class,
        ParamField::Associativity,
        base.assoc,
        overrides.assoc.as_ref(),
        |v| Ok(*v),
    )?;
    let block_size = merge(
        class,
        ParamField::BlockSize,
        base.block_size,
        overrides.block_size.as_ref(),
        |v| Ok(*v),
    )?;
    let clock = merge(
        class,
        ParamField::Clock,
        base.clock,
        overrides.clock.as_deref(),
        parse_unit,
    )?;
    let voltage = merge(
        class,
        ParamField::Voltage,
        base.voltage,
        overrides.voltage.as_deref(),
        parse_unit,
    )?;

    if let Some(0) = assoc {
        return Err(BuildError::invalid_parameter(
            class,
            ParamField::Associativity,
            "0",
            "associativity must be at least 1",
        ));
    }
    if let Some(block) = block_size {
        if !block.is_power_of_two() {
            return Err(BuildError::invalid_parameter(
                class,
                ParamField::BlockSize,
                block.to_string(),
                "block size must be a positive power of two",
            ));
        }
    }
    if let (Some(size), Some(assoc), Some(block)) = (size, assoc, block_size) {
        let way_bytes = u64::from(assoc) * u64::from(block);
        if size.bytes() < way_bytes {
            return Err(BuildError::invalid_parameter(
                class,
                ParamField::Size,
                size.to_string(),
                format!("cache cannot hold one set of {assoc} x {block}B blocks"),
            ));
        }
    }

    let params = ParameterSet::new(class, size, assoc, block_size, clock, voltage);
    debug!(%class, overridden = !overrides.is_empty(), ?params, "resolved parameters");
    Ok(params)
}

/// Picks the override when present, the default otherwise.
///
/// A present override for a field with no default belongs to a field the class does
/// not have and is rejected.
fn merge<T, R>(
    class: ComponentClass,
    field: ParamField,
    default: Option<T>,
    raw: Option<&R>,
    parse: impl FnOnce(&R) -> Result<T, String>,
) -> Result<Option<T>, BuildError>
where
    R: fmt::Display + ?Sized,
{
    match (raw, default) {
        (None, default) => Ok(default),
        (Some(raw), None) => Err(BuildError::invalid_parameter(
            class,
            field,
            raw.to_string(),
            format!("{class} has no `{field}` parameter"),
        )),
        (Some(raw), Some(_)) => parse(raw)
            .map(Some)
            .map_err(|reason| BuildError::invalid_parameter(class, field, raw.to_string(), reason)),
    }
}

fn parse_unit<T>(raw: &str) -> Result<T, String>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    raw.parse().map_err(|err: T::Err| err.to_string())
}

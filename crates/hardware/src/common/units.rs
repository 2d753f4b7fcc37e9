//! Capacity, frequency and voltage quantities.
//!
//! Configuration options arrive as gem5-style strings (`"32kB"`, `"1GHz"`, `"1.0V"`).
//! This module parses them into strongly typed quantities. It provides:
//! 1. **Capacity:** Byte counts with binary unit multiples (`kB` = 1024 bytes).
//! 2. **Frequency:** Clock rates in hertz, decimal mantissas allowed (`"2.5GHz"`).
//! 3. **Voltage:** Supply voltages in volts (`"1.0V"`, `"900mV"`).
//!
//! Every quantity must be strictly positive; a zero-sized cache or a 0 Hz clock is
//! rejected at parse time.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use thiserror::Error;

use super::constants::{GIB, KIB, MIB, TIB};

/// Reasons a quantity string could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UnitError {
    /// The string was empty or whitespace.
    #[error("empty quantity")]
    Empty,
    /// The numeric part was missing or malformed.
    #[error("malformed quantity `{0}`")]
    Malformed(String),
    /// The unit suffix is not recognized for this kind of quantity.
    #[error("unrecognized unit `{unit}` in `{value}` (expected one of {expected})")]
    UnknownUnit {
        /// Full input string.
        value: String,
        /// The offending suffix.
        unit: String,
        /// Human-readable list of accepted suffixes.
        expected: &'static str,
    },
    /// The quantity parsed to zero or a negative value.
    #[error("quantity `{0}` must be positive")]
    NotPositive(String),
    /// The quantity does not fit the underlying integer type.
    #[error("quantity `{0}` is out of range")]
    Overflow(String),
}

/// Splits `"32kB"` into `("32", "kB")`.
fn split_quantity(s: &str) -> (&str, &str) {
    let boundary = s
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(s.len());
    let (number, unit) = s.split_at(boundary);
    (number, unit.trim())
}

/// A memory capacity in bytes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Capacity(u64);

impl Capacity {
    const UNITS: &'static str = "B, kB, KiB, MB, MiB, GB, GiB, TB, TiB";

    /// Creates a capacity from a raw byte count.
    pub const fn from_bytes(bytes: u64) -> Self {
        Self(bytes)
    }

    /// Returns the capacity in bytes.
    pub const fn bytes(self) -> u64 {
        self.0
    }
}

impl FromStr for Capacity {
    type Err = UnitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(UnitError::Empty);
        }
        let (number, unit) = split_quantity(s);
        let value: u64 = number
            .parse()
            .map_err(|_| UnitError::Malformed(s.to_string()))?;
        let multiplier = match unit {
            "" | "B" => 1,
            "kB" | "KB" | "KiB" => KIB,
            "MB" | "MiB" => MIB,
            "GB" | "GiB" => GIB,
            "TB" | "TiB" => TIB,
            _ => {
                return Err(UnitError::UnknownUnit {
                    value: s.to_string(),
                    unit: unit.to_string(),
                    expected: Self::UNITS,
                });
            }
        };
        let bytes = value
            .checked_mul(multiplier)
            .ok_or_else(|| UnitError::Overflow(s.to_string()))?;
        if bytes == 0 {
            return Err(UnitError::NotPositive(s.to_string()));
        }
        Ok(Self(bytes))
    }
}

impl fmt::Display for Capacity {
    /// Formats with the largest unit that divides the byte count exactly (`32kB`, `1MB`).
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bytes = self.0;
        for (scale, suffix) in [(TIB, "TB"), (GIB, "GB"), (MIB, "MB"), (KIB, "kB")] {
            if bytes >= scale && bytes % scale == 0 {
                return write!(f, "{}{suffix}", bytes / scale);
            }
        }
        write!(f, "{bytes}B")
    }
}

/// A clock frequency in hertz.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Frequency(u64);

impl Frequency {
    const UNITS: &'static str = "Hz, kHz, MHz, GHz";

    /// Creates a frequency from a raw value in hertz.
    pub const fn from_hz(hz: u64) -> Self {
        Self(hz)
    }

    /// Returns the frequency in hertz.
    pub const fn hz(self) -> u64 {
        self.0
    }
}

impl FromStr for Frequency {
    type Err = UnitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(UnitError::Empty);
        }
        let (number, unit) = split_quantity(s);
        let value: f64 = number
            .parse()
            .map_err(|_| UnitError::Malformed(s.to_string()))?;
        let multiplier = match unit {
            "Hz" => 1.0,
            "kHz" => 1e3,
            "MHz" => 1e6,
            "GHz" => 1e9,
            _ => {
                return Err(UnitError::UnknownUnit {
                    value: s.to_string(),
                    unit: unit.to_string(),
                    expected: Self::UNITS,
                });
            }
        };
        let hz = (value * multiplier).round();
        if !hz.is_finite() || hz > u64::MAX as f64 {
            return Err(UnitError::Overflow(s.to_string()));
        }
        if hz < 1.0 {
            return Err(UnitError::NotPositive(s.to_string()));
        }
        Ok(Self(hz as u64))
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hz = self.0;
        for (scale, suffix) in [(1_000_000_000, "GHz"), (1_000_000, "MHz"), (1_000, "kHz")] {
            if hz >= scale && hz % scale == 0 {
                return write!(f, "{}{suffix}", hz / scale);
            }
        }
        write!(f, "{hz}Hz")
    }
}

/// A supply voltage in volts.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct Voltage(f64);

impl Voltage {
    const UNITS: &'static str = "V, mV";

    /// Creates a voltage from a raw value in volts.
    pub const fn from_volts(volts: f64) -> Self {
        Self(volts)
    }

    /// Returns the voltage in volts.
    pub const fn volts(self) -> f64 {
        self.0
    }
}

impl FromStr for Voltage {
    type Err = UnitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(UnitError::Empty);
        }
        let (number, unit) = split_quantity(s);
        let value: f64 = number
            .parse()
            .map_err(|_| UnitError::Malformed(s.to_string()))?;
        let volts = match unit {
            "V" => value,
            "mV" => value / 1e3,
            _ => {
                return Err(UnitError::UnknownUnit {
                    value: s.to_string(),
                    unit: unit.to_string(),
                    expected: Self::UNITS,
                });
            }
        };
        if !volts.is_finite() {
            return Err(UnitError::Overflow(s.to_string()));
        }
        if volts <= 0.0 {
            return Err(UnitError::NotPositive(s.to_string()));
        }
        Ok(Self(volts))
    }
}

impl fmt::Display for Voltage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}V", self.0)
    }
}

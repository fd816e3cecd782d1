//! Quantization of raw byte counts into reporting units.
//!
//! A unit is a coarse bucket of bytes. Partial units always round up, so a
//! one-byte document still costs one unit while a zero-byte read costs none.

use serde::{Deserialize, Serialize};

/// Default number of bytes in one document unit.
pub const DEFAULT_DOC_UNIT_SIZE_BYTES: u64 = 128;

/// Size of a single reporting unit in bytes.
///
/// The value is always non-zero; construct it through [`UnitSize::new`] or
/// use [`UnitSize::default`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u64", into = "u64")]
pub struct UnitSize(u64);

impl UnitSize {
    /// Creates a unit size, returning `None` for zero.
    pub const fn new(bytes: u64) -> Option<Self> {
        if bytes == 0 {
            None
        } else {
            Some(Self(bytes))
        }
    }

    /// Number of bytes per unit.
    pub const fn get(self) -> u64 {
        self.0
    }

    /// Converts `bytes` into units using this size.
    #[inline]
    pub const fn units(self, bytes: u64) -> u64 {
        bytes_to_units(bytes, self)
    }
}

impl Default for UnitSize {
    fn default() -> Self {
        Self(DEFAULT_DOC_UNIT_SIZE_BYTES)
    }
}

impl TryFrom<u64> for UnitSize {
    type Error = String;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        Self::new(value).ok_or_else(|| "unit size must be greater than zero".to_string())
    }
}

impl From<UnitSize> for u64 {
    fn from(value: UnitSize) -> Self {
        value.0
    }
}

/// Converts a byte count to units, rounding any partial unit up.
///
/// Equivalent to `ceil(bytes / unit_size)` without the overflow that
/// `bytes + unit_size - 1` would hit near `u64::MAX`.
#[inline]
pub const fn bytes_to_units(bytes: u64, unit_size: UnitSize) -> u64 {
    let size = unit_size.0;
    let whole = bytes / size;
    if bytes % size == 0 {
        whole
    } else {
        whole + 1
    }
}

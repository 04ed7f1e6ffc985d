//! QR numeric-mode capacity tables and chunk payload sizing
//!
//! A chunk travels as a pure decimal string, so the budget for one transport
//! unit is a digit count. The tables below give the numeric-mode capacity of
//! every QR version (1..=40) per error-correction level; byte capacity is
//! derived from the digit budget with one byte reserved for the chunk index.

use std::fmt;
use std::str::FromStr;

use num_bigint::BigUint;

use crate::error::{Error, Result};

/// Lowest QR symbol version.
pub const MIN_VERSION: u8 = 1;
/// Highest QR symbol version.
pub const MAX_VERSION: u8 = 40;

/// Digit capacity of a version-40 symbol at level L.
pub const MAX_DIGITS_L: u16 = 7089;
/// Digit capacity of a version-40 symbol at level M.
pub const MAX_DIGITS_M: u16 = 5596;
/// Digit capacity of a version-40 symbol at level Q.
pub const MAX_DIGITS_Q: u16 = 3993;
/// Digit capacity of a version-40 symbol at level H.
pub const MAX_DIGITS_H: u16 = 3057;

// Numeric-mode capacities from the QR standard. Index 0 is a
// placeholder so version numbers index their row directly.
#[rustfmt::skip]
const DIGITS_L: [u16; 41] = [
    0, 41, 77, 127, 187, 255, 322, 370, 461, 552, 652, 772, 883, 1022,
    1101, 1250, 1408, 1548, 1725, 1903, 2061, 2232, 2409, 2620, 2812,
    3057, 3283, 3517, 3669, 3909, 4158, 4417, 4686, 4965, 5253, 5529,
    5836, 6153, 6479, 6743, 7089,
];
#[rustfmt::skip]
const DIGITS_M: [u16; 41] = [
    0, 34, 63, 101, 149, 202, 255, 293, 365, 432, 513, 604, 691, 796,
    871, 991, 1082, 1212, 1346, 1500, 1600, 1708, 1872, 2059, 2188,
    2395, 2544, 2701, 2857, 3035, 3289, 3486, 3693, 3909, 4134, 4343,
    4588, 4775, 5039, 5313, 5596,
];
#[rustfmt::skip]
const DIGITS_Q: [u16; 41] = [
    0, 27, 48, 77, 111, 144, 178, 207, 259, 312, 364, 427, 489, 580,
    621, 703, 775, 876, 948, 1063, 1159, 1224, 1358, 1468, 1588, 1718,
    1804, 1933, 2085, 2181, 2358, 2473, 2670, 2805, 2949, 3081, 3244,
    3417, 3599, 3791, 3993,
];
#[rustfmt::skip]
const DIGITS_H: [u16; 41] = [
    0, 17, 34, 58, 82, 106, 139, 154, 202, 235, 288, 331, 374, 427,
    468, 530, 602, 674, 746, 813, 919, 969, 1056, 1108, 1228, 1286,
    1425, 1501, 1581, 1677, 1782, 1897, 2022, 2157, 2301, 2361, 2524,
    2625, 2735, 2927, 3057,
];

/// QR error-correction level, ordered by increasing redundancy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EcLevel {
    L,
    M,
    Q,
    H,
}

impl EcLevel {
    /// Numeric-mode digit capacity of a symbol at `version` (1..=40).
    ///
    /// Returns 0 for out-of-range versions; [`CapacityParams::new`] rejects
    /// those before lookup.
    pub fn digits_at(self, version: u8) -> u16 {
        if !(MIN_VERSION..=MAX_VERSION).contains(&version) {
            return 0;
        }
        let table = match self {
            EcLevel::L => &DIGITS_L,
            EcLevel::M => &DIGITS_M,
            EcLevel::Q => &DIGITS_Q,
            EcLevel::H => &DIGITS_H,
        };
        table[version as usize]
    }

    /// Digit capacity at the largest version (the fixed per-level maximum).
    pub const fn max_digits(self) -> u16 {
        match self {
            EcLevel::L => MAX_DIGITS_L,
            EcLevel::M => MAX_DIGITS_M,
            EcLevel::Q => MAX_DIGITS_Q,
            EcLevel::H => MAX_DIGITS_H,
        }
    }
}

impl fmt::Display for EcLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            EcLevel::L => "L",
            EcLevel::M => "M",
            EcLevel::Q => "Q",
            EcLevel::H => "H",
        };
        f.write_str(s)
    }
}

impl FromStr for EcLevel {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "L" | "l" => Ok(EcLevel::L),
            "M" | "m" => Ok(EcLevel::M),
            "Q" | "q" => Ok(EcLevel::Q),
            "H" | "h" => Ok(EcLevel::H),
            other => Err(format!("unknown error-correction level: {other}")),
        }
    }
}

/// Capacity configuration for one chunk stack.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CapacityParams {
    level: EcLevel,
    version: u8,
}

impl CapacityParams {
    /// Capacity at an explicit symbol version.
    pub fn new(level: EcLevel, version: u8) -> Result<Self> {
        if !(MIN_VERSION..=MAX_VERSION).contains(&version) {
            return Err(Error::NoCapacity { level, version });
        }
        Ok(CapacityParams { level, version })
    }

    /// Capacity at the largest symbol version for `level`.
    pub fn at_max_version(level: EcLevel) -> Self {
        CapacityParams {
            level,
            version: MAX_VERSION,
        }
    }

    pub fn level(&self) -> EcLevel {
        self.level
    }

    pub fn version(&self) -> u8 {
        self.version
    }

    /// Decimal digits one transport unit can carry.
    pub fn digit_budget(&self) -> u16 {
        self.level.digits_at(self.version)
    }

    /// Payload bytes per chunk after reserving the index byte.
    pub fn payload_bytes(&self) -> Result<usize> {
        payload_bytes_for_digits(self.digit_budget()).ok_or(Error::NoCapacity {
            level: self.level,
            version: self.version,
        })
    }
}

/// Derives the usable payload size from a digit budget:
/// `floor(bitLength(10^digits - 1) / 8) - 1`, the trailing `-1` reserving
/// the leading index byte. Returns `None` when the budget cannot hold the
/// index byte plus at least one payload byte.
pub fn payload_bytes_for_digits(digits: u16) -> Option<usize> {
    if digits == 0 {
        return None;
    }
    let nines = BigUint::from(10u8).pow(u32::from(digits)) - 1u8;
    let bytes = (nines.bits() / 8) as usize;
    if bytes >= 2 {
        Some(bytes - 1)
    } else {
        None
    }
}

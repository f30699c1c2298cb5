//! Fixed-width access strings.
//!
//! An access string is 8 characters wide:
//! - position 0: metadata read (`r`)
//! - position 1: metadata write (`w`)
//! - position 2: data read (`r`)
//! - position 3: data write (`w`)
//! - positions 4..8: reserved, always `-`
//!
//! Internally it is kept as a bitmask so checks are a single AND. A write bit
//! always carries its read bit with it, which keeps `can_read` monotonic.

use std::fmt;
use std::str::FromStr;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::constants::{ACCESS_STRING_LEN, DATA_READ, DATA_WRITE, METADATA_READ, METADATA_WRITE};
use crate::error::CascadeError;

const KNOWN_BITS: u8 = METADATA_READ | METADATA_WRITE | DATA_READ | DATA_WRITE;

// (bit, character) for the four meaningful positions
const POSITIONS: [(u8, u8); 4] = [
    (METADATA_READ, b'r'),
    (METADATA_WRITE, b'w'),
    (DATA_READ, b'r'),
    (DATA_WRITE, b'w'),
];

#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AccessString(u8);

impl AccessString {
    /// No access at all (`--------`)
    pub const DEFAULT: AccessString = AccessString(0);
    /// Metadata read (`r-------`)
    pub const READ: AccessString = AccessString(METADATA_READ);
    /// Metadata read and write (`rw------`)
    pub const READ_WRITE: AccessString = AccessString(METADATA_READ | METADATA_WRITE);

    /// Build from raw bits. Unknown bits are dropped and write bits pull in
    /// their read bit.
    pub const fn from_bits(bits: u8) -> Self {
        let mut b = bits & KNOWN_BITS;
        if b & METADATA_WRITE != 0 {
            b |= METADATA_READ;
        }
        if b & DATA_WRITE != 0 {
            b |= DATA_READ;
        }
        AccessString(b)
    }

    #[inline]
    pub const fn bits(self) -> u8 {
        self.0
    }

    #[inline]
    pub const fn can_read(self) -> bool {
        self.0 & METADATA_READ != 0
    }

    #[inline]
    pub const fn can_write(self) -> bool {
        self.0 & METADATA_WRITE != 0
    }

    #[inline]
    pub const fn can_read_data(self) -> bool {
        self.0 & DATA_READ != 0
    }

    #[inline]
    pub const fn can_write_data(self) -> bool {
        self.0 & DATA_WRITE != 0
    }

    /// True if every bit in `required` is present
    #[inline]
    pub const fn contains(self, required: AccessString) -> bool {
        self.0 & required.0 == required.0
    }
}

impl fmt::Display for AccessString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut buf = [b'-'; ACCESS_STRING_LEN];
        for (i, (bit, c)) in POSITIONS.iter().enumerate() {
            if self.0 & bit != 0 {
                buf[i] = *c;
            }
        }
        // Only ASCII is ever written into `buf`
        f.write_str(std::str::from_utf8(&buf).map_err(|_| fmt::Error)?)
    }
}

impl fmt::Debug for AccessString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AccessString(\"{}\")", self)
    }
}

impl FromStr for AccessString {
    type Err = CascadeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = s.as_bytes();
        if bytes.len() != ACCESS_STRING_LEN {
            return Err(CascadeError::InvalidAccess(
                s.to_string(),
                format!("expected {} characters, got {}", ACCESS_STRING_LEN, s.chars().count()),
            ));
        }

        let mut bits = 0u8;
        for (i, &c) in bytes.iter().enumerate() {
            match POSITIONS.get(i) {
                Some(&(bit, expected)) if c == expected => bits |= bit,
                _ if c == b'-' => {}
                _ => {
                    return Err(CascadeError::InvalidAccess(
                        s.to_string(),
                        format!("unexpected character at position {}", i),
                    ))
                }
            }
        }
        Ok(AccessString::from_bits(bits))
    }
}

impl TryFrom<&str> for AccessString {
    type Error = CascadeError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl Serialize for AccessString {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for AccessString {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(D::Error::custom)
    }
}

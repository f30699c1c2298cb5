//! Access bit constants

// Access bits, one per position in the 8-character access string
pub const METADATA_READ: u8 = 1;
pub const METADATA_WRITE: u8 = 1 << 1;
pub const DATA_READ: u8 = 1 << 2;
pub const DATA_WRITE: u8 = 1 << 3;

/// Width of a serialized access string
pub const ACCESS_STRING_LEN: usize = 8;

// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Endian-aware binary encoding of engine primitives.
//!
//! A [`BufferWriter`] appends values to a caller-owned `Vec<u8>`, and a
//! [`BufferParser`] reads them back from a byte slice in the same order. The
//! format is not self-describing: both sides must agree on the field sequence.
//!
//! Each writer and parser is configured with an [`Endianness`]. When the
//! configured order differs from the host's, every multi-byte value is fully
//! byte-reversed on its way in or out; otherwise bytes are copied as-is.
//!
//! Bounds violations (reading past the end, seeking out of range, patching
//! outside the written region) panic. There is no recoverable variant; callers
//! that accept untrusted data must validate sizes before parsing.

use serde::{Deserialize, Serialize};

mod parser;
mod writer;

pub use parser::BufferParser;
pub use writer::BufferWriter;

/// The byte order a writer or parser uses for multi-byte values.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Endianness {
    /// Whatever order the host uses; never swaps.
    #[default]
    Native,
    /// Least significant byte first.
    Little,
    /// Most significant byte first.
    Big,
}

const ENDIAN_TEST_PATTERN: u32 = 0x1234_5678;

const NATIVE_ENDIANNESS: Endianness = if ENDIAN_TEST_PATTERN.to_ne_bytes()[0] == 0x78 {
    Endianness::Little
} else {
    Endianness::Big
};

/// Returns the host's byte order, as [`Endianness::Little`] or [`Endianness::Big`].
///
/// Detected from the first in-memory byte of a known 32-bit pattern.
#[inline]
pub const fn native_endianness() -> Endianness {
    NATIVE_ENDIANNESS
}

impl Endianness {
    /// Resolves [`Endianness::Native`] to the host's concrete byte order.
    #[inline]
    pub const fn resolve(self) -> Endianness {
        match self {
            Endianness::Native => NATIVE_ENDIANNESS,
            other => other,
        }
    }

    /// Returns `true` if values must be byte-reversed to honour this order on the host.
    #[inline]
    pub fn needs_swap(self) -> bool {
        self.resolve() != NATIVE_ENDIANNESS
    }
}

/// Reverses the byte order of a 16-bit value.
#[inline]
pub const fn reverse_bytes_u16(value: u16) -> u16 {
    ((value & 0x00ff) << 8) | ((value & 0xff00) >> 8)
}

/// Reverses the byte order of a 32-bit value.
#[inline]
pub const fn reverse_bytes_u32(value: u32) -> u32 {
    ((value & 0x0000_00ff) << 24)
        | ((value & 0x0000_ff00) << 8)
        | ((value & 0x00ff_0000) >> 8)
        | ((value & 0xff00_0000) >> 24)
}

/// Reverses the byte order of a 64-bit value.
#[inline]
pub const fn reverse_bytes_u64(value: u64) -> u64 {
    ((value & 0x0000_0000_0000_00ff) << 56)
        | ((value & 0x0000_0000_0000_ff00) << 40)
        | ((value & 0x0000_0000_00ff_0000) << 24)
        | ((value & 0x0000_0000_ff00_0000) << 8)
        | ((value & 0x0000_00ff_0000_0000) >> 8)
        | ((value & 0x0000_ff00_0000_0000) >> 24)
        | ((value & 0x00ff_0000_0000_0000) >> 40)
        | ((value & 0xff00_0000_0000_0000) >> 56)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_native_detection_matches_target() {
        if cfg!(target_endian = "little") {
            assert_eq!(native_endianness(), Endianness::Little);
        } else {
            assert_eq!(native_endianness(), Endianness::Big);
        }
        assert_eq!(Endianness::Native.resolve(), native_endianness());
        assert!(!Endianness::Native.needs_swap());
    }

    #[test]
    fn test_exactly_one_explicit_order_swaps() {
        assert_ne!(Endianness::Little.needs_swap(), Endianness::Big.needs_swap());
    }

    #[test]
    fn test_reverse_bytes_matches_std() {
        assert_eq!(reverse_bytes_u16(0x1234), 0x3412);
        assert_eq!(reverse_bytes_u32(0x1234_5678), 0x7856_3412);
        assert_eq!(
            reverse_bytes_u64(0x0102_0304_0506_0708),
            0x0807_0605_0403_0201
        );
        for v in [0u64, 1, u64::MAX, 0xdead_beef_cafe_f00d] {
            assert_eq!(reverse_bytes_u64(v), v.swap_bytes());
            assert_eq!(reverse_bytes_u32(v as u32), (v as u32).swap_bytes());
            assert_eq!(reverse_bytes_u16(v as u16), (v as u16).swap_bytes());
        }
    }
}

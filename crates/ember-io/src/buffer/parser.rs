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

//! The reading half of the buffer codec.

use ember_core::math::{
    Aabb2, Aabb3, IntVec2, IntVec3, Obb2, Obb3, Plane2, Rgba8, Vec2, Vec3, Vec4, VertexPcu,
    VertexPcutbn,
};

use super::{reverse_bytes_u16, reverse_bytes_u32, reverse_bytes_u64, Endianness};

/// Reads primitive values sequentially from a fixed byte slice.
///
/// Every `parse_*` call starts at the current read position and advances it by
/// the decoded width.
///
/// # Panics
/// Every `parse_*` method panics if the value would extend past the end of the
/// buffer.
#[derive(Debug, Clone)]
pub struct BufferParser<'a> {
    data: &'a [u8],
    cursor: usize,
    endianness: Endianness,
    swap: bool,
}

impl<'a> BufferParser<'a> {
    /// Creates a parser positioned at the start of `data`.
    pub fn new(data: &'a [u8], endianness: Endianness) -> Self {
        Self {
            data,
            cursor: 0,
            endianness,
            swap: endianness.needs_swap(),
        }
    }

    /// The byte order currently used for multi-byte values.
    pub fn endianness(&self) -> Endianness {
        self.endianness
    }

    /// Changes the byte order for every value parsed from now on.
    pub fn set_endianness(&mut self, endianness: Endianness) {
        log::trace!("BufferParser endianness {:?} -> {:?}", self.endianness, endianness);
        self.endianness = endianness;
        self.swap = endianness.needs_swap();
    }

    /// The declared size of the buffer being parsed.
    pub fn buffer_size(&self) -> usize {
        self.data.len()
    }

    /// The offset of the next byte to be read.
    pub fn current_read_position(&self) -> usize {
        self.cursor
    }

    /// Number of bytes left to read.
    pub fn remaining(&self) -> usize {
        self.data.len() - self.cursor
    }

    /// Returns `true` once every byte has been consumed.
    pub fn is_at_end(&self) -> bool {
        self.cursor == self.data.len()
    }

    /// Moves the read position to `offset`.
    ///
    /// # Panics
    /// Panics unless `offset` is strictly less than the buffer size.
    pub fn seek(&mut self, offset: usize) {
        assert!(
            offset < self.data.len(),
            "BufferParser::seek: offset {offset} is out of bounds for a buffer of {} byte(s)",
            self.data.len()
        );
        self.cursor = offset;
    }

    // --- Scalars ---

    /// Reads a single unsigned byte.
    pub fn parse_byte(&mut self) -> u8 {
        self.take_array::<1>("parse_byte")[0]
    }

    /// Reads a single signed byte.
    pub fn parse_char(&mut self) -> i8 {
        self.take_array::<1>("parse_char")[0] as i8
    }

    /// Reads a one-byte bool; any non-zero byte is `true`.
    pub fn parse_bool(&mut self) -> bool {
        self.take_array::<1>("parse_bool")[0] != 0
    }

    /// Reads a `u16`.
    pub fn parse_u16(&mut self) -> u16 {
        let value = u16::from_ne_bytes(self.take_array("parse_u16"));
        if self.swap {
            reverse_bytes_u16(value)
        } else {
            value
        }
    }

    /// Reads an `i16`.
    pub fn parse_i16(&mut self) -> i16 {
        self.parse_u16() as i16
    }

    /// Reads a `u32`.
    pub fn parse_u32(&mut self) -> u32 {
        let value = u32::from_ne_bytes(self.take_array("parse_u32"));
        if self.swap {
            reverse_bytes_u32(value)
        } else {
            value
        }
    }

    /// Reads an `i32`.
    pub fn parse_i32(&mut self) -> i32 {
        self.parse_u32() as i32
    }

    /// Reads a `u64`.
    pub fn parse_u64(&mut self) -> u64 {
        let value = u64::from_ne_bytes(self.take_array("parse_u64"));
        if self.swap {
            reverse_bytes_u64(value)
        } else {
            value
        }
    }

    /// Reads an `i64`.
    pub fn parse_i64(&mut self) -> i64 {
        self.parse_u64() as i64
    }

    /// Reads an `f32` from its IEEE-754 bit pattern.
    pub fn parse_f32(&mut self) -> f32 {
        f32::from_bits(self.parse_u32())
    }

    /// Reads an `f64` from its IEEE-754 bit pattern.
    pub fn parse_f64(&mut self) -> f64 {
        f64::from_bits(self.parse_u64())
    }

    // --- Bytes and strings ---

    /// Reads `count` raw bytes.
    pub fn parse_bytes(&mut self, count: usize) -> &'a [u8] {
        self.take(count, "parse_bytes")
    }

    /// Reads bytes up to the next `0x00` and consumes the terminator.
    ///
    /// # Panics
    /// Panics if no terminator occurs before the end of the buffer.
    pub fn parse_zero_terminated_string(&mut self) -> String {
        let rest = &self.data[self.cursor..];
        let Some(terminator) = rest.iter().position(|&b| b == 0) else {
            panic!(
                "BufferParser::parse_zero_terminated_string: no terminator between offset {} and the end of a buffer of {} byte(s)",
                self.cursor,
                self.data.len()
            );
        };
        let text = String::from_utf8_lossy(&rest[..terminator]).into_owned();
        self.cursor += terminator + 1;
        text
    }

    /// Reads a 4-byte length followed by that many bytes.
    pub fn parse_string_with_length(&mut self) -> String {
        let length = self.parse_u32() as usize;
        let bytes = self.take(length, "parse_string_with_length");
        String::from_utf8_lossy(bytes).into_owned()
    }

    // --- Math primitives ---

    /// Reads a [`Vec2`].
    pub fn parse_vec2(&mut self) -> Vec2 {
        let x = self.parse_f32();
        let y = self.parse_f32();
        Vec2::new(x, y)
    }

    /// Reads a [`Vec3`].
    pub fn parse_vec3(&mut self) -> Vec3 {
        let x = self.parse_f32();
        let y = self.parse_f32();
        let z = self.parse_f32();
        Vec3::new(x, y, z)
    }

    /// Reads a [`Vec4`].
    pub fn parse_vec4(&mut self) -> Vec4 {
        let x = self.parse_f32();
        let y = self.parse_f32();
        let z = self.parse_f32();
        let w = self.parse_f32();
        Vec4::new(x, y, z, w)
    }

    /// Reads an [`IntVec2`].
    pub fn parse_int_vec2(&mut self) -> IntVec2 {
        let x = self.parse_i32();
        let y = self.parse_i32();
        IntVec2::new(x, y)
    }

    /// Reads an [`IntVec3`].
    pub fn parse_int_vec3(&mut self) -> IntVec3 {
        let x = self.parse_i32();
        let y = self.parse_i32();
        let z = self.parse_i32();
        IntVec3::new(x, y, z)
    }

    /// Reads four color channels.
    pub fn parse_rgba(&mut self) -> Rgba8 {
        let [r, g, b, a] = self.take_array::<4>("parse_rgba");
        Rgba8::new(r, g, b, a)
    }

    /// Reads three color channels; the result is fully opaque.
    pub fn parse_rgb(&mut self) -> Rgba8 {
        let [r, g, b] = self.take_array::<3>("parse_rgb");
        Rgba8::rgb(r, g, b)
    }

    /// Reads an [`Aabb2`].
    pub fn parse_aabb2(&mut self) -> Aabb2 {
        let mins = self.parse_vec2();
        let maxs = self.parse_vec2();
        Aabb2 { mins, maxs }
    }

    /// Reads an [`Aabb3`].
    pub fn parse_aabb3(&mut self) -> Aabb3 {
        let mins = self.parse_vec3();
        let maxs = self.parse_vec3();
        Aabb3 { mins, maxs }
    }

    /// Reads an [`Obb2`].
    pub fn parse_obb2(&mut self) -> Obb2 {
        let center = self.parse_vec2();
        let i_basis_normal = self.parse_vec2();
        let half_dimensions = self.parse_vec2();
        Obb2::new(center, i_basis_normal, half_dimensions)
    }

    /// Reads an [`Obb3`].
    pub fn parse_obb3(&mut self) -> Obb3 {
        Obb3 {
            center: self.parse_vec3(),
            i_basis: self.parse_vec3(),
            j_basis: self.parse_vec3(),
            k_basis: self.parse_vec3(),
            half_dimensions: self.parse_vec3(),
        }
    }

    /// Reads a [`Plane2`].
    pub fn parse_plane2(&mut self) -> Plane2 {
        let normal = self.parse_vec2();
        let distance = self.parse_f32();
        Plane2::new(normal, distance)
    }

    /// Reads a [`VertexPcu`].
    pub fn parse_vertex_pcu(&mut self) -> VertexPcu {
        let position = self.parse_vec3();
        let color = self.parse_rgba();
        let uv = self.parse_vec2();
        VertexPcu::new(position, color, uv)
    }

    /// Reads a [`VertexPcutbn`].
    pub fn parse_vertex_pcutbn(&mut self) -> VertexPcutbn {
        VertexPcutbn {
            position: self.parse_vec3(),
            color: self.parse_rgba(),
            uv: self.parse_vec2(),
            tangent: self.parse_vec3(),
            binormal: self.parse_vec3(),
            normal: self.parse_vec3(),
        }
    }

    fn take(&mut self, width: usize, operation: &str) -> &'a [u8] {
        let len = self.data.len();
        let end = self.cursor.checked_add(width).filter(|end| *end <= len);
        let Some(end) = end else {
            panic!(
                "BufferParser::{operation}: reading {width} byte(s) at offset {} overruns a buffer of {len} byte(s)",
                self.cursor
            );
        };
        let bytes = &self.data[self.cursor..end];
        self.cursor = end;
        bytes
    }

    fn take_array<const N: usize>(&mut self, operation: &str) -> [u8; N] {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N, operation));
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_big_and_little_u32() {
        let bytes = [0x12, 0x34, 0x56, 0x78];
        assert_eq!(BufferParser::new(&bytes, Endianness::Big).parse_u32(), 0x1234_5678);
        assert_eq!(
            BufferParser::new(&bytes, Endianness::Little).parse_u32(),
            0x7856_3412
        );
    }

    #[test]
    fn test_cursor_advances_by_width() {
        let bytes = [0u8; 16];
        let mut parser = BufferParser::new(&bytes, Endianness::Native);
        parser.parse_byte();
        assert_eq!(parser.current_read_position(), 1);
        parser.parse_u16();
        assert_eq!(parser.current_read_position(), 3);
        parser.parse_f32();
        assert_eq!(parser.current_read_position(), 7);
        parser.parse_i64();
        assert_eq!(parser.current_read_position(), 15);
        assert_eq!(parser.remaining(), 1);
        assert!(!parser.is_at_end());
        parser.parse_bool();
        assert!(parser.is_at_end());
    }

    #[test]
    #[should_panic(expected = "overruns")]
    fn test_two_byte_read_from_one_byte_buffer_panics() {
        let bytes = [0x01];
        BufferParser::new(&bytes, Endianness::Native).parse_u16();
    }

    #[test]
    #[should_panic(expected = "out of bounds")]
    fn test_seek_to_size_panics() {
        let bytes = [0u8; 4];
        BufferParser::new(&bytes, Endianness::Native).seek(4);
    }

    #[test]
    fn test_seek_rereads() {
        let bytes = [7, 8, 9];
        let mut parser = BufferParser::new(&bytes, Endianness::Native);
        assert_eq!(parser.parse_byte(), 7);
        parser.seek(2);
        assert_eq!(parser.parse_byte(), 9);
        parser.seek(0);
        assert_eq!(parser.parse_byte(), 7);
    }

    #[test]
    fn test_length_prefixed_string() {
        let bytes = [5, 0, 0, 0, b'h', b'e', b'l', b'l', b'o'];
        let mut parser = BufferParser::new(&bytes, Endianness::Little);
        assert_eq!(parser.parse_string_with_length(), "hello");
        assert!(parser.is_at_end());
    }

    #[test]
    #[should_panic(expected = "parse_string_with_length")]
    fn test_truncated_length_prefixed_string_panics() {
        let bytes = [9, 0, 0, 0, b'h', b'i'];
        BufferParser::new(&bytes, Endianness::Little).parse_string_with_length();
    }

    #[test]
    fn test_zero_terminated_strings_back_to_back() {
        let bytes = b"ab\0\0c\0";
        let mut parser = BufferParser::new(bytes, Endianness::Native);
        assert_eq!(parser.parse_zero_terminated_string(), "ab");
        assert_eq!(parser.parse_zero_terminated_string(), "");
        assert_eq!(parser.parse_zero_terminated_string(), "c");
        assert!(parser.is_at_end());
    }

    #[test]
    #[should_panic(expected = "no terminator")]
    fn test_unterminated_string_panics() {
        BufferParser::new(b"abc", Endianness::Native).parse_zero_terminated_string();
    }

    #[test]
    fn test_rgb_is_opaque() {
        let bytes = [10, 20, 30];
        let color = BufferParser::new(&bytes, Endianness::Native).parse_rgb();
        assert_eq!(color, Rgba8::new(10, 20, 30, 255));
    }
}

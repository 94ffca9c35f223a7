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

//! The appending half of the buffer codec.

use ember_core::math::{
    Aabb2, Aabb3, IntVec2, IntVec3, Obb2, Obb3, Plane2, Rgba8, Vec2, Vec3, Vec4, VertexPcu,
    VertexPcutbn,
};

use super::{reverse_bytes_u16, reverse_bytes_u32, reverse_bytes_u64, Endianness};

/// Appends primitive values to the end of a caller-owned byte buffer.
///
/// Existing contents of the buffer are left untouched; the writer only ever
/// grows it (or patches bytes it can already see, via [`Self::overwrite_u32`]).
#[derive(Debug)]
pub struct BufferWriter<'a> {
    buffer: &'a mut Vec<u8>,
    endianness: Endianness,
    swap: bool,
}

impl<'a> BufferWriter<'a> {
    /// Creates a writer that appends to `buffer` using `endianness`.
    pub fn new(buffer: &'a mut Vec<u8>, endianness: Endianness) -> Self {
        Self {
            buffer,
            endianness,
            swap: endianness.needs_swap(),
        }
    }

    /// The byte order currently used for multi-byte values.
    pub fn endianness(&self) -> Endianness {
        self.endianness
    }

    /// Changes the byte order for every value appended from now on.
    pub fn set_endianness(&mut self, endianness: Endianness) {
        log::trace!("BufferWriter endianness {:?} -> {:?}", self.endianness, endianness);
        self.endianness = endianness;
        self.swap = endianness.needs_swap();
    }

    /// Total length of the underlying buffer, including bytes written before this writer existed.
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Returns `true` if the underlying buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Reserves capacity for at least `additional` more bytes.
    pub fn reserve(&mut self, additional: usize) {
        self.buffer.reserve(additional);
    }

    // --- Scalars ---

    /// Appends a single unsigned byte.
    pub fn append_byte(&mut self, value: u8) {
        self.buffer.push(value);
    }

    /// Appends a single signed byte.
    pub fn append_char(&mut self, value: i8) {
        self.buffer.push(value as u8);
    }

    /// Appends a bool as one byte (`1` or `0`).
    pub fn append_bool(&mut self, value: bool) {
        self.buffer.push(u8::from(value));
    }

    /// Appends a `u16`.
    pub fn append_u16(&mut self, value: u16) {
        let value = if self.swap {
            reverse_bytes_u16(value)
        } else {
            value
        };
        self.buffer.extend_from_slice(&value.to_ne_bytes());
    }

    /// Appends an `i16`.
    pub fn append_i16(&mut self, value: i16) {
        self.append_u16(value as u16);
    }

    /// Appends a `u32`.
    pub fn append_u32(&mut self, value: u32) {
        let value = self.ordered_u32(value);
        self.buffer.extend_from_slice(&value.to_ne_bytes());
    }

    /// Appends an `i32`.
    pub fn append_i32(&mut self, value: i32) {
        self.append_u32(value as u32);
    }

    /// Appends a `u64`.
    pub fn append_u64(&mut self, value: u64) {
        let value = if self.swap {
            reverse_bytes_u64(value)
        } else {
            value
        };
        self.buffer.extend_from_slice(&value.to_ne_bytes());
    }

    /// Appends an `i64` (all eight bytes).
    pub fn append_i64(&mut self, value: i64) {
        self.append_u64(value as u64);
    }

    /// Appends an `f32` through its IEEE-754 bit pattern.
    pub fn append_f32(&mut self, value: f32) {
        self.append_u32(value.to_bits());
    }

    /// Appends an `f64` through its IEEE-754 bit pattern.
    pub fn append_f64(&mut self, value: f64) {
        self.append_u64(value.to_bits());
    }

    // --- Bytes and strings ---

    /// Appends raw bytes with no length prefix or terminator.
    pub fn append_bytes(&mut self, bytes: &[u8]) {
        self.buffer.extend_from_slice(bytes);
    }

    /// Appends the string's bytes followed by a single `0x00`.
    pub fn append_zero_terminated_string(&mut self, value: &str) {
        self.buffer.extend_from_slice(value.as_bytes());
        self.buffer.push(0);
    }

    /// Appends a 4-byte length followed by the string's bytes (no terminator).
    ///
    /// The length slot is written as a placeholder first and patched once the
    /// bytes are in place.
    ///
    /// # Panics
    /// Panics if the string is longer than `u32::MAX` bytes.
    pub fn append_string_with_length(&mut self, value: &str) {
        let length_offset = self.buffer.len();
        self.append_u32(0);
        self.buffer.extend_from_slice(value.as_bytes());

        let written = self.buffer.len() - length_offset - 4;
        let written = u32::try_from(written).unwrap_or_else(|_| {
            panic!("BufferWriter::append_string_with_length: {written} bytes do not fit a u32 length")
        });
        self.overwrite_u32(length_offset, written);
    }

    /// Replaces the four bytes at `offset` with `value` in the configured order.
    ///
    /// # Panics
    /// Panics if `offset + 4` exceeds the buffer length.
    pub fn overwrite_u32(&mut self, offset: usize, value: u32) {
        let len = self.buffer.len();
        let end = offset.checked_add(4).filter(|end| *end <= len);
        let Some(end) = end else {
            panic!(
                "BufferWriter::overwrite_u32: offset {offset} is out of bounds for a buffer of {len} byte(s)"
            );
        };
        let value = self.ordered_u32(value);
        self.buffer[offset..end].copy_from_slice(&value.to_ne_bytes());
    }

    // --- Math primitives ---

    /// Appends `x`, `y`.
    pub fn append_vec2(&mut self, value: Vec2) {
        self.append_f32(value.x);
        self.append_f32(value.y);
    }

    /// Appends `x`, `y`, `z`.
    pub fn append_vec3(&mut self, value: Vec3) {
        self.append_f32(value.x);
        self.append_f32(value.y);
        self.append_f32(value.z);
    }

    /// Appends `x`, `y`, `z`, `w`.
    pub fn append_vec4(&mut self, value: Vec4) {
        self.append_f32(value.x);
        self.append_f32(value.y);
        self.append_f32(value.z);
        self.append_f32(value.w);
    }

    /// Appends `x`, `y` as `i32`s.
    pub fn append_int_vec2(&mut self, value: IntVec2) {
        self.append_i32(value.x);
        self.append_i32(value.y);
    }

    /// Appends `x`, `y`, `z` as `i32`s.
    pub fn append_int_vec3(&mut self, value: IntVec3) {
        self.append_i32(value.x);
        self.append_i32(value.y);
        self.append_i32(value.z);
    }

    /// Appends all four channels, one byte each.
    pub fn append_rgba(&mut self, color: Rgba8) {
        self.buffer.extend_from_slice(&[color.r, color.g, color.b, color.a]);
    }

    /// Appends the red, green and blue channels only; alpha is dropped.
    pub fn append_rgb(&mut self, color: Rgba8) {
        self.buffer.extend_from_slice(&[color.r, color.g, color.b]);
    }

    /// Appends `mins` then `maxs`.
    pub fn append_aabb2(&mut self, value: Aabb2) {
        self.append_vec2(value.mins);
        self.append_vec2(value.maxs);
    }

    /// Appends `mins` then `maxs`.
    pub fn append_aabb3(&mut self, value: Aabb3) {
        self.append_vec3(value.mins);
        self.append_vec3(value.maxs);
    }

    /// Appends center, `i` basis and half-dimensions.
    pub fn append_obb2(&mut self, value: Obb2) {
        self.append_vec2(value.center);
        self.append_vec2(value.i_basis_normal);
        self.append_vec2(value.half_dimensions);
    }

    /// Appends center, the `i`/`j`/`k` basis and half-dimensions.
    pub fn append_obb3(&mut self, value: Obb3) {
        self.append_vec3(value.center);
        self.append_vec3(value.i_basis);
        self.append_vec3(value.j_basis);
        self.append_vec3(value.k_basis);
        self.append_vec3(value.half_dimensions);
    }

    /// Appends the normal then the distance from the origin.
    pub fn append_plane2(&mut self, value: Plane2) {
        self.append_vec2(value.normal);
        self.append_f32(value.distance_from_origin);
    }

    /// Appends position, color and UV.
    pub fn append_vertex_pcu(&mut self, vertex: &VertexPcu) {
        self.append_vec3(vertex.position);
        self.append_rgba(vertex.color);
        self.append_vec2(vertex.uv);
    }

    /// Appends position, color, UV, tangent, binormal and normal.
    pub fn append_vertex_pcutbn(&mut self, vertex: &VertexPcutbn) {
        self.append_vec3(vertex.position);
        self.append_rgba(vertex.color);
        self.append_vec2(vertex.uv);
        self.append_vec3(vertex.tangent);
        self.append_vec3(vertex.binormal);
        self.append_vec3(vertex.normal);
    }

    #[inline]
    fn ordered_u32(&self, value: u32) -> u32 {
        if self.swap {
            reverse_bytes_u32(value)
        } else {
            value
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::native_endianness;

    #[test]
    fn test_u32_byte_order() {
        let mut big = Vec::new();
        BufferWriter::new(&mut big, Endianness::Big).append_u32(0x1234_5678);
        assert_eq!(big, [0x12, 0x34, 0x56, 0x78]);

        let mut little = Vec::new();
        BufferWriter::new(&mut little, Endianness::Little).append_u32(0x1234_5678);
        assert_eq!(little, [0x78, 0x56, 0x34, 0x12]);

        let mut native = Vec::new();
        BufferWriter::new(&mut native, Endianness::Native).append_u32(0x1234_5678);
        let expected = if native_endianness() == Endianness::Little {
            little
        } else {
            big
        };
        assert_eq!(native, expected);
    }

    #[test]
    fn test_i64_writes_all_eight_bytes() {
        let mut buf = Vec::new();
        BufferWriter::new(&mut buf, Endianness::Big).append_i64(-2);
        assert_eq!(buf, [0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xfe]);
    }

    #[test]
    fn test_string_with_length_patches_prefix() {
        let mut buf = Vec::new();
        BufferWriter::new(&mut buf, Endianness::Little).append_string_with_length("hello");
        assert_eq!(buf, [5, 0, 0, 0, b'h', b'e', b'l', b'l', b'o']);
    }

    #[test]
    fn test_zero_terminated_string() {
        let mut buf = Vec::new();
        BufferWriter::new(&mut buf, Endianness::Big).append_zero_terminated_string("ok");
        assert_eq!(buf, [b'o', b'k', 0]);
    }

    #[test]
    fn test_appends_after_existing_contents() {
        let mut buf = vec![0xaa, 0xbb];
        let mut writer = BufferWriter::new(&mut buf, Endianness::Big);
        writer.append_u16(0x0102);
        writer.append_bool(true);
        assert_eq!(writer.len(), 5);
        assert_eq!(buf, [0xaa, 0xbb, 0x01, 0x02, 0x01]);
    }

    #[test]
    fn test_rgb_drops_alpha() {
        let mut buf = Vec::new();
        let mut writer = BufferWriter::new(&mut buf, Endianness::Native);
        writer.append_rgb(Rgba8::new(1, 2, 3, 4));
        writer.append_rgba(Rgba8::new(5, 6, 7, 8));
        assert_eq!(buf, [1, 2, 3, 5, 6, 7, 8]);
    }

    #[test]
    fn test_set_endianness_applies_to_later_values() {
        let mut buf = Vec::new();
        let mut writer = BufferWriter::new(&mut buf, Endianness::Little);
        writer.append_u16(0x0102);
        writer.set_endianness(Endianness::Big);
        assert_eq!(writer.endianness(), Endianness::Big);
        writer.append_u16(0x0102);
        assert_eq!(buf, [0x02, 0x01, 0x01, 0x02]);
    }

    #[test]
    fn test_overwrite_u32_in_bounds() {
        let mut buf = vec![0; 6];
        BufferWriter::new(&mut buf, Endianness::Big).overwrite_u32(2, 0xa1b2_c3d4);
        assert_eq!(buf, [0, 0, 0xa1, 0xb2, 0xc3, 0xd4]);
    }

    #[test]
    #[should_panic(expected = "out of bounds")]
    fn test_overwrite_u32_out_of_bounds_panics() {
        let mut buf = vec![0; 6];
        BufferWriter::new(&mut buf, Endianness::Big).overwrite_u32(3, 1);
    }

    #[test]
    fn test_vertex_sizes_on_the_wire() {
        let mut buf = Vec::new();
        let mut writer = BufferWriter::new(&mut buf, Endianness::Native);
        writer.append_vertex_pcu(&VertexPcu::default());
        assert_eq!(writer.len(), 24);
        writer.append_vertex_pcutbn(&VertexPcutbn::default());
        assert_eq!(writer.len(), 24 + 60);
    }
}

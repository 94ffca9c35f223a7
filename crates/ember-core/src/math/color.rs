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

//! Defines the `Rgba8` color type.

use serde::{Deserialize, Serialize};

/// A color stored as four 8-bit channels in sRGB order (`r`, `g`, `b`, `a`).
///
/// This is the color format baked into vertices and written to disk; lighting
/// math converts it to normalized floats first.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    bytemuck::Pod,
    bytemuck::Zeroable,
    Serialize,
    Deserialize,
)]
#[repr(C)]
pub struct Rgba8 {
    /// The red channel.
    pub r: u8,
    /// The green channel.
    pub g: u8,
    /// The blue channel.
    pub b: u8,
    /// The alpha (opacity) channel.
    pub a: u8,
}

impl Rgba8 {
    // --- Common Color Constants ---

    /// Opaque white.
    pub const WHITE: Self = Self::rgb(255, 255, 255);
    /// Opaque black.
    pub const BLACK: Self = Self::rgb(0, 0, 0);
    /// Opaque red.
    pub const RED: Self = Self::rgb(255, 0, 0);
    /// Opaque green.
    pub const GREEN: Self = Self::rgb(0, 255, 0);
    /// Opaque blue.
    pub const BLUE: Self = Self::rgb(0, 0, 255);
    /// Fully transparent black.
    pub const TRANSPARENT: Self = Self::new(0, 0, 0, 0);

    /// Creates a new `Rgba8` with explicit channel values.
    #[inline]
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Creates a new opaque `Rgba8` (alpha = 255).
    #[inline]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Returns the channels normalized to `[0.0, 1.0]`.
    #[inline]
    pub fn to_float_array(&self) -> [f32; 4] {
        [
            self.r as f32 / 255.0,
            self.g as f32 / 255.0,
            self.b as f32 / 255.0,
            self.a as f32 / 255.0,
        ]
    }

    /// Builds a color from normalized channels, clamping each to `[0.0, 1.0]`.
    #[inline]
    pub fn from_float_array(channels: [f32; 4]) -> Self {
        let to_byte = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        Self::new(
            to_byte(channels[0]),
            to_byte(channels[1]),
            to_byte(channels[2]),
            to_byte(channels[3]),
        )
    }
}

impl Default for Rgba8 {
    /// Returns opaque white, the neutral vertex tint.
    fn default() -> Self {
        Self::WHITE
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_rgb_is_opaque() {
        assert_eq!(Rgba8::rgb(1, 2, 3).a, 255);
        assert_eq!(Rgba8::default(), Rgba8::WHITE);
    }

    #[test]
    fn test_float_conversion() {
        let c = Rgba8::new(255, 0, 51, 128);
        let f = c.to_float_array();
        assert_relative_eq!(f[0], 1.0);
        assert_relative_eq!(f[2], 0.2);
        assert_eq!(Rgba8::from_float_array(f), c);
        assert_eq!(
            Rgba8::from_float_array([2.0, -1.0, 0.0, 1.0]),
            Rgba8::RED
        );
    }
}

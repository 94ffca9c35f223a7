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

//! Provides the mathematics primitives the engine stores and ships around.
//!
//! The types here are deliberately small: vectors, integer vectors, byte colors,
//! bounding volumes, a 2D plane, and the two vertex formats used by the
//! renderer. They are plain `#[repr(C)]` value types so they can be handed to
//! the GPU or to the binary buffer codec without conversion.

// --- Fundamental Constants ---

/// A small constant for floating-point comparisons.
pub const EPSILON: f32 = 1e-5;

pub use std::f32::consts::{FRAC_PI_2, PI, TAU};

// --- Declare Sub-Modules ---

pub mod color;
pub mod geometry;
pub mod vector;
pub mod vertex;

// --- Re-export Principal Types ---

pub use self::color::Rgba8;
pub use self::geometry::{Aabb2, Aabb3, Obb2, Obb3, Plane2};
pub use self::vector::{IntVec2, IntVec3, Vec2, Vec3, Vec4};
pub use self::vertex::{VertexPcu, VertexPcutbn};

/// Performs an approximate equality comparison using the module's default [`EPSILON`].
///
/// # Examples
///
/// ```
/// use ember_core::math::{approx_eq, EPSILON};
/// assert!(approx_eq(1.0, 1.0 + EPSILON / 2.0));
/// assert!(!approx_eq(1.0, 1.0 + EPSILON * 2.0));
/// ```
#[inline]
pub fn approx_eq(a: f32, b: f32) -> bool {
    (a - b).abs() < EPSILON
}

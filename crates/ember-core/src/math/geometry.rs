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

//! Provides geometric primitive shapes for spatial calculations.
//!
//! These are the bounding volumes used for culling, picking and physics
//! queries, plus the 2D half-space plane used by the 2D games.

use serde::{Deserialize, Serialize};

use super::{Vec2, Vec3};

/// A 2D Axis-Aligned Bounding Box defined by its minimum and maximum corners.
#[derive(
    Debug,
    Default,
    Clone,
    Copy,
    PartialEq,
    bytemuck::Pod,
    bytemuck::Zeroable,
    Serialize,
    Deserialize,
)]
#[repr(C)]
pub struct Aabb2 {
    /// The corner with the smallest coordinates.
    pub mins: Vec2,
    /// The corner with the largest coordinates.
    pub maxs: Vec2,
}

impl Aabb2 {
    /// Creates a new `Aabb2` from two corner points, ordering them component-wise.
    #[inline]
    pub fn from_min_max(a: Vec2, b: Vec2) -> Self {
        Self {
            mins: Vec2::new(a.x.min(b.x), a.y.min(b.y)),
            maxs: Vec2::new(a.x.max(b.x), a.y.max(b.y)),
        }
    }

    /// Calculates the center point of the box.
    #[inline]
    pub fn center(&self) -> Vec2 {
        (self.mins + self.maxs) * 0.5
    }

    /// Calculates the half-dimensions of the box.
    #[inline]
    pub fn half_dimensions(&self) -> Vec2 {
        (self.maxs - self.mins) * 0.5
    }

    /// Checks if a point lies inside or on the boundary of the box.
    #[inline]
    pub fn contains_point(&self, point: Vec2) -> bool {
        point.x >= self.mins.x
            && point.x <= self.maxs.x
            && point.y >= self.mins.y
            && point.y <= self.maxs.y
    }
}

/// A 3D Axis-Aligned Bounding Box defined by its minimum and maximum corners.
#[derive(
    Debug,
    Default,
    Clone,
    Copy,
    PartialEq,
    bytemuck::Pod,
    bytemuck::Zeroable,
    Serialize,
    Deserialize,
)]
#[repr(C)]
pub struct Aabb3 {
    /// The corner with the smallest coordinates.
    pub mins: Vec3,
    /// The corner with the largest coordinates.
    pub maxs: Vec3,
}

impl Aabb3 {
    /// Creates a new `Aabb3` from two corner points, ordering them component-wise.
    #[inline]
    pub fn from_min_max(a: Vec3, b: Vec3) -> Self {
        Self {
            mins: Vec3::new(a.x.min(b.x), a.y.min(b.y), a.z.min(b.z)),
            maxs: Vec3::new(a.x.max(b.x), a.y.max(b.y), a.z.max(b.z)),
        }
    }

    /// Calculates the center point of the box.
    #[inline]
    pub fn center(&self) -> Vec3 {
        (self.mins + self.maxs) * 0.5
    }

    /// Calculates the half-dimensions of the box.
    #[inline]
    pub fn half_dimensions(&self) -> Vec3 {
        (self.maxs - self.mins) * 0.5
    }

    /// Checks if a point lies inside or on the boundary of the box.
    #[inline]
    pub fn contains_point(&self, point: Vec3) -> bool {
        point.x >= self.mins.x
            && point.x <= self.maxs.x
            && point.y >= self.mins.y
            && point.y <= self.maxs.y
            && point.z >= self.mins.z
            && point.z <= self.maxs.z
    }
}

/// A 2D Oriented Bounding Box.
///
/// The box's local `i` axis is `i_basis_normal` (expected to be unit length); the
/// `j` axis is derived by rotating it +90 degrees.
#[derive(
    Debug,
    Default,
    Clone,
    Copy,
    PartialEq,
    bytemuck::Pod,
    bytemuck::Zeroable,
    Serialize,
    Deserialize,
)]
#[repr(C)]
pub struct Obb2 {
    /// The center of the box in world space.
    pub center: Vec2,
    /// The unit direction of the box's local `i` axis.
    pub i_basis_normal: Vec2,
    /// Half of the box's extent along its `i` and `j` axes.
    pub half_dimensions: Vec2,
}

impl Obb2 {
    /// Creates a new `Obb2`.
    #[inline]
    pub const fn new(center: Vec2, i_basis_normal: Vec2, half_dimensions: Vec2) -> Self {
        Self {
            center,
            i_basis_normal,
            half_dimensions,
        }
    }

    /// Returns the box's local `j` axis.
    #[inline]
    pub fn j_basis_normal(&self) -> Vec2 {
        self.i_basis_normal.rotated_90_degrees()
    }

    /// Checks if a world-space point lies inside or on the boundary of the box.
    pub fn contains_point(&self, point: Vec2) -> bool {
        let local = point - self.center;
        let i = local.dot(self.i_basis_normal);
        let j = local.dot(self.j_basis_normal());
        i.abs() <= self.half_dimensions.x && j.abs() <= self.half_dimensions.y
    }
}

/// A 3D Oriented Bounding Box with an explicit orthonormal basis.
#[derive(
    Debug,
    Default,
    Clone,
    Copy,
    PartialEq,
    bytemuck::Pod,
    bytemuck::Zeroable,
    Serialize,
    Deserialize,
)]
#[repr(C)]
pub struct Obb3 {
    /// The center of the box in world space.
    pub center: Vec3,
    /// The box's local forward axis.
    pub i_basis: Vec3,
    /// The box's local left axis.
    pub j_basis: Vec3,
    /// The box's local up axis.
    pub k_basis: Vec3,
    /// Half of the box's extent along `i`, `j` and `k`.
    pub half_dimensions: Vec3,
}

impl Obb3 {
    /// Creates an `Obb3` aligned with the world axes.
    #[inline]
    pub const fn axis_aligned(center: Vec3, half_dimensions: Vec3) -> Self {
        Self {
            center,
            i_basis: Vec3::X,
            j_basis: Vec3::Y,
            k_basis: Vec3::Z,
            half_dimensions,
        }
    }

    /// Checks if a world-space point lies inside or on the boundary of the box.
    pub fn contains_point(&self, point: Vec3) -> bool {
        let local = point - self.center;
        local.dot(self.i_basis).abs() <= self.half_dimensions.x
            && local.dot(self.j_basis).abs() <= self.half_dimensions.y
            && local.dot(self.k_basis).abs() <= self.half_dimensions.z
    }
}

/// A 2D half-space boundary: every point `p` with `dot(p, normal) == distance_from_origin`.
#[derive(
    Debug,
    Default,
    Clone,
    Copy,
    PartialEq,
    bytemuck::Pod,
    bytemuck::Zeroable,
    Serialize,
    Deserialize,
)]
#[repr(C)]
pub struct Plane2 {
    /// The unit normal of the plane, pointing to its front side.
    pub normal: Vec2,
    /// The signed distance from the origin along `normal`.
    pub distance_from_origin: f32,
}

impl Plane2 {
    /// Creates a new `Plane2`.
    #[inline]
    pub const fn new(normal: Vec2, distance_from_origin: f32) -> Self {
        Self {
            normal,
            distance_from_origin,
        }
    }

    /// Returns the signed distance from the plane to `point` (positive in front).
    #[inline]
    pub fn signed_distance(&self, point: Vec2) -> f32 {
        point.dot(self.normal) - self.distance_from_origin
    }

    /// Returns `true` if `point` lies strictly in front of the plane.
    #[inline]
    pub fn is_point_in_front(&self, point: Vec2) -> bool {
        self.signed_distance(point) > 0.0
    }
}

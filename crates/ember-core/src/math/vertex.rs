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

//! Vertex formats shared by the renderer and the asset pipeline.

use serde::{Deserialize, Serialize};

use super::{Rgba8, Vec2, Vec3};

/// A vertex with position, color and texture coordinates.
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
pub struct VertexPcu {
    /// Position in model space.
    pub position: Vec3,
    /// Vertex tint.
    pub color: Rgba8,
    /// Texture coordinates.
    pub uv: Vec2,
}

impl VertexPcu {
    /// Creates a new `VertexPcu`.
    #[inline]
    pub const fn new(position: Vec3, color: Rgba8, uv: Vec2) -> Self {
        Self {
            position,
            color,
            uv,
        }
    }
}

/// A lit vertex: position, color and texture coordinates plus a full
/// tangent / binormal / normal frame for normal mapping.
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
pub struct VertexPcutbn {
    /// Position in model space.
    pub position: Vec3,
    /// Vertex tint.
    pub color: Rgba8,
    /// Texture coordinates.
    pub uv: Vec2,
    /// Surface tangent (direction of increasing `u`).
    pub tangent: Vec3,
    /// Surface binormal (direction of increasing `v`).
    pub binormal: Vec3,
    /// Surface normal.
    pub normal: Vec3,
}

impl VertexPcutbn {
    /// Creates a `VertexPcutbn` with the default tangent frame (`X`, `Y`, `Z`).
    #[inline]
    pub const fn new(position: Vec3, color: Rgba8, uv: Vec2) -> Self {
        Self {
            position,
            color,
            uv,
            tangent: Vec3::X,
            binormal: Vec3::Y,
            normal: Vec3::Z,
        }
    }

    /// Returns this vertex with the given tangent frame.
    #[inline]
    pub const fn with_frame(mut self, tangent: Vec3, binormal: Vec3, normal: Vec3) -> Self {
        self.tangent = tangent;
        self.binormal = binormal;
        self.normal = normal;
        self
    }

    /// Drops the tangent frame, keeping position, color and UV.
    #[inline]
    pub const fn to_pcu(&self) -> VertexPcu {
        VertexPcu::new(self.position, self.color, self.uv)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vertex_layouts_have_no_padding() {
        assert_eq!(std::mem::size_of::<VertexPcu>(), 24);
        assert_eq!(std::mem::size_of::<VertexPcutbn>(), 60);
    }

    #[test]
    fn test_pcutbn_to_pcu() {
        let v = VertexPcutbn::new(Vec3::ONE, Rgba8::RED, Vec2::new(0.5, 0.25));
        assert_eq!(v.normal, Vec3::Z);
        assert_eq!(
            v.to_pcu(),
            VertexPcu::new(Vec3::ONE, Rgba8::RED, Vec2::new(0.5, 0.25))
        );
    }
}

//! Immediate-mode drawing from caller memory.
//!
//! For small or per-frame geometry (UI quads, debug lines) that is not worth
//! a persistent `Mesh`. Nothing is allocated on the device.

use bytemuck::{Pod, Zeroable};
use glam::{IVec2, Vec2, Vec3, Vec4};
use crate::engine::Engine;
use crate::error::Result;
use crate::graphics_device::{GraphicsDevice, Primitive};
use crate::resource::{Attribute, Mesh, VertexFormat};
use crate::engine_bail;

/// Vertex of the quad helpers
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
struct QuadVertex {
    position: Vec3,
    tex_coord: Vec2,
}

impl QuadVertex {
    const FORMAT: [Attribute; 3] = [Attribute::Position3f, Attribute::TexCoord2f, Attribute::End];

    fn new(position: Vec3, tex_coord: Vec2) -> Self {
        Self { position, tex_coord }
    }
}

/// Two counter-clockwise triangles over bottom-left, bottom-right, top-left, top-right
const QUAD_INDICES: [u16; 6] = [0, 1, 2, 1, 3, 2];

impl Mesh {
    /// Draw vertices and indices straight from caller memory
    ///
    /// # Arguments
    ///
    /// * `device` - Device to draw with
    /// * `primitive` - How `indices` are assembled
    /// * `format` - `Attribute::End`-terminated vertex format
    /// * `vertex_size` - Stride of one vertex in bytes
    /// * `vertices` - Interleaved vertex bytes
    /// * `indices` - Indices into `vertices`
    ///
    /// # Errors
    ///
    /// `InvalidVertexFormat` for a bad format or a stride smaller than it.
    /// `InvalidResource` if validation is enabled and an index is past the
    /// last whole vertex.
    pub fn render_array(
        device: &mut dyn GraphicsDevice,
        primitive: Primitive,
        format: &[Attribute],
        vertex_size: usize,
        vertices: &[u8],
        indices: &[u16],
    ) -> Result<()> {
        let format = VertexFormat::new(format)?;
        if vertex_size == 0 || vertex_size < format.vertex_size() {
            engine_bail!(InvalidVertexFormat, "tessera::Mesh",
                "Vertex size {} is invalid for a format of {} bytes", vertex_size, format.vertex_size());
        }

        if Engine::config().enable_validation {
            let vertex_count = vertices.len() / vertex_size;
            if let Some(&index) = indices.iter().find(|&&index| index as usize >= vertex_count) {
                engine_bail!("tessera::Mesh",
                    "Index {} out of range for {} vertices", index, vertex_count);
            }
        }

        device.draw_client_arrays(primitive, &format, vertex_size, vertices, indices)
    }

    /// Draw a textured quad spanning `bottom_left.x..top_right.x`
    ///
    /// The bottom edge sits at `(bottom_left.y, bottom_left.z)` and the top
    /// edge at `(top_right.y, top_right.z)`, so either Y or Z may be equal
    /// but X must differ.
    pub fn render_aa_quad_along_x(
        device: &mut dyn GraphicsDevice,
        bottom_left: Vec3,
        top_right: Vec3,
        tex_bottom_left: Vec2,
        tex_top_right: Vec2,
    ) -> Result<()> {
        let vertices = [
            QuadVertex::new(bottom_left, tex_bottom_left),
            QuadVertex::new(
                Vec3::new(top_right.x, bottom_left.y, bottom_left.z),
                Vec2::new(tex_top_right.x, tex_bottom_left.y),
            ),
            QuadVertex::new(
                Vec3::new(bottom_left.x, top_right.y, top_right.z),
                Vec2::new(tex_bottom_left.x, tex_top_right.y),
            ),
            QuadVertex::new(top_right, tex_top_right),
        ];

        Self::render_array(
            device,
            Primitive::Triangles,
            &QuadVertex::FORMAT,
            std::mem::size_of::<QuadVertex>(),
            bytemuck::cast_slice(&vertices),
            &QUAD_INDICES,
        )
    }

    /// Draw a nine-patch quad in the plane `z = bottom_left.z`
    ///
    /// `patch_info` is `(x0, y0, x1, y1)`: the stretchable region of the
    /// texture in UV space. Borders keep their texel size from
    /// `texture_size`; when opposite borders would overlap they meet at the
    /// centre of the quad.
    pub fn render_aa_quad_along_x_nine_patch(
        device: &mut dyn GraphicsDevice,
        bottom_left: Vec3,
        top_right: Vec3,
        texture_size: IVec2,
        patch_info: Vec4,
    ) -> Result<()> {
        let vertices = nine_patch_vertices(bottom_left, top_right, texture_size, patch_info);

        Self::render_array(
            device,
            Primitive::Triangles,
            &QuadVertex::FORMAT,
            std::mem::size_of::<QuadVertex>(),
            bytemuck::cast_slice(&vertices),
            &nine_patch_indices(),
        )
    }
}

/// 4x4 vertex grid, row-major from the bottom-left corner
fn nine_patch_vertices(
    bottom_left: Vec3,
    top_right: Vec3,
    texture_size: IVec2,
    patch_info: Vec4,
) -> [QuadVertex; 16] {
    let min = bottom_left.truncate().min(top_right.truncate());
    let max = bottom_left.truncate().max(top_right.truncate());
    let texture_size = texture_size.as_vec2();

    let mut p0 = texture_size * Vec2::new(patch_info.x, patch_info.y) + min;
    let mut p1 = max - texture_size * (Vec2::ONE - Vec2::new(patch_info.z, patch_info.w));

    // Borders wider than the quad
    if p0.x > p1.x {
        p0.x = (min.x + max.x) * 0.5;
        p1.x = p0.x;
    }
    if p0.y > p1.y {
        p0.y = (min.y + max.y) * 0.5;
        p1.y = p0.y;
    }

    let xs = [min.x, p0.x, p1.x, max.x];
    let ys = [min.y, p0.y, p1.y, max.y];
    let us = [0.0, patch_info.x, patch_info.z, 1.0];
    let vs = [0.0, patch_info.y, patch_info.w, 1.0];
    let z = bottom_left.z;

    std::array::from_fn(|i| {
        let (row, col) = (i / 4, i % 4);
        QuadVertex::new(Vec3::new(xs[col], ys[row], z), Vec2::new(us[col], vs[row]))
    })
}

/// Two triangles per cell, same winding as `QUAD_INDICES`
fn nine_patch_indices() -> [u16; 54] {
    let mut indices = [0u16; 54];
    for (cell, triangles) in indices.chunks_exact_mut(6).enumerate() {
        let corner = ((cell / 3) * 4 + cell % 3) as u16;
        triangles.copy_from_slice(&[
            corner, corner + 1, corner + 4,
            corner + 1, corner + 5, corner + 4,
        ]);
    }
    indices
}

#[cfg(test)]
#[path = "immediate_tests.rs"]
mod tests;

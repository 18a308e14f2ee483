//! Normal and tangent synthesis from positions, texture coordinates and
//! triangle indices.
//!
//! Face normals and UV-derived tangents are accumulated per vertex without
//! area or angle weighting, then normalized. The tangent is Gram-Schmidt
//! orthogonalized against the normal and its `w` stores the handedness, so a
//! shader rebuilds the binormal as `cross(normal, tangent.xyz) * tangent.w`.
//!
//! Triangles with zero UV area produce non-finite tangents; callers are
//! expected to clean such data upstream.

use bytemuck::{Pod, Zeroable};
use glam::{Vec2, Vec3, Vec4, Vec4Swizzles};
use crate::engine::Engine;
use crate::error::Result;
use crate::resource::Attribute;
use crate::{engine_bail, engine_warn};

// ============================================================================
// VERTEX CAPABILITY
// ============================================================================

/// Vertex record that can take part in tangent-space synthesis
///
/// Implement it for any vertex layout that carries a position, a texture
/// coordinate, a normal and a 4-component tangent.
pub trait TangentSpaceVertex {
    /// Object-space position
    fn position(&self) -> Vec3;
    /// Texture coordinate
    fn tex_coord(&self) -> Vec2;
    /// Current normal
    fn normal(&self) -> Vec3;
    /// Overwrite the normal
    fn set_normal(&mut self, normal: Vec3);
    /// Current tangent (xyz direction, w handedness)
    fn tangent(&self) -> Vec4;
    /// Overwrite the tangent
    fn set_tangent(&mut self, tangent: Vec4);
}

/// Interleaved position / texcoord / normal / tangent vertex
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default, Pod, Zeroable)]
pub struct NormalMappedVertex {
    pub position: [f32; 3],
    pub tex_coord: [f32; 2],
    pub normal: [f32; 3],
    pub tangent: [f32; 4],
}

impl NormalMappedVertex {
    /// Vertex format matching the field order
    pub const FORMAT: [Attribute; 5] = [
        Attribute::Position3f,
        Attribute::TexCoord2f,
        Attribute::Normal3f,
        Attribute::Tangent4f,
        Attribute::End,
    ];

    /// Vertex with zeroed normal and tangent
    pub fn new(position: Vec3, tex_coord: Vec2) -> Self {
        Self {
            position: position.to_array(),
            tex_coord: tex_coord.to_array(),
            ..Self::default()
        }
    }
}

impl TangentSpaceVertex for NormalMappedVertex {
    fn position(&self) -> Vec3 {
        Vec3::from_array(self.position)
    }

    fn tex_coord(&self) -> Vec2 {
        Vec2::from_array(self.tex_coord)
    }

    fn normal(&self) -> Vec3 {
        Vec3::from_array(self.normal)
    }

    fn set_normal(&mut self, normal: Vec3) {
        self.normal = normal.to_array();
    }

    fn tangent(&self) -> Vec4 {
        Vec4::from_array(self.tangent)
    }

    fn set_tangent(&mut self, tangent: Vec4) {
        self.tangent = tangent.to_array();
    }
}

// ============================================================================
// SYNTHESIS
// ============================================================================

/// Compute smooth normals and handed tangents in place
///
/// # Arguments
///
/// * `vertices` - Vertices to update; normal and tangent are overwritten
/// * `indices` - Triangle list, 3 indices per triangle
///
/// # Errors
///
/// `InvalidResource` if `indices` is not a whole number of triangles or
/// references a vertex outside `vertices`.
pub fn compute_normals_tangents<V: TangentSpaceVertex>(
    vertices: &mut [V],
    indices: &[u16],
) -> Result<()> {
    if indices.len() % 3 != 0 {
        engine_bail!("tessera::TangentSpace",
            "Index count {} is not a multiple of 3", indices.len());
    }
    if let Some(&index) = indices.iter().find(|&&index| index as usize >= vertices.len()) {
        engine_bail!("tessera::TangentSpace",
            "Index {} out of range for {} vertices", index, vertices.len());
    }

    // Binormal of the last triangle touching each vertex
    let mut binormals = vec![Vec3::ZERO; vertices.len()];

    for vertex in vertices.iter_mut() {
        vertex.set_normal(Vec3::ZERO);
        vertex.set_tangent(Vec4::ZERO);
    }

    for triangle in indices.chunks_exact(3) {
        let corners = [triangle[0] as usize, triangle[1] as usize, triangle[2] as usize];
        let [v0, v1, v2] = corners.map(|index| (vertices[index].position(), vertices[index].tex_coord()));

        let q1 = v1.0 - v0.0;
        let q2 = v2.0 - v0.0;
        let face_normal = q1.cross(q2).normalize();

        let uv1 = v1.1 - v0.1;
        let uv2 = v2.1 - v0.1;
        let m = 1.0 / (uv1.x * uv2.y - uv2.x * uv1.y);
        let face_tangent = ((q1 * uv2.y - q2 * uv1.y) * m).extend(0.0);
        let face_binormal = (q2 * uv1.x - q1 * uv2.x) * m;

        for index in corners {
            let vertex = &mut vertices[index];
            vertex.set_normal(vertex.normal() + face_normal);
            vertex.set_tangent(vertex.tangent() + face_tangent);
            binormals[index] = face_binormal;
        }
    }

    let mut non_finite = 0usize;
    for (vertex, binormal) in vertices.iter_mut().zip(&binormals) {
        let normal = vertex.normal().normalize();
        let tangent = vertex.tangent().xyz().normalize();
        let binormal = binormal.normalize();

        // Gram-Schmidt against the normal
        let tangent = (tangent - normal * normal.dot(tangent)).normalize();
        let handedness = normal.cross(tangent).dot(binormal).signum();

        vertex.set_normal(normal);
        vertex.set_tangent(tangent.extend(handedness));

        if !(normal.is_finite() && tangent.is_finite() && handedness.is_finite()) {
            non_finite += 1;
        }
    }

    if non_finite > 0 && Engine::config().enable_validation {
        engine_warn!("tessera::TangentSpace",
            "{} of {} vertices got a non-finite normal or tangent (degenerate triangle or UVs)",
            non_finite, vertices.len());
    }

    Ok(())
}

#[cfg(test)]
#[path = "tangent_space_tests.rs"]
mod tests;

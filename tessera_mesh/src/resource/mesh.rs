//! Geometry buffer: one vertex buffer shared by any number of material index ranges.
//!
//! # Ownership
//!
//! A `Mesh` exclusively owns its device buffers (`Box<dyn Buffer>`), which
//! are released when the mesh is dropped. It is move-only. Materials are
//! shared (`Arc<dyn Material>`) and managed by the caller.
//!
//! The vertex buffer and its format are fixed at construction. Index ranges
//! and bone data can be added afterwards.
//!
//! # Draw sequence
//!
//! ```text
//! bind_vertex_buffer
//! for each index range, in insertion order:
//!     material.bind        (unless ignored)
//!     bind_index_buffer
//!     draw_indexed
//! unbind_vertex_buffer
//! ```

use std::sync::Arc;
use glam::{Affine3A, IVec4, Mat4, Vec3};
use crate::engine::Engine;
use crate::error::Result;
use crate::graphics_device::{Buffer, BufferDesc, BufferUsage, GraphicsDevice, Primitive, Shader};
use crate::resource::{Attribute, Material, Skeleton, VertexFormat};
use crate::{engine_bail, engine_debug, engine_trace, engine_warn};

// ============================================================================
// AABB
// ============================================================================

/// Axis-aligned bounding box in object space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AABB {
    /// Minimum corner (x, y, z)
    pub min: Vec3,
    /// Maximum corner (x, y, z)
    pub max: Vec3,
}

impl AABB {
    /// Degenerate box at the origin
    pub const ZERO: Self = Self { min: Vec3::ZERO, max: Vec3::ZERO };

    /// Smallest box enclosing every point, `None` for an empty iterator
    pub fn from_points(points: impl IntoIterator<Item = Vec3>) -> Option<Self> {
        points.into_iter().fold(None, |bounds, point| {
            Some(match bounds {
                Some(AABB { min, max }) => AABB { min: min.min(point), max: max.max(point) },
                None => AABB { min: point, max: point },
            })
        })
    }

    /// Whether `point` lies inside or on the boundary
    pub fn contains_point(&self, point: Vec3) -> bool {
        point.cmpge(self.min).all() && point.cmple(self.max).all()
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }
}

// ============================================================================
// DESCRIPTORS
// ============================================================================

/// Descriptor for creating a mesh
///
/// `vertex_size` may exceed the packed size of `format` when vertices carry
/// trailing data the device does not read.
#[derive(Debug, Clone)]
pub struct MeshDesc<'a> {
    /// Interleaved vertex bytes, at least `vertex_count * vertex_size` long
    pub vertex_data: &'a [u8],
    /// Number of vertices
    pub vertex_count: usize,
    /// Stride of one vertex in bytes
    pub vertex_size: usize,
    /// `Attribute::End`-terminated vertex format
    pub format: &'a [Attribute],
    /// Precomputed bounds; scanned from the positions when `None`
    pub bounds: Option<AABB>,
}

/// View parameters of one eye for stereo rendering
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EyeView {
    /// Viewport (x, y, width, height)
    pub viewport: IVec4,
    /// Model-view-projection matrix
    pub model_view_projection: Mat4,
    /// Camera position in object space
    pub camera_position: Vec3,
}

// ============================================================================
// INDEX RANGE
// ============================================================================

/// Index buffer drawn with one material
pub struct IndexRange {
    /// Number of indices
    count: u32,
    /// Device index buffer (16-bit indices)
    buffer: Box<dyn Buffer>,
    /// Material bound before drawing
    material: Arc<dyn Material>,
}

impl IndexRange {
    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn buffer(&self) -> &dyn Buffer {
        self.buffer.as_ref()
    }

    pub fn material(&self) -> &Arc<dyn Material> {
        &self.material
    }
}

// ============================================================================
// MESH
// ============================================================================

/// Renderable geometry buffer
pub struct Mesh {
    format: VertexFormat,
    vertex_size: usize,
    vertex_count: usize,
    vertex_buffer: Box<dyn Buffer>,
    index_ranges: Vec<IndexRange>,
    bounds: AABB,
    skeleton: Skeleton,
}

impl Mesh {
    /// Upload vertex data and create a mesh without index ranges
    ///
    /// # Arguments
    ///
    /// * `device` - Device that allocates the vertex buffer
    /// * `desc` - Vertex data, format and optional bounds
    ///
    /// # Errors
    ///
    /// * `InvalidVertexFormat` - format not terminated, or stride smaller than the format
    /// * `InvalidResource` - `vertex_data` shorter than `vertex_count * vertex_size`
    /// * Device errors from buffer creation or upload, unchanged
    pub fn new(device: &mut dyn GraphicsDevice, desc: MeshDesc) -> Result<Self> {
        let format = VertexFormat::new(desc.format)?;

        if desc.vertex_size < format.vertex_size() {
            engine_bail!(InvalidVertexFormat, "tessera::Mesh",
                "Vertex size {} is smaller than its format ({} bytes)",
                desc.vertex_size, format.vertex_size());
        }

        let Some(byte_size) = desc.vertex_count.checked_mul(desc.vertex_size) else {
            engine_bail!("tessera::Mesh",
                "{} vertices of {} bytes overflow", desc.vertex_count, desc.vertex_size);
        };
        if desc.vertex_data.len() < byte_size {
            engine_bail!("tessera::Mesh",
                "Vertex data is {} bytes, {} vertices of {} bytes need {}",
                desc.vertex_data.len(), desc.vertex_count, desc.vertex_size, byte_size);
        }
        let vertex_data = &desc.vertex_data[..byte_size];

        let bounds = match desc.bounds {
            Some(bounds) => bounds,
            None => compute_bounds(vertex_data, &format, desc.vertex_size),
        };

        let vertex_buffer = device.create_buffer(BufferDesc {
            size: byte_size as u64,
            usage: BufferUsage::Vertex,
        })?;
        vertex_buffer.update(0, vertex_data)?;

        engine_debug!("tessera::Mesh", "Created mesh: {} vertices x {} bytes, bounds {:?} - {:?}",
            desc.vertex_count, desc.vertex_size, bounds.min, bounds.max);

        Ok(Self {
            format,
            vertex_size: desc.vertex_size,
            vertex_count: desc.vertex_count,
            vertex_buffer,
            index_ranges: Vec::new(),
            bounds,
            skeleton: Skeleton::default(),
        })
    }

    /// Upload a triangle index list and append it as a new range
    ///
    /// Ranges are drawn in insertion order, each after binding its material.
    ///
    /// # Errors
    ///
    /// `InvalidResource` if validation is enabled and an index is not below
    /// `vertex_count`. Device errors from buffer creation or upload.
    pub fn add_index_range(
        &mut self,
        device: &mut dyn GraphicsDevice,
        indices: &[u16],
        material: Arc<dyn Material>,
    ) -> Result<()> {
        if Engine::config().enable_validation {
            if let Some(&index) = indices.iter().find(|&&index| index as usize >= self.vertex_count) {
                engine_bail!("tessera::Mesh",
                    "Index {} out of range for {} vertices (material '{}')",
                    index, self.vertex_count, material.name());
            }
        }

        let Ok(count) = u32::try_from(indices.len()) else {
            engine_bail!("tessera::Mesh", "{} indices exceed u32 range", indices.len());
        };

        let buffer = device.create_buffer(BufferDesc {
            size: std::mem::size_of_val(indices) as u64,
            usage: BufferUsage::Index,
        })?;
        buffer.update(0, bytemuck::cast_slice(indices))?;

        engine_trace!("tessera::Mesh", "Index range {}: {} indices, material '{}'",
            self.index_ranges.len(), count, material.name());

        self.index_ranges.push(IndexRange { count, buffer, material });
        Ok(())
    }

    /// Draw every index range
    ///
    /// # Arguments
    ///
    /// * `device` - Device to draw with
    /// * `ignore_material` - Skip material binding (e.g. depth-only passes)
    /// * `instances` - Instance count passed to each draw call
    ///
    /// # Errors
    ///
    /// `Unsupported` if `instances > 1` and the device cannot instance.
    /// Nothing is bound or drawn for a mesh without index ranges.
    pub fn render(
        &self,
        device: &mut dyn GraphicsDevice,
        ignore_material: bool,
        instances: u32,
    ) -> Result<()> {
        if self.index_ranges.is_empty() {
            return Ok(());
        }
        self.check_instancing(device, instances)?;

        device.bind_vertex_buffer(self.vertex_buffer.as_ref(), &self.format, self.vertex_size)?;
        let drawn = self.draw_index_ranges(device, ignore_material, instances);
        let unbound = device.unbind_vertex_buffer(&self.format);
        drawn.and(unbound)
    }

    /// Draw the mesh once per eye
    ///
    /// Before each pass the eye's viewport, model-view-projection and camera
    /// position are set and `shader` is rebound so it picks them up.
    /// `eyes[0]` is the left eye. An unsupported instance count is rejected
    /// before any eye state is touched.
    pub fn render_stereo(
        &self,
        device: &mut dyn GraphicsDevice,
        shader: &dyn Shader,
        eyes: &[EyeView; 2],
        ignore_material: bool,
        instances: u32,
    ) -> Result<()> {
        if self.index_ranges.is_empty() {
            return Ok(());
        }
        self.check_instancing(device, instances)?;

        for eye in eyes {
            device.set_viewport(eye.viewport)?;
            device.set_model_view_projection(eye.model_view_projection)?;
            device.set_camera_position(eye.camera_position)?;
            device.bind_shader(shader)?;
            self.render(device, ignore_material, instances)?;
        }
        Ok(())
    }

    fn check_instancing(&self, device: &dyn GraphicsDevice, instances: u32) -> Result<()> {
        if instances > 1 && !device.capabilities().instancing {
            engine_bail!(Unsupported, "tessera::Mesh",
                "Drawing {} instances requires instancing support", instances);
        }
        Ok(())
    }

    /// Range loop of `render`; the caller unbinds the vertex buffer even on error
    fn draw_index_ranges(
        &self,
        device: &mut dyn GraphicsDevice,
        ignore_material: bool,
        instances: u32,
    ) -> Result<()> {
        for range in &self.index_ranges {
            if !ignore_material {
                range.material.bind(device)?;
            }
            device.bind_index_buffer(range.buffer.as_ref())?;
            device.draw_indexed(Primitive::Triangles, range.count, instances)?;
        }
        Ok(())
    }

    // ===== BONES =====

    /// Replace the bone hierarchy
    ///
    /// See [`Skeleton::new`] for the argument contract. On error the
    /// previous hierarchy is kept.
    pub fn set_bones(
        &mut self,
        local_transforms: &[Affine3A],
        parents: &[u8],
        names: Option<&[&str]>,
        shader_bone_indices: &[u8],
    ) -> Result<()> {
        self.skeleton = Skeleton::new(local_transforms, parents, names, shader_bone_indices)?;
        Ok(())
    }

    /// Replace the local bone transforms and recompute the global ones
    pub fn set_bone_transforms(&mut self, local_transforms: &[Affine3A]) -> Result<()> {
        self.skeleton.set_local_transforms(local_transforms)
    }

    /// Compact per-bone transforms down to the bones the shader samples
    pub fn gather_shader_transforms(
        &self,
        bone_transforms: &[Affine3A],
        shader_transforms: &mut [Affine3A],
    ) -> Result<()> {
        self.skeleton.gather_shader_transforms(bone_transforms, shader_transforms)
    }

    pub fn skeleton(&self) -> &Skeleton {
        &self.skeleton
    }

    pub fn num_bones(&self) -> usize {
        self.skeleton.num_bones()
    }

    pub fn num_shader_bones(&self) -> usize {
        self.skeleton.num_shader_bones()
    }

    pub fn bone_transforms(&self) -> &[Affine3A] {
        self.skeleton.local_transforms()
    }

    pub fn bone_global_transforms(&self) -> &[Affine3A] {
        self.skeleton.global_transforms()
    }

    pub fn bone_parents(&self) -> &[u8] {
        self.skeleton.parents()
    }

    pub fn bone_parent(&self, bone: usize) -> Option<usize> {
        self.skeleton.parent(bone)
    }

    pub fn bone_name(&self, bone: usize) -> Option<&str> {
        self.skeleton.name(bone)
    }

    pub fn bone_index(&self, name: &str) -> Option<usize> {
        self.skeleton.index_of(name)
    }

    pub fn shader_bone_indices(&self) -> &[u8] {
        self.skeleton.shader_bone_indices()
    }

    // ===== ACCESSORS =====

    /// Material of index range `i`
    pub fn material(&self, i: usize) -> Option<&Arc<dyn Material>> {
        self.index_ranges.get(i).map(IndexRange::material)
    }

    pub fn index_range(&self, i: usize) -> Option<&IndexRange> {
        self.index_ranges.get(i)
    }

    pub fn index_range_count(&self) -> usize {
        self.index_ranges.len()
    }

    pub fn format(&self) -> &VertexFormat {
        &self.format
    }

    pub fn vertex_size(&self) -> usize {
        self.vertex_size
    }

    pub fn vertex_count(&self) -> usize {
        self.vertex_count
    }

    pub fn vertex_buffer(&self) -> &dyn Buffer {
        self.vertex_buffer.as_ref()
    }

    pub fn bounds(&self) -> AABB {
        self.bounds
    }

    pub fn min_position(&self) -> Vec3 {
        self.bounds.min
    }

    pub fn max_position(&self) -> Vec3 {
        self.bounds.max
    }
}

/// Scan the position attribute of every vertex
///
/// A format without positions, or an empty mesh, gets `AABB::ZERO`.
fn compute_bounds(vertex_data: &[u8], format: &VertexFormat, vertex_size: usize) -> AABB {
    let Some(offset) = format.offset_of(Attribute::Position3f) else {
        engine_warn!("tessera::Mesh", "Vertex format has no position, bounds set to zero");
        return AABB::ZERO;
    };

    let positions = vertex_data.chunks_exact(vertex_size).map(|vertex| {
        let position: [f32; 3] = bytemuck::pod_read_unaligned(&vertex[offset..offset + 12]);
        Vec3::from_array(position)
    });
    AABB::from_points(positions).unwrap_or(AABB::ZERO)
}

#[cfg(test)]
#[path = "mesh_tests.rs"]
mod tests;

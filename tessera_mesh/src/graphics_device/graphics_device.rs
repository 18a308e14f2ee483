/// GraphicsDevice trait - render context consumed by the mesh core

use glam::{IVec4, Mat4, Vec3};
use crate::error::Result;
use crate::graphics_device::{Buffer, BufferDesc, Shader};
use crate::resource::VertexFormat;

// ============================================================================
// Common types
// ============================================================================

/// Primitive assembly mode for a draw call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Primitive {
    /// Triangle list (3 indices per triangle)
    Triangles,
    /// Line list (2 indices per line)
    Lines,
}

/// Capabilities reported by the device
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceCaps {
    /// Device can draw more than one instance per call
    pub instancing: bool,
}

impl Default for DeviceCaps {
    fn default() -> Self {
        Self { instancing: true }
    }
}

// ============================================================================
// GraphicsDevice trait
// ============================================================================

/// Render context trait
///
/// Every call mutates the device's global binding state (current vertex
/// buffer, index buffer, shader, view parameters). Callers must drive one
/// device from a single thread.
pub trait GraphicsDevice: Send + Sync {
    /// Capabilities of this device
    fn capabilities(&self) -> DeviceCaps;

    /// Create a buffer
    ///
    /// # Arguments
    ///
    /// * `desc` - Buffer descriptor
    ///
    /// # Returns
    ///
    /// The created buffer. Dropping it releases the device resource.
    fn create_buffer(&mut self, desc: BufferDesc) -> Result<Box<dyn Buffer>>;

    /// Bind a vertex buffer and enable the attributes of `format`
    ///
    /// # Arguments
    ///
    /// * `buffer` - Vertex buffer to bind
    /// * `format` - Attribute layout of one vertex
    /// * `vertex_size` - Stride between vertices in bytes
    fn bind_vertex_buffer(
        &mut self,
        buffer: &dyn Buffer,
        format: &VertexFormat,
        vertex_size: usize,
    ) -> Result<()>;

    /// Disable the attributes enabled by `bind_vertex_buffer`
    fn unbind_vertex_buffer(&mut self, format: &VertexFormat) -> Result<()>;

    /// Bind a 16-bit index buffer
    fn bind_index_buffer(&mut self, buffer: &dyn Buffer) -> Result<()>;

    /// Draw indexed primitives from the bound vertex and index buffers
    ///
    /// # Arguments
    ///
    /// * `primitive` - Primitive assembly mode
    /// * `index_count` - Number of indices to draw
    /// * `instances` - Number of instances (1 = non-instanced draw)
    fn draw_indexed(&mut self, primitive: Primitive, index_count: u32, instances: u32) -> Result<()>;

    /// Draw indexed primitives straight from caller memory
    ///
    /// No persistent buffer is created by the caller; the backend may stream
    /// the data however it likes.
    fn draw_client_arrays(
        &mut self,
        primitive: Primitive,
        format: &VertexFormat,
        vertex_size: usize,
        vertices: &[u8],
        indices: &[u16],
    ) -> Result<()>;

    /// Set the viewport as (x, y, width, height)
    fn set_viewport(&mut self, viewport: IVec4) -> Result<()>;

    /// Set the model-view-projection matrix used by subsequent draws
    fn set_model_view_projection(&mut self, mvp: Mat4) -> Result<()>;

    /// Set the camera position used by subsequent draws
    fn set_camera_position(&mut self, position: Vec3) -> Result<()>;

    /// Bind a shader and upload the current view parameters to it
    fn bind_shader(&mut self, shader: &dyn Shader) -> Result<()>;
}

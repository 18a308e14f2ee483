/// Buffer trait, buffer handle and buffer descriptor

use slotmap::new_key_type;
use crate::error::Result;

new_key_type! {
    /// Opaque device-side buffer handle.
    ///
    /// Allocated and interpreted by the graphics device only. The mesh core
    /// stores and forwards it, never looks at its bits.
    pub struct BufferHandle;
}

/// Buffer usage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferUsage {
    /// Vertex buffer
    Vertex,
    /// Index buffer (16-bit indices)
    Index,
}

/// Descriptor for creating a buffer
#[derive(Debug, Clone)]
pub struct BufferDesc {
    /// Size in bytes
    pub size: u64,
    /// Buffer usage
    pub usage: BufferUsage,
}

/// Buffer resource trait
///
/// Implemented by backend-specific buffer types.
/// The device resource is released when the buffer is dropped, so whoever
/// holds the `Box<dyn Buffer>` owns the resource exclusively.
pub trait Buffer: Send + Sync {
    /// Device handle of this buffer
    fn handle(&self) -> BufferHandle;

    /// Size in bytes
    fn size(&self) -> u64;

    /// Usage the buffer was created with
    fn usage(&self) -> BufferUsage;

    /// Update buffer data
    ///
    /// # Arguments
    ///
    /// * `offset` - Offset into the buffer in bytes
    /// * `data` - Data to write
    fn update(&self, offset: u64, data: &[u8]) -> Result<()>;
}

//! Material trait.
//!
//! Materials (textures, blend state, uniforms) are managed outside the mesh
//! core. A mesh only keeps a shared reference per index range and asks the
//! material to bind itself before that range is drawn.

use crate::error::Result;
use crate::graphics_device::GraphicsDevice;

/// Externally managed material
pub trait Material: Send + Sync {
    /// Name used in logs
    fn name(&self) -> &str;

    /// Bind this material's resources on `device` for the next draw call
    fn bind(&self, device: &mut dyn GraphicsDevice) -> Result<()>;
}

/// Shader trait

/// Compiled shader program owned by the backend.
///
/// The mesh core only forwards it to `GraphicsDevice::bind_shader` so the
/// backend can push the per-eye uniforms during stereo rendering.
pub trait Shader: Send + Sync {}

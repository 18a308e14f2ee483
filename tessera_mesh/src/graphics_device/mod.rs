/// Graphics device module - the seam between the mesh core and the backend
///
/// The backend (GL, Vulkan, a test recorder, ...) lives outside this crate.
/// The core only allocates buffers through it, binds them and issues draws.

// Module declarations
pub mod graphics_device;
pub mod buffer;
pub mod shader;

// Re-export everything from graphics_device.rs
pub use graphics_device::*;

// Re-export from other modules
pub use buffer::*;
pub use shader::*;

// Mock graphics device for tests (no GPU required)
#[cfg(test)]
pub mod mock_graphics_device;

/*!
# Tessera Mesh

Mesh core of the Tessera renderer.

A `Mesh` owns one vertex buffer and any number of index ranges, each drawn
with its own material. Meshes can carry a bone hierarchy whose transforms are
compacted down to the bones a skinning shader actually samples, and vertex
arrays can get smooth normals and handed tangents generated from their
positions and texture coordinates.

The graphics device, shaders and materials are supplied by the caller through
traits; this crate never talks to a graphics API itself.

## Architecture

- **GraphicsDevice**: Buffer allocation, binding and draw calls
- **Buffer**: Device buffer, released on drop
- **Material** / **Shader**: Opaque render state owned by the caller
- **Mesh**: Geometry buffer with material index ranges and bones
- **Skeleton**: Bone hierarchy and shader-bone gather
- **compute_normals_tangents**: Tangent-space generation for any vertex layout
*/

// Internal modules
mod error;
mod engine;
pub mod log;
pub mod graphics_device;
pub mod resource;

// Main tessera namespace module
pub mod tessera {
    // Error types
    pub use crate::error::{Error, Result};

    // Global logger and configuration
    pub use crate::engine::{Engine, Config};

    // Logging sub-module (types only, NOT macros)
    pub mod log {
        pub use crate::log::{Logger, LogEntry, LogSeverity, DefaultLogger};
    }

    // Device seam implemented by the caller
    pub mod graphics_device {
        pub use crate::graphics_device::*;
    }

    // Mesh resources
    pub mod resource {
        pub use crate::resource::*;
    }
}

// Re-export math and vertex casting libraries at crate root
pub use glam;
pub use bytemuck;

//! Mesh resources
//!
//! Vertex formats, the geometry buffer, bone hierarchies and the
//! tangent-space generator.

pub mod vertex_format;
pub mod material;
pub mod mesh;
pub mod skeleton;
pub mod tangent_space;
mod immediate;

pub use vertex_format::{vertex_size, Attribute, AttributeMask, VertexFormat, MAX_ATTRIBUTES};
pub use material::Material;
pub use mesh::{Mesh, MeshDesc, IndexRange, EyeView, AABB};
pub use skeleton::{Skeleton, INVALID_BONE_INDEX, MAX_BONES};
pub use tangent_space::{compute_normals_tangents, NormalMappedVertex, TangentSpaceVertex};

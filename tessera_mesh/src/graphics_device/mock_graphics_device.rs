/// Mock GraphicsDevice for unit tests (no GPU required)
///
/// Every device call is recorded as a string command in a log shared with
/// the buffers and materials it hands out, so tests can assert on the exact
/// binding/draw sequence a mesh produces.

use std::sync::{Arc, Mutex};
use glam::{IVec4, Mat4, Vec3};
use slotmap::SlotMap;

use crate::error::{Error, Result};
use crate::graphics_device::{
    GraphicsDevice, Buffer, BufferDesc, BufferHandle, BufferUsage,
    DeviceCaps, Primitive, Shader,
};
use crate::resource::{Material, VertexFormat};

/// Shared command log
pub type CommandLog = Arc<Mutex<Vec<String>>>;

/// Contents of every live buffer, keyed by handle
type BufferStore = Arc<Mutex<SlotMap<BufferHandle, Vec<u8>>>>;

// ============================================================================
// Mock Buffer
// ============================================================================

pub struct MockBuffer {
    handle: BufferHandle,
    size: u64,
    usage: BufferUsage,
    store: BufferStore,
    commands: CommandLog,
}

impl Buffer for MockBuffer {
    fn handle(&self) -> BufferHandle {
        self.handle
    }

    fn size(&self) -> u64 {
        self.size
    }

    fn usage(&self) -> BufferUsage {
        self.usage
    }

    fn update(&self, offset: u64, data: &[u8]) -> Result<()> {
        let end = offset + data.len() as u64;
        if end > self.size {
            return Err(Error::InvalidResource(format!(
                "update [{}, {}) exceeds buffer size {}",
                offset, end, self.size
            )));
        }
        let mut store = self.store.lock().unwrap();
        let contents = store
            .get_mut(self.handle)
            .ok_or_else(|| Error::BackendError("buffer already destroyed".to_string()))?;
        contents[offset as usize..end as usize].copy_from_slice(data);
        Ok(())
    }
}

impl Drop for MockBuffer {
    fn drop(&mut self) {
        self.store.lock().unwrap().remove(self.handle);
        self.commands.lock().unwrap().push("destroy_buffer".to_string());
    }
}

// ============================================================================
// Mock Shader
// ============================================================================

#[derive(Debug)]
pub struct MockShader {
    pub name: String,
}

impl MockShader {
    pub fn new(name: &str) -> Self {
        Self { name: name.to_string() }
    }
}

impl Shader for MockShader {}

// ============================================================================
// Mock Material
// ============================================================================

pub struct MockMaterial {
    pub name: String,
    commands: CommandLog,
    /// When set, `bind` records the attempt and then fails
    pub fail_bind: bool,
}

impl MockMaterial {
    /// Material that records `bind_material:<name>` into `commands`
    pub fn new(name: &str, commands: CommandLog) -> Self {
        Self { name: name.to_string(), commands, fail_bind: false }
    }
}

impl Material for MockMaterial {
    fn name(&self) -> &str {
        &self.name
    }

    fn bind(&self, _device: &mut dyn GraphicsDevice) -> Result<()> {
        self.commands.lock().unwrap().push(format!("bind_material:{}", self.name));
        if self.fail_bind {
            return Err(Error::BackendError(format!("material {} failed to bind", self.name)));
        }
        Ok(())
    }
}

// ============================================================================
// Mock GraphicsDevice
// ============================================================================

pub struct MockGraphicsDevice {
    commands: CommandLog,
    buffers: BufferStore,
    /// Capabilities returned by `capabilities()`
    pub caps: DeviceCaps,
    /// When set, every `create_buffer` fails with `OutOfMemory`
    pub fail_allocations: bool,
    /// Vertex bytes of the last `draw_client_arrays` call
    pub client_vertices: Vec<u8>,
    /// Indices of the last `draw_client_arrays` call
    pub client_indices: Vec<u16>,
    pub bound_vertex_buffer: Option<BufferHandle>,
    pub bound_index_buffer: Option<BufferHandle>,
    pub viewport: IVec4,
    pub model_view_projection: Mat4,
    pub camera_position: Vec3,
}

impl MockGraphicsDevice {
    pub fn new() -> Self {
        Self {
            commands: Arc::new(Mutex::new(Vec::new())),
            buffers: Arc::new(Mutex::new(SlotMap::with_key())),
            caps: DeviceCaps::default(),
            fail_allocations: false,
            client_vertices: Vec::new(),
            client_indices: Vec::new(),
            bound_vertex_buffer: None,
            bound_index_buffer: None,
            viewport: IVec4::ZERO,
            model_view_projection: Mat4::IDENTITY,
            camera_position: Vec3::ZERO,
        }
    }

    /// Shared command log (hand it to `MockMaterial::new`)
    pub fn command_log(&self) -> CommandLog {
        self.commands.clone()
    }

    /// Snapshot of all recorded commands
    pub fn commands(&self) -> Vec<String> {
        self.commands.lock().unwrap().clone()
    }

    /// Recorded commands starting with `prefix`
    pub fn commands_with_prefix(&self, prefix: &str) -> Vec<String> {
        self.commands()
            .into_iter()
            .filter(|c| c.starts_with(prefix))
            .collect()
    }

    /// Forget every recorded command
    pub fn clear_commands(&self) {
        self.commands.lock().unwrap().clear();
    }

    /// Number of buffers created and not yet dropped
    pub fn live_buffer_count(&self) -> usize {
        self.buffers.lock().unwrap().len()
    }

    /// Current contents of a live buffer
    pub fn buffer_data(&self, handle: BufferHandle) -> Option<Vec<u8>> {
        self.buffers.lock().unwrap().get(handle).cloned()
    }

    fn record(&self, command: String) {
        self.commands.lock().unwrap().push(command);
    }
}

impl GraphicsDevice for MockGraphicsDevice {
    fn capabilities(&self) -> DeviceCaps {
        self.caps
    }

    fn create_buffer(&mut self, desc: BufferDesc) -> Result<Box<dyn Buffer>> {
        if self.fail_allocations {
            return Err(Error::OutOfMemory);
        }
        let handle = self.buffers.lock().unwrap().insert(vec![0u8; desc.size as usize]);
        self.record(format!("create_buffer:{:?}:{}", desc.usage, desc.size));
        Ok(Box::new(MockBuffer {
            handle,
            size: desc.size,
            usage: desc.usage,
            store: self.buffers.clone(),
            commands: self.commands.clone(),
        }))
    }

    fn bind_vertex_buffer(
        &mut self,
        buffer: &dyn Buffer,
        _format: &VertexFormat,
        vertex_size: usize,
    ) -> Result<()> {
        self.bound_vertex_buffer = Some(buffer.handle());
        self.record(format!("bind_vertex_buffer:{}", vertex_size));
        Ok(())
    }

    fn unbind_vertex_buffer(&mut self, _format: &VertexFormat) -> Result<()> {
        self.bound_vertex_buffer = None;
        self.record("unbind_vertex_buffer".to_string());
        Ok(())
    }

    fn bind_index_buffer(&mut self, buffer: &dyn Buffer) -> Result<()> {
        self.bound_index_buffer = Some(buffer.handle());
        self.record("bind_index_buffer".to_string());
        Ok(())
    }

    fn draw_indexed(&mut self, primitive: Primitive, index_count: u32, instances: u32) -> Result<()> {
        self.record(format!("draw_indexed:{:?}:{}:{}", primitive, index_count, instances));
        Ok(())
    }

    fn draw_client_arrays(
        &mut self,
        primitive: Primitive,
        _format: &VertexFormat,
        vertex_size: usize,
        vertices: &[u8],
        indices: &[u16],
    ) -> Result<()> {
        self.client_vertices = vertices.to_vec();
        self.client_indices = indices.to_vec();
        self.record(format!(
            "draw_client_arrays:{:?}:{}:{}",
            primitive, vertex_size, indices.len()
        ));
        Ok(())
    }

    fn set_viewport(&mut self, viewport: IVec4) -> Result<()> {
        self.viewport = viewport;
        self.record(format!(
            "set_viewport:{},{},{},{}",
            viewport.x, viewport.y, viewport.z, viewport.w
        ));
        Ok(())
    }

    fn set_model_view_projection(&mut self, mvp: Mat4) -> Result<()> {
        self.model_view_projection = mvp;
        self.record("set_model_view_projection".to_string());
        Ok(())
    }

    fn set_camera_position(&mut self, position: Vec3) -> Result<()> {
        self.camera_position = position;
        self.record(format!(
            "set_camera_position:{},{},{}",
            position.x, position.y, position.z
        ));
        Ok(())
    }

    fn bind_shader(&mut self, _shader: &dyn Shader) -> Result<()> {
        self.record("bind_shader".to_string());
        Ok(())
    }
}

#[cfg(test)]
#[path = "mock_graphics_device_tests.rs"]
mod tests;

/// Unit tests for immediate.rs

use glam::{IVec2, Vec2, Vec3, Vec4};
use serial_test::serial;
use crate::error::Error;
use crate::graphics_device::mock_graphics_device::MockGraphicsDevice;
use crate::graphics_device::Primitive;
use crate::log::LogSeverity;
use crate::resource::{Attribute, Mesh};
use crate::tessera::{Config, Engine};

// ============================================================================
// HELPER FUNCTIONS
// ============================================================================

/// (position, tex_coord) of every vertex of the last client-array draw
fn drawn_vertices(device: &MockGraphicsDevice) -> Vec<(Vec3, Vec2)> {
    device
        .client_vertices
        .chunks_exact(20)
        .map(|bytes| {
            let [x, y, z, u, v]: [f32; 5] = bytemuck::pod_read_unaligned(bytes);
            (Vec3::new(x, y, z), Vec2::new(u, v))
        })
        .collect()
}

/// Signed z of each triangle's normal, projected on the XY plane
fn triangle_windings(vertices: &[(Vec3, Vec2)], indices: &[u16]) -> Vec<f32> {
    indices
        .chunks_exact(3)
        .map(|triangle| {
            let [a, b, c] = [0, 1, 2].map(|i| vertices[triangle[i] as usize].0);
            (b - a).cross(c - a).z
        })
        .collect()
}

// ============================================================================
// RENDER ARRAY TESTS
// ============================================================================

#[test]
fn test_render_array_forwards_client_memory() {
    let mut device = MockGraphicsDevice::new();
    let positions: [f32; 9] = [0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 1.0, 0.0];
    let indices = [0u16, 1, 1, 2];

    Mesh::render_array(
        &mut device,
        Primitive::Lines,
        &[Attribute::Position3f, Attribute::End],
        12,
        bytemuck::cast_slice(&positions),
        &indices,
    )
    .unwrap();

    assert_eq!(device.commands(), vec!["draw_client_arrays:Lines:12:4".to_string()]);
    assert_eq!(device.client_vertices, bytemuck::cast_slice::<f32, u8>(&positions).to_vec());
    assert_eq!(device.client_indices, indices.to_vec());
    assert_eq!(device.live_buffer_count(), 0);
}

#[test]
fn test_render_array_bad_format_rejected() {
    let mut device = MockGraphicsDevice::new();
    let data = [0u8; 24];

    let unterminated = Mesh::render_array(&mut device, Primitive::Triangles, &[Attribute::Position3f], 12, &data, &[]);
    assert!(matches!(unterminated, Err(Error::InvalidVertexFormat(_))));

    let short_stride = Mesh::render_array(
        &mut device,
        Primitive::Triangles,
        &[Attribute::Position3f, Attribute::Normal3f, Attribute::End],
        12,
        &data,
        &[],
    );
    assert!(matches!(short_stride, Err(Error::InvalidVertexFormat(_))));

    let zero_stride = Mesh::render_array(&mut device, Primitive::Triangles, &[Attribute::End], 0, &data, &[]);
    assert!(matches!(zero_stride, Err(Error::InvalidVertexFormat(_))));

    assert!(device.commands().is_empty());
}

#[test]
#[serial]
fn test_render_array_index_out_of_range_with_validation() {
    Engine::set_config(Config { enable_validation: true, min_log_severity: LogSeverity::Info });

    let mut device = MockGraphicsDevice::new();
    let data = [0u8; 36];
    let result = Mesh::render_array(
        &mut device,
        Primitive::Triangles,
        &[Attribute::Position3f, Attribute::End],
        12,
        &data,
        &[0, 1, 3],
    );

    Engine::reset_config();

    assert!(matches!(result, Err(Error::InvalidResource(_))));
    assert!(device.commands().is_empty());
}

#[test]
#[serial]
fn test_render_array_unchecked_without_validation() {
    Engine::set_config(Config { enable_validation: false, min_log_severity: LogSeverity::Info });

    let mut device = MockGraphicsDevice::new();
    let data = [0u8; 36];
    let result = Mesh::render_array(
        &mut device,
        Primitive::Triangles,
        &[Attribute::Position3f, Attribute::End],
        12,
        &data,
        &[0, 1, 3],
    );

    Engine::reset_config();

    assert!(result.is_ok());
    assert_eq!(device.commands_with_prefix("draw_client_arrays").len(), 1);
}

// ============================================================================
// QUAD TESTS
// ============================================================================

#[test]
fn test_quad_vertices_and_indices() {
    let mut device = MockGraphicsDevice::new();

    Mesh::render_aa_quad_along_x(
        &mut device,
        Vec3::new(-1.0, -2.0, 0.5),
        Vec3::new(3.0, 4.0, 0.5),
        Vec2::new(0.0, 0.0),
        Vec2::new(1.0, 1.0),
    )
    .unwrap();

    assert_eq!(device.commands(), vec!["draw_client_arrays:Triangles:20:6".to_string()]);
    assert_eq!(device.client_indices, vec![0, 1, 2, 1, 3, 2]);
    assert_eq!(drawn_vertices(&device), vec![
        (Vec3::new(-1.0, -2.0, 0.5), Vec2::new(0.0, 0.0)),
        (Vec3::new(3.0, -2.0, 0.5), Vec2::new(1.0, 0.0)),
        (Vec3::new(-1.0, 4.0, 0.5), Vec2::new(0.0, 1.0)),
        (Vec3::new(3.0, 4.0, 0.5), Vec2::new(1.0, 1.0)),
    ]);
}

#[test]
fn test_quad_is_counter_clockwise() {
    let mut device = MockGraphicsDevice::new();
    Mesh::render_aa_quad_along_x(&mut device, Vec3::ZERO, Vec3::new(2.0, 1.0, 0.0), Vec2::ZERO, Vec2::ONE).unwrap();

    let windings = triangle_windings(&drawn_vertices(&device), &device.client_indices);
    assert!(windings.iter().all(|&z| z > 0.0), "windings {:?}", windings);
}

#[test]
fn test_quad_in_xz_plane() {
    let mut device = MockGraphicsDevice::new();

    Mesh::render_aa_quad_along_x(
        &mut device,
        Vec3::new(0.0, 1.0, -1.0),
        Vec3::new(2.0, 1.0, 5.0),
        Vec2::new(0.25, 0.5),
        Vec2::new(0.75, 1.0),
    )
    .unwrap();

    let vertices = drawn_vertices(&device);
    assert_eq!(vertices[0].0, Vec3::new(0.0, 1.0, -1.0));
    assert_eq!(vertices[1].0, Vec3::new(2.0, 1.0, -1.0));
    assert_eq!(vertices[2].0, Vec3::new(0.0, 1.0, 5.0));
    assert_eq!(vertices[3].0, Vec3::new(2.0, 1.0, 5.0));
    assert_eq!(vertices[1].1, Vec2::new(0.75, 0.5));
    assert_eq!(vertices[2].1, Vec2::new(0.25, 1.0));
}

// ============================================================================
// NINE-PATCH TESTS
// ============================================================================

#[test]
fn test_nine_patch_grid() {
    let mut device = MockGraphicsDevice::new();

    Mesh::render_aa_quad_along_x_nine_patch(
        &mut device,
        Vec3::new(0.0, 0.0, 2.0),
        Vec3::new(100.0, 50.0, 2.0),
        IVec2::new(32, 32),
        Vec4::new(0.25, 0.25, 0.75, 0.75),
    )
    .unwrap();

    assert_eq!(device.commands(), vec!["draw_client_arrays:Triangles:20:54".to_string()]);

    let vertices = drawn_vertices(&device);
    assert_eq!(vertices.len(), 16);

    let xs = [0.0, 8.0, 92.0, 100.0];
    let ys = [0.0, 8.0, 42.0, 50.0];
    let uvs = [0.0, 0.25, 0.75, 1.0];
    for (i, (position, tex_coord)) in vertices.iter().enumerate() {
        let (row, col) = (i / 4, i % 4);
        assert_eq!(*position, Vec3::new(xs[col], ys[row], 2.0), "vertex {}", i);
        assert_eq!(*tex_coord, Vec2::new(uvs[col], uvs[row]), "vertex {}", i);
    }
}

#[test]
fn test_nine_patch_indices_cover_grid_counter_clockwise() {
    let mut device = MockGraphicsDevice::new();
    Mesh::render_aa_quad_along_x_nine_patch(
        &mut device,
        Vec3::ZERO,
        Vec3::new(64.0, 64.0, 0.0),
        IVec2::new(16, 16),
        Vec4::new(0.25, 0.25, 0.75, 0.75),
    )
    .unwrap();

    let indices = device.client_indices.clone();
    assert_eq!(indices.len(), 54);
    assert!(indices.iter().all(|&index| index < 16));
    // Every vertex is referenced
    assert!((0..16).all(|vertex| indices.contains(&vertex)));

    let windings = triangle_windings(&drawn_vertices(&device), &indices);
    assert!(windings.iter().all(|&z| z > 0.0), "windings {:?}", windings);
}

#[test]
fn test_nine_patch_overlapping_borders_meet_at_center() {
    let mut device = MockGraphicsDevice::new();

    Mesh::render_aa_quad_along_x_nine_patch(
        &mut device,
        Vec3::ZERO,
        Vec3::new(10.0, 6.0, 0.0),
        IVec2::new(32, 32),
        Vec4::new(0.25, 0.25, 0.75, 0.75),
    )
    .unwrap();

    let vertices = drawn_vertices(&device);
    let xs: Vec<f32> = vertices[..4].iter().map(|(position, _)| position.x).collect();
    let ys: Vec<f32> = vertices.iter().step_by(4).map(|(position, _)| position.y).collect();
    assert_eq!(xs, vec![0.0, 5.0, 5.0, 10.0]);
    assert_eq!(ys, vec![0.0, 3.0, 3.0, 6.0]);
}

#[test]
fn test_nine_patch_swapped_corners() {
    let mut device = MockGraphicsDevice::new();

    Mesh::render_aa_quad_along_x_nine_patch(
        &mut device,
        Vec3::new(100.0, 50.0, -3.0),
        Vec3::new(0.0, 0.0, 7.0),
        IVec2::new(32, 32),
        Vec4::new(0.25, 0.25, 0.75, 0.75),
    )
    .unwrap();

    let vertices = drawn_vertices(&device);
    assert_eq!(vertices[0].0, Vec3::new(0.0, 0.0, -3.0));
    assert_eq!(vertices[15].0, Vec3::new(100.0, 50.0, -3.0));
}

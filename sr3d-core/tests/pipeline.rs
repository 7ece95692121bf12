/// End-to-end checks of the transform and clipping pipeline through the
/// public API.
use std::rc::Rc;

use nalgebra::{Vector2, Vector3};
use slotmap::SlotMap;
use sr3d_core::{
    clip_line, clip_triangle, math, Camera, Color, Engine, Frustum, Mesh, Object, ObjectId, Primitive,
    Triangle3, Viewport,
};

const TOLERANCE: f32 = 1e-3;

fn camera_60() -> (Camera, Frustum) {
    let objects: SlotMap<ObjectId, Object> = SlotMap::with_key();
    let mut camera = Camera::new(16.0 / 9.0).unwrap();
    camera.set_fov(math::radians(60.0)).unwrap();
    camera.set_clip_range(0.1, 100.0).unwrap();
    let frustum = camera.compute_frustum(&objects);
    (camera, frustum)
}

fn assert_all_inside(triangles: &[Triangle3], frustum: &Frustum) {
    for triangle in triangles {
        for vertex in triangle {
            for plane in frustum.planes() {
                assert!(plane.distance_to(vertex) >= -TOLERANCE, "{vertex:?} outside {plane:?}");
            }
        }
    }
}

#[test]
fn triangle_behind_near_plane_is_dropped() {
    let (_, frustum) = camera_60();

    let behind = [
        Vector3::new(-1.0, 0.0, 0.05),
        Vector3::new(1.0, 0.0, 0.05),
        Vector3::new(0.0, 1.0, -3.0),
    ];
    assert!(clip_triangle(&behind, &frustum).is_empty());
}

#[test]
fn triangle_straddling_near_plane_is_cut() {
    let (_, frustum) = camera_60();

    // One vertex behind the camera, two in front
    let one_behind = [
        Vector3::new(-0.3, 0.0, 5.0),
        Vector3::new(0.3, 0.0, 5.0),
        Vector3::new(0.0, 0.0, -1.0),
    ];
    let pieces = clip_triangle(&one_behind, &frustum);
    assert!((1..=2).contains(&pieces.len()), "{} pieces", pieces.len());
    assert_all_inside(&pieces, &frustum);

    // Two vertices behind, one in front
    let two_behind = [
        Vector3::new(-0.06, 0.0, -1.0),
        Vector3::new(0.06, 0.0, -1.0),
        Vector3::new(0.0, 0.0, 5.0),
    ];
    let pieces = clip_triangle(&two_behind, &frustum);
    assert_eq!(pieces.len(), 1);
    assert_all_inside(&pieces, &frustum);
}

#[test]
fn clipped_pieces_project_into_the_unit_cube() {
    let objects: SlotMap<ObjectId, Object> = SlotMap::with_key();
    let (mut camera, frustum) = camera_60();
    let view_projection = camera.compute_view_projection_matrix(&objects);

    // Covers the whole view cross-section at its depth
    let huge = [
        Vector3::new(-50.0, -40.0, 10.0),
        Vector3::new(60.0, -30.0, 10.0),
        Vector3::new(0.0, 70.0, 10.0),
    ];
    let pieces = clip_triangle(&huge, &frustum);
    assert!(!pieces.is_empty());

    for piece in &pieces {
        for vertex in piece {
            let ndc = math::project_point(&view_projection, vertex);
            for c in ndc.iter() {
                assert!(c.abs() <= 1.0 + 1e-2, "{ndc:?}");
            }
        }
    }
}

#[test]
fn line_through_the_camera_is_trimmed() {
    let (_, frustum) = camera_60();
    let (from, to) = clip_line(Vector3::new(0.0, 0.0, -10.0), Vector3::new(0.0, 0.0, 10.0), &frustum)
        .expect("line crosses the view");

    assert!((from.z - 0.1).abs() < TOLERANCE);
    assert!((to.z - 10.0).abs() < TOLERANCE);

    assert!(clip_line(Vector3::new(0.0, 0.0, -10.0), Vector3::new(0.0, 0.0, -1.0), &frustum).is_none());
}

#[test]
fn rotating_the_camera_moves_geometry_out_of_view() {
    let mut engine = Engine::new(Viewport::new(320.0, 180.0).unwrap()).unwrap();
    engine.settings_mut().debug.grid.show = false;
    engine.add_mesh(Rc::new(Mesh::cube(1.0, Color::WHITE)), Vector3::new(0.0, 0.0, 5.0));

    assert_eq!(engine.draw().unwrap().len(), 2);

    engine
        .active_camera_mut()
        .set_rotation_angles(Vector2::new(math::radians(180.0), 0.0));
    assert!(engine.draw().unwrap().is_empty());

    engine
        .active_camera_mut()
        .set_rotation_angles(Vector2::new(math::radians(360.0), 0.0));
    let list = engine.draw().unwrap();
    assert_eq!(list.len(), 2);
    assert!(list.primitives().iter().all(|p| matches!(p, Primitive::Triangle(_))));
}

#[test]
fn camera_inside_a_mesh_sees_only_clipped_pieces() {
    let mut engine = Engine::new(Viewport::new(320.0, 180.0).unwrap()).unwrap();
    engine.settings_mut().debug.grid.show = false;
    engine.settings_mut().backface_culling = false;
    engine.add_mesh(Rc::new(Mesh::cube(4.0, Color::WHITE)), Vector3::zeros());

    engine.draw().unwrap();
    let stats = *engine.stats();
    assert_eq!(stats.faces, 12);
    assert!(stats.triangles > 0);
    assert!(stats.clipped > 0);
}

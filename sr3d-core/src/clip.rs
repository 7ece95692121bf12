/// Line and triangle clipping against a frustum
use log::warn;
use nalgebra::Vector3;

use crate::frustum::Frustum;
use crate::plane::Plane;

/// A triangle in world space.
pub type Triangle3 = [Vector3<f32>; 3];

/// Clip the segment `from..to` to the frustum.
///
/// Planes are applied one after another to the already-shortened segment.
/// Returns `None` as soon as the segment is found entirely outside one of
/// them.
pub fn clip_line(
    mut from: Vector3<f32>,
    mut to: Vector3<f32>,
    frustum: &Frustum,
) -> Option<(Vector3<f32>, Vector3<f32>)> {
    for plane in frustum.planes() {
        let from_outside = plane.is_outside(&from);
        let to_outside = plane.is_outside(&to);

        match (from_outside, to_outside) {
            (false, false) => continue,
            (true, true) => return None,
            _ => {}
        }

        // One endpoint on each side. A miss here can only come from rounding
        // right at the plane, where the outside part is negligible anyway.
        let hit = plane.intersect_line(&from, &to)?;
        if from_outside {
            from = hit.point;
        } else {
            to = hit.point;
        }
    }

    Some((from, to))
}

/// Sutherland-Hodgman clipping of one triangle against all six planes.
///
/// The result is zero or more triangles covering exactly the part of the
/// input inside the frustum. A triangle that is already inside comes back
/// unchanged.
pub fn clip_triangle(triangle: &Triangle3, frustum: &Frustum) -> Vec<Triangle3> {
    let mut triangles = vec![*triangle];
    let mut next = Vec::new();

    for plane in frustum.planes() {
        next.clear();
        for candidate in &triangles {
            clip_triangle_against_plane(candidate, plane, &mut next);
        }
        std::mem::swap(&mut triangles, &mut next);

        if triangles.is_empty() {
            break;
        }
    }

    triangles
}

/// Clip against a single plane, pushing 0, 1 or 2 triangles to `out`.
pub fn clip_triangle_against_plane(triangle: &Triangle3, plane: &Plane, out: &mut Vec<Triangle3>) {
    let mut inside = [Vector3::zeros(); 3];
    let mut outside = [Vector3::zeros(); 3];
    let (mut inside_count, mut outside_count) = (0, 0);

    for vertex in triangle {
        if plane.is_outside(vertex) {
            outside[outside_count] = *vertex;
            outside_count += 1;
        } else {
            inside[inside_count] = *vertex;
            inside_count += 1;
        }
    }

    match outside_count {
        0 => out.push(*triangle),
        3 => {}
        2 => {
            // One vertex survives: shrink towards it
            let (Some(a), Some(b)) = (
                crossing(plane, &inside[0], &outside[0]),
                crossing(plane, &inside[0], &outside[1]),
            ) else {
                return;
            };
            out.push([inside[0], a, b]);
        }
        1 => {
            // Two vertices survive: the remaining quad is split along
            // inside[1]..a, both halves use the same outside vertex
            let (Some(a), Some(b)) = (
                crossing(plane, &inside[0], &outside[0]),
                crossing(plane, &inside[1], &outside[0]),
            ) else {
                return;
            };
            out.push([inside[0], a, inside[1]]);
            out.push([a, b, inside[1]]);
        }
        _ => unreachable!("a triangle has three vertices"),
    }
}

// An inside and an outside vertex always straddle the plane, so a missing
// intersection is a classification bug.
fn crossing(plane: &Plane, inside: &Vector3<f32>, outside: &Vector3<f32>) -> Option<Vector3<f32>> {
    let hit = plane.intersect_line(inside, outside);
    debug_assert!(hit.is_some(), "straddling edge does not intersect the clip plane");
    if hit.is_none() {
        warn!("skipping malformed triangle: edge {inside:?}..{outside:?} does not cross its clip plane");
    }
    hit.map(|hit| hit.point)
}

/// Unnormalized face normal following the vertex winding.
pub fn face_normal(triangle: &Triangle3) -> Vector3<f32> {
    (triangle[1] - triangle[0]).cross(&(triangle[2] - triangle[0]))
}

pub fn centroid(triangle: &Triangle3) -> Vector3<f32> {
    (triangle[0] + triangle[1] + triangle[2]) / 3.0
}

/// A face is front-facing when its normal points towards the viewer.
pub fn is_back_facing(triangle: &Triangle3, eye: &Vector3<f32>) -> bool {
    face_normal(triangle).dot(&(centroid(triangle) - eye)) > 0.0
}

/// Cosmetic intensity in `[0.7, 1.0]`: faces seen head-on are brightest.
pub fn shade_factor(triangle: &Triangle3, eye: &Vector3<f32>) -> f32 {
    let normal = face_normal(triangle);
    let to_face = centroid(triangle) - eye;
    match (normal.try_normalize(0.0), to_face.try_normalize(0.0)) {
        (Some(normal), Some(to_face)) => 0.7 + 0.3 * normal.dot(&to_face).abs(),
        _ => 1.0,
    }
}

/// Area of a triangle, used by tests and statistics.
pub fn area(triangle: &Triangle3) -> f32 {
    face_normal(triangle).norm() / 2.0
}

/// Vector and matrix helpers on top of nalgebra
///
/// All matrices are used with column vectors (`clip = m * p`), so "row i" of a
/// transform is `m.row(i)`. View and projection matrices are built directly
/// from basis vectors; nothing in the pipeline needs a general inverse.
use nalgebra::{Matrix4, Vector2, Vector3, Vector4};

pub const SMALL_EPSILON: f32 = 0.000_001;
pub const DEFAULT_EPSILON: f32 = 0.000_01;
pub const LARGE_EPSILON: f32 = 0.000_1;

/// Depth-axis convention shared by view matrices, projection matrices and
/// everything derived from them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Handedness {
    /// Camera looks down +Z in view space.
    Left,
    /// Camera looks down -Z in view space (forward basis row is negated).
    Right,
}

/// Process-wide convention. Mixing conventions between the camera and the
/// frustum produces inverted geometry, so everything reads this one value.
pub const HANDEDNESS: Handedness = Handedness::Right;

pub fn is_zero(value: f32, epsilon: f32) -> bool {
    value.abs() <= epsilon
}

pub fn is_equal(lhs: f32, rhs: f32, epsilon: f32) -> bool {
    (lhs - rhs).abs() <= epsilon
}

pub fn is_normalized(v: &Vector3<f32>) -> bool {
    is_equal(v.norm(), 1.0, DEFAULT_EPSILON)
}

pub fn radians(degrees: f32) -> f32 {
    degrees.to_radians()
}

pub fn degrees(radians: f32) -> f32 {
    radians.to_degrees()
}

/// First three components of row `i`.
pub fn row3(m: &Matrix4<f32>, i: usize) -> Vector3<f32> {
    Vector3::new(m[(i, 0)], m[(i, 1)], m[(i, 2)])
}

pub fn row4(m: &Matrix4<f32>, i: usize) -> Vector4<f32> {
    Vector4::new(m[(i, 0)], m[(i, 1)], m[(i, 2)], m[(i, 3)])
}

pub fn set_row4(m: &mut Matrix4<f32>, i: usize, row: &Vector4<f32>) {
    for j in 0..4 {
        m[(i, j)] = row[j];
    }
}

pub fn translate(offset: &Vector3<f32>) -> Matrix4<f32> {
    Matrix4::new_translation(offset)
}

pub fn scale(factors: &Vector3<f32>) -> Matrix4<f32> {
    Matrix4::new_nonuniform_scaling(factors)
}

#[rustfmt::skip]
pub fn rotate_x(angle: f32) -> Matrix4<f32> {
    let (s, c) = angle.sin_cos();
    Matrix4::new(
        1.0, 0.0, 0.0, 0.0,
        0.0, c, -s, 0.0,
        0.0, s, c, 0.0,
        0.0, 0.0, 0.0, 1.0,
    )
}

#[rustfmt::skip]
pub fn rotate_y(angle: f32) -> Matrix4<f32> {
    let (s, c) = angle.sin_cos();
    Matrix4::new(
        c, 0.0, s, 0.0,
        0.0, 1.0, 0.0, 0.0,
        -s, 0.0, c, 0.0,
        0.0, 0.0, 0.0, 1.0,
    )
}

#[rustfmt::skip]
pub fn rotate_z(angle: f32) -> Matrix4<f32> {
    let (s, c) = angle.sin_cos();
    Matrix4::new(
        c, -s, 0.0, 0.0,
        s, c, 0.0, 0.0,
        0.0, 0.0, 1.0, 0.0,
        0.0, 0.0, 0.0, 1.0,
    )
}

/// Build a "look" matrix from a world position and an orthonormal basis.
///
/// `forward` is the direction the camera looks at in world space. Under
/// [`Handedness::Right`] the forward row is negated so visible points end up
/// with negative view-space z.
#[rustfmt::skip]
pub fn view_matrix(
    position: &Vector3<f32>,
    right: &Vector3<f32>,
    up: &Vector3<f32>,
    forward: &Vector3<f32>,
    handedness: Handedness,
) -> Matrix4<f32> {
    debug_assert!(is_normalized(right), "right basis is not normalized");
    debug_assert!(is_normalized(up), "up basis is not normalized");
    debug_assert!(is_normalized(forward), "forward basis is not normalized");

    let forward = match handedness {
        Handedness::Left => *forward,
        Handedness::Right => -*forward,
    };

    Matrix4::new(
        right.x, right.y, right.z, -position.dot(right),
        up.x, up.y, up.z, -position.dot(up),
        forward.x, forward.y, forward.z, -position.dot(&forward),
        0.0, 0.0, 0.0, 1.0,
    )
}

/// Symmetric perspective projection mapping view depth `[near, far]` to
/// clip `z` in `[-w, w]`.
#[rustfmt::skip]
pub fn perspective(
    aspect_ratio: f32,
    fov: f32,
    near_z: f32,
    far_z: f32,
    handedness: Handedness,
) -> Matrix4<f32> {
    let fov_tan = (fov / 2.0).tan();
    let depth = far_z - near_z;
    let z_scale = (far_z + near_z) / depth;
    let z_offset = -2.0 * far_z * near_z / depth;

    // Which way view-space z has to point for a vertex to be in front
    let sign = match handedness {
        Handedness::Left => 1.0,
        Handedness::Right => -1.0,
    };

    Matrix4::new(
        1.0 / (aspect_ratio * fov_tan), 0.0, 0.0, 0.0,
        0.0, 1.0 / fov_tan, 0.0, 0.0,
        0.0, 0.0, sign * z_scale, z_offset,
        0.0, 0.0, sign, 0.0,
    )
}

/// Maps normalized device coordinates to pixels, y pointing down.
#[rustfmt::skip]
pub fn screen_space_matrix(size: &Vector2<f32>) -> Matrix4<f32> {
    let half_width = size.x / 2.0;
    let half_height = size.y / 2.0;

    Matrix4::new(
        half_width, 0.0, 0.0, half_width,
        0.0, -half_height, 0.0, half_height,
        0.0, 0.0, 1.0, 0.0,
        0.0, 0.0, 0.0, 1.0,
    )
}

/// Transform a point and apply the perspective divide.
pub fn project_point(m: &Matrix4<f32>, p: &Vector3<f32>) -> Vector3<f32> {
    let clip = m * p.push(1.0);
    clip.xyz() / clip.w
}

/// Transform a point by an affine matrix, ignoring the w row.
pub fn transform_point(m: &Matrix4<f32>, p: &Vector3<f32>) -> Vector3<f32> {
    (m * p.push(1.0)).xyz()
}

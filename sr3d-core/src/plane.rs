/// Half-space planes used by the frustum and the clipper
use nalgebra::Vector3;

use crate::math::{self, LARGE_EPSILON};

/// The set of points `p` with `normal · p == distance`.
///
/// The half-space kept by the clipper is where [`Plane::distance_to`] is
/// non-negative; a point exactly on the plane counts as inside.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    normal: Vector3<f32>,
    distance: f32,
}

/// Where a line or ray meets a plane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Intersection {
    /// Multiple of the direction at which the plane is hit.
    pub t: f32,
    pub point: Vector3<f32>,
}

impl Plane {
    /// Plane through `point`. `normal` must already be unit length.
    pub fn new(normal: Vector3<f32>, point: &Vector3<f32>) -> Self {
        debug_assert!(math::is_normalized(&normal), "plane normal is not normalized");
        Self {
            normal,
            distance: normal.dot(point),
        }
    }

    pub fn from_normal_distance(normal: Vector3<f32>, distance: f32) -> Self {
        debug_assert!(math::is_normalized(&normal), "plane normal is not normalized");
        Self { normal, distance }
    }

    pub fn normal(&self) -> &Vector3<f32> {
        &self.normal
    }

    pub fn distance(&self) -> f32 {
        self.distance
    }

    /// Signed distance, positive on the side the normal points to.
    pub fn distance_to(&self, p: &Vector3<f32>) -> f32 {
        self.normal.dot(p) - self.distance
    }

    pub fn is_inside(&self, p: &Vector3<f32>) -> bool {
        self.distance_to(p) >= 0.0
    }

    pub fn is_outside(&self, p: &Vector3<f32>) -> bool {
        self.distance_to(p) < 0.0
    }

    /// Intersect the infinite line `start + t * direction`.
    ///
    /// Returns `None` only when the direction is parallel to the plane, even
    /// if the line lies inside it.
    pub fn intersect_ray(&self, start: &Vector3<f32>, direction: &Vector3<f32>) -> Option<Intersection> {
        let cos_alpha = self.normal.dot(direction);
        if cos_alpha == 0.0 {
            return None;
        }

        let t = (self.distance - self.normal.dot(start)) / cos_alpha;
        Some(Intersection {
            t,
            point: start + direction * t,
        })
    }

    /// Intersect the segment `p1..=p2`. The result exists only when the hit
    /// lies on the segment, i.e. `0 <= t <= 1`.
    pub fn intersect_line(&self, p1: &Vector3<f32>, p2: &Vector3<f32>) -> Option<Intersection> {
        self.intersect_ray(p1, &(p2 - p1))
            .filter(|hit| (0.0..=1.0).contains(&hit.t))
    }

    pub fn flip(&mut self) {
        self.normal = -self.normal;
        self.distance = -self.distance;
    }

    /// Common point of three planes (Cramer's rule).
    ///
    /// Planes that are parallel or nearly so have no single common point and
    /// give `None`.
    pub fn intersect(p1: &Plane, p2: &Plane, p3: &Plane) -> Option<Vector3<f32>> {
        let (n1, n2, n3) = (&p1.normal, &p2.normal, &p3.normal);

        let n2_cross_n3 = n2.cross(n3);
        let det = n1.dot(&n2_cross_n3);

        if math::is_zero(det, LARGE_EPSILON) {
            return None;
        }

        Some(
            (n2_cross_n3 * p1.distance + n3.cross(n1) * p2.distance + n1.cross(n2) * p3.distance)
                / det,
        )
    }
}

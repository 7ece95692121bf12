/// Frustum: six clipping planes extracted from a view-projection matrix
///
/// Every plane faces inward, so a point is inside the frustum when
/// `Plane::is_inside` holds for all six of them. No post-extraction
/// inversion is needed by the clip pipeline.
use nalgebra::{Matrix4, Vector3};

use crate::error::{Error, Result};
use crate::math;
use crate::plane::Plane;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlaneKind {
    Near,
    Far,
    Left,
    Right,
    Top,
    Bottom,
}

impl PlaneKind {
    pub const ALL: [PlaneKind; 6] = [
        PlaneKind::Near,
        PlaneKind::Far,
        PlaneKind::Left,
        PlaneKind::Right,
        PlaneKind::Top,
        PlaneKind::Bottom,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    // Clip-space row and the sign it is combined with row 3:
    // plane = row3 + sign * row
    fn extraction_row(self) -> (usize, f32) {
        match self {
            PlaneKind::Left => (0, 1.0),
            PlaneKind::Right => (0, -1.0),
            PlaneKind::Bottom => (1, 1.0),
            PlaneKind::Top => (1, -1.0),
            PlaneKind::Near => (2, 1.0),
            PlaneKind::Far => (2, -1.0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Corner {
    NearTopLeft,
    NearTopRight,
    NearBottomLeft,
    NearBottomRight,
    FarTopLeft,
    FarTopRight,
    FarBottomLeft,
    FarBottomRight,
}

impl Corner {
    pub const ALL: [Corner; 8] = [
        Corner::NearTopLeft,
        Corner::NearTopRight,
        Corner::NearBottomLeft,
        Corner::NearBottomRight,
        Corner::FarTopLeft,
        Corner::FarTopRight,
        Corner::FarBottomLeft,
        Corner::FarBottomRight,
    ];

    /// The twelve edges of the frustum box, as corner pairs.
    pub const EDGES: [(Corner, Corner); 12] = [
        (Corner::NearTopLeft, Corner::NearTopRight),
        (Corner::NearTopRight, Corner::NearBottomRight),
        (Corner::NearBottomRight, Corner::NearBottomLeft),
        (Corner::NearBottomLeft, Corner::NearTopLeft),
        (Corner::FarTopLeft, Corner::FarTopRight),
        (Corner::FarTopRight, Corner::FarBottomRight),
        (Corner::FarBottomRight, Corner::FarBottomLeft),
        (Corner::FarBottomLeft, Corner::FarTopLeft),
        (Corner::NearTopLeft, Corner::FarTopLeft),
        (Corner::NearTopRight, Corner::FarTopRight),
        (Corner::NearBottomLeft, Corner::FarBottomLeft),
        (Corner::NearBottomRight, Corner::FarBottomRight),
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    /// Depth, vertical and horizontal plane meeting at this corner.
    pub fn planes(self) -> [PlaneKind; 3] {
        use PlaneKind::*;
        match self {
            Corner::NearTopLeft => [Near, Top, Left],
            Corner::NearTopRight => [Near, Top, Right],
            Corner::NearBottomLeft => [Near, Bottom, Left],
            Corner::NearBottomRight => [Near, Bottom, Right],
            Corner::FarTopLeft => [Far, Top, Left],
            Corner::FarTopRight => [Far, Top, Right],
            Corner::FarBottomLeft => [Far, Bottom, Left],
            Corner::FarBottomRight => [Far, Bottom, Right],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frustum {
    planes: [Plane; 6],
}

impl Frustum {
    /// Gribb & Hartmann extraction.
    ///
    /// For a clip-space point `c = m * p` the frustum is `-w <= x, y, z <= w`,
    /// so each bound is the half-space `(row3 ± row_i) · p >= 0`. The
    /// resulting `[a, b, c, d]` gives normal `(a, b, c)` and distance `-d`,
    /// both divided by the normal length.
    pub fn from_view_projection(m: &Matrix4<f32>) -> Self {
        let row3 = math::row4(m, 3);

        let planes = PlaneKind::ALL.map(|kind| {
            let (row, sign) = kind.extraction_row();
            let v = row3 + math::row4(m, row) * sign;

            let normal = v.xyz();
            let length = normal.norm();
            debug_assert!(length > 0.0, "degenerate view-projection matrix");

            Plane::from_normal_distance(normal / length, -v.w / length)
        });

        Self { planes }
    }

    pub fn planes(&self) -> &[Plane; 6] {
        &self.planes
    }

    pub fn plane(&self, kind: PlaneKind) -> &Plane {
        &self.planes[kind.index()]
    }

    /// Flip every plane, turning "inside" into "outside".
    pub fn invert(&mut self) {
        for plane in &mut self.planes {
            plane.flip();
        }
    }

    pub fn contains(&self, p: &Vector3<f32>) -> bool {
        self.planes.iter().all(|plane| plane.is_inside(p))
    }

    /// The eight corners, indexed by [`Corner::index`].
    ///
    /// A well-formed camera always produces all eight; a missing corner means
    /// the camera configuration is broken and is reported as an error.
    pub fn corner_points(&self) -> Result<[Vector3<f32>; 8]> {
        let mut corners = [Vector3::zeros(); 8];

        for corner in Corner::ALL {
            let [a, b, c] = corner.planes().map(|kind| self.plane(kind));
            corners[corner.index()] = Plane::intersect(a, b, c).ok_or(Error::DegenerateFrustum)?;
        }

        Ok(corners)
    }
}

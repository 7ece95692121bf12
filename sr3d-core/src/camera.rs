/// Camera: an object with a perspective projection
use log::debug;
use nalgebra::{Matrix4, Vector2, Vector3};

use crate::error::{Error, Result};
use crate::frustum::Frustum;
use crate::math::{self, HANDEDNESS};
use crate::object::{Object, ObjectLookup};

const DEFAULT_FOV_DEGREES: f32 = 55.0;
const DEFAULT_NEAR_Z: f32 = 0.1;
const DEFAULT_FAR_Z: f32 = 100.0;

/// Camera configuration for 3D rendering.
///
/// The projection matrix is cached: every setter that can change it marks it
/// dirty and [`Camera::compute_projection_matrix`] rebuilds it on the next
/// call. The view matrix is cheap and always derived from the current
/// transform.
#[derive(Debug, Clone)]
pub struct Camera {
    object: Object,
    fov: f32,
    near_z: f32,
    far_z: f32,
    aspect_ratio: f32,
    attach_distance: Option<f32>,
    projection_matrix: Matrix4<f32>,
    projection_dirty: bool,
}

impl Camera {
    pub fn new(aspect_ratio: f32) -> Result<Self> {
        let mut camera = Self::default();
        camera.set_aspect_ratio(aspect_ratio)?;
        Ok(camera)
    }

    pub fn object(&self) -> &Object {
        &self.object
    }

    pub fn object_mut(&mut self) -> &mut Object {
        &mut self.object
    }

    pub fn rotation_angles(&self) -> &Vector2<f32> {
        self.object.rotation_angles()
    }

    pub fn set_rotation_angles(&mut self, angles: Vector2<f32>) {
        self.object.set_rotation_angles(angles);
    }

    pub fn direction(&self) -> &Vector3<f32> {
        self.object.direction()
    }

    pub fn world_position(&self, objects: &impl ObjectLookup) -> Vector3<f32> {
        self.object.world_position(objects)
    }

    /// Field of view in radians.
    pub fn fov(&self) -> f32 {
        self.fov
    }

    pub fn set_fov(&mut self, fov: f32) -> Result<()> {
        if !fov.is_finite() || fov <= 0.0 || fov >= std::f32::consts::PI {
            return Err(Error::InvalidCamera { parameter: "fov", value: fov });
        }
        self.fov = fov;
        self.projection_dirty = true;
        Ok(())
    }

    pub fn near_z(&self) -> f32 {
        self.near_z
    }

    pub fn set_near_z(&mut self, near_z: f32) -> Result<()> {
        if !near_z.is_finite() || near_z <= 0.0 || near_z >= self.far_z {
            return Err(Error::InvalidCamera { parameter: "near_z", value: near_z });
        }
        self.near_z = near_z;
        self.projection_dirty = true;
        Ok(())
    }

    pub fn far_z(&self) -> f32 {
        self.far_z
    }

    pub fn set_far_z(&mut self, far_z: f32) -> Result<()> {
        if !far_z.is_finite() || far_z <= 0.0 || far_z <= self.near_z {
            return Err(Error::InvalidCamera { parameter: "far_z", value: far_z });
        }
        self.far_z = far_z;
        self.projection_dirty = true;
        Ok(())
    }

    /// Set both clip distances at once, so a range that does not overlap the
    /// current one can be applied without tripping the near < far check.
    pub fn set_clip_range(&mut self, near_z: f32, far_z: f32) -> Result<()> {
        if !near_z.is_finite() || near_z <= 0.0 {
            return Err(Error::InvalidCamera { parameter: "near_z", value: near_z });
        }
        if !far_z.is_finite() || far_z <= near_z {
            return Err(Error::InvalidCamera { parameter: "far_z", value: far_z });
        }
        self.near_z = near_z;
        self.far_z = far_z;
        self.projection_dirty = true;
        Ok(())
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.aspect_ratio
    }

    pub fn set_aspect_ratio(&mut self, aspect_ratio: f32) -> Result<()> {
        if !aspect_ratio.is_finite() || aspect_ratio <= 0.0 {
            return Err(Error::InvalidCamera {
                parameter: "aspect_ratio",
                value: aspect_ratio,
            });
        }
        self.aspect_ratio = aspect_ratio;
        self.projection_dirty = true;
        Ok(())
    }

    /// Distance kept from the attachment target in follow mode.
    pub fn attach_distance(&self) -> Option<f32> {
        self.attach_distance
    }

    pub fn set_attach_distance(&mut self, distance: Option<f32>) -> Result<()> {
        if let Some(distance) = distance {
            if !distance.is_finite() || distance < 0.0 {
                return Err(Error::InvalidCamera {
                    parameter: "attach_distance",
                    value: distance,
                });
            }
        }
        self.attach_distance = distance;
        Ok(())
    }

    /// Per-tick update. In follow mode the camera sits `attach_distance`
    /// behind its target along the current view direction.
    pub fn update(&mut self, _ts: f32) {
        if let (true, Some(distance)) = (self.object.is_attached(), self.attach_distance) {
            let offset = -(self.object.direction() * distance);
            self.object.set_relative_position(offset);
        }
    }

    pub fn compute_view_matrix(&self, objects: &impl ObjectLookup) -> Matrix4<f32> {
        math::view_matrix(
            &self.object.world_position(objects),
            &self.object.right(),
            &self.object.up(),
            self.object.direction(),
            HANDEDNESS,
        )
    }

    pub fn compute_projection_matrix(&mut self) -> Matrix4<f32> {
        if self.projection_dirty {
            self.projection_matrix = math::perspective(
                self.aspect_ratio,
                self.fov,
                self.near_z,
                self.far_z,
                HANDEDNESS,
            );
            self.projection_dirty = false;
            debug!(
                "projection rebuilt: fov={:.1}° near={} far={} aspect={:.3}",
                math::degrees(self.fov),
                self.near_z,
                self.far_z,
                self.aspect_ratio
            );
        }
        self.projection_matrix
    }

    /// The cached projection, if no setter has invalidated it since the last
    /// [`Camera::compute_projection_matrix`].
    pub fn cached_projection_matrix(&self) -> Option<&Matrix4<f32>> {
        (!self.projection_dirty).then_some(&self.projection_matrix)
    }

    pub fn compute_view_projection_matrix(&mut self, objects: &impl ObjectLookup) -> Matrix4<f32> {
        self.compute_projection_matrix() * self.compute_view_matrix(objects)
    }

    pub fn compute_frustum(&mut self, objects: &impl ObjectLookup) -> Frustum {
        Frustum::from_view_projection(&self.compute_view_projection_matrix(objects))
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            object: Object::new(),
            fov: math::radians(DEFAULT_FOV_DEGREES),
            near_z: DEFAULT_NEAR_Z,
            far_z: DEFAULT_FAR_Z,
            aspect_ratio: 1.0,
            attach_distance: None,
            projection_matrix: Matrix4::identity(),
            projection_dirty: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::ObjectId;
    use slotmap::SlotMap;

    fn no_objects() -> SlotMap<ObjectId, Object> {
        SlotMap::with_key()
    }

    #[test]
    fn test_camera_creation() {
        let camera = Camera::new(800.0 / 600.0).unwrap();
        assert!((camera.aspect_ratio() - 800.0 / 600.0).abs() < 1e-6);
        assert!((math::degrees(camera.fov()) - 55.0).abs() < 1e-4);
        assert!(camera.cached_projection_matrix().is_none());
    }

    #[test]
    fn test_rejects_invalid_parameters() {
        let mut camera = Camera::default();
        assert!(camera.set_near_z(0.0).is_err());
        assert!(camera.set_near_z(-1.0).is_err());
        assert!(camera.set_near_z(f32::NAN).is_err());
        assert!(camera.set_near_z(500.0).is_err());
        assert!(camera.set_far_z(0.05).is_err());
        assert!(camera.set_far_z(-3.0).is_err());
        assert!(camera.set_fov(0.0).is_err());
        assert!(camera.set_fov(4.0).is_err());
        assert!(camera.set_aspect_ratio(0.0).is_err());
        assert!(camera.set_aspect_ratio(f32::INFINITY).is_err());
        assert!(camera.set_attach_distance(Some(-1.0)).is_err());
        assert!(Camera::new(0.0).is_err());

        // Nothing was changed by the rejected calls
        assert_eq!(camera.near_z(), DEFAULT_NEAR_Z);
        assert_eq!(camera.far_z(), DEFAULT_FAR_Z);

        camera.set_clip_range(200.0, 400.0).unwrap();
        assert_eq!((camera.near_z(), camera.far_z()), (200.0, 400.0));
    }

    #[test]
    fn test_projection_cache() {
        let mut camera = Camera::default();
        let first = camera.compute_projection_matrix();
        assert_eq!(camera.cached_projection_matrix(), Some(&first));

        camera.set_fov(math::radians(90.0)).unwrap();
        assert!(camera.cached_projection_matrix().is_none());

        let second = camera.compute_projection_matrix();
        assert_ne!(first, second);
        assert!((second[(1, 1)] - 1.0).abs() < 1e-5);

        // Rotating does not touch the projection
        camera.set_rotation_angles(Vector2::new(0.5, 0.2));
        assert!(camera.cached_projection_matrix().is_some());
    }

    #[test]
    fn test_view_matrix() {
        let objects = no_objects();
        let mut camera = Camera::default();
        camera.object_mut().set_relative_position(Vector3::new(0.0, 0.0, -5.0));

        let view = camera.compute_view_matrix(&objects);
        // A point straight ahead ends up on the view axis at its distance
        let p = math::transform_point(&view, &Vector3::new(0.0, 0.0, 5.0));
        assert!(p.xy().norm() < 1e-5);
        let expected_z = match HANDEDNESS {
            math::Handedness::Right => -10.0,
            math::Handedness::Left => 10.0,
        };
        assert!((p.z - expected_z).abs() < 1e-5);
    }

    #[test]
    fn test_point_ahead_projects_to_center() {
        let objects = no_objects();
        let mut camera = Camera::new(16.0 / 9.0).unwrap();
        camera.set_rotation_angles(Vector2::new(math::radians(30.0), math::radians(-10.0)));

        let ahead = camera.direction() * 10.0;
        let vp = camera.compute_view_projection_matrix(&objects);
        let ndc = math::project_point(&vp, &ahead);
        assert!(ndc.xy().norm() < 1e-4);
        assert!(ndc.z > -1.0 && ndc.z < 1.0);
    }

    #[test]
    fn test_follow_mode_update() {
        let mut objects = no_objects();
        let target = objects.insert(Object::with_position(Vector3::new(3.0, 0.0, 3.0)));

        let mut camera = Camera::default();
        camera.object_mut().attach_to(target, &objects).unwrap();
        camera.set_attach_distance(Some(4.0)).unwrap();
        camera.set_rotation_angles(Vector2::new(math::radians(90.0), 0.0));
        camera.update(0.016);

        let position = camera.world_position(&objects);
        assert!((position - Vector3::new(-1.0, 0.0, 3.0)).norm() < 1e-5);
        assert!(((position - objects[target].relative_position()).norm() - 4.0).abs() < 1e-5);
    }

    #[test]
    fn test_update_without_attachment_keeps_position() {
        let mut camera = Camera::default();
        camera.object_mut().set_relative_position(Vector3::new(1.0, 2.0, 3.0));
        camera.set_attach_distance(Some(4.0)).unwrap();
        camera.update(0.016);
        assert_eq!(*camera.object().relative_position(), Vector3::new(1.0, 2.0, 3.0));
    }
}

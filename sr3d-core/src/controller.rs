/// First-person camera controller
use nalgebra::{Vector2, Vector3};

use crate::camera::Camera;
use crate::math;

/// Rotation per unit of pointer movement, before sensitivity.
const LOOK_STEP_DEGREES: f32 = 3.0 / 25.0;

/// Which movement inputs are held during a tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Movement {
    pub forward: bool,
    pub backward: bool,
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
    pub fast: bool,
}

impl Movement {
    pub fn is_idle(&self) -> bool {
        !(self.forward || self.backward || self.left || self.right || self.up || self.down)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CameraController {
    pub mouse_sensitivity: f32,
    /// World units per second.
    pub move_speed: f32,
    pub fast_multiplier: f32,
    pub movement: Movement,
}

impl Default for CameraController {
    fn default() -> Self {
        Self {
            mouse_sensitivity: 1.0,
            move_speed: 2.0,
            fast_multiplier: 3.0,
            movement: Movement::default(),
        }
    }
}

impl CameraController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Turn the camera by a pointer offset. Positive `x` turns right,
    /// positive `y` (screen down) looks down.
    pub fn handle_mouse_movement(&self, camera: &mut Camera, x_offset: f32, y_offset: f32) {
        let step = math::radians(LOOK_STEP_DEGREES) * self.mouse_sensitivity;
        let delta = Vector2::new(x_offset, -y_offset) * step;
        camera.object_mut().rotate_by(&delta);
    }

    /// Move the camera according to the held inputs. Forward follows the
    /// full view direction; strafing stays horizontal.
    pub fn update(&self, ts: f32, camera: &mut Camera) {
        if self.movement.is_idle() {
            return;
        }

        let direction = *camera.direction();
        let strafe = Vector3::new(direction.z, 0.0, -direction.x)
            .try_normalize(math::SMALL_EPSILON)
            .unwrap_or_else(Vector3::zeros);

        let mut offset = Vector3::zeros();
        if self.movement.forward {
            offset += direction;
        }
        if self.movement.backward {
            offset -= direction;
        }
        if self.movement.right {
            offset += strafe;
        }
        if self.movement.left {
            offset -= strafe;
        }
        if self.movement.up {
            offset += Vector3::y();
        }
        if self.movement.down {
            offset -= Vector3::y();
        }

        if math::is_zero(offset.norm(), math::SMALL_EPSILON) {
            return;
        }

        offset *= self.move_speed * ts;
        if self.movement.fast {
            offset *= self.fast_multiplier;
        }

        camera.object_mut().move_by(&offset);
    }
}

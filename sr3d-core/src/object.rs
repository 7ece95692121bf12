/// Transform nodes: position, yaw/pitch rotation and parent attachment
use nalgebra::{Matrix4, Vector2, Vector3};
use slotmap::SlotMap;

use crate::error::{Error, Result};
use crate::math;

slotmap::new_key_type! {
    /// Stable handle of an object stored in a [`crate::World`].
    pub struct ObjectId;
}

/// Resolves attachment links. Parents are never owned by their children,
/// they are looked up by id every time a world position is needed.
pub trait ObjectLookup {
    fn object(&self, id: ObjectId) -> Option<&Object>;
}

impl ObjectLookup for SlotMap<ObjectId, Object> {
    fn object(&self, id: ObjectId) -> Option<&Object> {
        self.get(id)
    }
}

/// How pitch is limited after wrapping into one turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PitchPolicy {
    /// Clamp to [-85°, 85°] so the view never flips over the pole.
    #[default]
    Clamp85,
    Free,
}

const PITCH_LIMIT_DEGREES: f32 = 85.0;

#[derive(Debug, Clone)]
pub struct Object {
    relative_position: Vector3<f32>,
    // (yaw, pitch) in radians
    rotation_angles: Vector2<f32>,
    rotation_matrix: Matrix4<f32>,
    direction: Vector3<f32>,
    pitch_policy: PitchPolicy,
    attached_to: Option<ObjectId>,
}

impl Object {
    pub fn new() -> Self {
        let mut object = Self {
            relative_position: Vector3::zeros(),
            rotation_angles: Vector2::zeros(),
            rotation_matrix: Matrix4::identity(),
            direction: Vector3::z(),
            pitch_policy: PitchPolicy::default(),
            attached_to: None,
        };
        object.update_rotation();
        object
    }

    pub fn with_position(position: Vector3<f32>) -> Self {
        let mut object = Self::new();
        object.relative_position = position;
        object
    }

    /// Position relative to the parent, or absolute when detached.
    pub fn relative_position(&self) -> &Vector3<f32> {
        &self.relative_position
    }

    pub fn set_relative_position(&mut self, position: Vector3<f32>) {
        self.relative_position = position;
    }

    pub fn move_by(&mut self, offset: &Vector3<f32>) {
        self.relative_position += offset;
    }

    /// Walks the attachment chain. A parent that no longer resolves ends the
    /// walk as if the chain were rooted there.
    pub fn world_position(&self, objects: &impl ObjectLookup) -> Vector3<f32> {
        self.relative_position + Self::chain_offset(self.attached_to, objects)
    }

    pub fn set_world_position(&mut self, position: Vector3<f32>, objects: &impl ObjectLookup) {
        self.relative_position = position - Self::chain_offset(self.attached_to, objects);
    }

    fn chain_offset(mut parent: Option<ObjectId>, objects: &impl ObjectLookup) -> Vector3<f32> {
        let mut offset = Vector3::zeros();
        while let Some(id) = parent {
            match objects.object(id) {
                Some(object) => {
                    offset += object.relative_position;
                    parent = object.attached_to;
                }
                None => break,
            }
        }
        offset
    }

    pub fn rotation_angles(&self) -> &Vector2<f32> {
        &self.rotation_angles
    }

    /// Set (yaw, pitch) in radians. Both are wrapped into one turn, pitch is
    /// then limited by the pitch policy, and the rotation matrix and forward
    /// direction are rebuilt before returning.
    pub fn set_rotation_angles(&mut self, angles: Vector2<f32>) {
        let full_turn = math::radians(360.0);
        let yaw = angles.x % full_turn;
        let mut pitch = angles.y % full_turn;

        if self.pitch_policy == PitchPolicy::Clamp85 {
            let limit = math::radians(PITCH_LIMIT_DEGREES);
            pitch = pitch.clamp(-limit, limit);
        }

        self.rotation_angles = Vector2::new(yaw, pitch);
        self.update_rotation();
    }

    pub fn rotate_by(&mut self, delta: &Vector2<f32>) {
        self.set_rotation_angles(self.rotation_angles + delta);
    }

    pub fn pitch_policy(&self) -> PitchPolicy {
        self.pitch_policy
    }

    pub fn set_pitch_policy(&mut self, policy: PitchPolicy) {
        self.pitch_policy = policy;
        self.set_rotation_angles(self.rotation_angles);
    }

    pub fn rotation_matrix(&self) -> &Matrix4<f32> {
        &self.rotation_matrix
    }

    /// Forward basis vector (row 2 of the rotation matrix).
    pub fn direction(&self) -> &Vector3<f32> {
        &self.direction
    }

    pub fn right(&self) -> Vector3<f32> {
        math::row3(&self.rotation_matrix, 0)
    }

    pub fn up(&self) -> Vector3<f32> {
        math::row3(&self.rotation_matrix, 1)
    }

    fn update_rotation(&mut self) {
        let yaw = self.rotation_angles.x;
        let pitch = self.rotation_angles.y;
        self.rotation_matrix = math::rotate_x(pitch) * math::rotate_y(-yaw);
        self.direction = math::row3(&self.rotation_matrix, 2);
    }

    pub fn attached_to(&self) -> Option<ObjectId> {
        self.attached_to
    }

    pub fn is_attached(&self) -> bool {
        self.attached_to.is_some()
    }

    /// Attach to `parent`, keeping the current world position.
    ///
    /// Objects stored in a [`crate::World`] go through
    /// [`crate::World::attach`], which also rejects self-attachment and
    /// cycles before calling this.
    pub fn attach_to(&mut self, parent: ObjectId, objects: &impl ObjectLookup) -> Result<()> {
        let parent_object = objects.object(parent).ok_or(Error::UnknownObject)?;
        let parent_position = parent_object.world_position(objects);
        let world_position = self.world_position(objects);

        self.relative_position = world_position - parent_position;
        self.attached_to = Some(parent);
        Ok(())
    }

    /// Detach from the parent, keeping the current world position.
    pub fn detach(&mut self, objects: &impl ObjectLookup) -> Result<()> {
        if self.attached_to.is_none() {
            return Err(Error::NotAttached);
        }

        self.relative_position = self.world_position(objects);
        self.attached_to = None;
        Ok(())
    }

    /// Local-to-world transform: rotate so local +Z follows the forward
    /// direction, then translate to the world position.
    pub fn model_matrix(&self, objects: &impl ObjectLookup) -> Matrix4<f32> {
        math::translate(&self.world_position(objects)) * self.rotation_matrix.transpose()
    }
}

impl Default for Object {
    fn default() -> Self {
        Self::new()
    }
}

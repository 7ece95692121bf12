/// Scene container: rigid bodies and the attachment graph between them
use std::rc::Rc;

use log::debug;
use nalgebra::{Vector2, Vector3};
use slotmap::SlotMap;

use crate::color::Color;
use crate::error::{Error, Result};
use crate::mesh::Mesh;
use crate::object::{Object, ObjectId, ObjectLookup};

/// A drawable object: a transform node plus a shared mesh.
#[derive(Debug, Clone)]
pub struct RigidBody {
    object: Object,
    mesh: Rc<Mesh>,
    pub visible: bool,
    /// Overrides the mesh's vertex colours when set.
    pub color: Option<Color>,
    /// (yaw, pitch) change in radians per second, applied by `World::update`.
    pub rotation_velocity: Vector2<f32>,
}

impl RigidBody {
    pub fn new(mesh: Rc<Mesh>) -> Self {
        Self {
            object: Object::new(),
            mesh,
            visible: true,
            color: None,
            rotation_velocity: Vector2::zeros(),
        }
    }

    pub fn with_position(mut self, position: Vector3<f32>) -> Self {
        self.object.set_relative_position(position);
        self
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = Some(color);
        self
    }

    pub fn with_rotation_velocity(mut self, velocity: Vector2<f32>) -> Self {
        self.rotation_velocity = velocity;
        self
    }

    pub fn object(&self) -> &Object {
        &self.object
    }

    /// Direct access to the transform. Attachment changes should go through
    /// [`World::attach`] and [`World::detach`] so cycles are caught.
    pub fn object_mut(&mut self) -> &mut Object {
        &mut self.object
    }

    pub fn mesh(&self) -> &Rc<Mesh> {
        &self.mesh
    }

    pub fn set_mesh(&mut self, mesh: Rc<Mesh>) {
        self.mesh = mesh;
    }
}

#[derive(Debug, Default)]
pub struct World {
    bodies: SlotMap<ObjectId, RigidBody>,
}

impl ObjectLookup for World {
    fn object(&self, id: ObjectId) -> Option<&Object> {
        self.bodies.get(id).map(|body| &body.object)
    }
}

impl World {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, body: RigidBody) -> ObjectId {
        let id = self.bodies.insert(body);
        debug!("body {id:?} added");
        id
    }

    /// Remove a body. Bodies attached to it are detached first and keep
    /// their world positions.
    pub fn remove(&mut self, id: ObjectId) -> Result<RigidBody> {
        if !self.bodies.contains_key(id) {
            return Err(Error::UnknownObject);
        }

        let children: Vec<ObjectId> = self
            .bodies
            .iter()
            .filter(|(_, body)| body.object.attached_to() == Some(id))
            .map(|(child, _)| child)
            .collect();
        for child in children {
            self.detach(child)?;
        }

        let body = self.bodies.remove(id).ok_or(Error::UnknownObject)?;
        debug!("body {id:?} removed");
        Ok(body)
    }

    pub fn get(&self, id: ObjectId) -> Option<&RigidBody> {
        self.bodies.get(id)
    }

    pub fn get_mut(&mut self, id: ObjectId) -> Option<&mut RigidBody> {
        self.bodies.get_mut(id)
    }

    pub fn contains(&self, id: ObjectId) -> bool {
        self.bodies.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ObjectId, &RigidBody)> {
        self.bodies.iter()
    }

    pub fn ids(&self) -> impl Iterator<Item = ObjectId> + '_ {
        self.bodies.keys()
    }

    pub fn world_position(&self, id: ObjectId) -> Result<Vector3<f32>> {
        let body = self.bodies.get(id).ok_or(Error::UnknownObject)?;
        Ok(body.object.world_position(self))
    }

    /// Attach `child` to `parent`, keeping the child's world position.
    pub fn attach(&mut self, child: ObjectId, parent: ObjectId) -> Result<()> {
        if child == parent {
            return Err(Error::SelfAttach);
        }
        if !self.bodies.contains_key(child) || !self.bodies.contains_key(parent) {
            return Err(Error::UnknownObject);
        }

        // Walking up from the new parent must not reach the child
        let mut ancestor = Some(parent);
        while let Some(id) = ancestor {
            if id == child {
                return Err(Error::AttachmentCycle);
            }
            ancestor = self.bodies.get(id).and_then(|body| body.object.attached_to());
        }

        let mut object = self.bodies[child].object.clone();
        object.attach_to(parent, self)?;
        self.bodies[child].object = object;

        debug!("body {child:?} attached to {parent:?}");
        Ok(())
    }

    /// Detach `child` from its parent, keeping its world position.
    pub fn detach(&mut self, child: ObjectId) -> Result<()> {
        let mut object = self.bodies.get(child).ok_or(Error::UnknownObject)?.object.clone();
        object.detach(self)?;
        self.bodies[child].object = object;

        debug!("body {child:?} detached");
        Ok(())
    }

    /// Advance every body's rotation by its rotation velocity.
    pub fn update(&mut self, ts: f32) {
        for body in self.bodies.values_mut() {
            if body.rotation_velocity != Vector2::zeros() {
                let delta = body.rotation_velocity * ts;
                body.object.rotate_by(&delta);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::PitchPolicy;

    fn body_at(x: f32, y: f32, z: f32) -> RigidBody {
        RigidBody::new(Rc::new(Mesh::cube(1.0, Color::WHITE))).with_position(Vector3::new(x, y, z))
    }

    #[test]
    fn test_add_and_lookup() {
        let mut world = World::new();
        let a = world.add(body_at(1.0, 2.0, 3.0));
        assert_eq!(world.len(), 1);
        assert!(world.contains(a));
        assert_eq!(world.world_position(a).unwrap(), Vector3::new(1.0, 2.0, 3.0));
        assert!(world.object(a).is_some());
    }

    #[test]
    fn test_attach_rejects_self_and_cycles() {
        let mut world = World::new();
        let a = world.add(body_at(0.0, 0.0, 0.0));
        let b = world.add(body_at(1.0, 0.0, 0.0));
        let c = world.add(body_at(2.0, 0.0, 0.0));

        assert!(matches!(world.attach(a, a), Err(Error::SelfAttach)));

        world.attach(b, a).unwrap();
        world.attach(c, b).unwrap();
        assert!(matches!(world.attach(a, c), Err(Error::AttachmentCycle)));
        assert!(matches!(world.attach(a, b), Err(Error::AttachmentCycle)));

        // Positions are unchanged by attaching
        assert_eq!(world.world_position(c).unwrap(), Vector3::new(2.0, 0.0, 0.0));
        assert_eq!(world.get(c).unwrap().object().attached_to(), Some(b));
    }

    #[test]
    fn test_children_follow_parent() {
        let mut world = World::new();
        let parent = world.add(body_at(0.0, 0.0, 0.0));
        let child = world.add(body_at(0.0, 1.0, 0.0));
        world.attach(child, parent).unwrap();

        world.get_mut(parent).unwrap().object_mut().move_by(&Vector3::new(5.0, 0.0, 0.0));
        assert_eq!(world.world_position(child).unwrap(), Vector3::new(5.0, 1.0, 0.0));

        world.detach(child).unwrap();
        assert!(matches!(world.detach(child), Err(Error::NotAttached)));
        world.get_mut(parent).unwrap().object_mut().move_by(&Vector3::new(5.0, 0.0, 0.0));
        assert_eq!(world.world_position(child).unwrap(), Vector3::new(5.0, 1.0, 0.0));
    }

    #[test]
    fn test_remove_detaches_children() {
        let mut world = World::new();
        let parent = world.add(body_at(3.0, 0.0, 0.0));
        let child = world.add(body_at(3.0, 2.0, 0.0));
        world.attach(child, parent).unwrap();

        world.remove(parent).unwrap();
        assert!(!world.contains(parent));
        assert!(!world.get(child).unwrap().object().is_attached());
        assert_eq!(world.world_position(child).unwrap(), Vector3::new(3.0, 2.0, 0.0));

        assert!(matches!(world.remove(parent), Err(Error::UnknownObject)));
    }

    #[test]
    fn test_update_applies_rotation_velocity() {
        let mut world = World::new();
        let spinning = world.add(body_at(0.0, 0.0, 0.0).with_rotation_velocity(Vector2::new(1.0, 0.0)));
        let still = world.add(body_at(0.0, 0.0, 0.0));
        world.get_mut(spinning).unwrap().object_mut().set_pitch_policy(PitchPolicy::Free);

        world.update(0.5);
        world.update(0.25);

        let yaw = world.get(spinning).unwrap().object().rotation_angles().x;
        assert!((yaw - 0.75).abs() < 1e-6);
        assert_eq!(*world.get(still).unwrap().object().rotation_angles(), Vector2::zeros());
    }
}

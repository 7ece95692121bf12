/// Frame assembly: cameras, world and the per-frame draw list
use std::rc::Rc;

use log::{debug, trace};
use nalgebra::{Matrix4, Vector2, Vector3};
use slotmap::SlotMap;

use crate::camera::Camera;
use crate::clip::{self, Triangle3};
use crate::color::Color;
use crate::draw_list::DrawList;
use crate::error::{Error, Result};
use crate::frustum::{Corner, Frustum};
use crate::math;
use crate::mesh::Mesh;
use crate::object::ObjectId;
use crate::settings::Settings;
use crate::viewport::Viewport;
use crate::world::{RigidBody, World};

slotmap::new_key_type! {
    pub struct CameraId;
}

// Ground grid: a net in the y = GRID_Y plane spanning (x, z) from MIN to MAX
const GRID_MIN: (f32, f32) = (-10.0, 0.1);
const GRID_MAX: (f32, f32) = (10.0, 10.1);
const GRID_Y: f32 = -0.2;
const GRID_DIVISIONS: usize = 20;

/// Counters for the last drawn frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// Faces of visible bodies considered.
    pub faces: usize,
    pub culled: usize,
    /// Faces entirely outside the frustum.
    pub clipped_away: usize,
    /// Faces cut by at least one plane.
    pub clipped: usize,
    pub triangles: usize,
    pub lines: usize,
}

struct QueuedTriangle {
    depth: f32,
    points: [Vector2<f32>; 3],
    color: Color,
    outline: Option<Color>,
}

/// What the active camera sees this frame.
struct FrameView {
    eye: Vector3<f32>,
    frustum: Frustum,
    // World space to screen pixels
    to_screen: Matrix4<f32>,
}

/// Body output collected before painter sorting.
#[derive(Default)]
struct FrameQueue {
    triangles: Vec<QueuedTriangle>,
    normals: Vec<(Vector2<f32>, Vector2<f32>, Color)>,
}

pub struct Engine {
    world: World,
    cameras: SlotMap<CameraId, Camera>,
    // Always a key of `cameras`
    active_camera: CameraId,
    viewport: Viewport,
    settings: Settings,
    draw_list: DrawList,
    stats: FrameStats,
}

impl Engine {
    pub fn new(viewport: Viewport) -> Result<Self> {
        let mut cameras = SlotMap::with_key();
        let active_camera = cameras.insert(Camera::new(viewport.aspect_ratio())?);

        Ok(Self {
            world: World::new(),
            cameras,
            active_camera,
            viewport,
            settings: Settings::default(),
            draw_list: DrawList::new(),
            stats: FrameStats::default(),
        })
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn settings_mut(&mut self) -> &mut Settings {
        &mut self.settings
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    /// Change the output size and update every camera's aspect ratio.
    pub fn set_viewport(&mut self, viewport: Viewport) -> Result<()> {
        for camera in self.cameras.values_mut() {
            camera.set_aspect_ratio(viewport.aspect_ratio())?;
        }
        self.viewport = viewport;
        debug!("viewport {}x{}", viewport.width(), viewport.height());
        Ok(())
    }

    pub fn add_body(&mut self, body: RigidBody) -> ObjectId {
        self.world.add(body)
    }

    /// Convenience for `add_body` with a fresh body at `position`.
    pub fn add_mesh(&mut self, mesh: Rc<Mesh>, position: Vector3<f32>) -> ObjectId {
        self.world.add(RigidBody::new(mesh).with_position(position))
    }

    /// Remove a body. Cameras attached to it are detached where they stand.
    pub fn remove_body(&mut self, id: ObjectId) -> Result<RigidBody> {
        if !self.world.contains(id) {
            return Err(Error::UnknownObject);
        }

        for camera in self.cameras.values_mut() {
            if camera.object().attached_to() == Some(id) {
                camera.object_mut().detach(&self.world)?;
                camera.set_attach_distance(None)?;
            }
        }

        self.world.remove(id)
    }

    /// New camera at the active camera's position and orientation.
    pub fn create_camera(&mut self) -> Result<CameraId> {
        let active = self.active_camera();
        let position = active.world_position(&self.world);
        let angles = *active.rotation_angles();

        let mut camera = Camera::new(self.viewport.aspect_ratio())?;
        camera.set_fov(active.fov())?;
        camera.set_clip_range(active.near_z(), active.far_z())?;
        camera.object_mut().set_relative_position(position);
        camera.set_rotation_angles(angles);

        let id = self.cameras.insert(camera);
        debug!("camera {id:?} created");
        Ok(id)
    }

    /// Remove a camera. The last one cannot be removed; removing the active
    /// camera activates another.
    pub fn remove_camera(&mut self, id: CameraId) -> Result<Camera> {
        if !self.cameras.contains_key(id) {
            return Err(Error::UnknownCamera);
        }
        if self.cameras.len() == 1 {
            return Err(Error::LastCamera);
        }

        let camera = self.cameras.remove(id).ok_or(Error::UnknownCamera)?;
        if id == self.active_camera {
            self.active_camera = self.cameras.keys().next().ok_or(Error::LastCamera)?;
        }
        debug!("camera {id:?} removed");
        Ok(camera)
    }

    pub fn set_active_camera(&mut self, id: CameraId) -> Result<()> {
        if !self.cameras.contains_key(id) {
            return Err(Error::UnknownCamera);
        }
        self.active_camera = id;
        Ok(())
    }

    pub fn active_camera_id(&self) -> CameraId {
        self.active_camera
    }

    pub fn active_camera(&self) -> &Camera {
        &self.cameras[self.active_camera]
    }

    pub fn active_camera_mut(&mut self) -> &mut Camera {
        &mut self.cameras[self.active_camera]
    }

    pub fn camera(&self, id: CameraId) -> Option<&Camera> {
        self.cameras.get(id)
    }

    pub fn camera_mut(&mut self, id: CameraId) -> Option<&mut Camera> {
        self.cameras.get_mut(id)
    }

    pub fn camera_ids(&self) -> impl Iterator<Item = CameraId> + '_ {
        self.cameras.keys()
    }

    /// Attach a camera to a body. With a distance the camera follows the
    /// body from behind along its view direction; without one it keeps its
    /// current offset.
    pub fn attach_camera(&mut self, camera: CameraId, body: ObjectId, distance: Option<f32>) -> Result<()> {
        let camera = self.cameras.get_mut(camera).ok_or(Error::UnknownCamera)?;
        camera.object_mut().attach_to(body, &self.world)?;
        camera.set_attach_distance(distance)?;
        camera.update(0.0);
        Ok(())
    }

    pub fn detach_camera(&mut self, camera: CameraId) -> Result<()> {
        let camera = self.cameras.get_mut(camera).ok_or(Error::UnknownCamera)?;
        camera.object_mut().detach(&self.world)?;
        camera.set_attach_distance(None)
    }

    /// Advance body rotations, then let cameras follow their targets.
    pub fn update(&mut self, ts: f32) {
        self.world.update(ts);
        for camera in self.cameras.values_mut() {
            camera.update(ts);
        }
    }

    pub fn draw_list(&self) -> &DrawList {
        &self.draw_list
    }

    pub fn stats(&self) -> &FrameStats {
        &self.stats
    }

    /// Build the draw list for the active camera.
    ///
    /// Order: ground grid, body triangles from far to near with their
    /// outlines, face normals, then frustums of the other cameras.
    pub fn draw(&mut self) -> Result<&DrawList> {
        self.draw_list.clear();
        let mut stats = FrameStats::default();

        let camera = &mut self.cameras[self.active_camera];
        let view_projection = camera.compute_view_projection_matrix(&self.world);
        let view = FrameView {
            eye: camera.world_position(&self.world),
            frustum: Frustum::from_view_projection(&view_projection),
            to_screen: self.viewport.screen_space_matrix() * view_projection,
        };

        if self.settings.debug.grid.show {
            self.draw_grid(&view, &mut stats);
        }

        let mut queue = FrameQueue::default();
        for (_, body) in self.world.iter() {
            if !body.visible {
                continue;
            }
            self.queue_body(body, &view, &mut queue, &mut stats);
        }

        let FrameQueue { triangles: mut queued, normals } = queue;
        queued.sort_by(|a, b| b.depth.total_cmp(&a.depth));
        for triangle in &queued {
            let [p1, p2, p3] = triangle.points;
            self.draw_list.add_filled_triangle(p1, p2, p3, triangle.color);
            if let Some(outline) = triangle.outline {
                self.draw_list.add_triangle(p1, p2, p3, outline);
                stats.lines += 3;
            }
        }
        stats.triangles = queued.len();

        for (from, to, color) in normals {
            self.draw_list.add_line(from, to, color);
            stats.lines += 1;
        }

        if self.settings.debug.frustums.show {
            self.draw_frustums(&view, &mut stats)?;
        }

        trace!("frame: {stats:?}");
        self.stats = stats;
        Ok(&self.draw_list)
    }

    fn draw_grid(&mut self, view: &FrameView, stats: &mut FrameStats) {
        let color = self.settings.debug.grid.color;
        let (min_x, min_z) = GRID_MIN;
        let (max_x, max_z) = GRID_MAX;
        let step_x = (max_x - min_x) / GRID_DIVISIONS as f32;
        let step_z = (max_z - min_z) / GRID_DIVISIONS as f32;

        for line in 0..=GRID_DIVISIONS {
            let x = min_x + step_x * line as f32;
            let z = min_z + step_z * line as f32;

            let segments = [
                (Vector3::new(x, GRID_Y, min_z), Vector3::new(x, GRID_Y, max_z)),
                (Vector3::new(min_x, GRID_Y, z), Vector3::new(max_x, GRID_Y, z)),
            ];
            for (from, to) in segments {
                if let Some((from, to)) = clip::clip_line(from, to, &view.frustum) {
                    self.draw_list.add_line(project(&view.to_screen, &from), project(&view.to_screen, &to), color);
                    stats.lines += 1;
                }
            }
        }
    }

    fn queue_body(&self, body: &RigidBody, view: &FrameView, queue: &mut FrameQueue, stats: &mut FrameStats) {
        let FrameView { eye, frustum, to_screen } = view;
        let model = body.object().model_matrix(&self.world);
        let mesh = body.mesh();

        for face in mesh.faces() {
            stats.faces += 1;

            let triangle: Triangle3 = mesh
                .face_positions(face)
                .map(|p| math::transform_point(&model, &p));

            if self.settings.backface_culling && clip::is_back_facing(&triangle, eye) {
                stats.culled += 1;
                continue;
            }

            let mut color = body.color.unwrap_or_else(|| mesh.face_color(face));
            if self.settings.shading {
                color = color.scaled(clip::shade_factor(&triangle, eye));
            }

            let pieces = clip::clip_triangle(&triangle, frustum);
            if pieces.is_empty() {
                stats.clipped_away += 1;
                continue;
            }

            let was_clipped = pieces.len() != 1 || pieces[0] != triangle;
            let debug = if was_clipped {
                stats.clipped += 1;
                &self.settings.debug.clipped_triangle
            } else {
                &self.settings.debug.triangle
            };
            let outline = debug.outlines.show.then_some(debug.outlines.color);

            for piece in &pieces {
                queue.triangles.push(QueuedTriangle {
                    depth: (clip::centroid(piece) - eye).norm_squared(),
                    points: piece.map(|p| project(to_screen, &p)),
                    color,
                    outline,
                });
            }

            if debug.normals.show {
                if let Some(normal) = clip::face_normal(&triangle).try_normalize(math::SMALL_EPSILON) {
                    let start = clip::centroid(&triangle);
                    let end = start + normal * debug.normals.length;
                    if let Some((from, to)) = clip::clip_line(start, end, frustum) {
                        queue.normals.push((project(to_screen, &from), project(to_screen, &to), debug.normals.color));
                    }
                }
            }
        }
    }

    fn draw_frustums(&mut self, view: &FrameView, stats: &mut FrameStats) -> Result<()> {
        let color = self.settings.debug.frustums.color;

        for (id, camera) in self.cameras.iter_mut() {
            if id == self.active_camera {
                continue;
            }

            let corners = camera.compute_frustum(&self.world).corner_points()?;
            for (a, b) in Corner::EDGES {
                if let Some((from, to)) = clip::clip_line(corners[a.index()], corners[b.index()], &view.frustum) {
                    self.draw_list.add_line(project(&view.to_screen, &from), project(&view.to_screen, &to), color);
                    stats.lines += 1;
                }
            }
        }

        Ok(())
    }
}

fn project(to_screen: &Matrix4<f32>, p: &Vector3<f32>) -> Vector2<f32> {
    math::project_point(to_screen, p).xy()
}

/// SR3D Core Library - software transform and frustum clipping pipeline
///
/// This library takes meshes placed in a world, looks at them through a
/// perspective camera and produces a list of screen-space lines and
/// triangles for any 2D backend implementing [`Renderer`]. Geometry is
/// clipped against the six frustum planes in world space before projection,
/// so nothing behind the camera or outside the view ever reaches the
/// backend.

pub mod camera;
pub mod clip;
pub mod color;
pub mod controller;
pub mod draw_list;
pub mod engine;
pub mod error;
pub mod frustum;
pub mod math;
pub mod mesh;
pub mod obj;
pub mod object;
pub mod plane;
pub mod renderer;
pub mod settings;
pub mod viewport;
pub mod world;

// Re-export commonly used types
pub use camera::Camera;
pub use clip::{clip_line, clip_triangle, Triangle3};
pub use color::Color;
pub use controller::{CameraController, Movement};
pub use draw_list::{DrawList, Primitive, ScreenVertex};
pub use engine::{CameraId, Engine, FrameStats};
pub use error::{Error, Result};
pub use frustum::{Corner, Frustum, PlaneKind};
pub use mesh::{Face, Mesh, Vertex};
pub use object::{Object, ObjectId, ObjectLookup, PitchPolicy};
pub use plane::{Intersection, Plane};
pub use renderer::Renderer;
pub use settings::{DebugSettings, Settings};
pub use viewport::Viewport;
pub use world::{RigidBody, World};

/// Output surface description
use nalgebra::{Matrix4, Vector2};

use crate::error::{Error, Result};
use crate::math;

/// Size of the render target in pixels (or character cells).
///
/// `pixel_aspect` is the width of one cell divided by its height; terminal
/// cells are roughly twice as tall as they are wide, so a terminal viewport
/// uses 0.5.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    width: f32,
    height: f32,
    pixel_aspect: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Result<Self> {
        Self::with_pixel_aspect(width, height, 1.0)
    }

    pub fn with_pixel_aspect(width: f32, height: f32, pixel_aspect: f32) -> Result<Self> {
        let valid = |v: f32| v.is_finite() && v > 0.0;
        if !valid(width) || !valid(height) || !valid(pixel_aspect) {
            return Err(Error::InvalidViewport { width, height });
        }
        Ok(Self {
            width,
            height,
            pixel_aspect,
        })
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    pub fn pixel_aspect(&self) -> f32 {
        self.pixel_aspect
    }

    /// Aspect ratio of the picture as seen, fed to the camera projection.
    pub fn aspect_ratio(&self) -> f32 {
        self.width / self.height * self.pixel_aspect
    }

    pub fn screen_space_matrix(&self) -> Matrix4<f32> {
        math::screen_space_matrix(&Vector2::new(self.width, self.height))
    }
}

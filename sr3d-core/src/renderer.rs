/// Backend interface the draw list is submitted to
use nalgebra::Vector2;

use crate::color::Color;

/// A 2D rasterizer working in screen pixels, y pointing down.
///
/// Coordinates may fall outside the target; implementations clip or skip
/// what they cannot draw.
pub trait Renderer {
    fn draw_line(&mut self, p1: &Vector2<f32>, p2: &Vector2<f32>, color: Color);

    fn draw_triangle(&mut self, p1: &Vector2<f32>, p2: &Vector2<f32>, p3: &Vector2<f32>, color: Color);
}

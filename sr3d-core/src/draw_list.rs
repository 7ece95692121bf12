/// Screen-space primitives produced by one frame
use nalgebra::Vector2;

use crate::color::Color;
use crate::renderer::Renderer;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenVertex {
    pub position: Vector2<f32>,
    pub color: Color,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Primitive {
    Line([ScreenVertex; 2]),
    /// Filled triangle
    Triangle([ScreenVertex; 3]),
}

/// Ordered list of primitives. Submission preserves insertion order, so
/// later primitives paint over earlier ones.
#[derive(Debug, Clone, Default)]
pub struct DrawList {
    primitives: Vec<Primitive>,
}

impl DrawList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.primitives.clear();
    }

    pub fn primitives(&self) -> &[Primitive] {
        &self.primitives
    }

    pub fn len(&self) -> usize {
        self.primitives.len()
    }

    pub fn is_empty(&self) -> bool {
        self.primitives.is_empty()
    }

    pub fn add_primitive(&mut self, primitive: Primitive) {
        self.primitives.push(primitive);
    }

    pub fn add_line(&mut self, p1: Vector2<f32>, p2: Vector2<f32>, color: Color) {
        self.add_primitive(Primitive::Line([
            ScreenVertex { position: p1, color },
            ScreenVertex { position: p2, color },
        ]));
    }

    /// Triangle outline, as three lines.
    pub fn add_triangle(&mut self, p1: Vector2<f32>, p2: Vector2<f32>, p3: Vector2<f32>, color: Color) {
        self.add_line(p1, p2, color);
        self.add_line(p2, p3, color);
        self.add_line(p3, p1, color);
    }

    pub fn add_filled_triangle(&mut self, p1: Vector2<f32>, p2: Vector2<f32>, p3: Vector2<f32>, color: Color) {
        self.add_primitive(Primitive::Triangle([
            ScreenVertex { position: p1, color },
            ScreenVertex { position: p2, color },
            ScreenVertex { position: p3, color },
        ]));
    }

    pub fn submit(&self, renderer: &mut impl Renderer) {
        for primitive in &self.primitives {
            match primitive {
                Primitive::Line([a, b]) => renderer.draw_line(&a.position, &b.position, a.color),
                Primitive::Triangle([a, b, c]) => {
                    renderer.draw_triangle(&a.position, &b.position, &c.position, a.color)
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder {
        calls: Vec<String>,
    }

    impl Renderer for Recorder {
        fn draw_line(&mut self, p1: &Vector2<f32>, p2: &Vector2<f32>, _color: Color) {
            self.calls.push(format!("line {} {} {} {}", p1.x, p1.y, p2.x, p2.y));
        }

        fn draw_triangle(&mut self, p1: &Vector2<f32>, _p2: &Vector2<f32>, _p3: &Vector2<f32>, color: Color) {
            self.calls.push(format!("triangle {} {} {:?}", p1.x, p1.y, color));
        }
    }

    #[test]
    fn test_outline_is_three_lines() {
        let mut list = DrawList::new();
        list.add_triangle(Vector2::new(0.0, 0.0), Vector2::new(4.0, 0.0), Vector2::new(0.0, 3.0), Color::RED);
        assert_eq!(list.len(), 3);
        assert!(list.primitives().iter().all(|p| matches!(p, Primitive::Line(_))));

        list.clear();
        assert!(list.is_empty());
    }

    #[test]
    fn test_submit_preserves_order() {
        let mut list = DrawList::new();
        list.add_filled_triangle(Vector2::new(1.0, 2.0), Vector2::new(3.0, 4.0), Vector2::new(5.0, 6.0), Color::BLUE);
        list.add_line(Vector2::new(0.0, 0.0), Vector2::new(7.0, 8.0), Color::GREEN);

        let mut recorder = Recorder::default();
        list.submit(&mut recorder);
        assert_eq!(recorder.calls.len(), 2);
        assert!(recorder.calls[0].starts_with("triangle 1 2"));
        assert_eq!(recorder.calls[1], "line 0 0 7 8");
    }
}

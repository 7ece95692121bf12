/// ASCII rasterizer for terminal rendering
use crossterm::{
    cursor,
    style::{Color as TermColor, Print, ResetColor, SetForegroundColor},
    QueueableCommand,
};
use nalgebra::Vector2;
use sr3d_core::{Color, Renderer};
use std::io::Write;

/// Character luminosity ramp for shading (darkest to lightest)
const LUMINOSITY_RAMP: &[char] = &[' ', '.', ':', '-', '=', '+', '*', '#', '%', '@'];

/// Character and colour buffers the size of the terminal.
///
/// Primitives are painted in submission order, later ones overwrite earlier
/// ones; there is no depth buffer.
pub struct AsciiRenderer {
    width: usize,
    height: usize,
    char_buffer: Vec<char>,
    color_buffer: Vec<Color>,
}

impl AsciiRenderer {
    pub fn new(width: usize, height: usize) -> Self {
        let size = width * height;
        Self {
            width,
            height,
            char_buffer: vec![' '; size],
            color_buffer: vec![Color::WHITE; size],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn resize(&mut self, width: usize, height: usize) {
        *self = Self::new(width, height);
    }

    pub fn clear(&mut self) {
        self.char_buffer.fill(' ');
        self.color_buffer.fill(Color::WHITE);
    }

    pub fn char_at(&self, x: usize, y: usize) -> Option<char> {
        (x < self.width && y < self.height).then(|| self.char_buffer[y * self.width + x])
    }

    pub fn color_at(&self, x: usize, y: usize) -> Option<Color> {
        (x < self.width && y < self.height).then(|| self.color_buffer[y * self.width + x])
    }

    fn put(&mut self, x: i64, y: i64, character: char, color: Color) {
        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
            return;
        }
        let idx = y as usize * self.width + x as usize;
        self.char_buffer[idx] = character;
        self.color_buffer[idx] = color;
    }

    pub fn draw<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        let mut current = None;

        for y in 0..self.height {
            writer.queue(cursor::MoveTo(0, y as u16))?;
            for x in 0..self.width {
                let idx = y * self.width + x;
                let color = self.color_buffer[idx];

                if current != Some(color) {
                    writer.queue(SetForegroundColor(to_term_color(color)))?;
                    current = Some(color);
                }
                writer.queue(Print(self.char_buffer[idx]))?;
            }
        }
        writer.queue(ResetColor)?;
        Ok(())
    }
}

impl Renderer for AsciiRenderer {
    /// DDA line with a slope-dependent character.
    fn draw_line(&mut self, p1: &Vector2<f32>, p2: &Vector2<f32>, color: Color) {
        if !(p1.iter().chain(p2.iter()).all(|v| v.is_finite())) {
            return;
        }

        let character = line_char(&(p2 - p1));
        let Some((p1, p2)) = clip_to_screen(p1, p2, self.width as f64, self.height as f64) else {
            return;
        };

        // Bounded by the screen diagonal after clipping
        let delta = p2 - p1;
        let steps = delta.x.abs().max(delta.y.abs()).ceil().max(1.0);
        let step = delta / steps;

        let mut p = p1;
        for _ in 0..=steps as usize {
            self.put(p.x.floor() as i64, p.y.floor() as i64, character, color);
            p += step;
        }
    }

    fn draw_triangle(&mut self, p1: &Vector2<f32>, p2: &Vector2<f32>, p3: &Vector2<f32>, color: Color) {
        let character = fill_char(color);

        // Bounding box, clipped to screen bounds
        let min_x = p1.x.min(p2.x).min(p3.x).floor().max(0.0) as i64;
        let max_x = p1.x.max(p2.x).max(p3.x).ceil().min(self.width as f32 - 1.0) as i64;
        let min_y = p1.y.min(p2.y).min(p3.y).floor().max(0.0) as i64;
        let max_y = p1.y.max(p2.y).max(p3.y).ceil().min(self.height as f32 - 1.0) as i64;

        for y in min_y..=max_y {
            for x in min_x..=max_x {
                let p = Vector2::new(x as f32 + 0.5, y as f32 + 0.5);

                if let Some((w0, w1, w2)) = barycentric(p1, p2, p3, &p) {
                    if w0 >= 0.0 && w1 >= 0.0 && w2 >= 0.0 {
                        self.put(x, y, character, color);
                    }
                }
            }
        }
    }
}

fn to_term_color(color: Color) -> TermColor {
    TermColor::Rgb {
        r: color.r,
        g: color.g,
        b: color.b,
    }
}

/// Map brightness onto the ramp, skipping the blank so dark faces still show.
fn fill_char(color: Color) -> char {
    let last = LUMINOSITY_RAMP.len() - 1;
    let index = 1 + (color.brightness() * (last - 1) as f32).round() as usize;
    LUMINOSITY_RAMP[index.min(last)]
}

// Screen y points down, so a rising line has negative dy
fn line_char(delta: &Vector2<f32>) -> char {
    let (dx, dy) = (delta.x.abs(), delta.y.abs());
    if dy <= dx * 0.5 {
        '-'
    } else if dx <= dy * 0.5 {
        '|'
    } else if (delta.x > 0.0) == (delta.y > 0.0) {
        '\\'
    } else {
        '/'
    }
}

const LEFT: u8 = 1;
const RIGHT: u8 = 2;
const TOP: u8 = 4;
const BOTTOM: u8 = 8;

/// Cohen-Sutherland clip of a segment to `[0, width] x [0, height]`.
///
/// Runs in f64 so the difference of two huge f32 endpoints cannot overflow.
/// A returned segment always lies inside the box.
fn clip_to_screen(
    p1: &Vector2<f32>,
    p2: &Vector2<f32>,
    width: f64,
    height: f64,
) -> Option<(Vector2<f32>, Vector2<f32>)> {
    let outcode = |p: &Vector2<f64>| {
        let mut code = 0;
        if p.x < 0.0 {
            code |= LEFT;
        } else if p.x > width {
            code |= RIGHT;
        }
        if p.y < 0.0 {
            code |= TOP;
        } else if p.y > height {
            code |= BOTTOM;
        }
        code
    };

    let (mut a, mut b) = (p1.cast::<f64>(), p2.cast::<f64>());

    // Each pass snaps one endpoint onto an edge, at most twice per endpoint
    for _ in 0..5 {
        let (code_a, code_b) = (outcode(&a), outcode(&b));
        if code_a | code_b == 0 {
            return Some((a.cast::<f32>(), b.cast::<f32>()));
        }
        if code_a & code_b != 0 {
            return None;
        }

        let code = if code_a != 0 { code_a } else { code_b };
        let d = b - a;
        let point = if code & TOP != 0 {
            Vector2::new(a.x + d.x * -a.y / d.y, 0.0)
        } else if code & BOTTOM != 0 {
            Vector2::new(a.x + d.x * (height - a.y) / d.y, height)
        } else if code & LEFT != 0 {
            Vector2::new(0.0, a.y + d.y * -a.x / d.x)
        } else {
            Vector2::new(width, a.y + d.y * (width - a.x) / d.x)
        };

        if code == code_a {
            a = point;
        } else {
            b = point;
        }
    }

    // Only a corner graze lands here
    None
}

/// Calculate barycentric coordinates for a point in a triangle
fn barycentric(
    v0: &Vector2<f32>,
    v1: &Vector2<f32>,
    v2: &Vector2<f32>,
    p: &Vector2<f32>,
) -> Option<(f32, f32, f32)> {
    let denom = (v1.y - v2.y) * (v0.x - v2.x) + (v2.x - v1.x) * (v0.y - v2.y);

    if denom.abs() < 1e-6 {
        return None;
    }

    let w0 = ((v1.y - v2.y) * (p.x - v2.x) + (v2.x - v1.x) * (p.y - v2.y)) / denom;
    let w1 = ((v2.y - v0.y) * (p.x - v2.x) + (v0.x - v2.x) * (p.y - v2.y)) / denom;
    let w2 = 1.0 - w0 - w1;

    Some((w0, w1, w2))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fill_triangle_either_winding() {
        let (a, b, c) = (Vector2::new(0.0, 0.0), Vector2::new(10.0, 0.0), Vector2::new(0.0, 10.0));

        for (p1, p2, p3) in [(a, b, c), (a, c, b)] {
            let mut renderer = AsciiRenderer::new(12, 12);
            renderer.draw_triangle(&p1, &p2, &p3, Color::WHITE);
            assert_eq!(renderer.char_at(1, 1), Some('@'));
            assert_eq!(renderer.color_at(1, 1), Some(Color::WHITE));
            assert_eq!(renderer.char_at(9, 9), Some(' '));
        }
    }

    #[test]
    fn test_dark_colors_stay_visible() {
        assert_ne!(fill_char(Color::BLACK), ' ');
        assert_eq!(fill_char(Color::WHITE), '@');
    }

    #[test]
    fn test_line_chars() {
        let mut renderer = AsciiRenderer::new(10, 10);
        renderer.draw_line(&Vector2::new(0.5, 2.5), &Vector2::new(8.5, 2.5), Color::GREEN);
        assert_eq!(renderer.char_at(0, 2), Some('-'));
        assert_eq!(renderer.char_at(8, 2), Some('-'));
        assert_eq!(renderer.char_at(9, 2), Some(' '));

        renderer.clear();
        renderer.draw_line(&Vector2::new(4.5, 0.5), &Vector2::new(4.5, 9.5), Color::GREEN);
        assert_eq!(renderer.char_at(4, 5), Some('|'));

        renderer.clear();
        renderer.draw_line(&Vector2::new(0.5, 9.5), &Vector2::new(9.5, 0.5), Color::GREEN);
        assert_eq!(renderer.char_at(0, 9), Some('/'));
        assert_eq!(renderer.char_at(9, 0), Some('/'));
    }

    #[test]
    fn test_out_of_bounds_is_ignored() {
        let mut renderer = AsciiRenderer::new(4, 4);
        renderer.draw_line(&Vector2::new(-20.0, -3.0), &Vector2::new(30.0, 2.0), Color::RED);
        renderer.draw_triangle(
            &Vector2::new(-50.0, -50.0),
            &Vector2::new(50.0, -50.0),
            &Vector2::new(0.0, 50.0),
            Color::RED,
        );
        renderer.draw_line(&Vector2::new(f32::NAN, 0.0), &Vector2::new(1.0, 1.0), Color::RED);
        assert!(renderer.char_at(4, 0).is_none());
    }

    #[test]
    fn test_huge_line_is_trimmed_to_screen() {
        let mut renderer = AsciiRenderer::new(20, 10);
        renderer.draw_line(&Vector2::new(-1e30, 5.5), &Vector2::new(1e30, 5.5), Color::BLUE);
        for x in 0..20 {
            assert_eq!(renderer.char_at(x, 5), Some('-'));
        }
        assert_eq!(renderer.char_at(0, 4), Some(' '));

        renderer.clear();
        renderer.draw_line(&Vector2::new(10.5, -1e30), &Vector2::new(10.5, 1e30), Color::BLUE);
        for y in 0..10 {
            assert_eq!(renderer.char_at(10, y), Some('|'));
        }
        assert_eq!(renderer.char_at(9, 4), Some(' '));

        renderer.clear();
        renderer.draw_line(&Vector2::new(-1e30, -1.0), &Vector2::new(1e30, -1.0), Color::BLUE);
        renderer.draw_line(&Vector2::new(f32::MAX, -f32::MAX), &Vector2::new(-f32::MAX, f32::MAX), Color::BLUE);
        assert_eq!(renderer.char_at(10, 5), Some(' '));
    }

    #[test]
    fn test_clip_to_screen() {
        let inside = (Vector2::new(1.0, 1.0), Vector2::new(3.0, 2.0));
        assert_eq!(clip_to_screen(&inside.0, &inside.1, 4.0, 4.0), Some(inside));

        let (from, to) = clip_to_screen(&Vector2::new(-4.0, 2.0), &Vector2::new(8.0, 2.0), 4.0, 4.0).unwrap();
        assert_eq!((from.x, to.x), (0.0, 4.0));

        assert!(clip_to_screen(&Vector2::new(5.0, 0.0), &Vector2::new(9.0, 3.0), 4.0, 4.0).is_none());

        // Both endpoints beyond a corner
        let (from, to) = clip_to_screen(&Vector2::new(-2.0, -1.0), &Vector2::new(6.0, 5.0), 4.0, 4.0).unwrap();
        assert!((from - Vector2::new(0.0, 0.5)).norm() < 1e-6, "{from:?}");
        assert!((to - Vector2::new(4.0, 3.5)).norm() < 1e-6, "{to:?}");
    }

    #[test]
    fn test_draw_moves_cursor_per_row() {
        let mut renderer = AsciiRenderer::new(3, 2);
        renderer.put(1, 1, '#', Color::BLUE);

        let mut out = Vec::new();
        renderer.draw(&mut out).unwrap();
        let text = String::from_utf8_lossy(&out);
        assert!(text.contains('#'));
        assert!(!text.contains('\n'));
    }
}

/// 8-bit RGBA colours carried by mesh vertices and draw primitives

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const RED: Color = Color::rgb(255, 0, 0);
    pub const GREEN: Color = Color::rgb(0, 255, 0);
    pub const BLUE: Color = Color::rgb(0, 0, 255);
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const TRANSPARENT: Color = Color::rgba(0, 0, 0, 0);

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::rgba(r, g, b, 255)
    }

    /// Multiply the colour channels by `factor`, leaving alpha alone.
    pub fn scaled(self, factor: f32) -> Self {
        let channel = |c: u8| (c as f32 * factor).round().clamp(0.0, 255.0) as u8;
        Self {
            r: channel(self.r),
            g: channel(self.g),
            b: channel(self.b),
            a: self.a,
        }
    }

    /// Perceived brightness in [0, 1] (Rec. 601 luma).
    pub fn brightness(&self) -> f32 {
        (0.299 * self.r as f32 + 0.587 * self.g as f32 + 0.114 * self.b as f32) / 255.0
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::WHITE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scaled() {
        let c = Color::rgba(200, 100, 10, 128).scaled(0.5);
        assert_eq!(c, Color::rgba(100, 50, 5, 128));

        // Saturates instead of wrapping
        assert_eq!(Color::rgb(200, 200, 200).scaled(2.0), Color::WHITE);
        assert_eq!(Color::WHITE.scaled(-1.0), Color::BLACK);
    }

    #[test]
    fn test_brightness() {
        assert_eq!(Color::BLACK.brightness(), 0.0);
        assert!((Color::WHITE.brightness() - 1.0).abs() < 1e-5);
        assert!(Color::GREEN.brightness() > Color::RED.brightness());
        assert!(Color::RED.brightness() > Color::BLUE.brightness());
    }
}

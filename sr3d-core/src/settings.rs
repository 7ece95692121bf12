/// Engine settings and debug overlays
use crate::color::Color;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TriangleOutlines {
    pub show: bool,
    pub color: Color,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TriangleNormals {
    pub show: bool,
    pub color: Color,
    /// World-space length of the drawn normal.
    pub length: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TriangleSettings {
    pub outlines: TriangleOutlines,
    pub normals: TriangleNormals,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlaySettings {
    pub show: bool,
    pub color: Color,
}

/// `triangle` applies to faces that needed no clipping, `clipped_triangle`
/// to the pieces of faces the frustum cut.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DebugSettings {
    pub triangle: TriangleSettings,
    pub clipped_triangle: TriangleSettings,
    /// Frustums of the cameras that are not active.
    pub frustums: OverlaySettings,
    pub grid: OverlaySettings,
}

impl Default for DebugSettings {
    fn default() -> Self {
        let normals = TriangleNormals {
            show: false,
            color: Color::rgb(255, 0, 255),
            length: 0.25,
        };

        Self {
            triangle: TriangleSettings {
                outlines: TriangleOutlines {
                    show: false,
                    color: Color::BLACK,
                },
                normals,
            },
            clipped_triangle: TriangleSettings {
                outlines: TriangleOutlines {
                    show: false,
                    color: Color::RED,
                },
                normals,
            },
            frustums: OverlaySettings {
                show: true,
                color: Color::rgb(255, 255, 0),
            },
            grid: OverlaySettings {
                show: true,
                color: Color::GREEN,
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Settings {
    pub debug: DebugSettings,
    pub backface_culling: bool,
    /// Darken faces seen at a grazing angle.
    pub shading: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            debug: DebugSettings::default(),
            backface_culling: true,
            shading: true,
        }
    }
}

impl Settings {
    /// Show or hide outlines of both whole and clipped triangles.
    pub fn set_outlines(&mut self, show: bool) {
        self.debug.triangle.outlines.show = show;
        self.debug.clipped_triangle.outlines.show = show;
    }

    pub fn set_normals(&mut self, show: bool) {
        self.debug.triangle.normals.show = show;
        self.debug.clipped_triangle.normals.show = show;
    }
}

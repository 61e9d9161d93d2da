//! Backend trait definitions.
//!
//! The display backend implements these traits. The core never calls
//! platform-specific drawing or windowing APIs directly; it paints frames and
//! pumps events through [`RenderBackend`] and [`InputBackend`].

use std::path::Path;
use std::str::FromStr;

use crate::error::{NetTesterError, Result};
use crate::input::InputEvent;

/// A color in RGBA format (0-255 per channel).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const BLACK: Self = Self::rgb(0, 0, 0);
    pub const WHITE: Self = Self::rgb(255, 255, 255);
}

/// Parses `"R,G,B"` (whitespace around components is ignored).
impl FromStr for Color {
    type Err = NetTesterError;

    fn from_str(s: &str) -> Result<Self> {
        let parts: Vec<&str> = s.split(',').map(str::trim).collect();
        if parts.len() != 3 {
            return Err(NetTesterError::Config(format!(
                "color must be \"R,G,B\", got {s:?}"
            )));
        }
        let channel = |p: &str| {
            p.parse::<u8>()
                .map_err(|e| NetTesterError::Config(format!("bad color channel {p:?}: {e}")))
        };
        Ok(Color::rgb(
            channel(parts[0])?,
            channel(parts[1])?,
            channel(parts[2])?,
        ))
    }
}

/// An axis-aligned rectangle in screen pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub w: u32,
    pub h: u32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, w: u32, h: u32) -> Self {
        Self { x, y, w, h }
    }

    /// Exclusive right edge.
    pub fn right(&self) -> i32 {
        self.x + self.w as i32
    }

    /// Exclusive bottom edge.
    pub fn bottom(&self) -> i32 {
        self.y + self.h as i32
    }

    /// Half-open containment: the left/top edges are inside, the right/bottom
    /// edges are not.
    pub fn contains(&self, px: i32, py: i32) -> bool {
        px >= self.x && px < self.right() && py >= self.y && py < self.bottom()
    }

    /// Whether the two rectangles share any pixel.
    pub fn intersects(&self, other: &Rect) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }
}

/// Opaque handle to a loaded texture in the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureId(pub u64);

/// Requested window surface mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayMode {
    /// Fullscreen at the configured resolution.
    Fullscreen { width: u32, height: u32 },
    /// A resizable window.
    Windowed { width: u32, height: u32 },
}

/// Rendering backend trait.
///
/// Text is drawn with a single monospace font at arbitrary pixel sizes; the
/// backend caches whatever per-size state it needs. `antialias` is a hint the
/// backend honors when its font renderer supports both modes.
pub trait RenderBackend {
    /// Clear the whole surface to a solid color.
    fn clear(&mut self, color: Color) -> Result<()>;

    /// Draw a filled rectangle.
    fn fill_rect(&mut self, rect: Rect, color: Color) -> Result<()>;

    /// Draw a straight line of the given width.
    fn draw_line(&mut self, x1: i32, y1: i32, x2: i32, y2: i32, width: u32, color: Color)
    -> Result<()>;

    /// Draw text with its top-left corner at `(x, y)`.
    fn draw_text(
        &mut self,
        text: &str,
        x: i32,
        y: i32,
        font_size: u32,
        color: Color,
        antialias: bool,
    ) -> Result<()>;

    /// Draw text mirrored horizontally. Backends without flip support fall
    /// back to plain text.
    fn draw_text_mirrored(
        &mut self,
        text: &str,
        x: i32,
        y: i32,
        font_size: u32,
        color: Color,
        antialias: bool,
    ) -> Result<()> {
        self.draw_text(text, x, y, font_size, color, antialias)
    }

    /// Rendered `(width, height)` of `text` at `font_size`.
    fn measure_text(&self, text: &str, font_size: u32) -> (u32, u32);

    /// Recommended distance between baselines at `font_size`.
    fn line_height(&self, font_size: u32) -> u32;

    /// Load an image file into a texture.
    fn load_image(&mut self, path: &Path) -> Result<TextureId>;

    /// Native size of a loaded texture.
    fn texture_size(&self, tex: TextureId) -> Option<(u32, u32)>;

    /// Blit a texture scaled into `dst`.
    fn blit(&mut self, tex: TextureId, dst: Rect) -> Result<()>;

    /// Recreate the window surface. Returns the size actually obtained.
    fn set_display_mode(&mut self, mode: DisplayMode) -> Result<(u32, u32)>;

    /// Show or hide the pointer cursor.
    fn show_cursor(&mut self, visible: bool);

    /// Present the finished frame.
    fn swap_buffers(&mut self) -> Result<()>;

    /// Release backend resources.
    fn shutdown(&mut self) -> Result<()>;
}

/// Input backend trait.
pub trait InputBackend {
    /// Drain all pending events since the last call.
    fn poll_events(&mut self) -> Vec<InputEvent>;
}

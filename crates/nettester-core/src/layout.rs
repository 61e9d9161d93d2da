//! Screen geometry.
//!
//! Everything positional is derived from the display resolution and the
//! configured font size correction. The result is recomputed wholesale on
//! every resize; nothing caches partial geometry.

use std::str::FromStr;

use crate::backend::Rect;
use crate::error::{NetTesterError, Result};

/// Number of columns in the menu grid.
pub const MENU_COLUMNS: u32 = 3;

/// Upper bound for menu icon edge length in pixels.
pub const MAX_ICON_SIZE: u32 = 200;

/// Largest font size a renderer can load.
pub const MAX_FONT_SIZE: u32 = u16::MAX as u32;

/// Font sizes at or above this are rendered antialiased.
pub const ANTIALIAS_MIN_FONT_SIZE: u32 = 15;

/// A non-zero display size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Resolution {
    pub fn new(width: u32, height: u32) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(NetTesterError::Config(format!(
                "resolution must be non-zero, got {width}x{height}"
            )));
        }
        Ok(Self { width, height })
    }
}

/// Accepts `"WxH"`, `"W,H"`, or a single `"W"` used for both dimensions.
impl FromStr for Resolution {
    type Err = NetTesterError;

    fn from_str(s: &str) -> Result<Self> {
        let dim = |p: &str| {
            p.trim()
                .parse::<u32>()
                .map_err(|e| NetTesterError::Config(format!("bad resolution {s:?}: {e}")))
        };
        let parts: Vec<&str> = s.split(['x', 'X', ',']).collect();
        match parts.as_slice() {
            [w] => {
                let w = dim(w)?;
                Self::new(w, w)
            },
            [w, h] => Self::new(dim(w)?, dim(h)?),
            _ => Err(NetTesterError::Config(format!(
                "resolution must be \"WxH\", \"W,H\" or \"W\", got {s:?}"
            ))),
        }
    }
}

/// Computed regions and sizes for one resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutGeometry {
    pub resolution: Resolution,
    pub scale_correction: f32,
    pub titlebar_rect: Rect,
    /// Same area as `textbox_rect`; the menu grid replaces the text.
    pub menu_rect: Rect,
    pub textbox_rect: Rect,
    /// `[up, down]` halves of the text box.
    pub paging_rects: [Rect; 2],
    pub menu_button_size: u32,
    pub menu_button_padding: u32,
    pub menu_icon_size: u32,
    pub titlebar_font_size: u32,
    pub text_font_size: u32,
    pub antialias: bool,
}

impl LayoutGeometry {
    pub fn compute(resolution: Resolution, scale_correction: f32) -> Self {
        let width = resolution.width;
        let height = resolution.height;

        let titlebar_font_size = ((f64::from(width) / 20.0 * f64::from(scale_correction)).floor()
            as u32)
            .clamp(1, MAX_FONT_SIZE);
        let text_font_size = (titlebar_font_size * 4 / 5).max(1);

        let titlebar_h = (u64::from(titlebar_font_size) * 3 / 2).min(u64::from(height)) as u32;
        let titlebar_rect = Rect::new(0, 0, width, titlebar_h);
        let textbox_rect = Rect::new(0, titlebar_h as i32, width, height - titlebar_h);

        let half = textbox_rect.h / 2;
        let paging_rects = [
            Rect::new(0, textbox_rect.y, width, half),
            Rect::new(0, textbox_rect.y + half as i32, width, half),
        ];

        // floor(w / 3 * 0.9) without float rounding at exact multiples.
        let menu_button_size = (u64::from(textbox_rect.w) * 3 / 10) as u32;
        let menu_button_padding =
            (textbox_rect.w - MENU_COLUMNS * menu_button_size) / (MENU_COLUMNS + 1);
        let menu_icon_size = (menu_button_size * 9 / 10).min(MAX_ICON_SIZE);

        Self {
            resolution,
            scale_correction,
            titlebar_rect,
            menu_rect: textbox_rect,
            textbox_rect,
            paging_rects,
            menu_button_size,
            menu_button_padding,
            menu_icon_size,
            titlebar_font_size,
            text_font_size,
            antialias: text_font_size >= ANTIALIAS_MIN_FONT_SIZE,
        }
    }

    /// Cell of the `index`-th menu button.
    pub fn menu_cell(&self, index: usize) -> Rect {
        let col = index as u32 % MENU_COLUMNS;
        let row = index as u32 / MENU_COLUMNS;
        let step = self.menu_button_size + self.menu_button_padding;
        Rect::new(
            (self.menu_button_padding + col * step) as i32,
            self.textbox_rect.y + (self.menu_button_padding + row * step) as i32,
            self.menu_button_size,
            self.menu_button_size,
        )
    }

    /// Vertical inset of titlebar text.
    pub fn titlebar_text_offset(&self) -> u32 {
        self.titlebar_rect.h / 6
    }

    /// Width of the titlebar divider lines.
    pub fn divider_width(&self) -> u32 {
        self.titlebar_rect.h.div_ceil(100)
    }

    /// Area the splash logo is fitted into: 85% of the display, offset by
    /// 7.25% on each axis.
    pub fn splash_bounds(&self) -> Rect {
        let pct = |v: u32, per_10k: u64| (u64::from(v) * per_10k / 10_000) as u32;
        let (w, h) = (self.resolution.width, self.resolution.height);
        Rect::new(pct(w, 725) as i32, pct(h, 725) as i32, pct(w, 8500), pct(h, 8500))
    }
}

/// Largest rectangle with the aspect ratio of `src` that fits in `bounds`,
/// centered.
pub fn aspect_fit(src: (u32, u32), bounds: Rect) -> Rect {
    let (sw, sh) = src;
    if sw == 0 || sh == 0 {
        return Rect::new(bounds.x, bounds.y, 0, 0);
    }
    let scale = (f64::from(bounds.w) / f64::from(sw)).min(f64::from(bounds.h) / f64::from(sh));
    let w = (f64::from(sw) * scale) as u32;
    let h = (f64::from(sh) * scale) as u32;
    Rect::new(
        bounds.x + ((bounds.w - w) / 2) as i32,
        bounds.y + ((bounds.h - h) / 2) as i32,
        w,
        h,
    )
}

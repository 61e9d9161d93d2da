//! SDL2 backend for NetTester.
//!
//! Implements `RenderBackend` and `InputBackend` on top of SDL2 with
//! SDL2_ttf for the monospace text font and SDL2_image for the logo and menu
//! icons. Runs on desktop X11/Wayland and on the Raspberry Pi through SDL2's
//! kmsdrm driver.

use std::cell::RefCell;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use sdl2::EventPump;
use sdl2::event::{Event, WindowEvent};
use sdl2::image::{InitFlag, LoadSurface, LoadTexture, Sdl2ImageContext};
use sdl2::keyboard::Keycode;
use sdl2::mouse::{MouseButton, MouseUtil};
use sdl2::pixels::Color as SdlColor;
use sdl2::rect::Rect as SdlRect;
use sdl2::render::{Canvas, Texture, TextureCreator};
use sdl2::surface::Surface;
use sdl2::ttf::{Font, Sdl2TtfContext};
use sdl2::video::{FullscreenType, Window, WindowContext};

use nettester_types::backend::{
    Color, DisplayMode, InputBackend, Rect, RenderBackend, TextureId,
};
use nettester_types::error::{NetTesterError, Result};
use nettester_types::input::{InputEvent, Key, PointerButton};

/// Monospace font under the resource directory.
pub const FONT_FILE: &str = "freemono.ttf";

/// Window and taskbar icon under the resource directory.
pub const ICON_FILE: &str = "logo.png";

fn backend_err(e: impl ToString) -> NetTesterError {
    NetTesterError::Backend(e.to_string())
}

fn sdl_color(color: Color) -> SdlColor {
    SdlColor::RGBA(color.r, color.g, color.b, color.a)
}

fn sdl_rect(rect: Rect) -> SdlRect {
    SdlRect::new(rect.x, rect.y, rect.w, rect.h)
}

/// SDL2 rendering and input backend.
///
/// # Safety
///
/// `textures` is declared before `texture_creator` so that Rust's drop order
/// (declaration order) destroys all textures before the creator they borrow
/// from. The `Texture<'static>` lifetime is erased via transmute in
/// `load_image()`; this is sound because the `TextureCreator` always outlives
/// the textures.
pub struct SdlBackend {
    canvas: Canvas<Window>,
    event_pump: EventPump,
    mouse: MouseUtil,
    textures: HashMap<u64, Texture<'static>>,
    texture_creator: TextureCreator<WindowContext>,
    next_texture_id: u64,
    fonts: RefCell<HashMap<u32, Font<'static, 'static>>>,
    ttf: &'static Sdl2TtfContext,
    font_path: PathBuf,
    _image: Sdl2ImageContext,
}

impl SdlBackend {
    /// Open a resizable window and load the text font.
    ///
    /// The display mode is chosen later through
    /// [`RenderBackend::set_display_mode`]. A missing font is an error; a
    /// missing window icon is only logged.
    pub fn new(title: &str, resource_dir: &Path) -> Result<Self> {
        let sdl = sdl2::init().map_err(backend_err)?;
        let video = sdl.video().map_err(backend_err)?;
        let mut window = video
            .window(title, 640, 480)
            .position_centered()
            .resizable()
            .build()
            .map_err(backend_err)?;

        let image = sdl2::image::init(InitFlag::PNG).map_err(backend_err)?;
        match Surface::from_file(resource_dir.join(ICON_FILE)) {
            Ok(icon) => window.set_icon(icon),
            Err(e) => log::warn!("Window icon not loaded: {e}"),
        }

        let canvas = window
            .into_canvas()
            .accelerated()
            .present_vsync()
            .build()
            .map_err(backend_err)?;
        let texture_creator = canvas.texture_creator();
        let event_pump = sdl.event_pump().map_err(backend_err)?;
        let mouse = sdl.mouse();

        // Fonts borrow the TTF context for as long as the backend lives, which
        // is the rest of the process.
        let ttf: &'static Sdl2TtfContext =
            Box::leak(Box::new(sdl2::ttf::init().map_err(backend_err)?));
        let font_path = resource_dir.join(FONT_FILE);
        let probe = ttf.load_font(&font_path, 12).map_err(|e| {
            NetTesterError::Backend(format!("font {}: {e}", font_path.display()))
        })?;

        log::info!(
            "SDL2 backend initialized (video driver {}, font {})",
            video.current_video_driver(),
            font_path.display()
        );

        Ok(Self {
            canvas,
            event_pump,
            mouse,
            textures: HashMap::new(),
            texture_creator,
            next_texture_id: 1,
            fonts: RefCell::new(HashMap::from([(12, probe)])),
            ttf,
            font_path,
            _image: image,
        })
    }

    /// Run `f` with the font at `size`, loading it on first use.
    fn with_font<R>(&self, size: u32, f: impl FnOnce(&Font<'static, 'static>) -> R) -> Result<R> {
        let size = size.clamp(1, u16::MAX as u32);
        let mut fonts = self.fonts.borrow_mut();
        if !fonts.contains_key(&size) {
            let font = self
                .ttf
                .load_font(&self.font_path, size as u16)
                .map_err(backend_err)?;
            log::debug!("Loaded font at {size}px");
            fonts.insert(size, font);
        }
        match fonts.get(&size) {
            Some(font) => Ok(f(font)),
            None => Err(NetTesterError::Backend(format!("font {size}px missing"))),
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn render_text(
        &mut self,
        text: &str,
        x: i32,
        y: i32,
        font_size: u32,
        color: Color,
        antialias: bool,
        mirrored: bool,
    ) -> Result<()> {
        if text.is_empty() {
            return Ok(());
        }
        let color = sdl_color(color);
        let surface = self
            .with_font(font_size, |font| {
                let partial = font.render(text);
                if antialias {
                    partial.blended(color)
                } else {
                    partial.solid(color)
                }
            })?
            .map_err(backend_err)?;
        let texture = self
            .texture_creator
            .create_texture_from_surface(&surface)
            .map_err(backend_err)?;
        let dst = SdlRect::new(x, y, surface.width(), surface.height());
        self.canvas
            .copy_ex(&texture, None, dst, 0.0, None, mirrored, false)
            .map_err(backend_err)
    }
}

impl RenderBackend for SdlBackend {
    fn clear(&mut self, color: Color) -> Result<()> {
        self.canvas.set_draw_color(sdl_color(color));
        self.canvas.clear();
        Ok(())
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) -> Result<()> {
        self.canvas.set_draw_color(sdl_color(color));
        self.canvas.fill_rect(sdl_rect(rect)).map_err(backend_err)
    }

    fn draw_line(
        &mut self,
        x1: i32,
        y1: i32,
        x2: i32,
        y2: i32,
        width: u32,
        color: Color,
    ) -> Result<()> {
        self.canvas.set_draw_color(sdl_color(color));
        let width = width.max(1);
        let half = (width / 2) as i32;
        // Axis-aligned lines become rectangles centered on the line.
        if x1 == x2 {
            let (top, bottom) = (y1.min(y2), y1.max(y2));
            let len = (bottom - top) as u32 + 1;
            self.canvas
                .fill_rect(SdlRect::new(x1 - half, top, width, len))
                .map_err(backend_err)
        } else if y1 == y2 {
            let (left, right) = (x1.min(x2), x1.max(x2));
            let len = (right - left) as u32 + 1;
            self.canvas
                .fill_rect(SdlRect::new(left, y1 - half, len, width))
                .map_err(backend_err)
        } else {
            for offset in -half..=(width as i32 - 1 - half) {
                self.canvas
                    .draw_line((x1, y1 + offset), (x2, y2 + offset))
                    .map_err(backend_err)?;
            }
            Ok(())
        }
    }

    fn draw_text(
        &mut self,
        text: &str,
        x: i32,
        y: i32,
        font_size: u32,
        color: Color,
        antialias: bool,
    ) -> Result<()> {
        self.render_text(text, x, y, font_size, color, antialias, false)
    }

    fn draw_text_mirrored(
        &mut self,
        text: &str,
        x: i32,
        y: i32,
        font_size: u32,
        color: Color,
        antialias: bool,
    ) -> Result<()> {
        self.render_text(text, x, y, font_size, color, antialias, true)
    }

    fn measure_text(&self, text: &str, font_size: u32) -> (u32, u32) {
        let measured = self.with_font(font_size, |font| {
            if text.is_empty() {
                Ok((0, font.height().max(0) as u32))
            } else {
                font.size_of(text)
            }
        });
        match measured {
            Ok(Ok(size)) => size,
            Ok(Err(e)) => {
                log::debug!("measure_text({text:?}) failed: {e}");
                (0, font_size)
            },
            Err(e) => {
                log::debug!("measure_text: {e}");
                (0, font_size)
            },
        }
    }

    fn line_height(&self, font_size: u32) -> u32 {
        self.with_font(font_size, |font| font.recommended_line_spacing().max(1) as u32)
            .unwrap_or(font_size)
    }

    fn load_image(&mut self, path: &Path) -> Result<TextureId> {
        let texture = self
            .texture_creator
            .load_texture(path)
            .map_err(|e| NetTesterError::Backend(format!("{}: {e}", path.display())))?;

        // SAFETY: The texture borrows from self.texture_creator which lives in the
        // same struct. `textures` is declared before `texture_creator`, so Rust drops
        // textures first. The erased lifetime is therefore always valid.
        let texture: Texture<'static> = unsafe { std::mem::transmute(texture) };

        let id = self.next_texture_id;
        self.next_texture_id += 1;
        self.textures.insert(id, texture);
        log::debug!("Loaded {} as texture {id}", path.display());
        Ok(TextureId(id))
    }

    fn texture_size(&self, tex: TextureId) -> Option<(u32, u32)> {
        self.textures.get(&tex.0).map(|t| {
            let q = t.query();
            (q.width, q.height)
        })
    }

    fn blit(&mut self, tex: TextureId, dst: Rect) -> Result<()> {
        let texture = self
            .textures
            .get(&tex.0)
            .ok_or_else(|| NetTesterError::Backend(format!("texture not found: {}", tex.0)))?;
        self.canvas
            .copy(texture, None, sdl_rect(dst))
            .map_err(backend_err)
    }

    fn set_display_mode(&mut self, mode: DisplayMode) -> Result<(u32, u32)> {
        let window = self.canvas.window_mut();
        match mode {
            DisplayMode::Fullscreen { width, height } => {
                window.set_size(width, height).map_err(backend_err)?;
                window
                    .set_fullscreen(FullscreenType::True)
                    .map_err(backend_err)?;
            },
            DisplayMode::Windowed { width, height } => {
                window.set_fullscreen(FullscreenType::Off).map_err(backend_err)?;
                window.set_size(width, height).map_err(backend_err)?;
            },
        }
        let size = self.canvas.output_size().map_err(backend_err)?;
        log::info!("Display mode {mode:?}, surface {}x{}", size.0, size.1);
        Ok(size)
    }

    fn show_cursor(&mut self, visible: bool) {
        self.mouse.show_cursor(visible);
    }

    fn swap_buffers(&mut self) -> Result<()> {
        self.canvas.present();
        Ok(())
    }

    fn shutdown(&mut self) -> Result<()> {
        self.textures.clear();
        self.fonts.borrow_mut().clear();
        log::info!("SDL2 backend shut down");
        Ok(())
    }
}

impl InputBackend for SdlBackend {
    fn poll_events(&mut self) -> Vec<InputEvent> {
        let mut events = Vec::new();
        for event in self.event_pump.poll_iter() {
            if let Some(e) = map_sdl_event(event) {
                events.push(e);
            }
        }
        events
    }
}

/// Map an SDL2 event to a NetTester input event.
///
/// Touch contacts reach us as synthesized left-button mouse events, so
/// finger events are not mapped separately.
fn map_sdl_event(event: Event) -> Option<InputEvent> {
    match event {
        Event::Quit { .. } => Some(InputEvent::Quit),
        Event::KeyDown {
            keycode: Some(key),
            repeat: false,
            ..
        } => map_key(key).map(InputEvent::KeyPress),
        Event::MouseButtonDown {
            x, y, mouse_btn, ..
        } => map_mouse_button(mouse_btn).map(|button| InputEvent::PointerPress { x, y, button }),
        Event::MouseButtonUp {
            x, y, mouse_btn, ..
        } => {
            map_mouse_button(mouse_btn).map(|button| InputEvent::PointerRelease { x, y, button })
        },
        Event::Window {
            win_event: WindowEvent::SizeChanged(w, h),
            ..
        } if w > 0 && h > 0 => Some(InputEvent::Resize {
            width: w as u32,
            height: h as u32,
        }),
        _ => None,
    }
}

fn map_key(key: Keycode) -> Option<Key> {
    match key {
        Keycode::Escape => Some(Key::Escape),
        Keycode::F11 => Some(Key::F11),
        Keycode::PageUp => Some(Key::PageUp),
        Keycode::PageDown => Some(Key::PageDown),
        _ => None,
    }
}

fn map_mouse_button(button: MouseButton) -> Option<PointerButton> {
    match button {
        MouseButton::Left => Some(PointerButton::Primary),
        MouseButton::Middle => Some(PointerButton::Middle),
        MouseButton::Right => Some(PointerButton::Secondary),
        _ => None,
    }
}

//! Frame painter.
//!
//! Draws the splash screen and the regular frame (titlebar plus either the
//! menu grid or the current text page) through [`RenderBackend`]. Nothing
//! here mutates application state.

use std::collections::HashMap;
use std::path::Path;

use crate::backend::{Color, Rect, RenderBackend, TextureId};
use crate::buttons::{ButtonId, ButtonTables};
use crate::controller::InteractionController;
use crate::error::Result;
use crate::layout::{LayoutGeometry, aspect_fit};
use crate::paginate::WRAP_MARKER;

/// Splash and window icon image under the resource directory.
pub const LOGO_FILE: &str = "logo.png";

pub struct Renderer {
    fg: Color,
    bg: Color,
    logo: Option<TextureId>,
    icons: HashMap<ButtonId, TextureId>,
}

impl Renderer {
    pub fn new(fg: Color, bg: Color) -> Self {
        Self {
            fg,
            bg,
            logo: None,
            icons: HashMap::new(),
        }
    }

    /// Load the logo and menu icons. Missing images are logged; their buttons
    /// fall back to text labels.
    pub fn load_resources(
        &mut self,
        backend: &mut dyn RenderBackend,
        resource_dir: &Path,
        tables: &ButtonTables,
    ) {
        match backend.load_image(&resource_dir.join(LOGO_FILE)) {
            Ok(tex) => self.logo = Some(tex),
            Err(e) => log::warn!("Logo not loaded: {e}"),
        }
        for button in &tables.menu {
            let Some(icon) = button.icon else { continue };
            match backend.load_image(&resource_dir.join(icon)) {
                Ok(tex) => {
                    self.icons.insert(button.id, tex);
                },
                Err(e) => log::warn!("Icon {icon} not loaded, using label: {e}"),
            }
        }
    }

    /// Background plus the logo fitted into the splash area.
    pub fn paint_splash(
        &self,
        backend: &mut dyn RenderBackend,
        geometry: &LayoutGeometry,
    ) -> Result<()> {
        backend.clear(self.bg)?;
        if let Some(logo) = self.logo
            && let Some(size) = backend.texture_size(logo)
        {
            backend.blit(logo, aspect_fit(size, geometry.splash_bounds()))?;
        }
        Ok(())
    }

    /// Paint one frame. The caller presents it.
    pub fn paint_frame(
        &self,
        backend: &mut dyn RenderBackend,
        controller: &InteractionController,
    ) -> Result<()> {
        backend.clear(self.bg)?;
        self.paint_titlebar(backend, controller)?;
        if controller.state().menu_open {
            self.paint_menu(backend, controller)
        } else {
            self.paint_text(backend, controller)
        }
    }

    fn paint_titlebar(
        &self,
        backend: &mut dyn RenderBackend,
        controller: &InteractionController,
    ) -> Result<()> {
        let g = controller.geometry();
        let bar = g.titlebar_rect;
        let font = g.titlebar_font_size;
        let text_y = g.titlebar_text_offset() as i32;
        let line_w = g.divider_width();

        let bottom = bar.bottom() - 1;
        backend.draw_line(0, bottom, bar.right(), bottom, line_w, self.fg)?;

        let clock = controller.clock_text();
        if !clock.is_empty() {
            let (cw, _) = backend.measure_text(&clock, font);
            backend.draw_text(&clock, bar.right() - cw as i32, text_y, font, self.fg, g.antialias)?;
        }

        for button in &controller.tables().titlebar {
            let Some(rect) = controller.bounds().get(button.id) else {
                continue;
            };
            backend.draw_text(button.label, rect.x, text_y, font, self.fg, g.antialias)?;
            backend.draw_line(rect.right(), 0, rect.right(), rect.bottom(), line_w, self.fg)?;
        }

        let title = &controller.state().title;
        if !title.is_empty() {
            let (tw, _) = backend.measure_text(title, font);
            let x = (bar.w as i32 - tw as i32) / 2;
            backend.draw_text(title, x, text_y, font, self.fg, g.antialias)?;
        }
        Ok(())
    }

    fn paint_menu(
        &self,
        backend: &mut dyn RenderBackend,
        controller: &InteractionController,
    ) -> Result<()> {
        let g = controller.geometry();
        for button in &controller.tables().menu {
            let Some(cell) = controller.bounds().get(button.id) else {
                continue;
            };
            backend.fill_rect(cell, self.fg)?;

            if let Some(&tex) = self.icons.get(&button.id) {
                let size = g.menu_icon_size;
                let inset = ((cell.w - size) / 2) as i32;
                backend.blit(tex, Rect::new(cell.x + inset, cell.y + inset, size, size))?;
            } else {
                let font = g.text_font_size;
                let (lw, lh) = backend.measure_text(button.label, font);
                let x = cell.x + (cell.w as i32 - lw as i32) / 2;
                let y = cell.y + (cell.h as i32 - lh as i32) / 2;
                backend.draw_text(button.label, x, y, font, self.bg, g.antialias)?;
            }
        }
        Ok(())
    }

    fn paint_text(
        &self,
        backend: &mut dyn RenderBackend,
        controller: &InteractionController,
    ) -> Result<()> {
        let g = controller.geometry();
        let font = g.text_font_size;
        let glyph = backend.measure_text("M", font).0 as i32;
        let line_height = backend.line_height(font) as i32;
        let page = controller.state().paginator.page(controller.capacity());

        for (i, row) in page.lines.iter().enumerate() {
            let y = g.textbox_rect.y + i as i32 * line_height;
            let mut x = g.textbox_rect.x;
            if row.wrap_in {
                backend.draw_text_mirrored(WRAP_MARKER, x, y, font, self.fg, g.antialias)?;
                x += glyph;
            }
            if !row.text.is_empty() {
                backend.draw_text(&row.text, x, y, font, self.fg, g.antialias)?;
            }
            if row.wrap_out {
                let end = x + row.text.chars().count() as i32 * glyph;
                backend.draw_text(WRAP_MARKER, end, y, font, self.fg, g.antialias)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buttons::Command;
    use crate::config::Settings;
    use crate::controller::Phase;
    use crate::layout::Resolution;
    use crate::platform::InterfaceKind;
    use crate::strings::Locale;
    use crate::task::ProbeKind;
    use crate::test_utils::{DrawCall, MockBackend, MockPlatform};
    use std::path::PathBuf;
    use std::sync::Arc;
    use std::time::{Duration, Instant};

    const ICONS: [&str; 6] = [
        "wireless.png",
        "wired.png",
        "shutdown.png",
        "internet.png",
        "search.png",
        "custom.png",
    ];

    fn settings() -> Settings {
        Settings {
            resolution: Resolution::new(800, 480).unwrap(),
            fg_color: Color::WHITE,
            bg_color: Color::BLACK,
            font_size_correction: 1.0,
            show_mouse_cursor: false,
            online_test_remotes: vec![],
            custom_command: "true".into(),
            fullscreen: true,
            resource_dir: PathBuf::from("res"),
            locale: Locale::German,
        }
    }

    fn setup(backend: &mut MockBackend) -> (InteractionController, Renderer) {
        setup_with(backend, MockPlatform::new())
    }

    fn setup_with(
        backend: &mut MockBackend,
        platform: MockPlatform,
    ) -> (InteractionController, Renderer) {
        let platform = platform.with_interface("eth0", InterfaceKind::Wired);
        let controller = InteractionController::new(
            &settings(),
            Arc::new(platform),
            &*backend,
            Resolution::new(800, 480).unwrap(),
        );
        let mut renderer = Renderer::new(Color::WHITE, Color::BLACK);
        renderer.load_resources(backend, Path::new("res"), controller.tables());
        backend.reset();
        (controller, renderer)
    }

    fn is_fill(c: &DrawCall) -> bool {
        matches!(c, DrawCall::FillRect { .. })
    }

    fn is_blit(c: &DrawCall) -> bool {
        matches!(c, DrawCall::Blit { .. })
    }

    #[test]
    fn titlebar_has_menu_title_and_clock() {
        let mut backend = MockBackend::new();
        let (controller, renderer) = setup(&mut backend);
        renderer.paint_frame(&mut backend, &controller).unwrap();

        assert_eq!(backend.calls[0], DrawCall::Clear(Color::BLACK));
        assert!(backend.has_text("Menü"));
        assert!(backend.has_text("eth0"));
        assert!(backend.has_text("12:34:56"));
        // Bottom border plus the divider right of the menu label.
        assert_eq!(
            backend.count(|c| matches!(c, DrawCall::Line { .. })),
            2
        );
    }

    #[test]
    fn clock_is_right_aligned() {
        let mut backend = MockBackend::new();
        let (controller, renderer) = setup(&mut backend);
        renderer.paint_frame(&mut backend, &controller).unwrap();
        let x = backend.calls.iter().find_map(|c| match c {
            DrawCall::Text { text, x, .. } if text == "12:34:56" => Some(*x),
            _ => None,
        });
        // 8 glyphs of 24px at the 40px titlebar font.
        assert_eq!(x, Some(800 - 8 * 24));
    }

    #[test]
    fn menu_without_icons_draws_labels() {
        let mut backend = MockBackend::new();
        let (controller, renderer) = setup(&mut backend);
        renderer.paint_frame(&mut backend, &controller).unwrap();

        assert_eq!(backend.count(is_fill), 6);
        assert_eq!(backend.count(is_blit), 0);
        assert!(backend.has_text("Wireless"));
        assert!(backend.has_text("Custom Command"));
    }

    #[test]
    fn menu_icons_are_centered_in_cells() {
        let mut backend = MockBackend::new().with_images(&ICONS);
        let (controller, renderer) = setup(&mut backend);
        renderer.paint_frame(&mut backend, &controller).unwrap();

        assert_eq!(backend.count(is_blit), 6);
        assert!(!backend.has_text("Wireless"));
        let first = controller.geometry().menu_cell(0);
        let expected = Rect::new(first.x + 20, first.y + 20, 200, 200);
        assert!(backend.calls.iter().any(|c| matches!(
            c,
            DrawCall::Blit { dst, .. } if *dst == expected
        )));
    }

    #[test]
    fn text_page_shows_interface_info() {
        let mut backend = MockBackend::new();
        let (mut controller, renderer) = setup(&mut backend);
        controller.dispatch(Command::ToggleMenu, &mut backend);
        backend.reset();
        renderer.paint_frame(&mut backend, &controller).unwrap();

        assert_eq!(backend.count(is_fill), 0);
        // eth0 has no scripted info.
        assert!(backend.has_text("Not available:"));
        assert!(backend.has_text("no such device"));
    }

    #[test]
    fn wrapped_rows_get_markers() {
        let mut backend = MockBackend::new();
        let output = format!("{}\ntail\n", "x".repeat(100));
        let platform = MockPlatform::new().with_process_output(true, &output);
        let (mut controller, renderer) = setup_with(&mut backend, platform);
        controller.dispatch(Command::RunProbe(ProbeKind::CustomCommand), &mut backend);
        let deadline = Instant::now() + Duration::from_secs(5);
        while controller.state().phase != Phase::Idle && Instant::now() < deadline {
            controller.tick();
            std::thread::sleep(Duration::from_millis(5));
        }
        backend.reset();
        renderer.paint_frame(&mut backend, &controller).unwrap();

        // 100 chars at 42 per row: 41 + 40 + 19.
        let mirrored = backend.count(|c| {
            matches!(c, DrawCall::Text { text, mirrored: true, .. } if text == WRAP_MARKER)
        });
        let plain = backend.count(|c| {
            matches!(c, DrawCall::Text { text, mirrored: false, .. } if text == WRAP_MARKER)
        });
        assert_eq!(mirrored, 2);
        assert_eq!(plain, 2);
        assert!(backend.has_text("tail"));

        let marker_x = backend.calls.iter().find_map(|c| match c {
            DrawCall::Text { text, x, mirrored: false, .. } if text == WRAP_MARKER => Some(*x),
            _ => None,
        });
        assert_eq!(marker_x, Some(41 * 19));
    }

    #[test]
    fn splash_fits_logo() {
        let mut backend = MockBackend::new().with_images(&[LOGO_FILE]);
        let (controller, renderer) = setup(&mut backend);
        renderer
            .paint_splash(&mut backend, controller.geometry())
            .unwrap();
        // 400x200 logo into the 680x408 splash area at (58, 34).
        assert!(backend.calls.contains(&DrawCall::Blit {
            tex: TextureId(1),
            dst: Rect::new(58, 34 + 34, 680, 340),
        }));
    }

    #[test]
    fn splash_without_logo_only_clears() {
        let mut backend = MockBackend::new();
        let (controller, renderer) = setup(&mut backend);
        renderer
            .paint_splash(&mut backend, controller.geometry())
            .unwrap();
        assert_eq!(backend.calls, vec![DrawCall::Clear(Color::BLACK)]);
    }
}

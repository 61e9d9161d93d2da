//! Button tables and their clickable bounds.
//!
//! [`ButtonSpec`]s never change after startup. Where they sit on screen
//! depends on the geometry and on measured label widths, so bounds live in a
//! separate [`ButtonBounds`] map that is rebuilt wholesale whenever the
//! geometry changes.

use std::collections::HashMap;

use crate::backend::Rect;
use crate::layout::LayoutGeometry;
use crate::paginate::ScrollDirection;
use crate::platform::InterfaceKind;
use crate::strings::Strings;
use crate::task::ProbeKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ButtonId {
    Menu,
    Wireless,
    Wired,
    Shutdown,
    CheckInternet,
    WifiScan,
    CustomCommand,
    PageUp,
    PageDown,
}

/// Everything the user can ask the controller to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    ToggleMenu,
    SelectInterface(InterfaceKind),
    Shutdown,
    RunProbe(ProbeKind),
    Scroll(ScrollDirection),
    ToggleFullscreen,
    Resize { width: u32, height: u32 },
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ButtonSpec {
    pub id: ButtonId,
    pub label: &'static str,
    /// Icon file name under the resource directory.
    pub icon: Option<&'static str>,
    pub command: Command,
}

impl ButtonSpec {
    fn new(id: ButtonId, label: &'static str, command: Command) -> Self {
        Self {
            id,
            label,
            icon: None,
            command,
        }
    }

    fn with_icon(mut self, icon: &'static str) -> Self {
        self.icon = Some(icon);
        self
    }
}

/// The three button lists, in hit-test order.
#[derive(Debug, Clone)]
pub struct ButtonTables {
    pub titlebar: Vec<ButtonSpec>,
    pub menu: Vec<ButtonSpec>,
    pub paging: Vec<ButtonSpec>,
}

impl ButtonTables {
    pub fn new(strings: &'static Strings) -> Self {
        Self {
            titlebar: vec![ButtonSpec::new(
                ButtonId::Menu,
                strings.menu,
                Command::ToggleMenu,
            )],
            menu: vec![
                ButtonSpec::new(
                    ButtonId::Wireless,
                    strings.wireless,
                    Command::SelectInterface(InterfaceKind::Wireless),
                )
                .with_icon("wireless.png"),
                ButtonSpec::new(
                    ButtonId::Wired,
                    strings.wired,
                    Command::SelectInterface(InterfaceKind::Wired),
                )
                .with_icon("wired.png"),
                ButtonSpec::new(ButtonId::Shutdown, strings.shutdown, Command::Shutdown)
                    .with_icon("shutdown.png"),
                ButtonSpec::new(
                    ButtonId::CheckInternet,
                    strings.check_internet,
                    Command::RunProbe(ProbeKind::Reachability),
                )
                .with_icon("internet.png"),
                ButtonSpec::new(
                    ButtonId::WifiScan,
                    strings.wifi_scan,
                    Command::RunProbe(ProbeKind::WifiScan),
                )
                .with_icon("search.png"),
                ButtonSpec::new(
                    ButtonId::CustomCommand,
                    strings.custom_command,
                    Command::RunProbe(ProbeKind::CustomCommand),
                )
                .with_icon("custom.png"),
            ],
            paging: vec![
                ButtonSpec::new(
                    ButtonId::PageUp,
                    strings.page_up,
                    Command::Scroll(ScrollDirection::Up),
                ),
                ButtonSpec::new(
                    ButtonId::PageDown,
                    strings.page_down,
                    Command::Scroll(ScrollDirection::Down),
                ),
            ],
        }
    }

    /// Every icon file referenced by the menu.
    pub fn icons(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.menu.iter().filter_map(|b| b.icon)
    }
}

/// Screen rectangles of all buttons for one geometry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ButtonBounds {
    rects: HashMap<ButtonId, Rect>,
}

impl ButtonBounds {
    /// Lay out all buttons for `geometry`.
    ///
    /// `measure` returns the rendered `(width, height)` of a label at a font
    /// size. Titlebar buttons are placed left to right, each advancing by 110%
    /// of its label width.
    pub fn rebuild(
        geometry: &LayoutGeometry,
        tables: &ButtonTables,
        measure: impl Fn(&str, u32) -> (u32, u32),
    ) -> Self {
        let mut rects = HashMap::new();

        let offset = geometry.titlebar_text_offset();
        let mut x = 0u32;
        for button in &tables.titlebar {
            let (w, h) = measure(button.label, geometry.titlebar_font_size);
            rects.insert(button.id, Rect::new(x as i32, 0, w, h + 2 * offset));
            x += w * 11 / 10;
        }

        for (i, button) in tables.menu.iter().enumerate() {
            rects.insert(button.id, geometry.menu_cell(i));
        }

        for (button, rect) in tables.paging.iter().zip(geometry.paging_rects) {
            rects.insert(button.id, rect);
        }

        Self { rects }
    }

    pub fn get(&self, id: ButtonId) -> Option<Rect> {
        self.rects.get(&id).copied()
    }
}

/// First button in `list` whose bounds contain `(x, y)`.
pub fn hit_test<'a>(
    list: &'a [ButtonSpec],
    bounds: &ButtonBounds,
    x: i32,
    y: i32,
) -> Option<&'a ButtonSpec> {
    list.iter()
        .find(|b| bounds.get(b.id).is_some_and(|r| r.contains(x, y)))
}

//! Platform-agnostic input event types.
//!
//! Every backend maps its native input to these enums. The controller never
//! sees raw platform input.

/// A platform-agnostic input event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    /// Pointer button pressed (mouse or touch) at an absolute position.
    PointerPress { x: i32, y: i32, button: PointerButton },
    /// Pointer button released at an absolute position.
    PointerRelease { x: i32, y: i32, button: PointerButton },
    /// A mapped key was pressed.
    KeyPress(Key),
    /// The window surface changed size.
    Resize { width: u32, height: u32 },
    /// User requested quit (window close, etc.).
    Quit,
}

/// Pointer buttons. Touch contacts arrive as `Primary`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerButton {
    Primary,
    Middle,
    Secondary,
}

/// Keys the kiosk reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Escape,
    F11,
    PageUp,
    PageDown,
}

impl InputEvent {
    /// Position of a primary-button release, if this is one.
    pub fn primary_release(&self) -> Option<(i32, i32)> {
        match *self {
            InputEvent::PointerRelease {
                x,
                y,
                button: PointerButton::Primary,
            } => Some((x, y)),
            _ => None,
        }
    }
}

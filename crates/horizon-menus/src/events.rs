//! Input events consumed by menus and menu bars.
//!
//! The embedding windowing layer translates its native input into these
//! events and hands them to [`MenuHost::dispatch`](crate::MenuHost::dispatch).
//! Pointer positions are in viewport coordinates. Enter and leave
//! transitions between menus are derived by the host from successive pointer
//! positions; the window only reports [`InputEvent::PointerLeave`] when the
//! pointer leaves the surface entirely.

use crate::geometry::Point;

/// Keyboard modifier state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct KeyboardModifiers {
    /// The Shift key is held.
    pub shift: bool,
    /// The Control key is held (Cmd on macOS).
    pub control: bool,
    /// The Alt key is held (Option on macOS).
    pub alt: bool,
    /// The Meta/Super key is held.
    pub meta: bool,
}

impl KeyboardModifiers {
    /// No modifiers pressed.
    pub const NONE: Self = Self {
        shift: false,
        control: false,
        alt: false,
        meta: false,
    };

    /// Whether a modifier that turns a key into a shortcut is held.
    pub fn has_command_modifier(&self) -> bool {
        self.control || self.meta
    }
}

/// Keys menus react to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Enter,
    Escape,
    ArrowLeft,
    ArrowUp,
    ArrowRight,
    ArrowDown,
    Home,
    End,
    /// A key that produces text; the text is in [`KeyPressEvent::text`].
    Character,
    /// Any other key.
    Other,
}

/// Key press event.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyPressEvent {
    /// The key that was pressed.
    pub key: Key,
    /// Keyboard modifiers held during the event.
    pub modifiers: KeyboardModifiers,
    /// The text input from this key press, empty for non-printable keys.
    pub text: String,
}

impl KeyPressEvent {
    /// Create a key press event with no text.
    pub fn new(key: Key) -> Self {
        Self {
            key,
            modifiers: KeyboardModifiers::NONE,
            text: String::new(),
        }
    }

    /// Create a printable key press for `ch`.
    pub fn character(ch: char) -> Self {
        Self {
            key: Key::Character,
            modifiers: KeyboardModifiers::NONE,
            text: ch.to_string(),
        }
    }

    /// Set the modifiers using builder pattern.
    pub fn with_modifiers(mut self, modifiers: KeyboardModifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    /// The character to try as a mnemonic, if any.
    pub fn mnemonic_char(&self) -> Option<char> {
        if self.key != Key::Character || self.modifiers.has_command_modifier() {
            return None;
        }
        self.text.chars().next()
    }
}

/// Mouse buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    /// Primary button (usually left).
    Left,
    /// Secondary button (usually right).
    Right,
    /// Middle button (scroll wheel click).
    Middle,
}

/// A mouse button press or release.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MouseButtonEvent {
    /// The button that changed state.
    pub button: MouseButton,
    /// Pointer position in viewport coordinates.
    pub pos: Point,
}

impl MouseButtonEvent {
    /// Create a mouse button event.
    pub fn new(button: MouseButton, pos: Point) -> Self {
        Self { button, pos }
    }

    /// A left button event at `(x, y)`.
    pub fn left(x: f32, y: f32) -> Self {
        Self::new(MouseButton::Left, Point::new(x, y))
    }
}

/// Input routed through [`MenuHost::dispatch`](crate::MenuHost::dispatch).
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    KeyPress(KeyPressEvent),
    MousePress(MouseButtonEvent),
    MouseRelease(MouseButtonEvent),
    /// The pointer moved to a new viewport position.
    MouseMove(Point),
    /// The pointer left the surface.
    PointerLeave,
    /// A context-menu request at a viewport position.
    ContextMenu(Point),
}

impl InputEvent {
    /// A key press with no modifiers or text.
    pub fn key(key: Key) -> Self {
        Self::KeyPress(KeyPressEvent::new(key))
    }

    /// A printable key press.
    pub fn char(ch: char) -> Self {
        Self::KeyPress(KeyPressEvent::character(ch))
    }

    /// A pointer move to `(x, y)`.
    pub fn mouse_move(x: f32, y: f32) -> Self {
        Self::MouseMove(Point::new(x, y))
    }

    /// A left button press at `(x, y)`.
    pub fn mouse_down(x: f32, y: f32) -> Self {
        Self::MousePress(MouseButtonEvent::left(x, y))
    }

    /// A left button release at `(x, y)`.
    pub fn mouse_up(x: f32, y: f32) -> Self {
        Self::MouseRelease(MouseButtonEvent::left(x, y))
    }

    /// The pointer position carried by the event, if any.
    pub fn pos(&self) -> Option<Point> {
        match self {
            Self::MousePress(ev) | Self::MouseRelease(ev) => Some(ev.pos),
            Self::MouseMove(pos) | Self::ContextMenu(pos) => Some(*pos),
            Self::KeyPress(_) | Self::PointerLeave => None,
        }
    }
}

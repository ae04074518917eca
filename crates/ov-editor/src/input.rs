//! Input abstraction layer.
//!
//! Normalizes pointer, keyboard and text-field events from the host toolkit
//! into one `InputEvent` enum. Pointer positions are in screen space; the
//! interaction state machine maps them to document space.

use kurbo::Point;
use serde::{Deserialize, Serialize};

/// Modifier keys held during an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        shift: false,
        ctrl: false,
        alt: false,
        meta: false,
    };

    pub const SHIFT: Modifiers = Modifiers {
        shift: true,
        ..Modifiers::NONE
    };

    pub const CTRL: Modifiers = Modifiers {
        ctrl: true,
        ..Modifiers::NONE
    };

    /// Ctrl on Linux/Windows, ⌘ on macOS.
    pub fn command(&self) -> bool {
        self.ctrl || self.meta
    }

    pub fn any(&self) -> bool {
        self.shift || self.ctrl || self.alt || self.meta
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PointerButton {
    #[default]
    Primary,
    Secondary,
}

fn one() -> u8 {
    1
}

/// A normalized input event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InputEvent {
    /// Pointer pressed. `click_count` is 2 for the second press of a
    /// double click.
    PointerDown {
        x: f64,
        y: f64,
        #[serde(default)]
        button: PointerButton,
        #[serde(default = "one")]
        click_count: u8,
        #[serde(default)]
        modifiers: Modifiers,
    },

    PointerMove {
        x: f64,
        y: f64,
        #[serde(default)]
        modifiers: Modifiers,
    },

    PointerUp {
        x: f64,
        y: f64,
        #[serde(default)]
        modifiers: Modifiers,
    },

    /// Key press. `key` is the `KeyboardEvent.key`-style name
    /// (`"z"`, `"Enter"`, `"ArrowLeft"`).
    Key {
        key: String,
        #[serde(default)]
        modifiers: Modifiers,
    },

    /// The inline text field's whole content changed.
    TextInput { text: String },

    /// The inline text field lost focus.
    Blur,
}

impl InputEvent {
    pub fn down(x: f64, y: f64) -> Self {
        Self::PointerDown {
            x,
            y,
            button: PointerButton::Primary,
            click_count: 1,
            modifiers: Modifiers::NONE,
        }
    }

    pub fn down_with(x: f64, y: f64, modifiers: Modifiers) -> Self {
        Self::PointerDown {
            x,
            y,
            button: PointerButton::Primary,
            click_count: 1,
            modifiers,
        }
    }

    pub fn double_click(x: f64, y: f64) -> Self {
        Self::PointerDown {
            x,
            y,
            button: PointerButton::Primary,
            click_count: 2,
            modifiers: Modifiers::NONE,
        }
    }

    pub fn right_click(x: f64, y: f64) -> Self {
        Self::PointerDown {
            x,
            y,
            button: PointerButton::Secondary,
            click_count: 1,
            modifiers: Modifiers::NONE,
        }
    }

    pub fn moved(x: f64, y: f64) -> Self {
        Self::PointerMove {
            x,
            y,
            modifiers: Modifiers::NONE,
        }
    }

    pub fn up(x: f64, y: f64) -> Self {
        Self::PointerUp {
            x,
            y,
            modifiers: Modifiers::NONE,
        }
    }

    pub fn key(key: &str) -> Self {
        Self::Key {
            key: key.to_string(),
            modifiers: Modifiers::NONE,
        }
    }

    pub fn key_with(key: &str, modifiers: Modifiers) -> Self {
        Self::Key {
            key: key.to_string(),
            modifiers,
        }
    }

    /// Screen position, if this is a pointer event.
    pub fn position(&self) -> Option<Point> {
        match self {
            Self::PointerDown { x, y, .. }
            | Self::PointerMove { x, y, .. }
            | Self::PointerUp { x, y, .. } => Some(Point::new(*x, *y)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn script_events_deserialize_with_defaults() {
        let events: Vec<InputEvent> = serde_json::from_str(
            r#"[
                {"type":"pointer_down","x":10,"y":20},
                {"type":"pointer_down","x":10,"y":20,"click_count":2,"modifiers":{"shift":true}},
                {"type":"key","key":"Delete"},
                {"type":"blur"}
            ]"#,
        )
        .unwrap();
        assert_eq!(events[0], InputEvent::down(10.0, 20.0));
        assert!(matches!(
            events[1],
            InputEvent::PointerDown {
                click_count: 2,
                modifiers: Modifiers { shift: true, .. },
                ..
            }
        ));
        assert_eq!(events[2], InputEvent::key("Delete"));
        assert_eq!(events[3], InputEvent::Blur);
    }

    #[test]
    fn position_only_for_pointer_events() {
        assert_eq!(InputEvent::moved(1.0, 2.0).position(), Some(Point::new(1.0, 2.0)));
        assert_eq!(InputEvent::key("a").position(), None);
    }
}

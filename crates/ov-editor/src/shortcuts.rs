//! Keyboard shortcut mapping.
//!
//! Maps key + modifier combos to semantic `ShortcutAction`s. Keys typed
//! into the inline text editor never reach this map; the interaction
//! state machine routes them to the edit buffer first.

/// Actions that keyboard shortcuts can trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShortcutAction {
    // ── Tool switching ──
    ToolSelect,
    ToolLine,
    ToolRect,
    ToolCircle,
    ToolPolyline,
    ToolText,
    ToolTextBox,

    // ── Edit ──
    Undo,
    Redo,
    Delete,
    SelectAll,
    /// Move the selection by one step; `large` is the Shift variant.
    Nudge { dx: i8, dy: i8, large: bool },

    // ── View ──
    ZoomIn,
    ZoomOut,
    ZoomReset,

    // ── UI ──
    /// Cancel the current gesture, or clear the selection when idle.
    Escape,
    /// Finish the shape under construction.
    Confirm,
}

/// Resolves key events into shortcut actions.
///
/// On macOS `meta` is ⌘, on other platforms `ctrl` serves the same role.
pub struct ShortcutMap;

impl ShortcutMap {
    /// Resolve a key event to an action.
    ///
    /// `key` is the `KeyboardEvent.key` value (e.g. `"z"`, `"Delete"`).
    /// Returns `None` if the key combo has no binding.
    pub fn resolve(
        key: &str,
        ctrl: bool,
        shift: bool,
        _alt: bool,
        meta: bool,
    ) -> Option<ShortcutAction> {
        let cmd = ctrl || meta;

        // ── Modifier combos first (most specific) ──
        if cmd && shift {
            return match key {
                "z" | "Z" => Some(ShortcutAction::Redo),
                _ => None,
            };
        }

        if cmd {
            return match key {
                "z" | "Z" => Some(ShortcutAction::Undo),
                "y" | "Y" => Some(ShortcutAction::Redo),
                "a" | "A" => Some(ShortcutAction::SelectAll),
                "=" | "+" => Some(ShortcutAction::ZoomIn),
                "-" => Some(ShortcutAction::ZoomOut),
                "0" => Some(ShortcutAction::ZoomReset),
                _ => None,
            };
        }

        if let Some((dx, dy)) = arrow(key) {
            return Some(ShortcutAction::Nudge {
                dx,
                dy,
                large: shift,
            });
        }

        if shift {
            return None;
        }

        // ── Single keys (no modifiers) ──
        match key {
            "v" | "V" => Some(ShortcutAction::ToolSelect),
            "l" | "L" => Some(ShortcutAction::ToolLine),
            "r" | "R" => Some(ShortcutAction::ToolRect),
            "o" | "O" => Some(ShortcutAction::ToolCircle),
            "p" | "P" => Some(ShortcutAction::ToolPolyline),
            "t" | "T" => Some(ShortcutAction::ToolText),
            "b" | "B" => Some(ShortcutAction::ToolTextBox),
            "Delete" | "Backspace" => Some(ShortcutAction::Delete),
            "Escape" => Some(ShortcutAction::Escape),
            "Enter" => Some(ShortcutAction::Confirm),
            _ => None,
        }
    }
}

fn arrow(key: &str) -> Option<(i8, i8)> {
    match key {
        "ArrowLeft" => Some((-1, 0)),
        "ArrowRight" => Some((1, 0)),
        "ArrowUp" => Some((0, -1)),
        "ArrowDown" => Some((0, 1)),
        _ => None,
    }
}

//! Keyboard shortcut registry and documentation.

use deskpin_core::WidgetKind;

/// What a shortcut does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShortcutAction {
    /// Cycle the focused widget's z-policy.
    CycleZPolicy,
    /// Toggle click-through on the focused widget.
    ToggleClickThrough,
    /// Turn click-through off on every widget.
    ClearAllClickThrough,
    /// Close the focused widget. Closing the last one exits.
    CloseWidget,
    /// Start or pause the focused timer.
    ToggleTimer,
    /// Stop and zero the focused timer.
    ResetTimer,
    /// Turn edge snapping on or off for every widget.
    ToggleSnapping,
    /// Add a widget of the given kind.
    AddWidget(WidgetKind),
    /// Flush the layout and exit.
    Quit,
}

/// A keyboard shortcut definition.
#[derive(Debug, Clone)]
pub struct Shortcut {
    pub key: &'static str,
    pub ctrl: bool,
    pub shift: bool,
    pub description: &'static str,
    pub action: ShortcutAction,
}

impl Shortcut {
    pub const fn new(
        key: &'static str,
        ctrl: bool,
        shift: bool,
        description: &'static str,
        action: ShortcutAction,
    ) -> Self {
        Self {
            key,
            ctrl,
            shift,
            description,
            action,
        }
    }

    /// Format the shortcut for display (e.g., "Ctrl+K").
    pub fn format(&self) -> String {
        let mut parts = Vec::new();
        if self.ctrl {
            parts.push("Ctrl");
        }
        if self.shift {
            parts.push("Shift");
        }
        parts.push(self.key);
        parts.join("+")
    }

    /// Whether a key press with these modifiers triggers this shortcut.
    pub fn matches(&self, key: &str, ctrl: bool, shift: bool) -> bool {
        self.ctrl == ctrl && self.shift == shift && self.key.eq_ignore_ascii_case(key)
    }
}

/// Registry of all keyboard shortcuts.
pub struct ShortcutRegistry;

impl ShortcutRegistry {
    /// Get all registered shortcuts.
    pub fn all() -> Vec<Shortcut> {
        use ShortcutAction::*;
        vec![
            Shortcut::new("T", true, false, "Cycle z-policy", CycleZPolicy),
            Shortcut::new("K", true, false, "Toggle click-through", ToggleClickThrough),
            Shortcut::new("K", true, true, "Disable click-through on all widgets", ClearAllClickThrough),
            Shortcut::new("W", true, false, "Close widget (last one quits)", CloseWidget),
            Shortcut::new("P", true, false, "Start/pause timer", ToggleTimer),
            Shortcut::new("R", true, false, "Reset timer", ResetTimer),
            Shortcut::new("G", true, false, "Toggle edge snapping", ToggleSnapping),
            Shortcut::new("1", true, false, "Add clock", AddWidget(WidgetKind::Clock)),
            Shortcut::new("2", true, false, "Add system monitor", AddWidget(WidgetKind::SystemMonitor)),
            Shortcut::new("3", true, false, "Add timer", AddWidget(WidgetKind::Timer)),
            Shortcut::new("4", true, false, "Add notes", AddWidget(WidgetKind::Notes)),
            Shortcut::new("5", true, false, "Add image", AddWidget(WidgetKind::Image)),
            Shortcut::new("6", true, false, "Add web bookmark", AddWidget(WidgetKind::Web)),
            Shortcut::new("Q", true, false, "Save layout and quit", Quit),
        ]
    }

    /// Find the action bound to a key press.
    pub fn find(key: &str, ctrl: bool, shift: bool) -> Option<ShortcutAction> {
        Self::all()
            .into_iter()
            .find(|shortcut| shortcut.matches(key, ctrl, shift))
            .map(|shortcut| shortcut.action)
    }

    /// Print all shortcuts to console.
    pub fn print_all() {
        println!("\n=== Keyboard Shortcuts ===");
        for shortcut in Self::all() {
            println!("  {:20} {}", shortcut.format(), shortcut.description);
        }
        println!("  {:20} {}", "Drag", "Move widget");
        println!("  {:20} {}", "Drag corner", "Resize widget");
        println!();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format() {
        let shortcut = Shortcut::new("K", true, true, "", ShortcutAction::ClearAllClickThrough);
        assert_eq!(shortcut.format(), "Ctrl+Shift+K");
    }

    #[test]
    fn test_find_respects_modifiers() {
        assert_eq!(
            ShortcutRegistry::find("k", true, false),
            Some(ShortcutAction::ToggleClickThrough)
        );
        assert_eq!(
            ShortcutRegistry::find("K", true, true),
            Some(ShortcutAction::ClearAllClickThrough)
        );
        assert_eq!(ShortcutRegistry::find("k", false, false), None);
    }

    #[test]
    fn test_timer_and_snap_bindings() {
        assert_eq!(ShortcutRegistry::find("p", true, false), Some(ShortcutAction::ToggleTimer));
        assert_eq!(ShortcutRegistry::find("R", true, false), Some(ShortcutAction::ResetTimer));
        assert_eq!(ShortcutRegistry::find("g", true, false), Some(ShortcutAction::ToggleSnapping));
    }

    #[test]
    fn test_every_kind_has_an_add_shortcut() {
        for kind in WidgetKind::ALL {
            assert!(
                ShortcutRegistry::all()
                    .iter()
                    .any(|s| s.action == ShortcutAction::AddWidget(kind)),
                "no shortcut adds {kind}"
            );
        }
    }

    #[test]
    fn test_no_duplicate_bindings() {
        let all = ShortcutRegistry::all();
        for (i, a) in all.iter().enumerate() {
            for b in &all[i + 1..] {
                assert!(!b.matches(a.key, a.ctrl, a.shift), "{} bound twice", a.format());
            }
        }
    }
}

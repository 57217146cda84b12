//! Viewer actions and their keyboard / button bindings

/// A discrete user command
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViewerAction {
    ToggleGrid,
    ToggleAutoRotate,
    ResetView,
    ZoomIn,
    ZoomOut,
}

impl ViewerAction {
    /// All actions that have a toolbar button, in toolbar order
    pub const BUTTONS: [ViewerAction; 5] = [
        ViewerAction::ResetView,
        ViewerAction::ToggleAutoRotate,
        ViewerAction::ToggleGrid,
        ViewerAction::ZoomIn,
        ViewerAction::ZoomOut,
    ];

    /// DOM element id of the button bound to this action
    pub fn button_id(&self) -> &'static str {
        match self {
            ViewerAction::ResetView => "reset-view",
            ViewerAction::ToggleAutoRotate => "auto-rotate",
            ViewerAction::ToggleGrid => "toggle-grid",
            ViewerAction::ZoomIn => "zoom-in",
            ViewerAction::ZoomOut => "zoom-out",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ViewerAction::ResetView => "Reset View",
            ViewerAction::ToggleAutoRotate => "Auto Rotate",
            ViewerAction::ToggleGrid => "Toggle Grid",
            ViewerAction::ZoomIn => "Zoom In",
            ViewerAction::ZoomOut => "Zoom Out",
        }
    }
}

/// Result of mapping a key press
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyCommand {
    pub action: ViewerAction,
    /// Whether the browser's default handling of the key should be suppressed
    pub prevent_default: bool,
}

/// Map a `KeyboardEvent.key` value to an action
pub fn action_for_key(key: &str) -> Option<KeyCommand> {
    let (action, prevent_default) = match key {
        "g" | "G" => (ViewerAction::ToggleGrid, true),
        "r" | "R" => (ViewerAction::ResetView, false),
        " " => (ViewerAction::ToggleAutoRotate, true),
        "+" => (ViewerAction::ZoomIn, false),
        "-" => (ViewerAction::ZoomOut, false),
        _ => return None,
    };
    Some(KeyCommand {
        action,
        prevent_default,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_bindings() {
        let action = |key| action_for_key(key).map(|c| c.action);
        assert_eq!(action("g"), Some(ViewerAction::ToggleGrid));
        assert_eq!(action("G"), Some(ViewerAction::ToggleGrid));
        assert_eq!(action("r"), Some(ViewerAction::ResetView));
        assert_eq!(action("R"), Some(ViewerAction::ResetView));
        assert_eq!(action(" "), Some(ViewerAction::ToggleAutoRotate));
        assert_eq!(action("+"), Some(ViewerAction::ZoomIn));
        assert_eq!(action("-"), Some(ViewerAction::ZoomOut));
        assert_eq!(action("x"), None);
        assert_eq!(action("Enter"), None);
    }

    #[test]
    fn test_prevent_default_only_for_grid_and_space() {
        assert!(action_for_key("g").unwrap().prevent_default);
        assert!(action_for_key(" ").unwrap().prevent_default);
        assert!(!action_for_key("r").unwrap().prevent_default);
        assert!(!action_for_key("+").unwrap().prevent_default);
    }

    #[test]
    fn test_button_ids() {
        let ids: Vec<&str> = ViewerAction::BUTTONS.iter().map(|a| a.button_id()).collect();
        assert_eq!(
            ids,
            vec!["reset-view", "auto-rotate", "toggle-grid", "zoom-in", "zoom-out"]
        );
    }
}

//! User-visible button text and styles

use crate::state::ViewerState;

pub const HIDE_GRID: &str = "Hide Grid";
pub const SHOW_GRID: &str = "Show Grid";
pub const STOP_ROTATION: &str = "Stop Rotation";
pub const AUTO_ROTATE: &str = "Auto Rotate";

/// Two-stop gradient used as a button background
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Gradient {
    pub from: u32,
    pub to: u32,
}

impl Gradient {
    /// CSS `background` value
    pub fn css(&self) -> String {
        format!("linear-gradient(45deg, #{:06x}, #{:06x})", self.from, self.to)
    }
}

pub const ROTATING_BACKGROUND: Gradient = Gradient {
    from: 0xff6b6b,
    to: 0xee5a52,
};

pub const IDLE_BACKGROUND: Gradient = Gradient {
    from: 0x667eea,
    to: 0x764ba2,
};

/// Color of load failure messages
pub const ERROR_COLOR: u32 = 0xff6b6b;

pub fn grid_button_label(state: &ViewerState) -> &'static str {
    if state.grid_visible { HIDE_GRID } else { SHOW_GRID }
}

pub fn auto_rotate_button_label(state: &ViewerState) -> &'static str {
    if state.auto_rotating {
        STOP_ROTATION
    } else {
        AUTO_ROTATE
    }
}

pub fn auto_rotate_button_background(state: &ViewerState) -> Gradient {
    if state.auto_rotating {
        ROTATING_BACKGROUND
    } else {
        IDLE_BACKGROUND
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels_follow_state() {
        let mut state = ViewerState::default();
        assert_eq!(grid_button_label(&state), HIDE_GRID);
        assert_eq!(auto_rotate_button_label(&state), AUTO_ROTATE);

        state.toggle_grid();
        state.toggle_auto_rotate();
        assert_eq!(grid_button_label(&state), SHOW_GRID);
        assert_eq!(auto_rotate_button_label(&state), STOP_ROTATION);
        assert_eq!(auto_rotate_button_background(&state), ROTATING_BACKGROUND);
    }

    #[test]
    fn test_gradient_css() {
        assert_eq!(
            ROTATING_BACKGROUND.css(),
            "linear-gradient(45deg, #ff6b6b, #ee5a52)"
        );
        assert_eq!(IDLE_BACKGROUND.css(), "linear-gradient(45deg, #667eea, #764ba2)");
    }
}

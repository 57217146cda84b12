//! Mutable view state driven by buttons and keyboard shortcuts

/// View toggles read every frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewerState {
    pub grid_visible: bool,
    pub auto_rotating: bool,
    pub auto_rotate_speed: f32,
}

impl ViewerState {
    pub fn new(auto_rotate_speed: f32) -> Self {
        Self {
            grid_visible: true,
            auto_rotating: false,
            auto_rotate_speed,
        }
    }

    /// Flip grid visibility, returning the new value
    pub fn toggle_grid(&mut self) -> bool {
        self.grid_visible = !self.grid_visible;
        self.grid_visible
    }

    /// Flip auto-rotation, returning the new value
    pub fn toggle_auto_rotate(&mut self) -> bool {
        self.auto_rotating = !self.auto_rotating;
        self.auto_rotating
    }

    /// A view reset always stops auto-rotation
    pub fn reset(&mut self) {
        self.auto_rotating = false;
    }
}

impl Default for ViewerState {
    fn default() -> Self {
        Self::new(0.5)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state() {
        let state = ViewerState::default();
        assert!(state.grid_visible);
        assert!(!state.auto_rotating);
        assert_eq!(state.auto_rotate_speed, 0.5);
    }

    #[test]
    fn test_grid_toggle_parity() {
        for n in 0..12 {
            let mut state = ViewerState::default();
            for _ in 0..n {
                state.toggle_grid();
            }
            assert_eq!(state.grid_visible, n % 2 == 0, "after {} toggles", n);
        }
    }

    #[test]
    fn test_reset_stops_rotation() {
        let mut state = ViewerState::default();
        state.reset();
        assert!(!state.auto_rotating);

        assert!(state.toggle_auto_rotate());
        state.reset();
        assert!(!state.auto_rotating);
    }

    #[test]
    fn test_toggles_are_independent() {
        let mut state = ViewerState::default();
        state.toggle_auto_rotate();
        assert!(state.grid_visible);
        state.toggle_grid();
        assert!(state.auto_rotating);
    }
}

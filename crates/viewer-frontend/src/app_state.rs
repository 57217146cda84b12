//! State shared between the UI thread, DOM callbacks and the loader

use std::sync::Arc;

use parking_lot::Mutex;

use viewer_core::{LoadEvent, ViewerAction};

/// Queues drained by the app once per frame
#[derive(Debug, Default)]
pub struct AppState {
    pending_actions: Vec<ViewerAction>,
    load_events: Vec<LoadEvent>,
}

impl AppState {
    /// Queue a viewer action (button, key or toolbar)
    pub fn queue_action(&mut self, action: ViewerAction) {
        self.pending_actions.push(action);
    }

    /// Report loader progress or completion
    pub fn push_load_event(&mut self, event: LoadEvent) {
        self.load_events.push(event);
    }

    pub fn take_actions(&mut self) -> Vec<ViewerAction> {
        std::mem::take(&mut self.pending_actions)
    }

    pub fn take_load_events(&mut self) -> Vec<LoadEvent> {
        std::mem::take(&mut self.load_events)
    }
}

pub type SharedAppState = Arc<Mutex<AppState>>;

pub fn create_shared_state() -> SharedAppState {
    Arc::new(Mutex::new(AppState::default()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_actions_drain_in_order() {
        let state = create_shared_state();
        state.lock().queue_action(ViewerAction::ToggleGrid);
        state.lock().queue_action(ViewerAction::ZoomIn);

        let actions = state.lock().take_actions();
        assert_eq!(actions, vec![ViewerAction::ToggleGrid, ViewerAction::ZoomIn]);
        assert!(state.lock().take_actions().is_empty());
    }

    #[test]
    fn test_load_events_drain() {
        let state = create_shared_state();
        state.lock().push_load_event(LoadEvent::Progress(0.5));
        let events = state.lock().take_load_events();
        assert_eq!(events.len(), 1);
        assert!(matches!(events[0], LoadEvent::Progress(p) if p == 0.5));
        assert!(state.lock().take_load_events().is_empty());
    }
}

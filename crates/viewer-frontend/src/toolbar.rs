//! Native toolbar and load status overlay

use viewer_core::labels::{self, ERROR_COLOR};
use viewer_core::{LoadStatus, ViewerAction, ViewerState, format_percent};

use crate::app_state::SharedAppState;

fn hex_color(hex: u32) -> egui::Color32 {
    egui::Color32::from_rgb((hex >> 16) as u8, (hex >> 8) as u8, hex as u8)
}

/// Fill and outline of the auto-rotate button, from the two gradient stops
pub fn auto_rotate_colors(state: &ViewerState) -> (egui::Color32, egui::Color32) {
    let gradient = labels::auto_rotate_button_background(state);
    (hex_color(gradient.from), hex_color(gradient.to))
}

/// Button text for an action, following the current view state
pub fn button_label(action: ViewerAction, state: &ViewerState) -> &'static str {
    match action {
        ViewerAction::ToggleGrid => labels::grid_button_label(state),
        ViewerAction::ToggleAutoRotate => labels::auto_rotate_button_label(state),
        other => other.name(),
    }
}

/// Keyboard shortcut shown in the button tooltip
pub fn shortcut(action: ViewerAction) -> &'static str {
    match action {
        ViewerAction::ToggleGrid => "G",
        ViewerAction::ResetView => "R",
        ViewerAction::ToggleAutoRotate => "Space",
        ViewerAction::ZoomIn => "+",
        ViewerAction::ZoomOut => "-",
    }
}

/// Text of the centered status overlay, `None` once the model is shown
pub fn status_text(status: &LoadStatus) -> Option<String> {
    match status {
        LoadStatus::Loading => Some("Loading model...".to_string()),
        LoadStatus::Progress(fraction) => {
            Some(format!("Loading model... {}", format_percent(*fraction)))
        }
        LoadStatus::Ready => None,
        LoadStatus::Failed(message) => Some(message.clone()),
    }
}

pub fn show_toolbar(ctx: &egui::Context, state: &ViewerState, app_state: &SharedAppState) {
    egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
        ui.horizontal(|ui| {
            for action in ViewerAction::BUTTONS {
                let text = egui::RichText::new(button_label(action, state));
                let button = if action == ViewerAction::ToggleAutoRotate {
                    let (fill, outline) = auto_rotate_colors(state);
                    egui::Button::new(text.color(egui::Color32::WHITE))
                        .fill(fill)
                        .stroke(egui::Stroke::new(2.0, outline))
                } else {
                    egui::Button::new(text)
                };

                let response = ui
                    .add(button)
                    .on_hover_text(format!("{} ({})", action.name(), shortcut(action)));
                if response.clicked() {
                    app_state.lock().queue_action(action);
                }
            }
        });
    });
}

pub fn show_status_overlay(ctx: &egui::Context, status: &LoadStatus) {
    let Some(text) = status_text(status) else {
        return;
    };

    egui::Area::new(egui::Id::new("load_status"))
        .anchor(egui::Align2::CENTER_CENTER, egui::Vec2::ZERO)
        .interactable(false)
        .show(ctx, |ui| {
            egui::Frame::popup(ui.style()).show(ui, |ui| {
                match status {
                    LoadStatus::Failed(_) => {
                        ui.colored_label(hex_color(ERROR_COLOR), text);
                    }
                    LoadStatus::Progress(fraction) => {
                        ui.label(text);
                        ui.add(egui::ProgressBar::new(*fraction).desired_width(200.0));
                    }
                    _ => {
                        ui.horizontal(|ui| {
                            ui.spinner();
                            ui.label(text);
                        });
                    }
                }
            });
        });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_button_labels_follow_state() {
        let mut state = ViewerState::default();
        assert_eq!(button_label(ViewerAction::ToggleGrid, &state), "Hide Grid");
        assert_eq!(button_label(ViewerAction::ToggleAutoRotate, &state), "Auto Rotate");
        assert_eq!(button_label(ViewerAction::ResetView, &state), "Reset View");

        state.toggle_grid();
        state.toggle_auto_rotate();
        assert_eq!(button_label(ViewerAction::ToggleGrid, &state), "Show Grid");
        assert_eq!(button_label(ViewerAction::ToggleAutoRotate, &state), "Stop Rotation");
    }

    #[test]
    fn test_status_text() {
        assert_eq!(status_text(&LoadStatus::Ready), None);
        assert_eq!(
            status_text(&LoadStatus::Progress(0.5)).as_deref(),
            Some("Loading model... 50.00%")
        );
        assert_eq!(
            status_text(&LoadStatus::Failed("Failed to load model: x".into())).as_deref(),
            Some("Failed to load model: x")
        );
    }

    #[test]
    fn test_auto_rotate_colors_use_both_stops() {
        let mut state = ViewerState::default();
        assert_eq!(
            auto_rotate_colors(&state),
            (hex_color(0x667eea), hex_color(0x764ba2))
        );

        state.toggle_auto_rotate();
        assert_eq!(
            auto_rotate_colors(&state),
            (hex_color(0xff6b6b), hex_color(0xee5a52))
        );
    }

    #[test]
    fn test_hex_color() {
        assert_eq!(hex_color(0xff6b6b), egui::Color32::from_rgb(0xff, 0x6b, 0x6b));
    }
}

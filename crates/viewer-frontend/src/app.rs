//! Main application

use viewer_core::{LoadEvent, ViewerConfig};

use crate::app_state::{SharedAppState, create_shared_state};
use crate::controller::ViewerController;
use crate::error::AppError;
use crate::loader;
use crate::viewport_state::{ViewportState, render_size};

/// GLB viewer application
pub struct ViewerApp {
    app_state: SharedAppState,
    controller: ViewerController,
    viewport: ViewportState,
    render_state: egui_wgpu::RenderState,
    #[cfg(target_arch = "wasm32")]
    dom: crate::dom::DomBindings,
}

impl ViewerApp {
    /// Create the app and start loading the configured model
    pub fn new(cc: &eframe::CreationContext<'_>, config: ViewerConfig) -> Result<Self, AppError> {
        let render_state = cc
            .wgpu_render_state
            .clone()
            .ok_or(AppError::NoRenderState)?;

        let viewport = ViewportState::new(
            render_state.device.clone(),
            render_state.queue.clone(),
            render_state.target_format,
            &config,
        );
        tracing::info!("Renderer ready ({:?})", render_state.target_format);

        let app_state = create_shared_state();

        #[cfg(target_arch = "wasm32")]
        let dom = crate::dom::DomBindings::bind(app_state.clone())?;

        if let Err(e) = loader::start_load(
            config.asset.model_path.clone(),
            app_state.clone(),
            cc.egui_ctx.clone(),
        ) {
            app_state.lock().push_load_event(LoadEvent::Failed(e));
        }

        Ok(Self {
            app_state,
            controller: ViewerController::new(config),
            viewport,
            render_state,
            #[cfg(target_arch = "wasm32")]
            dom,
        })
    }

    fn process_load_events(&mut self) {
        let events = self.app_state.lock().take_load_events();
        for event in events {
            self.controller.handle_load_event(event);
        }

        if self.controller.take_model_changed()
            && let Some(model) = self.controller.model()
        {
            self.viewport.set_model(model);
        }
    }

    /// Map typed characters to actions. The browser build reads keys from the page.
    #[cfg(not(target_arch = "wasm32"))]
    fn process_key_input(&self, ctx: &egui::Context) {
        if ctx.wants_keyboard_input() {
            return;
        }

        let typed: Vec<String> = ctx.input(|i| {
            i.events
                .iter()
                .filter_map(|event| match event {
                    egui::Event::Text(text) => Some(text.clone()),
                    _ => None,
                })
                .collect()
        });

        for text in typed {
            if let Some(command) = viewer_core::action_for_key(&text) {
                self.app_state.lock().queue_action(command.action);
            }
        }
    }

    fn process_actions(&mut self) {
        let actions = self.app_state.lock().take_actions();
        for action in actions {
            tracing::debug!("Action: {}", action.name());
            self.controller.handle_action(action);
        }
    }

    fn show_viewport(&mut self, ui: &mut egui::Ui) {
        let rect = ui.available_rect_before_wrap();
        let response = ui.allocate_rect(rect, egui::Sense::click_and_drag());

        let drag = response.drag_delta();
        let drag = glam::Vec2::new(drag.x, drag.y);
        if response.dragged_by(egui::PointerButton::Primary) {
            self.controller.rotate_drag(drag, rect.height());
        } else if response.dragged_by(egui::PointerButton::Secondary)
            || response.dragged_by(egui::PointerButton::Middle)
        {
            self.controller.pan_drag(drag, rect.height());
        }

        if response.hovered() {
            let scroll = ui.input(|i| i.raw_scroll_delta.y);
            self.controller.wheel(scroll);

            if let Some(pinch) = ui.input(|i| i.multi_touch().map(|touch| touch.zoom_delta)) {
                self.controller.wheel(pinch - 1.0);
            }
        }

        self.controller.resize(rect.width(), rect.height());
        let (width, height) = render_size(
            rect.size(),
            ui.ctx().pixels_per_point(),
            self.controller.config().renderer.max_pixel_ratio,
        );
        let texture_id = {
            let mut egui_renderer = self.render_state.renderer.write();
            self.viewport
                .ensure_texture(width, height, &mut egui_renderer)
        };

        self.controller.update();
        self.viewport.sync(&self.controller);
        self.viewport.render();

        if let Some(texture_id) = texture_id {
            egui::Image::new(egui::load::SizedTexture::new(texture_id, rect.size()))
                .paint_at(ui, rect);
        }
    }
}

impl eframe::App for ViewerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.process_load_events();
        #[cfg(not(target_arch = "wasm32"))]
        self.process_key_input(ctx);
        self.process_actions();

        #[cfg(not(target_arch = "wasm32"))]
        crate::toolbar::show_toolbar(ctx, self.controller.state(), &self.app_state);
        #[cfg(target_arch = "wasm32")]
        self.dom.sync(&self.controller);

        egui::CentralPanel::default()
            .frame(egui::Frame::none())
            .show(ctx, |ui| self.show_viewport(ui));

        #[cfg(not(target_arch = "wasm32"))]
        crate::toolbar::show_status_overlay(ctx, self.controller.status());

        ctx.request_repaint();
    }
}

//! Browser page bindings
//!
//! The page provides the canvas, the loading indicator and the toolbar
//! buttons. Buttons and keys queue [`ViewerAction`]s into the shared app
//! state; the app mirrors view state back into the elements each frame.

use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;
use web_sys::{AddEventListenerOptions, Document, Event, EventTarget, HtmlCanvasElement, HtmlElement};

use viewer_core::labels::{self, ERROR_COLOR};
use viewer_core::{LoadStatus, ViewerAction, action_for_key};

use crate::app_state::SharedAppState;
use crate::controller::ViewerController;

pub const CONTAINER_ID: &str = "canvas-container";
pub const CANVAS_ID: &str = "model-canvas";
pub const LOADING_ID: &str = "loading";

/// Errors raised while binding to the page
#[derive(Debug, thiserror::Error)]
pub enum DomError {
    #[error("no browser window")]
    NoWindow,

    #[error("no document in window")]
    NoDocument,

    #[error("element #{0} not found")]
    MissingElement(String),

    #[error("element #{id} is not a {expected}")]
    WrongElementType { id: String, expected: &'static str },

    #[error("DOM call failed: {0}")]
    Js(String),
}

impl From<wasm_bindgen::JsValue> for DomError {
    fn from(value: wasm_bindgen::JsValue) -> Self {
        DomError::Js(format!("{:?}", value))
    }
}

type Listener = Closure<dyn FnMut(Event)>;

fn document() -> Result<Document, DomError> {
    web_sys::window()
        .ok_or(DomError::NoWindow)?
        .document()
        .ok_or(DomError::NoDocument)
}

fn element_by_id<T: JsCast>(
    document: &Document,
    id: &str,
    expected: &'static str,
) -> Result<T, DomError> {
    document
        .get_element_by_id(id)
        .ok_or_else(|| DomError::MissingElement(id.to_string()))?
        .dyn_into::<T>()
        .map_err(|_| DomError::WrongElementType {
            id: id.to_string(),
            expected,
        })
}

/// The canvas the renderer draws into
pub fn canvas() -> Result<HtmlCanvasElement, DomError> {
    element_by_id(&document()?, CANVAS_ID, "canvas")
}

fn listen(
    target: &EventTarget,
    event_type: &str,
    passive: bool,
    handler: impl FnMut(Event) + 'static,
) -> Result<Listener, DomError> {
    let closure = Closure::<dyn FnMut(Event)>::new(handler);
    let options = AddEventListenerOptions::new();
    options.set_passive(passive);
    target.add_event_listener_with_callback_and_add_event_listener_options(
        event_type,
        closure.as_ref().unchecked_ref(),
        &options,
    )?;
    Ok(closure)
}

fn is_multi_touch(event: &Event) -> bool {
    event
        .dyn_ref::<web_sys::TouchEvent>()
        .is_some_and(|touch| touch.touches().length() > 1)
}

/// Last values written to the page, to avoid touching the DOM every frame
#[derive(Debug, Default, PartialEq)]
struct Rendered {
    grid_visible: Option<bool>,
    auto_rotating: Option<bool>,
    status: Option<LoadStatus>,
}

/// Live bindings to the page elements
pub struct DomBindings {
    document: Document,
    loading: HtmlElement,
    grid_button: HtmlElement,
    auto_rotate_button: HtmlElement,
    rendered: Rendered,
    _listeners: Vec<Listener>,
}

impl DomBindings {
    /// Look up every element and install the listeners.
    ///
    /// Any missing element fails the whole bind.
    pub fn bind(state: SharedAppState) -> Result<Self, DomError> {
        let document = document()?;

        let container: HtmlElement = element_by_id(&document, CONTAINER_ID, "HTML element")?;
        let canvas: HtmlCanvasElement = element_by_id(&document, CANVAS_ID, "canvas")?;
        let loading: HtmlElement = element_by_id(&document, LOADING_ID, "HTML element")?;
        tracing::debug!(
            "Bound #{} ({}x{})",
            CONTAINER_ID,
            container.client_width(),
            container.client_height()
        );

        let mut listeners = Vec::new();

        for action in ViewerAction::BUTTONS {
            let button: HtmlElement = element_by_id(&document, action.button_id(), "HTML element")?;
            let state = state.clone();
            listeners.push(listen(&button, "click", true, move |_| {
                state.lock().queue_action(action);
            })?);
        }

        let key_state = state.clone();
        listeners.push(listen(&document, "keydown", false, move |event| {
            let Some(key_event) = event.dyn_ref::<web_sys::KeyboardEvent>() else {
                return;
            };
            if let Some(command) = action_for_key(&key_event.key()) {
                if command.prevent_default {
                    event.prevent_default();
                }
                key_state.lock().queue_action(command.action);
            }
        })?);

        for event_type in ["touchstart", "touchmove"] {
            listeners.push(listen(&canvas, event_type, false, |event| {
                if is_multi_touch(&event) {
                    event.prevent_default();
                }
            })?);
        }
        for event_type in ["contextmenu", "wheel", "dragstart", "selectstart"] {
            listeners.push(listen(&canvas, event_type, false, |event| {
                event.prevent_default();
            })?);
        }

        let grid_button = element_by_id(
            &document,
            ViewerAction::ToggleGrid.button_id(),
            "HTML element",
        )?;
        let auto_rotate_button = element_by_id(
            &document,
            ViewerAction::ToggleAutoRotate.button_id(),
            "HTML element",
        )?;

        tracing::info!("Bound {} page listeners", listeners.len());

        Ok(Self {
            document,
            loading,
            grid_button,
            auto_rotate_button,
            rendered: Rendered::default(),
            _listeners: listeners,
        })
    }

    /// Mirror button labels and load status into the page
    pub fn sync(&mut self, controller: &ViewerController) {
        let state = controller.state();

        if self.rendered.grid_visible != Some(state.grid_visible) {
            self.grid_button
                .set_text_content(Some(labels::grid_button_label(state)));
            self.rendered.grid_visible = Some(state.grid_visible);
        }

        if self.rendered.auto_rotating != Some(state.auto_rotating) {
            self.auto_rotate_button
                .set_text_content(Some(labels::auto_rotate_button_label(state)));
            let background = labels::auto_rotate_button_background(state).css();
            if let Err(e) = self
                .auto_rotate_button
                .style()
                .set_property("background", &background)
            {
                tracing::warn!("Could not style auto-rotate button: {:?}", e);
            }
            self.rendered.auto_rotating = Some(state.auto_rotating);
        }

        let status = controller.status();
        if self.rendered.status.as_ref() != Some(status) {
            if let Err(e) = self.show_status(status) {
                tracing::warn!("Could not update loading indicator: {}", e);
            }
            self.rendered.status = Some(status.clone());
        }
    }

    fn show_status(&self, status: &LoadStatus) -> Result<(), DomError> {
        match status {
            LoadStatus::Loading | LoadStatus::Progress(_) => Ok(()),
            LoadStatus::Ready => {
                self.loading.style().set_property("display", "none")?;
                Ok(())
            }
            LoadStatus::Failed(message) => {
                let paragraph = self.document.create_element("p")?;
                paragraph.set_attribute("style", &format!("color: #{:06x};", ERROR_COLOR))?;
                paragraph.set_text_content(Some(message));
                self.loading.set_inner_html("");
                self.loading.append_child(&paragraph)?;
                Ok(())
            }
        }
    }
}

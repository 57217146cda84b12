//! Model loader task
//!
//! One load per run. Native builds read the file on a background thread;
//! the browser build streams it with `fetch` on the page's event loop. Both
//! report through the shared app state.

use viewer_core::{LoadError, LoadEvent, Model};

use crate::app_state::SharedAppState;

fn report(state: &SharedAppState, ctx: &egui::Context, event: LoadEvent) {
    state.lock().push_load_event(event);
    ctx.request_repaint();
}

fn finish(state: &SharedAppState, ctx: &egui::Context, result: Result<Model, LoadError>) {
    let event = match result {
        Ok(model) => LoadEvent::Loaded(model),
        Err(e) => LoadEvent::Failed(e),
    };
    report(state, ctx, event);
}

/// Read and decode a GLB file, reporting progress as it is read
#[cfg(not(target_arch = "wasm32"))]
pub fn load_file(
    path: &std::path::Path,
    on_progress: impl FnMut(f32),
) -> Result<Model, LoadError> {
    let file = std::fs::File::open(path)?;
    let total = file.metadata().ok().map(|m| m.len());
    let bytes = viewer_core::read_with_progress(std::io::BufReader::new(file), total, on_progress)?;
    viewer_core::decode_glb(&bytes)
}

/// Start loading `path` on a background thread.
///
/// Only failing to start the thread is reported here; everything after that
/// arrives as [`LoadEvent`]s.
#[cfg(not(target_arch = "wasm32"))]
pub fn start_load(
    path: String,
    state: SharedAppState,
    ctx: egui::Context,
) -> Result<(), LoadError> {
    tracing::info!("Loading model from {}", path);
    std::thread::Builder::new()
        .name("model-loader".into())
        .spawn(move || {
            let result = load_file(std::path::Path::new(&path), |fraction| {
                report(&state, &ctx, LoadEvent::Progress(fraction));
            });
            finish(&state, &ctx, result);
        })
        .map_err(|e| LoadError::Setup(format!("could not start loader thread: {}", e)))?;
    Ok(())
}

#[cfg(target_arch = "wasm32")]
fn js_error(e: wasm_bindgen::JsValue) -> LoadError {
    LoadError::Fetch(format!("{:?}", e))
}

/// Start fetching `url` on the page's event loop.
#[cfg(target_arch = "wasm32")]
pub fn start_load(url: String, state: SharedAppState, ctx: egui::Context) -> Result<(), LoadError> {
    tracing::info!("Fetching model from {}", url);
    let window = web_sys::window().ok_or_else(|| LoadError::Setup("no browser window".into()))?;
    let request = window.fetch_with_str(&url);

    wasm_bindgen_futures::spawn_local(async move {
        let result = fetch_model(request, &state, &ctx).await;
        finish(&state, &ctx, result);
    });
    Ok(())
}

#[cfg(target_arch = "wasm32")]
async fn fetch_model(
    request: js_sys::Promise,
    state: &SharedAppState,
    ctx: &egui::Context,
) -> Result<Model, LoadError> {
    use wasm_bindgen::JsCast;
    use wasm_bindgen_futures::JsFuture;

    let resp_val = JsFuture::from(request).await.map_err(js_error)?;
    let resp: web_sys::Response = resp_val.dyn_into().map_err(js_error)?;

    if !resp.ok() {
        return Err(LoadError::Fetch(format!(
            "HTTP {} {}",
            resp.status(),
            resp.status_text()
        )));
    }

    let total = resp
        .headers()
        .get("content-length")
        .ok()
        .flatten()
        .and_then(|value| value.parse::<u64>().ok());

    let bytes = match resp.body() {
        Some(body) => {
            read_stream(body, total, |fraction| {
                report(state, ctx, LoadEvent::Progress(fraction));
            })
            .await?
        }
        None => {
            let buf_promise = resp.array_buffer().map_err(js_error)?;
            let buf_val = JsFuture::from(buf_promise).await.map_err(js_error)?;
            js_sys::Uint8Array::new(&buf_val).to_vec()
        }
    };

    viewer_core::decode_glb(&bytes)
}

/// Drain a response body, reporting progress after each chunk
#[cfg(target_arch = "wasm32")]
async fn read_stream(
    body: web_sys::ReadableStream,
    total: Option<u64>,
    mut on_progress: impl FnMut(f32),
) -> Result<Vec<u8>, LoadError> {
    use wasm_bindgen::JsCast;
    use wasm_bindgen_futures::JsFuture;

    let reader: web_sys::ReadableStreamDefaultReader =
        body.get_reader().dyn_into().map_err(js_error)?;
    let mut bytes = Vec::with_capacity(total.unwrap_or(0) as usize);

    loop {
        let result = JsFuture::from(reader.read()).await.map_err(js_error)?;
        let done = js_sys::Reflect::get(&result, &"done".into())
            .map_err(js_error)?
            .as_bool()
            .unwrap_or(true);
        if done {
            break;
        }

        let value = js_sys::Reflect::get(&result, &"value".into()).map_err(js_error)?;
        let chunk = js_sys::Uint8Array::new(&value);
        let start = bytes.len();
        bytes.resize(start + chunk.length() as usize, 0);
        chunk.copy_to(&mut bytes[start..]);

        if let Some(fraction) = viewer_core::progress_fraction(bytes.len() as u64, total) {
            on_progress(fraction);
        }
    }

    Ok(bytes)
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_is_io_error() {
        let result = load_file(std::path::Path::new("/nonexistent/model.glb"), |_| {});
        let err = result.expect_err("missing file must fail");
        assert!(matches!(err, LoadError::Io(_)));
        assert!(err.user_message().starts_with("Failed to load model: "));
    }

    #[test]
    fn test_garbage_file_is_decode_error() {
        let path = std::env::temp_dir().join(format!("glb-viewer-garbage-{}.glb", std::process::id()));
        std::fs::write(&path, b"definitely not a glb").expect("write temp file");

        let mut progress = Vec::new();
        let result = load_file(&path, |fraction| progress.push(fraction));
        assert!(matches!(result, Err(LoadError::Decode(_))));
        assert_eq!(progress.last().copied(), Some(1.0));
    }

    #[test]
    fn test_background_load_reports_failure() {
        let state = crate::app_state::create_shared_state();
        let ctx = egui::Context::default();
        start_load("/nonexistent/model.glb".into(), state.clone(), ctx).expect("thread starts");

        let deadline = std::time::Instant::now() + std::time::Duration::from_secs(5);
        loop {
            let events = state.lock().take_load_events();
            if let Some(event) = events.into_iter().find(|e| !matches!(e, LoadEvent::Progress(_))) {
                assert!(matches!(event, LoadEvent::Failed(LoadError::Io(_))));
                break;
            }
            assert!(std::time::Instant::now() < deadline, "loader never finished");
            std::thread::sleep(std::time::Duration::from_millis(10));
        }
    }
}

//! Application startup errors

/// Errors that prevent the viewer from starting
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("wgpu render state is not available; the wgpu backend must be enabled")]
    NoRenderState,

    #[cfg(target_arch = "wasm32")]
    #[error(transparent)]
    Dom(#[from] crate::dom::DomError),
}

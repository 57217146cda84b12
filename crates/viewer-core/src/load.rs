//! Model load pipeline primitives
//!
//! The platform-specific fetch lives in the frontend; this module holds the
//! outcome type, the error type and the progress-reporting reader.

use std::io::Read;

use crate::model::Model;

/// Size of the chunks read while reporting progress
pub const READ_CHUNK_SIZE: usize = 64 * 1024;

/// Errors that can occur while loading the model
#[derive(Debug, Clone, thiserror::Error)]
pub enum LoadError {
    #[error("IO error: {0}")]
    Io(String),

    #[error("Request failed: {0}")]
    Fetch(String),

    #[error("Failed to decode model: {0}")]
    Decode(String),

    #[error("Model contains no triangle geometry")]
    EmptyModel,

    /// Raised synchronously while starting the load
    #[error("{0}")]
    Setup(String),
}

impl LoadError {
    /// Message shown in place of the loading indicator
    pub fn user_message(&self) -> String {
        match self {
            LoadError::Setup(reason) => format!("Load error: {}", reason),
            other => format!("Failed to load model: {}", other),
        }
    }
}

impl From<std::io::Error> for LoadError {
    fn from(e: std::io::Error) -> Self {
        LoadError::Io(e.to_string())
    }
}

/// One completion path of the asynchronous load
#[derive(Debug, Clone)]
pub enum LoadEvent {
    /// Fraction of bytes received, in `0.0..=1.0`
    Progress(f32),
    Loaded(Model),
    Failed(LoadError),
}

/// Where the load currently stands, as shown to the user
#[derive(Debug, Clone, PartialEq, Default)]
pub enum LoadStatus {
    #[default]
    Loading,
    Progress(f32),
    Ready,
    Failed(String),
}

impl LoadStatus {
    /// Whether the loading indicator should still be shown
    pub fn is_pending(&self) -> bool {
        matches!(self, LoadStatus::Loading | LoadStatus::Progress(_))
    }
}

/// Fraction of a download completed, or `None` when the total is unknown
pub fn progress_fraction(loaded: u64, total: Option<u64>) -> Option<f32> {
    match total {
        Some(total) if total > 0 => Some((loaded as f64 / total as f64).min(1.0) as f32),
        _ => None,
    }
}

/// Format a progress fraction as a percentage with two decimals
pub fn format_percent(fraction: f32) -> String {
    format!("{:.2}%", fraction * 100.0)
}

/// Read everything from `reader`, reporting progress after each chunk.
///
/// Progress is only reported when `total` is known.
pub fn read_with_progress<R: Read>(
    mut reader: R,
    total: Option<u64>,
    mut on_progress: impl FnMut(f32),
) -> Result<Vec<u8>, LoadError> {
    let mut bytes = Vec::with_capacity(total.unwrap_or(0) as usize);
    let mut chunk = vec![0u8; READ_CHUNK_SIZE];

    loop {
        let n = match reader.read(&mut chunk) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        };
        bytes.extend_from_slice(&chunk[..n]);
        if let Some(fraction) = progress_fraction(bytes.len() as u64, total) {
            on_progress(fraction);
        }
    }

    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_progress_fraction() {
        assert_eq!(progress_fraction(50, Some(200)), Some(0.25));
        assert_eq!(progress_fraction(300, Some(200)), Some(1.0));
        assert_eq!(progress_fraction(10, Some(0)), None);
        assert_eq!(progress_fraction(10, None), None);
    }

    #[test]
    fn test_format_percent() {
        assert_eq!(format_percent(0.5), "50.00%");
        assert_eq!(format_percent(0.256), "25.60%");
    }

    #[test]
    fn test_read_with_progress_reports_monotonic_fractions() {
        let data = vec![7u8; READ_CHUNK_SIZE * 2 + 10];
        let mut reported = Vec::new();
        let bytes =
            read_with_progress(Cursor::new(&data), Some(data.len() as u64), |f| reported.push(f))
                .unwrap();

        assert_eq!(bytes, data);
        assert_eq!(reported.len(), 3);
        assert!(reported.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(*reported.last().unwrap(), 1.0);
    }

    #[test]
    fn test_read_without_total_reports_nothing() {
        let mut calls = 0;
        let bytes = read_with_progress(Cursor::new(vec![1u8, 2, 3]), None, |_| calls += 1).unwrap();
        assert_eq!(bytes, vec![1, 2, 3]);
        assert_eq!(calls, 0);
    }

    #[test]
    fn test_user_messages() {
        let failed = LoadError::Fetch("404 Not Found".into());
        assert_eq!(
            failed.user_message(),
            "Failed to load model: Request failed: 404 Not Found"
        );
        let setup = LoadError::Setup("no window".into());
        assert_eq!(setup.user_message(), "Load error: no window");
    }

    #[test]
    fn test_status_pending() {
        assert!(LoadStatus::Loading.is_pending());
        assert!(LoadStatus::Progress(0.3).is_pending());
        assert!(!LoadStatus::Ready.is_pending());
        assert!(!LoadStatus::Failed("x".into()).is_pending());
    }
}

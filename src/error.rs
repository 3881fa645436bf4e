//! Viewer error types.

use thiserror::Error;

/// Errors surfaced during startup or frame acquisition.
#[derive(Error, Debug)]
pub enum ViewerError {
    #[error("Failed to create event loop: {0}")]
    EventLoopCreationFailed(String),
    #[error("Event loop failed: {0}")]
    EventLoopFailed(String),
    #[error("Failed to create window: {0}")]
    WindowCreationFailed(String),
    #[error("Failed to create surface: {0}")]
    SurfaceCreationFailed(String),
    #[error("No suitable graphics adapter found")]
    NoAdapter,
    #[error("Failed to create device: {0}")]
    DeviceCreationFailed(String),
    #[error("Failed to acquire next frame: {0}")]
    AcquireFrameFailed(String),
    #[error("Out of GPU memory")]
    OutOfMemory,
}

pub type ViewerResult<T> = Result<T, ViewerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ViewerError::NoAdapter;
        assert_eq!(err.to_string(), "No suitable graphics adapter found");

        let err = ViewerError::WindowCreationFailed("denied".to_string());
        assert_eq!(err.to_string(), "Failed to create window: denied");
    }
}

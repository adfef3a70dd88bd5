use thiserror::Error;

/// Device startup or presentation failure.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DeviceError {
    #[error("failed to create surface: {0}")]
    SurfaceCreation(String),

    #[error("no suitable GPU adapter: {0}")]
    AdapterUnavailable(String),

    #[error("device request rejected: {0}")]
    DeviceRequest(String),

    #[error("surface advertises no supported formats")]
    NoSurfaceFormats,

    #[error("device was created without a presentable surface")]
    NoSurface,

    #[error("surface is out of memory")]
    SurfaceOutOfMemory,
}

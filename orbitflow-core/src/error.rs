use thiserror::Error;

/// Errors originating from the core fractal engine.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid max iterations: {0} (must be <= 65536)")]
    InvalidMaxIterations(u32),

    #[error("invalid zoom factor: {0} (must be > 0.0 and finite)")]
    InvalidZoomFactor(f64),

    #[error("invalid viewport: {reason}")]
    InvalidViewport { reason: String },
}

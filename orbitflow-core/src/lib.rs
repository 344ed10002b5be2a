pub mod complex;
pub mod error;
pub mod escape;
pub mod rect;
pub mod viewport;

// Re-export primary types for convenience.
pub use complex::Complex;
pub use error::CoreError;
pub use escape::{escape_time, IterationLimit, ESCAPE_RADIUS_SQ};
pub use rect::{PixelRect, PlaneRect, SEED_FRAME};
pub use viewport::{Viewport, ZOOM_IN_FACTOR, ZOOM_OUT_FACTOR};

/// Convenience result type for the core crate.
pub type Result<T> = std::result::Result<T, CoreError>;

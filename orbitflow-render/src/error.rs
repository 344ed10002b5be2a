use std::path::PathBuf;

use thiserror::Error;

/// Errors originating from the rendering pipeline.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("a tiled render is already in flight for this grid")]
    RenderInFlight,

    #[error("failed to build the tile worker pool")]
    WorkerPool(#[from] rayon::ThreadPoolBuildError),

    #[error("invalid save target: {reason}")]
    InvalidSavePath { reason: String },

    #[error("could not save image to {}", path.display())]
    Save {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Core(#[from] orbitflow_core::CoreError),
}

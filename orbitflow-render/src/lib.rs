//! Frame rendering for the escape-time explorer: region fills, column-tile
//! scheduling over a worker pool, color mapping, and the per-tick frame loop.
//!
//! The pipeline per frame is fill → colorize → hand off:
//! escape counts land in an [`IterationGrid`], the active [`ColorMode`]
//! turns them into an ARGB [`PixelBuffer`], and the host's display or
//! persistence sink consumes that buffer. Recoloring never recomputes the
//! grid.

pub mod buffer;
pub mod color;
pub mod engine;
pub mod error;
pub mod frame;
pub mod grid;
pub mod scheduler;
pub mod tile;

pub use buffer::PixelBuffer;
pub use color::{color_of, colorize, ColorMode};
pub use engine::{fill_region, fill_strip};
pub use error::RenderError;
pub use frame::{save_path, FrameLoop, PixelSink, RenderMode, TickReport};
pub use grid::IterationGrid;
pub use scheduler::{PollStatus, TileScheduler, FIRST_POLL_DELAY, POLL_INTERVAL};
pub use tile::{build_column_jobs, TileJob};

pub type Result<T> = std::result::Result<T, RenderError>;

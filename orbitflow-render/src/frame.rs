use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use orbitflow_core::{
    IterationLimit, PixelRect, PlaneRect, Viewport, SEED_FRAME, ZOOM_IN_FACTOR, ZOOM_OUT_FACTOR,
};

use crate::buffer::PixelBuffer;
use crate::color::{self, ColorMode};
use crate::engine;
use crate::grid::IterationGrid;
use crate::scheduler::{PollStatus, TileScheduler};

/// How a frame's escape counts are computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RenderMode {
    /// Single-threaded fill of the whole region.
    Naive,
    /// Column tiles fanned out over the worker pool.
    TiledParallel,
}

impl RenderMode {
    /// Display name for mode selectors.
    pub fn label(self) -> &'static str {
        match self {
            Self::Naive => "Naive method",
            Self::TiledParallel => "Thread pool",
        }
    }
}

/// What one tick accomplished, for the host's FPS/status labels.
///
/// The host pulls this snapshot each tick; nothing is pushed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickReport {
    /// `true` when a freshly colorized frame is in the pixel buffer.
    pub frame_completed: bool,
    /// Wall-clock duration of the last completed compute pass.
    pub compute_time: Duration,
    /// `(done, total)` tile counters; `(0, 0)` outside tiled renders.
    pub progress: (usize, usize),
}

/// Destination for a finished pixel buffer on a save request.
///
/// Image encoding lives behind this seam, outside the compute core; a
/// failing sink surfaces as a recoverable error, never a panic.
pub trait PixelSink {
    fn persist(&mut self, path: &Path, buffer: &PixelBuffer) -> std::io::Result<()>;
}

/// Build the `directory/base_name.png` save target.
///
/// A missing directory or name is the caller's validation problem and is
/// rejected here before any sink is involved.
pub fn save_path(directory: &str, base_name: &str) -> crate::Result<PathBuf> {
    if directory.trim().is_empty() || base_name.trim().is_empty() {
        return Err(crate::RenderError::InvalidSavePath {
            reason: "directory and file name must both be provided".into(),
        });
    }
    Ok(Path::new(directory).join(format!("{base_name}.png")))
}

/// Once-per-tick orchestration of the whole pipeline: held-key zoom, region
/// fill (naive or tiled), colorize, timing.
///
/// Driven by a single continuous-update thread; one tick finishes before the
/// next begins, and a render pass works from a viewport snapshot taken at
/// its start, so user intents between ticks never race a fill.
pub struct FrameLoop {
    viewport: Viewport,
    width: u32,
    height: u32,
    limit: IterationLimit,
    render_mode: RenderMode,
    /// Mode switches land here and apply between frames, never mid-flight.
    pending_mode: Option<RenderMode>,
    color_mode: ColorMode,
    grid: IterationGrid,
    buffer: PixelBuffer,
    scheduler: TileScheduler,
    /// Last known cursor position; the continuous-zoom anchor.
    cursor: (f64, f64),
    zoom_in_held: bool,
    zoom_out_held: bool,
    compute_time: Duration,
    tiled_started: Option<Instant>,
    /// The frame's rect pair, seeded with the default framing and replaced
    /// by a fresh viewport snapshot at every pass.
    frame_pixel: PixelRect,
    frame_plane: PlaneRect,
}

impl FrameLoop {
    /// A frame loop with the default scheduler and the original initial
    /// view (offset `(-4, -2)`, 120 px/unit, 64 iterations, naive fill,
    /// sine coloring).
    pub fn new(width: u32, height: u32) -> crate::Result<Self> {
        Ok(Self::with_scheduler(width, height, TileScheduler::new()?))
    }

    /// A frame loop over a caller-configured scheduler.
    pub fn with_scheduler(width: u32, height: u32, scheduler: TileScheduler) -> Self {
        Self {
            viewport: Viewport::default(),
            width,
            height,
            limit: IterationLimit::default(),
            render_mode: RenderMode::Naive,
            pending_mode: None,
            color_mode: ColorMode::SineApprox,
            grid: IterationGrid::new(width, height),
            buffer: PixelBuffer::new(width, height),
            scheduler,
            cursor: (width as f64 / 2.0, height as f64 / 2.0),
            zoom_in_held: false,
            zoom_out_held: false,
            compute_time: Duration::ZERO,
            tiled_started: None,
            frame_pixel: PixelRect::full_image(width, height),
            frame_plane: SEED_FRAME,
        }
    }

    // -- intents ------------------------------------------------------------

    /// Shift the view by a per-event pixel delta (drag gesture).
    pub fn pan(&mut self, dx: f64, dy: f64) {
        self.viewport.pan(dx, dy);
    }

    /// One discrete zoom step anchored at `(px, py)`.
    pub fn zoom_at(&mut self, px: f64, py: f64, factor: f64) -> crate::Result<()> {
        self.viewport.zoom_at(px, py, factor)?;
        Ok(())
    }

    /// Update the iteration budget; out-of-range values are refused and the
    /// previous budget stays in effect.
    pub fn set_max_iterations(&mut self, value: u32) -> crate::Result<()> {
        self.limit = IterationLimit::new(value)?;
        Ok(())
    }

    /// Select the fill strategy; takes effect on the next frame, never
    /// mid-flight.
    pub fn set_render_mode(&mut self, mode: RenderMode) {
        if mode == self.render_mode {
            self.pending_mode = None;
        } else {
            self.pending_mode = Some(mode);
        }
    }

    pub fn set_color_mode(&mut self, mode: ColorMode) {
        self.color_mode = mode;
    }

    /// Continuous zoom-in while held, one step per tick.
    pub fn hold_zoom_in(&mut self, held: bool) {
        self.zoom_in_held = held;
    }

    /// Continuous zoom-out while held, one step per tick.
    pub fn hold_zoom_out(&mut self, held: bool) {
        self.zoom_out_held = held;
    }

    /// Record the cursor position used as the continuous-zoom anchor.
    pub fn set_cursor(&mut self, px: f64, py: f64) {
        self.cursor = (px, py);
    }

    /// Restore a previously persisted view.
    pub fn restore_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    // -- queries ------------------------------------------------------------

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn max_iterations(&self) -> u32 {
        self.limit.get()
    }

    pub fn render_mode(&self) -> RenderMode {
        self.render_mode
    }

    pub fn color_mode(&self) -> ColorMode {
        self.color_mode
    }

    /// The finished frame, for the display sink.
    pub fn buffer(&self) -> &PixelBuffer {
        &self.buffer
    }

    /// Wall-clock duration of the last completed compute pass.
    pub fn compute_time(&self) -> Duration {
        self.compute_time
    }

    /// `(done, total)` tile counters of the current tiled frame.
    pub fn progress(&self) -> (usize, usize) {
        self.scheduler.progress()
    }

    // -- the tick -----------------------------------------------------------

    /// Advance the loop by one tick.
    pub fn tick(&mut self) -> TickReport {
        // Held-key continuous zoom, anchored at the last known cursor
        // position (the anchor is intentionally cached across ticks).
        // The factors are positive constants, so the calls cannot fail.
        if self.zoom_in_held {
            let _ = self.viewport.zoom_at(self.cursor.0, self.cursor.1, ZOOM_IN_FACTOR);
        }
        if self.zoom_out_held {
            let _ = self.viewport.zoom_at(self.cursor.0, self.cursor.1, ZOOM_OUT_FACTOR);
        }

        // Apply a deferred mode switch only between frames.
        if let Some(mode) = self.pending_mode {
            if self.scheduler.is_idle() {
                debug!(?mode, "render mode switched");
                self.render_mode = mode;
                self.pending_mode = None;
            }
        }

        match self.render_mode {
            RenderMode::Naive => self.tick_naive(),
            RenderMode::TiledParallel => self.tick_tiled(),
        }
    }

    fn tick_naive(&mut self) -> TickReport {
        self.snapshot_frame();
        let start = Instant::now();
        engine::fill_region(
            &self.frame_pixel,
            &self.frame_plane,
            self.limit.get(),
            self.grid.as_mut_slice(),
            self.width as usize,
        );
        self.compute_time = start.elapsed();
        color::colorize(&self.grid, self.color_mode, &mut self.buffer);
        TickReport {
            frame_completed: true,
            compute_time: self.compute_time,
            progress: (0, 0),
        }
    }

    fn tick_tiled(&mut self) -> TickReport {
        if self.scheduler.is_idle() {
            self.snapshot_frame();
            self.tiled_started = Some(Instant::now());
            if let Err(err) =
                self.scheduler
                    .dispatch(&self.frame_pixel, &self.frame_plane, self.limit.get())
            {
                debug!(%err, "tile dispatch refused");
            }
            return TickReport {
                frame_completed: false,
                compute_time: self.compute_time,
                progress: self.scheduler.progress(),
            };
        }

        match self.scheduler.poll(&mut self.grid) {
            PollStatus::Complete => {
                self.compute_time = self
                    .tiled_started
                    .take()
                    .map(|started| started.elapsed())
                    .unwrap_or_default();
                color::colorize(&self.grid, self.color_mode, &mut self.buffer);
                info!(
                    elapsed_ms = self.compute_time.as_millis(),
                    "tiled frame colorized"
                );
                TickReport {
                    frame_completed: true,
                    compute_time: self.compute_time,
                    progress: self.scheduler.progress(),
                }
            }
            PollStatus::InFlight { done, total } => TickReport {
                frame_completed: false,
                compute_time: self.compute_time,
                progress: (done, total),
            },
            PollStatus::Idle => TickReport {
                frame_completed: false,
                compute_time: self.compute_time,
                progress: (0, 0),
            },
        }
    }

    /// Snapshot the viewport into this frame's rect pair.
    fn snapshot_frame(&mut self) {
        let (pixel, plane) = self.viewport.frame_rects(self.width, self.height);
        self.frame_pixel = pixel;
        self.frame_plane = plane;
    }

    // -- persistence handoff ------------------------------------------------

    /// Hand the current pixel buffer and a `directory/base_name.png` target
    /// to the persistence sink.
    pub fn request_save(
        &self,
        directory: &str,
        base_name: &str,
        sink: &mut dyn PixelSink,
    ) -> crate::Result<()> {
        let path = save_path(directory, base_name)?;
        sink.persist(&path, &self.buffer)
            .map_err(|source| crate::RenderError::Save {
                path: path.clone(),
                source,
            })?;
        info!(path = %path.display(), "frame handed to persistence sink");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::TileScheduler;
    use std::time::Duration;

    fn fast_loop(width: u32, height: u32) -> FrameLoop {
        let scheduler =
            TileScheduler::with_poll_cadence(Duration::ZERO, Duration::ZERO).unwrap();
        FrameLoop::with_scheduler(width, height, scheduler)
    }

    /// Tick a tiled loop until it reports a completed frame.
    fn tick_until_complete(frame_loop: &mut FrameLoop) -> TickReport {
        let deadline = Instant::now() + Duration::from_secs(30);
        loop {
            let report = frame_loop.tick();
            if report.frame_completed {
                return report;
            }
            assert!(Instant::now() < deadline, "tiled frame never completed");
            std::thread::sleep(Duration::from_millis(1));
        }
    }

    #[test]
    fn naive_tick_completes_immediately() {
        let mut frame_loop = fast_loop(32, 32);
        let report = frame_loop.tick();
        assert!(report.frame_completed);
        assert!(report.compute_time.as_nanos() > 0);
    }

    #[test]
    fn naive_and_tiled_buffers_agree() {
        let mut naive = fast_loop(48, 40);
        let naive_report = naive.tick();
        assert!(naive_report.frame_completed);

        let mut tiled = fast_loop(48, 40);
        tiled.set_render_mode(RenderMode::TiledParallel);
        tick_until_complete(&mut tiled);

        assert_eq!(
            naive.buffer().as_argb(),
            tiled.buffer().as_argb(),
            "fill strategy must not change the image"
        );
    }

    #[test]
    fn mode_switch_takes_effect_next_tick() {
        let mut frame_loop = fast_loop(16, 16);
        frame_loop.set_render_mode(RenderMode::TiledParallel);
        assert_eq!(frame_loop.render_mode(), RenderMode::Naive);
        frame_loop.tick();
        assert_eq!(frame_loop.render_mode(), RenderMode::TiledParallel);
    }

    #[test]
    fn held_zoom_applies_each_tick() {
        let mut frame_loop = fast_loop(8, 8);
        let scale_before = frame_loop.viewport().scale();
        frame_loop.set_cursor(4.0, 4.0);
        frame_loop.hold_zoom_in(true);
        frame_loop.tick();
        frame_loop.tick();
        let expected = scale_before * ZOOM_IN_FACTOR * ZOOM_IN_FACTOR;
        assert!((frame_loop.viewport().scale() - expected).abs() < 1e-9);

        frame_loop.hold_zoom_in(false);
        frame_loop.tick();
        assert!((frame_loop.viewport().scale() - expected).abs() < 1e-9);
    }

    #[test]
    fn max_iterations_rejected_out_of_range() {
        let mut frame_loop = fast_loop(8, 8);
        frame_loop.set_max_iterations(256).unwrap();
        assert!(frame_loop.set_max_iterations(65537).is_err());
        assert_eq!(frame_loop.max_iterations(), 256, "budget must be unchanged");
    }

    #[test]
    fn color_mode_changes_the_image() {
        let mut frame_loop = fast_loop(24, 24);
        frame_loop.tick();
        let sine = frame_loop.buffer().as_argb().to_vec();

        frame_loop.set_color_mode(ColorMode::ModuloPhase);
        frame_loop.tick();
        assert_ne!(frame_loop.buffer().as_argb(), &sine[..]);
    }

    #[test]
    fn save_path_convention() {
        let path = save_path("/tmp/fractals", "deep_zoom").unwrap();
        assert_eq!(path, Path::new("/tmp/fractals").join("deep_zoom.png"));
    }

    #[test]
    fn save_path_rejects_empty_components() {
        assert!(save_path("", "name").is_err());
        assert!(save_path("/tmp", "").is_err());
        assert!(save_path("   ", "name").is_err());
    }

    #[test]
    fn save_hands_buffer_to_sink() {
        struct Recorder {
            path: Option<PathBuf>,
            pixels: usize,
        }
        impl PixelSink for Recorder {
            fn persist(&mut self, path: &Path, buffer: &PixelBuffer) -> std::io::Result<()> {
                self.path = Some(path.to_path_buf());
                self.pixels = buffer.as_argb().len();
                Ok(())
            }
        }

        let mut frame_loop = fast_loop(10, 10);
        frame_loop.tick();
        let mut sink = Recorder {
            path: None,
            pixels: 0,
        };
        frame_loop.request_save("/tmp/out", "frame", &mut sink).unwrap();
        assert_eq!(sink.path.as_deref(), Some(Path::new("/tmp/out/frame.png")));
        assert_eq!(sink.pixels, 100);
    }

    #[test]
    fn sink_failure_is_recoverable() {
        struct FailingSink;
        impl PixelSink for FailingSink {
            fn persist(&mut self, _: &Path, _: &PixelBuffer) -> std::io::Result<()> {
                Err(std::io::Error::other("disk full"))
            }
        }

        let mut frame_loop = fast_loop(4, 4);
        frame_loop.tick();
        let err = frame_loop
            .request_save("/tmp/out", "frame", &mut FailingSink)
            .unwrap_err();
        assert!(matches!(err, crate::RenderError::Save { .. }));
        // The loop keeps working after a failed save.
        assert!(frame_loop.tick().frame_completed);
    }
}

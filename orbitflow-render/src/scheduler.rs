use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{mpsc, Arc};
use std::time::{Duration, Instant};

use rayon::ThreadPoolBuilder;
use tracing::{debug, info};

use orbitflow_core::{PixelRect, PlaneRect};

use crate::engine;
use crate::grid::IterationGrid;
use crate::tile::{build_column_jobs, TileJob};

/// Delay before the first completion check after a dispatch.
pub const FIRST_POLL_DELAY: Duration = Duration::from_millis(500);

/// Interval between subsequent completion checks.
pub const POLL_INTERVAL: Duration = Duration::from_secs(1);

// ---------------------------------------------------------------------------
// Progress
// ---------------------------------------------------------------------------

/// Shared tile-completion counters for the "M of N tiles" display.
///
/// Workers bump `done`; the driving thread reads both without blocking.
#[derive(Debug)]
pub struct RenderProgress {
    done: AtomicUsize,
    total: AtomicUsize,
}

impl RenderProgress {
    pub fn new() -> Self {
        Self {
            done: AtomicUsize::new(0),
            total: AtomicUsize::new(0),
        }
    }

    /// Reset for a new frame with `total` tiles.
    pub fn reset(&self, total: usize) {
        self.total.store(total, Ordering::Relaxed);
        self.done.store(0, Ordering::Relaxed);
    }

    /// Mark one tile finished.
    pub fn inc(&self) {
        self.done.fetch_add(1, Ordering::Relaxed);
    }

    /// Read the current `(done, total)` pair.
    pub fn progress(&self) -> (usize, usize) {
        (
            self.done.load(Ordering::Relaxed),
            self.total.load(Ordering::Relaxed),
        )
    }
}

impl Default for RenderProgress {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Scheduler
// ---------------------------------------------------------------------------

/// What a completion check observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollStatus {
    /// No tiled render outstanding.
    Idle,
    /// Tiles are still computing; the pair is `(done, total)`.
    InFlight { done: usize, total: usize },
    /// Every tile of the frame has been folded into the grid.
    Complete,
}

struct InFlightFrame {
    rx: mpsc::Receiver<(usize, Vec<u32>)>,
    jobs: Vec<TileJob>,
    pending: usize,
    next_check: Instant,
}

/// Fans a frame out across a worker pool as disjoint column-strip jobs and
/// observes their completion by non-blocking polling.
///
/// One pool is built up front, sized to hardware concurrency (at least one
/// thread). A dispatched frame accepts no further jobs, and only one frame
/// may be in flight per grid at a time; callers wanting a newer view wait
/// for the current frame rather than starting an overlapping write.
///
/// There is no forcible cancellation: strips of a superseded frame run to
/// completion and their output is simply never consumed. The fill is
/// deterministic, so late results are never wrong results.
pub struct TileScheduler {
    pool: rayon::ThreadPool,
    workers: usize,
    progress: Arc<RenderProgress>,
    first_poll_delay: Duration,
    poll_interval: Duration,
    in_flight: Option<InFlightFrame>,
}

impl TileScheduler {
    /// Build a scheduler with the default polling cadence.
    pub fn new() -> crate::Result<Self> {
        Self::with_poll_cadence(FIRST_POLL_DELAY, POLL_INTERVAL)
    }

    /// Build a scheduler that checks for completion on a custom cadence.
    pub fn with_poll_cadence(
        first_poll_delay: Duration,
        poll_interval: Duration,
    ) -> crate::Result<Self> {
        let workers = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        let pool = ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("tile-worker-{i}"))
            .build()?;
        Ok(Self {
            pool,
            workers,
            progress: Arc::new(RenderProgress::new()),
            first_poll_delay,
            poll_interval,
            in_flight: None,
        })
    }

    pub fn worker_count(&self) -> usize {
        self.workers
    }

    pub fn is_idle(&self) -> bool {
        self.in_flight.is_none()
    }

    /// The `(done, total)` tile counters of the current (or last) frame.
    pub fn progress(&self) -> (usize, usize) {
        self.progress.progress()
    }

    /// Submit one frame as column-strip jobs.
    ///
    /// Fails with [`RenderError::RenderInFlight`](crate::RenderError) while
    /// a previous frame is still outstanding.
    pub fn dispatch(
        &mut self,
        frame_pixel: &PixelRect,
        frame_plane: &PlaneRect,
        max_iterations: u32,
    ) -> crate::Result<()> {
        if self.in_flight.is_some() {
            return Err(crate::RenderError::RenderInFlight);
        }

        let jobs = build_column_jobs(frame_pixel, frame_plane, self.workers, max_iterations);
        let total = jobs.len();
        self.progress.reset(total);

        let (tx, rx) = mpsc::channel();
        for (index, job) in jobs.iter().copied().enumerate() {
            let tx = tx.clone();
            let progress = Arc::clone(&self.progress);
            self.pool.spawn(move || {
                let data =
                    engine::fill_strip(&job.frame_pixel, &job.frame_plane, &job.strip, job.max_iterations);
                progress.inc();
                // The receiver disappears if the scheduler was dropped;
                // the strip is then simply not consumed.
                let _ = tx.send((index, data));
            });
        }

        debug!(
            tiles = total,
            workers = self.workers,
            max_iterations,
            "dispatched tiled frame"
        );
        self.in_flight = Some(InFlightFrame {
            rx,
            jobs,
            pending: total,
            next_check: Instant::now() + self.first_poll_delay,
        });
        Ok(())
    }

    /// Non-blocking completion check.
    ///
    /// Honors the polling cadence, folds any finished strips into `grid`
    /// (disjoint column ranges, written from this thread only), and reports
    /// whether the frame is done. The caller must not colorize the grid
    /// until this returns [`PollStatus::Complete`].
    pub fn poll(&mut self, grid: &mut IterationGrid) -> PollStatus {
        let Some(flight) = self.in_flight.as_mut() else {
            return PollStatus::Idle;
        };

        let now = Instant::now();
        if now < flight.next_check {
            let (done, total) = self.progress.progress();
            return PollStatus::InFlight { done, total };
        }
        flight.next_check = now + self.poll_interval;

        while let Ok((index, data)) = flight.rx.try_recv() {
            grid.blit_columns(&flight.jobs[index].strip, &data);
            flight.pending -= 1;
        }

        if flight.pending == 0 {
            self.in_flight = None;
            info!("tiled frame assembled");
            PollStatus::Complete
        } else {
            let (done, total) = self.progress.progress();
            PollStatus::InFlight { done, total }
        }
    }
}

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;

use parking_lot::{Condvar, Mutex};
use tracing::{error, info, warn};

use super::controller::{FrameOutcome, PipelineController};
use super::error::Result;
use super::slot::FrameSource;
use crate::diagnostics::{PipelineSnapshot, PipelineStats};
use crate::overlay::DisplaySurface;

/// Wake-up state shared between a [`Pipeline`] handle and its worker.
#[derive(Default)]
struct Signal {
    /// At least one frame notification arrived since the worker last
    /// looked. Further notifications collapse into this flag.
    pending: bool,
    shutdown: bool,
}

struct Shared {
    signal: Mutex<Signal>,
    wake: Condvar,
    running: AtomicBool,
    fatal: Mutex<Option<String>>,
}

/// A pose pipeline running on its own worker thread.
///
/// Frame notifications wake the worker, which processes the newest frame
/// from its source. While a frame is in flight, further notifications
/// collapse into one, so a slow engine throttles intake instead of queueing.
pub struct Pipeline {
    stream_id: String,
    shared: Arc<Shared>,
    stats: Arc<Mutex<PipelineStats>>,
    thread: Option<JoinHandle<PipelineController>>,
}

impl Pipeline {
    /// Spawn the worker for `controller`.
    ///
    /// The worker only locks `surface` while drawing, never during
    /// inference.
    pub fn start<S>(
        controller: PipelineController,
        source: Arc<dyn FrameSource>,
        surface: Arc<Mutex<S>>,
    ) -> Result<Self>
    where
        S: DisplaySurface + 'static,
    {
        let stream_id = controller.stream_id().to_string();
        let stats = controller.stats();
        let shared = Arc::new(Shared {
            signal: Mutex::new(Signal::default()),
            wake: Condvar::new(),
            running: AtomicBool::new(true),
            fatal: Mutex::new(None),
        });

        let thread = {
            let shared = Arc::clone(&shared);
            std::thread::Builder::new()
                .name(format!("pose-{stream_id}"))
                .spawn(move || run_worker(controller, source.as_ref(), &surface, &shared))?
        };
        info!("pipeline started for {stream_id}");

        Ok(Self {
            stream_id,
            shared,
            stats,
            thread: Some(thread),
        })
    }

    pub fn stream_id(&self) -> &str {
        &self.stream_id
    }

    /// Tell the worker a new frame is available. Cheap; never blocks on
    /// frame processing.
    pub fn notify_frame_available(&self) {
        let mut signal = self.shared.signal.lock();
        if signal.shutdown {
            return;
        }
        signal.pending = true;
        self.shared.wake.notify_one();
    }

    /// True while the worker thread is accepting frames.
    pub fn is_running(&self) -> bool {
        self.shared.running.load(Ordering::Acquire)
    }

    /// The error that stopped the worker, if any.
    pub fn fatal_error(&self) -> Option<String> {
        self.shared.fatal.lock().clone()
    }

    /// Take a snapshot of this pipeline's diagnostic stats.
    pub fn snapshot(&self) -> PipelineSnapshot {
        self.stats.lock().snapshot()
    }

    /// Stop the pipeline: let the in-flight frame finish, join the worker,
    /// then close the inference engine. Idempotent.
    pub fn stop(&mut self) {
        {
            let mut signal = self.shared.signal.lock();
            signal.shutdown = true;
            self.shared.wake.notify_all();
        }
        let Some(handle) = self.thread.take() else {
            return;
        };
        match handle.join() {
            Ok(mut controller) => controller.close_engine(),
            Err(_) => error!("pipeline worker for {} panicked", self.stream_id),
        }
        self.shared.running.store(false, Ordering::Release);
        info!("pipeline stopped for {}", self.stream_id);
    }
}

impl Drop for Pipeline {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Marks the worker as stopped when it leaves, including by unwinding.
struct WorkerExit<'a> {
    shared: &'a Shared,
    stream_id: &'a str,
}

impl Drop for WorkerExit<'_> {
    fn drop(&mut self) {
        if std::thread::panicking() {
            error!("[{}] pipeline worker panicked", self.stream_id);
            self.shared
                .fatal
                .lock()
                .get_or_insert_with(|| "pipeline worker panicked".to_string());
        }
        self.shared.running.store(false, Ordering::Release);
    }
}

fn run_worker<S: DisplaySurface>(
    mut controller: PipelineController,
    source: &dyn FrameSource,
    surface: &Mutex<S>,
    shared: &Shared,
) -> PipelineController {
    let stream_id = controller.stream_id().to_string();
    info!("pipeline worker starting for {stream_id}");
    let exit = WorkerExit {
        shared,
        stream_id: &stream_id,
    };

    loop {
        {
            let mut signal = shared.signal.lock();
            while !signal.pending && !signal.shutdown {
                shared.wake.wait(&mut signal);
            }
            if signal.shutdown {
                break;
            }
            signal.pending = false;
        }

        match controller.infer_next(source) {
            Ok(Some(pose)) => {
                let mut surface = surface.lock();
                if controller.render(&pose, &mut *surface) == FrameOutcome::RenderSkipped {
                    warn!("[{stream_id}] frame inferred but not displayed");
                }
            }
            Ok(None) => {}
            Err(e) if e.is_fatal() => {
                error!("[{stream_id}] pipeline halted: {e}");
                *shared.fatal.lock() = Some(e.to_string());
                break;
            }
            Err(e) => warn!("[{stream_id}] dropping frame: {e}"),
        }
    }

    drop(exit);
    info!("pipeline worker exiting for {stream_id}");
    controller
}

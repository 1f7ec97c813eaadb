//! Background render thread with a fixed tick interval.
//!
//! [`RenderLoop`] owns the surface and the renderer behind one mutex. The
//! render thread takes that mutex for every tick, and every lifecycle call
//! takes it for the transition it makes, so a draw never overlaps a
//! pause/resume/stop/destroy. While the loop is idle or paused the thread
//! parks on a condition variable; any transition that needs it awake notifies
//! it.

use std::{
    fmt,
    panic::{self, AssertUnwindSafe},
    sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError, Weak},
    thread::{self, JoinHandle},
    time::{Duration, Instant},
};

use tracing::{debug, info, trace, warn};

use crate::{
    surface::{Canvas, RenderSurface},
    Result, WaveLineError,
};

/// Interval between ticks, roughly 60 frames per second.
pub const DEFAULT_FRAME_INTERVAL: Duration = Duration::from_millis(16);
const THREAD_NAME: &str = "RenderThread";

/// Draws into the frame borrowed by the render loop.
pub trait FrameRenderer: Send + 'static {
    /// Runs on every drawn tick, before anything else.
    fn draw_background(&mut self, canvas: &mut dyn Canvas);

    /// Runs after the background while the animation is started.
    fn render(&mut self, canvas: &mut dyn Canvas, millis_passed: u64);

    /// Called under the loop lock when the animation (re)starts.
    fn on_start(&mut self) {}

    /// Called under the loop lock when the animation stops.
    fn on_stop(&mut self) {}
}

/// Lifecycle of a [`RenderLoop`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    /// Not drawing; the thread, if spawned, is parked.
    Created,
    Running,
    /// Drawing suspended until resumed; the thread is parked.
    Paused,
    /// Terminal. The thread exits at its next wake.
    Destroyed,
}

struct Control<S, R> {
    state: LoopState,
    animating: bool,
    clear_pending: bool,
    surface: S,
    renderer: R,
    worker: Option<JoinHandle<()>>,
    threads_spawned: usize,
    frames_published: u64,
}

struct Shared<S, R> {
    control: Mutex<Control<S, R>>,
    wake: Condvar,
}

/// Handle to a render thread drawing `R` onto `S`.
///
/// The thread only holds a weak reference to the shared state; once the
/// handle is dropped the thread stops at its next tick.
pub struct RenderLoop<S, R> {
    shared: Arc<Shared<S, R>>,
    interval: Duration,
}

impl<S: RenderSurface, R: FrameRenderer> RenderLoop<S, R> {
    pub fn new(surface: S, renderer: R) -> Self {
        Self::with_interval(surface, renderer, DEFAULT_FRAME_INTERVAL)
    }

    pub fn with_interval(surface: S, renderer: R, interval: Duration) -> Self {
        Self {
            shared: Arc::new(Shared {
                control: Mutex::new(Control {
                    state: LoopState::Created,
                    animating: false,
                    clear_pending: false,
                    surface,
                    renderer,
                    worker: None,
                    threads_spawned: 0,
                    frames_published: 0,
                }),
                wake: Condvar::new(),
            }),
            interval,
        }
    }

    /// Begins drawing frames, spawning the render thread on first use.
    ///
    /// Valid from `Created` and `Paused`; a no-op while running or after
    /// destruction. The thread is spawned at most once per loop.
    pub fn start(&self) -> Result<()> {
        let mut control = self.shared.lock();
        self.start_locked(&mut control)
    }

    /// Resets the renderer's animation state and starts drawing with it.
    pub fn start_animation(&self) -> Result<()> {
        let mut control = self.shared.lock();
        if control.state == LoopState::Destroyed {
            debug!("ignoring animation start on destroyed render loop");
            return Ok(());
        }
        control.renderer.on_start();
        control.animating = true;
        self.start_locked(&mut control)
    }

    /// Stops the animation and asks the thread for one background-only frame
    /// so the last waveform does not linger.
    pub fn stop_animation(&self) {
        let mut control = self.shared.lock();
        control.animating = false;
        control.renderer.on_stop();
        if control.worker.is_some() && control.state != LoopState::Destroyed {
            control.clear_pending = true;
        }
        self.shared.idle_locked(&mut control);
    }

    pub fn pause(&self) {
        let mut control = self.shared.lock();
        if control.state == LoopState::Running {
            debug!("render loop paused");
            control.state = LoopState::Paused;
        }
    }

    pub fn resume(&self) {
        let mut control = self.shared.lock();
        if control.state == LoopState::Paused {
            debug!("render loop resumed");
            control.state = LoopState::Running;
            self.shared.wake.notify_all();
        }
    }

    /// Halts drawing but keeps the thread parked so [`start`](Self::start)
    /// can pick up again.
    pub fn stop(&self) {
        let mut control = self.shared.lock();
        self.shared.idle_locked(&mut control);
    }

    /// Moves to the terminal state and wakes the thread so it can exit.
    /// Calling it again has no effect.
    pub fn destroy(&self) {
        let mut control = self.shared.lock();
        if control.state != LoopState::Destroyed {
            debug!(from = ?control.state, "render loop destroyed");
            control.state = LoopState::Destroyed;
            control.clear_pending = false;
        }
        self.shared.wake.notify_all();
    }

    /// Destroys the loop and waits for the render thread to exit.
    pub fn shutdown(&self) {
        self.destroy();
        let worker = self.shared.lock().worker.take();
        if let Some(worker) = worker {
            if worker.thread().id() == thread::current().id() {
                return;
            }
            if worker.join().is_err() {
                warn!("render thread terminated with a panic");
            }
        }
    }

    pub fn state(&self) -> LoopState {
        self.shared.lock().state
    }

    pub fn is_running(&self) -> bool {
        self.state() == LoopState::Running
    }

    pub fn is_animating(&self) -> bool {
        self.shared.lock().animating
    }

    /// How many render threads this loop has ever spawned (0 or 1).
    pub fn threads_spawned(&self) -> usize {
        self.shared.lock().threads_spawned
    }

    pub fn frames_published(&self) -> u64 {
        self.shared.lock().frames_published
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Runs `f` against the renderer under the loop lock.
    pub fn with_renderer<T>(&self, f: impl FnOnce(&mut R) -> T) -> T {
        f(&mut self.shared.lock().renderer)
    }

    fn start_locked(&self, control: &mut Control<S, R>) -> Result<()> {
        match control.state {
            LoopState::Destroyed => {
                debug!("ignoring start on destroyed render loop");
                return Ok(());
            }
            LoopState::Running => {}
            LoopState::Created | LoopState::Paused => {
                debug!(from = ?control.state, "render loop running");
                control.state = LoopState::Running;
                control.clear_pending = false;
                self.shared.wake.notify_all();
            }
        }

        if control.worker.is_none() {
            let weak = Arc::downgrade(&self.shared);
            let interval = self.interval;
            let spawned = thread::Builder::new()
                .name(THREAD_NAME.to_string())
                .spawn(move || run(weak, interval));

            match spawned {
                Ok(handle) => {
                    control.worker = Some(handle);
                    control.threads_spawned += 1;
                }
                Err(err) => {
                    control.state = LoopState::Created;
                    return Err(WaveLineError::from(err));
                }
            }
        }
        Ok(())
    }
}

impl<S, R> Shared<S, R> {
    fn lock(&self) -> MutexGuard<'_, Control<S, R>> {
        self.control.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn idle_locked(&self, control: &mut Control<S, R>) {
        if matches!(control.state, LoopState::Running | LoopState::Paused) {
            debug!(from = ?control.state, "render loop stopped");
            control.state = LoopState::Created;
        }
        self.wake.notify_all();
    }
}

impl<S: RenderSurface, R: FrameRenderer> Shared<S, R> {
    /// One iteration of the render thread. Returns `false` once the loop has
    /// been destroyed.
    fn tick(&self, started_at: Instant) -> bool {
        let mut control = self.lock();
        while control.is_parked() {
            control = self
                .wake
                .wait(control)
                .unwrap_or_else(PoisonError::into_inner);
        }

        match control.state {
            LoopState::Destroyed => false,
            LoopState::Running => {
                let millis = started_at.elapsed().as_millis() as u64;
                control.draw_frame(Some(millis));
                true
            }
            LoopState::Created | LoopState::Paused => {
                control.draw_frame(None);
                control.clear_pending = false;
                true
            }
        }
    }
}

impl<S: RenderSurface, R: FrameRenderer> Control<S, R> {
    fn is_parked(&self) -> bool {
        matches!(self.state, LoopState::Created | LoopState::Paused) && !self.clear_pending
    }

    /// Acquires, draws and publishes one frame. `millis` is `None` for a
    /// background-only frame.
    fn draw_frame(&mut self, millis: Option<u64>) {
        let mut frame = match self.surface.acquire() {
            Ok(Some(frame)) => frame,
            Ok(None) => {
                trace!("surface not ready, skipping tick");
                return;
            }
            Err(err) => {
                warn!(%err, "render surface unavailable, halting draws");
                if self.state != LoopState::Destroyed {
                    self.state = LoopState::Created;
                }
                return;
            }
        };

        let renderer = &mut self.renderer;
        let animate = self.animating && millis.is_some();
        let drawn = panic::catch_unwind(AssertUnwindSafe(|| {
            renderer.draw_background(&mut frame);
            if animate {
                renderer.render(&mut frame, millis.unwrap_or_default());
            }
        }));
        if drawn.is_err() {
            warn!("frame drawing panicked, dropping frame");
            return;
        }

        match self.surface.publish(frame) {
            Ok(()) => self.frames_published += 1,
            Err(err) => warn!(%err, "failed to publish frame"),
        }
    }
}

fn run<S: RenderSurface, R: FrameRenderer>(shared: Weak<Shared<S, R>>, interval: Duration) {
    info!("render thread started");
    let started_at = Instant::now();

    loop {
        let Some(strong) = shared.upgrade() else {
            debug!("render loop owner dropped");
            break;
        };
        if !strong.tick(started_at) {
            break;
        }
        drop(strong);
        thread::sleep(interval);
    }

    info!("render thread exited");
}

impl<S, R> Drop for RenderLoop<S, R> {
    fn drop(&mut self) {
        let mut control = self.shared.lock();
        control.state = LoopState::Destroyed;
        self.shared.wake.notify_all();
    }
}

impl<S, R> fmt::Debug for RenderLoop<S, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let control = self.shared.lock();
        f.debug_struct("RenderLoop")
            .field("state", &control.state)
            .field("animating", &control.animating)
            .field("threads_spawned", &control.threads_spawned)
            .field("frames_published", &control.frames_published)
            .field("interval", &self.interval)
            .finish()
    }
}

//! Test doubles for the drawing capability.

use std::{
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex,
    },
    thread,
    time::{Duration, Instant},
};

use crate::{
    surface::{Canvas, ClearMode, RenderSurface, StrokeStyle},
    Color, FrameRenderer, Result, WaveLineError, WavePath,
};

#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    Clear(Color, ClearMode),
    Stroke(WavePath, StrokeStyle),
}

/// Canvas that records every call instead of rasterising.
#[derive(Debug, Default)]
pub struct RecordingCanvas {
    pub width: u32,
    pub height: u32,
    pub ops: Vec<DrawOp>,
}

impl RecordingCanvas {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            ops: Vec::new(),
        }
    }

    pub fn strokes(&self) -> Vec<(&WavePath, &StrokeStyle)> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Stroke(path, style) => Some((path, style)),
                DrawOp::Clear(..) => None,
            })
            .collect()
    }
}

impl Canvas for RecordingCanvas {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn clear(&mut self, color: Color, mode: ClearMode) {
        self.ops.push(DrawOp::Clear(color, mode));
    }

    fn stroke_path(&mut self, path: &WavePath, style: &StrokeStyle) {
        self.ops.push(DrawOp::Stroke(path.clone(), *style));
    }
}

/// What the scripted surface answers on the next acquisition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Availability {
    Ready,
    NotReady,
    Lost,
}

#[derive(Debug)]
pub struct SurfaceLog {
    pub availability: Availability,
    pub acquired: usize,
    pub published: usize,
}

/// Surface whose availability is flipped from the test thread.
#[derive(Debug, Clone)]
pub struct ScriptedSurface {
    pub log: Arc<Mutex<SurfaceLog>>,
}

impl ScriptedSurface {
    pub fn new() -> Self {
        Self {
            log: Arc::new(Mutex::new(SurfaceLog {
                availability: Availability::Ready,
                acquired: 0,
                published: 0,
            })),
        }
    }

    pub fn set_availability(&self, availability: Availability) {
        self.log.lock().unwrap().availability = availability;
    }

    pub fn published(&self) -> usize {
        self.log.lock().unwrap().published
    }

    pub fn acquired(&self) -> usize {
        self.log.lock().unwrap().acquired
    }
}

impl RenderSurface for ScriptedSurface {
    type Frame = RecordingCanvas;

    fn acquire(&mut self) -> Result<Option<RecordingCanvas>> {
        let mut log = self.log.lock().unwrap();
        log.acquired += 1;
        match log.availability {
            Availability::Ready => Ok(Some(RecordingCanvas::new(120, 60))),
            Availability::NotReady => Ok(None),
            Availability::Lost => Err(WaveLineError::SurfaceLost),
        }
    }

    fn publish(&mut self, _frame: RecordingCanvas) -> Result<()> {
        self.log.lock().unwrap().published += 1;
        Ok(())
    }
}

/// Renderer that only counts how often each hook runs.
#[derive(Debug, Clone, Default)]
pub struct CountingRenderer {
    pub backgrounds: Arc<AtomicUsize>,
    pub renders: Arc<AtomicUsize>,
    pub starts: Arc<AtomicUsize>,
    pub panic_on_render: bool,
}

impl CountingRenderer {
    pub fn backgrounds(&self) -> usize {
        self.backgrounds.load(Ordering::SeqCst)
    }

    pub fn renders(&self) -> usize {
        self.renders.load(Ordering::SeqCst)
    }
}

impl FrameRenderer for CountingRenderer {
    fn draw_background(&mut self, canvas: &mut dyn Canvas) {
        canvas.clear(Color::WHITE, ClearMode::Fill);
        self.backgrounds.fetch_add(1, Ordering::SeqCst);
    }

    fn render(&mut self, _canvas: &mut dyn Canvas, _millis_passed: u64) {
        self.renders.fetch_add(1, Ordering::SeqCst);
        if self.panic_on_render {
            panic!("renderer failure requested by test");
        }
    }

    fn on_start(&mut self) {
        self.starts.fetch_add(1, Ordering::SeqCst);
    }
}

/// Polls `condition` until it holds or `timeout` elapses.
pub fn wait_until(timeout: Duration, mut condition: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        thread::sleep(Duration::from_millis(1));
    }
    condition()
}

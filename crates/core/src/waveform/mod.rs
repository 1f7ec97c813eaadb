//! Volume driven waveform: four phase-shifted, edge-attenuated sine strokes.

mod controls;

pub use controls::{
    WaveControls, DEFAULT_TARGET_VOLUME, MAX_VOLUME, MIN_VOLUME, VOLUME_STEP_PER_SENSIBILITY,
};

use std::{f64::consts::PI, sync::Arc};

use tracing::trace;

use crate::{
    surface::{Canvas, ClearMode, StrokeStyle},
    DecayCache, FrameRenderer, WaveformConfig, WavePath,
};

/// Relative amplitude of each stroke, thick line first.
pub const PATH_WEIGHTS: [f32; 4] = [0.6, 0.35, 0.1, -0.1];
const THICK_ALPHA: f32 = 255.0;
const FINE_ALPHA: f32 = 100.0;
const ALPHA_STEP: f32 = 0.02;
/// The intro sweep covers the width in this many steps.
const SWEEP_DIVISOR: u32 = 60;

/// Sample positions derived from the first usable surface size.
#[derive(Debug, Clone)]
pub struct Geometry {
    pub width: u32,
    pub height: u32,
    pub center_y: f32,
    pub amplitude: f32,
    pub sample_x: Vec<f32>,
    /// `sample_x` mapped onto the `[-2, 2]` domain.
    pub map_x: Vec<f32>,
}

#[derive(Debug, Clone, Default)]
struct IntroState {
    line_offset: u32,
    finished: bool,
    alpha: f32,
}

/// Produces and strokes one waveform frame per tick.
#[derive(Debug)]
pub struct WaveformGenerator {
    config: WaveformConfig,
    controls: Arc<WaveControls>,
    decay: DecayCache,
    geometry: Option<Geometry>,
    per_volume_step: f32,
    volume: f32,
    paths: [WavePath; 4],
    intro: IntroState,
}

impl WaveformGenerator {
    pub fn new(config: WaveformConfig, controls: Arc<WaveControls>) -> Self {
        Self {
            config,
            controls,
            decay: DecayCache::new(),
            geometry: None,
            per_volume_step: 0.0,
            volume: 0.0,
            paths: Default::default(),
            intro: IntroState::default(),
        }
    }

    pub fn controls(&self) -> &Arc<WaveControls> {
        &self.controls
    }

    pub fn geometry(&self) -> Option<&Geometry> {
        self.geometry.as_ref()
    }

    pub fn paths(&self) -> &[WavePath; 4] {
        &self.paths
    }

    /// Smoothed volume currently drawn.
    pub fn volume(&self) -> f32 {
        self.volume
    }

    pub fn per_volume_step(&self) -> f32 {
        self.per_volume_step
    }

    pub fn intro_finished(&self) -> bool {
        self.intro.finished
    }

    /// Clears the animation sub-state and the sample arrays so the next frame
    /// starts a fresh cycle. The decay cache does not depend on the surface
    /// size and is kept.
    pub fn reset(&mut self) {
        self.intro = IntroState::default();
        self.geometry = None;
    }

    /// Derives sample positions for a `width` x `height` surface.
    ///
    /// Returns `false` and leaves the arrays untouched when any dimension or
    /// the sampling size is zero; the next frame retries.
    pub fn init_draw(&mut self, width: u32, height: u32) -> bool {
        let sampling_size = self.config.sampling_size;
        if width == 0 || height == 0 || sampling_size == 0 {
            trace!(width, height, sampling_size, "deferring waveform geometry");
            return false;
        }

        let w = width as f32;
        let gap = w / sampling_size as f32;
        let sample_x: Vec<f32> = (0..=sampling_size).map(|i| i as f32 * gap).collect();
        let map_x = sample_x.iter().map(|x| (x / w) * 4.0 - 2.0).collect();

        self.per_volume_step = self.controls.per_volume_step();
        self.geometry = Some(Geometry {
            width,
            height,
            center_y: (height / 2) as f32,
            amplitude: height as f32 / 3.0,
            sample_x,
            map_x,
        });
        true
    }

    /// Advances the intro sweep by one step and draws it.
    ///
    /// Returns `true` once the waveform may be drawn. After the first `true`
    /// the sweep stays finished until [`reset`](Self::reset).
    pub fn line_anim(&mut self, canvas: &mut dyn Canvas) -> bool {
        if self.intro.finished || !self.config.intro_animation {
            return true;
        }
        let Some(geometry) = &self.geometry else {
            return false;
        };

        let width = geometry.width;
        let w = width as f32;
        let center = geometry.center_y;
        let samples = self.config.sampling_size as f32;
        let reach = self.intro.line_offset as f32;

        let [left, right, ..] = &mut self.paths;
        left.rewind();
        right.rewind();
        left.move_to(0.0, center);
        right.move_to(w, center);
        for i in 1..=self.config.sampling_size {
            let x = i as f32 * reach / samples;
            left.line_to(x, center);
            right.line_to(w - x, center);
        }
        left.move_to(w / 2.0, center);
        right.move_to(w / 2.0, center);

        let style = StrokeStyle::new(self.controls.line_color(), self.config.thick_line_width);
        canvas.stroke_path(left, &style);
        canvas.stroke_path(right, &style);

        self.intro.line_offset += (width / SWEEP_DIVISOR).max(1);
        if self.intro.line_offset >= width / 2 {
            self.intro.finished = true;
            return true;
        }
        false
    }

    /// Moves the drawn volume one step toward the target.
    pub fn step_volume(&mut self) -> f32 {
        let target = self.controls.target_volume() as f32;
        let step = self.per_volume_step;

        if self.volume < target - step {
            self.volume += step;
        } else if self.volume > target + step {
            self.volume = (self.volume - step).max(step * 2.0);
        } else {
            self.volume = target;
        }
        self.volume
    }

    /// Fade-in factor in `[0, 1]`, advanced once per frame.
    pub fn alpha_in_anim(&mut self) -> f32 {
        if !self.config.intro_animation {
            return 1.0;
        }
        self.intro.alpha = (self.intro.alpha + ALPHA_STEP).min(1.0);
        self.intro.alpha
    }

    /// Rebuilds the four paths for a phase `offset`. No-op before geometry exists.
    pub fn build_paths(&mut self, offset: f32) {
        let Some(center) = self.geometry.as_ref().map(|g| g.center_y) else {
            return;
        };
        self.reset_paths(center);
        self.step_volume();

        let Some(geometry) = &self.geometry else {
            return;
        };
        let phase = (offset % 2.0) as f64 * PI;
        let scale = self.volume * 0.01;

        for (&x, &map_x) in geometry.sample_x.iter().zip(&geometry.map_x) {
            let attenuation = self.decay.decay(map_x);
            let cur_y = (geometry.amplitude as f64
                * (PI * map_x as f64 - phase).sin()
                * attenuation) as f32;
            for (path, weight) in self.paths.iter_mut().zip(PATH_WEIGHTS) {
                path.line_to(x, center + cur_y * weight * scale);
            }
        }

        let w = geometry.width as f32;
        for path in &mut self.paths {
            path.move_to(w, center);
        }
    }

    /// Draws one waveform frame for `millis_passed` since the loop started.
    pub fn render_frame(&mut self, canvas: &mut dyn Canvas, millis_passed: u64) {
        if self.geometry.is_none() && !self.init_draw(canvas.width(), canvas.height()) {
            return;
        }
        if !self.line_anim(canvas) {
            return;
        }

        let offset = phase_offset(millis_passed, self.controls.move_speed());
        self.build_paths(offset);

        let alpha = self.alpha_in_anim();
        let color = self.controls.line_color();
        for (n, path) in self.paths.iter().enumerate() {
            let (width, full) = if n == 0 {
                (self.config.thick_line_width, THICK_ALPHA)
            } else {
                (self.config.fine_line_width, FINE_ALPHA)
            };
            let style = StrokeStyle::new(color.with_alpha((full * alpha) as u8), width);
            canvas.stroke_path(path, &style);
        }
    }

    pub fn draw_background(&self, canvas: &mut dyn Canvas) {
        let color = self.controls.background_color();
        let mode = if color.is_transparent() {
            ClearMode::Clear
        } else {
            ClearMode::Fill
        };
        canvas.clear(color, mode);
    }

    fn reset_paths(&mut self, center: f32) {
        for path in &mut self.paths {
            path.rewind();
            path.move_to(0.0, center);
        }
    }
}

/// Position of the wave within its `[0, 2)` cycle after `millis_passed`.
fn phase_offset(millis_passed: u64, move_speed: f32) -> f32 {
    ((millis_passed as f64 / move_speed as f64) % 2.0) as f32
}

impl FrameRenderer for WaveformGenerator {
    fn draw_background(&mut self, canvas: &mut dyn Canvas) {
        WaveformGenerator::draw_background(self, canvas);
    }

    fn render(&mut self, canvas: &mut dyn Canvas, millis_passed: u64) {
        self.render_frame(canvas, millis_passed);
    }

    fn on_start(&mut self) {
        self.reset();
    }

    fn on_stop(&mut self) {
        if let Some(center) = self.geometry.as_ref().map(|g| g.center_y) {
            self.reset_paths(center);
        }
    }
}

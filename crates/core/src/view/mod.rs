//! Host-facing waveform view.
//!
//! [`WaveLineView`] is what the host UI talks to. It reacts to surface
//! lifecycle callbacks by building and tearing down a [`RenderLoop`], exposes
//! the start/stop/pause controls, and forwards runtime setters to the shared
//! [`WaveControls`] so they never wait on a frame being drawn.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::{
    render::{LoopState, RenderLoop},
    surface::RenderSurface,
    Color, WaveControls, WaveformConfig, WaveformGenerator,
};

pub struct WaveLineView<S: RenderSurface> {
    config: WaveformConfig,
    controls: Arc<WaveControls>,
    render_loop: Option<RenderLoop<S, WaveformGenerator>>,
    anim_requested: bool,
    released: bool,
}

impl<S: RenderSurface> WaveLineView<S> {
    pub fn new(config: WaveformConfig) -> Self {
        let controls = Arc::new(WaveControls::new(&config));
        Self {
            config,
            controls,
            render_loop: None,
            anim_requested: false,
            released: false,
        }
    }

    pub fn config(&self) -> &WaveformConfig {
        &self.config
    }

    pub fn controls(&self) -> &Arc<WaveControls> {
        &self.controls
    }

    /// State of the current render loop, if a surface is attached.
    pub fn loop_state(&self) -> Option<LoopState> {
        self.render_loop.as_ref().map(RenderLoop::state)
    }

    pub fn render_loop(&self) -> Option<&RenderLoop<S, WaveformGenerator>> {
        self.render_loop.as_ref()
    }

    /// Attaches a fresh render loop to `surface`, starting it right away when
    /// the animation was requested before the surface existed.
    pub fn on_surface_created(&mut self, surface: S) {
        if self.released {
            debug!("ignoring surface created after release");
            return;
        }
        if let Some(previous) = self.render_loop.take() {
            previous.destroy();
        }

        let generator = WaveformGenerator::new(self.config.clone(), self.controls.clone());
        let render_loop =
            RenderLoop::with_interval(surface, generator, self.config.frame_interval());
        debug!(anim_requested = self.anim_requested, "surface created");

        if self.anim_requested {
            if let Err(err) = render_loop.start_animation() {
                warn!(%err, "could not start render thread");
            }
        }
        self.render_loop = Some(render_loop);
    }

    /// Geometry is read from each acquired buffer, so a resize needs no work.
    pub fn on_surface_changed(&mut self, width: u32, height: u32) {
        debug!(width, height, "surface changed");
    }

    pub fn on_surface_destroyed(&mut self) {
        if let Some(render_loop) = self.render_loop.take() {
            debug!("surface destroyed");
            render_loop.stop();
            render_loop.destroy();
        }
    }

    pub fn start_anim(&mut self) {
        self.anim_requested = true;
        if let Some(render_loop) = &self.render_loop {
            if let Err(err) = render_loop.start_animation() {
                warn!(%err, "could not start render thread");
            }
        }
    }

    pub fn stop_anim(&mut self) {
        self.anim_requested = false;
        if let Some(render_loop) = &self.render_loop {
            render_loop.stop_animation();
        }
    }

    pub fn on_resume(&self) {
        if let Some(render_loop) = &self.render_loop {
            render_loop.resume();
        }
    }

    pub fn on_pause(&self) {
        if let Some(render_loop) = &self.render_loop {
            render_loop.pause();
        }
    }

    /// Regaining focus restarts a requested animation from its intro; any
    /// other focus change just makes sure the loop is drawing.
    pub fn on_window_focus_changed(&mut self, has_focus: bool) {
        if has_focus && self.anim_requested {
            self.start_anim();
        } else if let Some(render_loop) = &self.render_loop {
            if let Err(err) = render_loop.start() {
                warn!(%err, "could not start render thread");
            }
        }
    }

    /// Detaches the view for good: the render loop is destroyed and later
    /// surface callbacks are ignored.
    pub fn release(&mut self) {
        self.anim_requested = false;
        self.released = true;
        if let Some(render_loop) = self.render_loop.take() {
            render_loop.shutdown();
        }
    }

    pub fn is_running(&self) -> bool {
        self.render_loop
            .as_ref()
            .map(RenderLoop::is_running)
            .unwrap_or(false)
    }

    /// Smoothed volume the render thread is currently drawing.
    pub fn displayed_volume(&self) -> Option<f32> {
        self.render_loop
            .as_ref()
            .map(|render_loop| render_loop.with_renderer(|generator| generator.volume()))
    }

    pub fn is_anim_requested(&self) -> bool {
        self.anim_requested
    }

    /// Feeds a normalized `[0, 1]` amplitude, ignored while not animating.
    pub fn update_amplitude(&self, amplitude: f32) {
        if !self.anim_requested {
            return;
        }
        let volume = (amplitude.clamp(0.0, 1.0) * 100.0) as i32;
        self.set_volume(volume);
    }

    pub fn set_move_speed(&self, speed: f32) {
        if !self.controls.set_move_speed(speed) {
            warn!(speed, "ignoring non-positive move speed");
        }
    }

    pub fn set_volume(&self, volume: i32) {
        self.controls.set_volume(volume);
    }

    pub fn set_background_color(&self, color: Color) {
        self.controls.set_background_color(color);
    }

    pub fn set_line_color(&self, color: Color) {
        self.controls.set_line_color(color);
    }

    pub fn set_sensibility(&self, sensibility: i32) {
        self.controls.set_sensibility(sensibility);
    }
}

impl<S: RenderSurface> Drop for WaveLineView<S> {
    fn drop(&mut self) {
        if let Some(render_loop) = self.render_loop.take() {
            render_loop.destroy();
        }
    }
}

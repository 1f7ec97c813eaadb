//! Core library for the WaveLine view.
//!
//! A volume-driven waveform animation drawn by a dedicated render thread. The
//! crate is split the same way the data flows: host callbacks reach the
//! [`WaveLineView`], which drives a [`RenderLoop`]; each tick the loop borrows
//! a frame from a [`RenderSurface`] and lets the [`WaveformGenerator`] stroke
//! four [`WavePath`]s into it, attenuated by the [`DecayCache`].

pub mod color;
pub mod config;
pub mod decay;
pub mod error;
pub mod path;
pub mod render;
pub mod surface;
pub mod view;
pub mod waveform;

#[cfg(test)]
mod testing;

pub use color::Color;
pub use config::WaveformConfig;
pub use decay::DecayCache;
pub use error::{Result, WaveLineError};
pub use path::{PathVerb, WavePath};
pub use render::{FrameRenderer, LoopState, RenderLoop};
pub use surface::{Canvas, ClearMode, PixmapSurface, RenderSurface, StrokeStyle, SurfaceHandle};
pub use view::WaveLineView;
pub use waveform::{WaveControls, WaveformGenerator};

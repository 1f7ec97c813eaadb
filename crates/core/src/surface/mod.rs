//! Drawing capability consumed by the render loop.
//!
//! The loop never owns pixels. Each tick it borrows a frame from a
//! [`RenderSurface`], draws into it through the [`Canvas`] trait and hands it
//! back with [`RenderSurface::publish`].

mod pixmap;

pub use pixmap::{PixmapFrame, PixmapSurface, SurfaceHandle};

use crate::{Color, Result, WavePath};

/// How a canvas is cleared before a frame is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClearMode {
    /// Paint the color over the whole target.
    Fill,
    /// Reset every pixel to fully transparent, ignoring the color.
    Clear,
}

/// Stroke settings for one path.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrokeStyle {
    pub color: Color,
    pub width: f32,
    pub anti_alias: bool,
}

impl StrokeStyle {
    pub fn new(color: Color, width: f32) -> Self {
        Self {
            color,
            width,
            anti_alias: true,
        }
    }
}

/// 2-D target a frame is drawn into.
pub trait Canvas {
    fn width(&self) -> u32;
    fn height(&self) -> u32;
    fn clear(&mut self, color: Color, mode: ClearMode);
    fn stroke_path(&mut self, path: &WavePath, style: &StrokeStyle);
}

/// Externally owned, double-buffered drawing target.
pub trait RenderSurface: Send + 'static {
    type Frame: Canvas;

    /// Borrows the back buffer.
    ///
    /// `Ok(None)` means the surface is not ready yet and the tick should be
    /// skipped; [`WaveLineError::SurfaceLost`](crate::WaveLineError::SurfaceLost)
    /// means it has been torn down.
    fn acquire(&mut self) -> Result<Option<Self::Frame>>;

    /// Hands a drawn frame back so it becomes the visible buffer.
    fn publish(&mut self, frame: Self::Frame) -> Result<()>;
}

use std::{
    fmt,
    path::Path,
    sync::{Arc, Mutex, MutexGuard},
};

use tiny_skia::{Paint, Pixmap, Rect, Stroke, Transform};

use super::{Canvas, ClearMode, RenderSurface, StrokeStyle};
use crate::{Color, Result, WaveLineError, WavePath};

struct SurfaceState {
    width: u32,
    height: u32,
    front: Option<Pixmap>,
    spare: Option<Pixmap>,
    alive: bool,
    published: u64,
}

/// In-memory double buffer backed by two tiny-skia pixmaps.
///
/// The surface itself moves into the render thread; the owner keeps a
/// [`SurfaceHandle`] to resize it, tear it down or read the visible frame.
#[derive(Debug)]
pub struct PixmapSurface {
    state: Arc<Mutex<SurfaceState>>,
}

/// Owner-side view of a [`PixmapSurface`].
#[derive(Debug, Clone)]
pub struct SurfaceHandle {
    state: Arc<Mutex<SurfaceState>>,
}

/// Back buffer lent out for a single tick.
pub struct PixmapFrame {
    pixmap: Pixmap,
}

impl PixmapSurface {
    /// Creates a surface of the given size. A zero dimension is allowed and
    /// simply makes every acquisition report "not ready".
    pub fn new(width: u32, height: u32) -> (Self, SurfaceHandle) {
        let state = Arc::new(Mutex::new(SurfaceState {
            width,
            height,
            front: None,
            spare: None,
            alive: true,
            published: 0,
        }));

        (
            Self {
                state: state.clone(),
            },
            SurfaceHandle { state },
        )
    }
}

impl RenderSurface for PixmapSurface {
    type Frame = PixmapFrame;

    fn acquire(&mut self) -> Result<Option<PixmapFrame>> {
        let mut state = lock(&self.state)?;
        if !state.alive {
            return Err(WaveLineError::SurfaceLost);
        }
        if state.width == 0 || state.height == 0 {
            return Ok(None);
        }

        let (width, height) = (state.width, state.height);
        let reusable = state
            .spare
            .take()
            .filter(|pixmap| pixmap.width() == width && pixmap.height() == height);
        let pixmap = match reusable {
            Some(pixmap) => pixmap,
            None => match Pixmap::new(width, height) {
                Some(pixmap) => pixmap,
                None => return Ok(None),
            },
        };

        Ok(Some(PixmapFrame { pixmap }))
    }

    fn publish(&mut self, frame: PixmapFrame) -> Result<()> {
        let mut state = lock(&self.state)?;
        if !state.alive {
            return Err(WaveLineError::SurfaceLost);
        }
        // Frames drawn before a resize are stale; drop them.
        if frame.pixmap.width() != state.width || frame.pixmap.height() != state.height {
            return Ok(());
        }

        let previous = state.front.replace(frame.pixmap);
        state.spare = previous;
        state.published += 1;
        Ok(())
    }
}

impl SurfaceHandle {
    pub fn size(&self) -> Result<(u32, u32)> {
        let state = lock(&self.state)?;
        Ok((state.width, state.height))
    }

    /// Changes the size of subsequently acquired buffers.
    pub fn resize(&self, width: u32, height: u32) -> Result<()> {
        let mut state = lock(&self.state)?;
        state.width = width;
        state.height = height;
        state.spare = None;
        Ok(())
    }

    /// Marks the surface as gone; later acquisitions fail with `SurfaceLost`.
    pub fn tear_down(&self) -> Result<()> {
        let mut state = lock(&self.state)?;
        state.alive = false;
        state.spare = None;
        Ok(())
    }

    pub fn is_alive(&self) -> Result<bool> {
        Ok(lock(&self.state)?.alive)
    }

    /// Number of frames that reached the front buffer.
    pub fn published_frames(&self) -> Result<u64> {
        Ok(lock(&self.state)?.published)
    }

    /// Copy of the visible frame, if one has been published.
    pub fn snapshot(&self) -> Result<Option<Pixmap>> {
        Ok(lock(&self.state)?.front.clone())
    }

    pub fn encode_png(&self) -> Result<Vec<u8>> {
        let frame = self
            .snapshot()?
            .ok_or_else(|| WaveLineError::msg("no frame has been published yet"))?;
        frame
            .encode_png()
            .map_err(|err| WaveLineError::Png(err.to_string()))
    }

    pub fn save_png(&self, path: impl AsRef<Path>) -> Result<()> {
        let bytes = self.encode_png()?;
        std::fs::write(path, bytes)?;
        Ok(())
    }
}

impl PixmapFrame {
    pub fn pixmap(&self) -> &Pixmap {
        &self.pixmap
    }
}

impl Canvas for PixmapFrame {
    fn width(&self) -> u32 {
        self.pixmap.width()
    }

    fn height(&self) -> u32 {
        self.pixmap.height()
    }

    fn clear(&mut self, color: Color, mode: ClearMode) {
        match mode {
            ClearMode::Clear => self.pixmap.fill(tiny_skia::Color::TRANSPARENT),
            ClearMode::Fill => {
                let (width, height) = (self.pixmap.width() as f32, self.pixmap.height() as f32);
                let Some(rect) = Rect::from_xywh(0.0, 0.0, width, height) else {
                    return;
                };

                let mut paint = Paint::default();
                paint.set_color(color.into());
                self.pixmap.fill_rect(rect, &paint, Transform::identity(), None);
            }
        }
    }

    fn stroke_path(&mut self, path: &WavePath, style: &StrokeStyle) {
        let Some(path) = path.to_skia() else {
            return;
        };

        let mut paint = Paint::default();
        paint.set_color(style.color.into());
        paint.anti_alias = style.anti_alias;

        let stroke = Stroke {
            width: style.width,
            ..Stroke::default()
        };
        self.pixmap
            .stroke_path(&path, &paint, &stroke, Transform::identity(), None);
    }
}

impl fmt::Debug for SurfaceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SurfaceState")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("has_front", &self.front.is_some())
            .field("alive", &self.alive)
            .field("published", &self.published)
            .finish()
    }
}

impl fmt::Debug for PixmapFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PixmapFrame")
            .field("width", &self.pixmap.width())
            .field("height", &self.pixmap.height())
            .finish()
    }
}

fn lock(state: &Mutex<SurfaceState>) -> Result<MutexGuard<'_, SurfaceState>> {
    state
        .lock()
        .map_err(|_| WaveLineError::msg("pixmap surface has been poisoned"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_sized_surface_is_not_ready() {
        let (mut surface, handle) = PixmapSurface::new(0, 40);
        assert!(surface.acquire().unwrap().is_none());

        handle.resize(80, 40).unwrap();
        let frame = surface.acquire().unwrap().expect("resized surface is ready");
        assert_eq!((frame.width(), frame.height()), (80, 40));
    }

    #[test]
    fn publish_swaps_front_buffer() {
        let (mut surface, handle) = PixmapSurface::new(4, 4);
        assert!(handle.snapshot().unwrap().is_none());

        let mut frame = surface.acquire().unwrap().unwrap();
        frame.clear(Color::from_rgb(255, 0, 0), ClearMode::Fill);
        surface.publish(frame).unwrap();

        let front = handle.snapshot().unwrap().expect("frame was published");
        let pixel = front.pixel(1, 1).unwrap();
        assert_eq!((pixel.red(), pixel.green(), pixel.alpha()), (255, 0, 255));
        assert_eq!(handle.published_frames().unwrap(), 1);
    }

    #[test]
    fn clear_mode_resets_to_transparent() {
        let (mut surface, handle) = PixmapSurface::new(4, 4);
        let mut frame = surface.acquire().unwrap().unwrap();
        frame.clear(Color::WHITE, ClearMode::Fill);
        frame.clear(Color::WHITE, ClearMode::Clear);
        surface.publish(frame).unwrap();

        let front = handle.snapshot().unwrap().unwrap();
        assert_eq!(front.pixel(0, 0).unwrap().alpha(), 0);
    }

    #[test]
    fn torn_down_surface_reports_loss() {
        let (mut surface, handle) = PixmapSurface::new(4, 4);
        let frame = surface.acquire().unwrap().unwrap();
        handle.tear_down().unwrap();

        assert!(matches!(surface.acquire(), Err(WaveLineError::SurfaceLost)));
        assert!(matches!(surface.publish(frame), Err(WaveLineError::SurfaceLost)));
        assert!(!handle.is_alive().unwrap());
    }

    #[test]
    fn stale_frames_are_dropped_after_resize() {
        let (mut surface, handle) = PixmapSurface::new(4, 4);
        let frame = surface.acquire().unwrap().unwrap();
        handle.resize(8, 8).unwrap();
        surface.publish(frame).unwrap();

        assert_eq!(handle.published_frames().unwrap(), 0);
    }

    #[test]
    fn strokes_land_on_the_pixmap() {
        let (mut surface, handle) = PixmapSurface::new(20, 20);
        let mut frame = surface.acquire().unwrap().unwrap();
        frame.clear(Color::WHITE, ClearMode::Fill);

        let mut path = WavePath::new();
        path.move_to(0.0, 10.0);
        path.line_to(20.0, 10.0);
        frame.stroke_path(&path, &StrokeStyle::new(Color::BLACK, 4.0));
        surface.publish(frame).unwrap();

        let front = handle.snapshot().unwrap().unwrap();
        let on_line = front.pixel(10, 10).unwrap();
        let off_line = front.pixel(10, 1).unwrap();
        assert!(on_line.red() < 50);
        assert_eq!(off_line.red(), 255);
        assert!(!handle.encode_png().unwrap().is_empty());
    }
}

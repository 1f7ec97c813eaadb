/// Single drawing instruction of a [`WavePath`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathVerb {
    MoveTo { x: f32, y: f32 },
    LineTo { x: f32, y: f32 },
}

/// Backend independent open polyline.
///
/// The waveform only ever needs straight segments, so the path is a flat list
/// of move/line verbs that a [`Canvas`](crate::Canvas) implementation turns
/// into its native path type.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WavePath {
    verbs: Vec<PathVerb>,
}

impl WavePath {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drops all verbs but keeps the allocation for the next frame.
    pub fn rewind(&mut self) {
        self.verbs.clear();
    }

    pub fn move_to(&mut self, x: f32, y: f32) {
        self.verbs.push(PathVerb::MoveTo { x, y });
    }

    pub fn line_to(&mut self, x: f32, y: f32) {
        self.verbs.push(PathVerb::LineTo { x, y });
    }

    pub fn verbs(&self) -> &[PathVerb] {
        &self.verbs
    }

    pub fn is_empty(&self) -> bool {
        self.verbs.is_empty()
    }

    /// Number of line segments, i.e. everything that actually gets stroked.
    pub fn segment_count(&self) -> usize {
        self.verbs
            .iter()
            .filter(|verb| matches!(verb, PathVerb::LineTo { .. }))
            .count()
    }

    /// Builds the tiny-skia equivalent, or `None` when nothing would be stroked.
    pub fn to_skia(&self) -> Option<tiny_skia::Path> {
        if self.segment_count() == 0 {
            return None;
        }

        let mut pb = tiny_skia::PathBuilder::with_capacity(self.verbs.len(), self.verbs.len());
        for verb in &self.verbs {
            match *verb {
                PathVerb::MoveTo { x, y } => pb.move_to(x, y),
                PathVerb::LineTo { x, y } => pb.line_to(x, y),
            }
        }
        pb.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rewind_clears_previous_geometry() {
        let mut path = WavePath::new();
        path.move_to(0.0, 10.0);
        path.line_to(5.0, 12.0);
        assert_eq!(path.segment_count(), 1);

        path.rewind();
        assert!(path.is_empty());
        assert!(path.to_skia().is_none());
    }

    #[test]
    fn converts_polyline_to_skia_path() {
        let mut path = WavePath::new();
        path.move_to(0.0, 10.0);
        path.line_to(5.0, 12.0);
        path.line_to(10.0, 8.0);
        path.move_to(10.0, 10.0);

        let skia = path.to_skia().expect("path with segments should convert");
        let bounds = skia.bounds();
        assert_eq!(bounds.left(), 0.0);
        assert_eq!(bounds.right(), 10.0);
        assert_eq!(bounds.top(), 8.0);
        assert_eq!(bounds.bottom(), 12.0);
    }

    #[test]
    fn moves_alone_do_not_produce_a_path() {
        let mut path = WavePath::new();
        path.move_to(0.0, 10.0);
        path.move_to(4.0, 10.0);
        assert!(path.to_skia().is_none());
    }
}

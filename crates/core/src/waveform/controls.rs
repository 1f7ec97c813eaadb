use std::sync::atomic::{AtomicI32, AtomicU32, Ordering};

use tracing::debug;

use crate::{config::clamp_sensibility, Color, WaveformConfig};

pub const MIN_VOLUME: i32 = 0;
pub const MAX_VOLUME: i32 = 100;
pub const DEFAULT_TARGET_VOLUME: i32 = 50;
/// Volume step per frame contributed by one unit of sensibility.
pub const VOLUME_STEP_PER_SENSIBILITY: f32 = 0.35;

/// Runtime knobs shared between the owning thread and the render thread.
///
/// Every value is an independent scalar, so plain atomic loads and stores are
/// enough: the render thread reads a consistent value per field on each frame
/// and no field depends on another.
#[derive(Debug)]
pub struct WaveControls {
    target_volume: AtomicI32,
    sensibility: AtomicI32,
    move_speed: AtomicU32,
    line_color: AtomicU32,
    background_color: AtomicU32,
}

impl WaveControls {
    pub fn new(config: &WaveformConfig) -> Self {
        Self {
            target_volume: AtomicI32::new(DEFAULT_TARGET_VOLUME),
            sensibility: AtomicI32::new(clamp_sensibility(config.sensibility)),
            move_speed: AtomicU32::new(config.move_speed.to_bits()),
            line_color: AtomicU32::new(config.line_color.to_argb()),
            background_color: AtomicU32::new(config.background_color.to_argb()),
        }
    }

    /// Sets the volume the waveform eases toward, clamped to `0..=100`.
    ///
    /// Changes no larger than one smoothing step are ignored so a jittery
    /// input does not keep restarting the easing. Returns whether the target
    /// moved.
    pub fn set_volume(&self, volume: i32) -> bool {
        let current = self.target_volume();
        if ((current as i64 - volume as i64).abs() as f32) <= self.per_volume_step() {
            return false;
        }

        let clamped = volume.clamp(MIN_VOLUME, MAX_VOLUME);
        self.target_volume.store(clamped, Ordering::Relaxed);
        true
    }

    pub fn target_volume(&self) -> i32 {
        self.target_volume.load(Ordering::Relaxed)
    }

    /// Clamped to `1..=10`.
    pub fn set_sensibility(&self, sensibility: i32) {
        let clamped = clamp_sensibility(sensibility);
        if clamped != sensibility {
            debug!(requested = sensibility, clamped, "sensibility clamped");
        }
        self.sensibility.store(clamped, Ordering::Relaxed);
    }

    pub fn sensibility(&self) -> i32 {
        self.sensibility.load(Ordering::Relaxed)
    }

    pub fn per_volume_step(&self) -> f32 {
        self.sensibility() as f32 * VOLUME_STEP_PER_SENSIBILITY
    }

    /// Ignores speeds that are not strictly positive and finite.
    pub fn set_move_speed(&self, speed: f32) -> bool {
        if !speed.is_finite() || speed <= 0.0 {
            return false;
        }
        self.move_speed.store(speed.to_bits(), Ordering::Relaxed);
        true
    }

    pub fn move_speed(&self) -> f32 {
        f32::from_bits(self.move_speed.load(Ordering::Relaxed))
    }

    pub fn set_line_color(&self, color: Color) {
        self.line_color.store(color.to_argb(), Ordering::Relaxed);
    }

    pub fn line_color(&self) -> Color {
        Color::from_argb(self.line_color.load(Ordering::Relaxed))
    }

    pub fn set_background_color(&self, color: Color) {
        self.background_color.store(color.to_argb(), Ordering::Relaxed);
    }

    pub fn background_color(&self) -> Color {
        Color::from_argb(self.background_color.load(Ordering::Relaxed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn controls() -> WaveControls {
        WaveControls::new(&WaveformConfig::default())
    }

    #[test]
    fn volume_is_clamped() {
        let controls = controls();
        assert!(controls.set_volume(150));
        assert_eq!(controls.target_volume(), 100);

        assert!(controls.set_volume(-5));
        assert_eq!(controls.target_volume(), 0);
    }

    #[test]
    fn small_volume_changes_are_ignored() {
        let controls = controls();
        // Default sensibility 5 gives a step of 1.75.
        assert!(!controls.set_volume(51));
        assert_eq!(controls.target_volume(), DEFAULT_TARGET_VOLUME);

        assert!(controls.set_volume(52));
        assert_eq!(controls.target_volume(), 52);
    }

    #[test]
    fn sensibility_is_clamped() {
        let controls = controls();
        controls.set_sensibility(15);
        assert_eq!(controls.sensibility(), 10);

        controls.set_sensibility(0);
        assert_eq!(controls.sensibility(), 1);
        assert!((controls.per_volume_step() - 0.35).abs() < 1e-6);
    }

    #[test]
    fn rejects_non_positive_speed() {
        let controls = controls();
        assert!(!controls.set_move_speed(0.0));
        assert!(!controls.set_move_speed(f32::NAN));
        assert_eq!(controls.move_speed(), 250.0);

        assert!(controls.set_move_speed(125.0));
        assert_eq!(controls.move_speed(), 125.0);
    }

    #[test]
    fn colors_round_trip_through_atomics() {
        let controls = controls();
        controls.set_background_color(Color::TRANSPARENT);
        controls.set_line_color(Color::from_rgba(10, 20, 30, 40));

        assert!(controls.background_color().is_transparent());
        assert_eq!(controls.line_color(), Color::from_rgba(10, 20, 30, 40));
    }
}

use std::{path::Path, time::Duration};

use serde::{Deserialize, Serialize};

use crate::{Color, Result, WaveLineError};

pub const DEFAULT_SAMPLING_SIZE: usize = 64;
pub const DEFAULT_MOVE_SPEED: f32 = 250.0;
pub const DEFAULT_SENSIBILITY: i32 = 5;
pub const MIN_SENSIBILITY: i32 = 1;
pub const MAX_SENSIBILITY: i32 = 10;
pub const DEFAULT_FRAME_INTERVAL_MS: u64 = 16;

/// Per-session parameters of the waveform view.
///
/// Built once when the view is constructed. Afterwards only the runtime
/// setters on the view change the values that may move (volume, colors,
/// speed and sensibility).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WaveformConfig {
    /// Number of horizontal sample intervals; `sampling_size + 1` points are drawn.
    pub sampling_size: usize,
    /// Milliseconds per unit of phase offset.
    pub move_speed: f32,
    /// Smoothing aggressiveness, clamped to `1..=10`.
    pub sensibility: i32,
    pub line_color: Color,
    pub background_color: Color,
    pub thick_line_width: f32,
    pub fine_line_width: f32,
    /// Enables the intro line sweep and the alpha fade-in.
    pub intro_animation: bool,
    pub frame_interval_ms: u64,
}

impl Default for WaveformConfig {
    fn default() -> Self {
        Self {
            sampling_size: DEFAULT_SAMPLING_SIZE,
            move_speed: DEFAULT_MOVE_SPEED,
            sensibility: DEFAULT_SENSIBILITY,
            line_color: Color::from_rgb(0x2E, 0xD1, 0x84),
            background_color: Color::WHITE,
            thick_line_width: 6.0,
            fine_line_width: 2.0,
            intro_animation: false,
            frame_interval_ms: DEFAULT_FRAME_INTERVAL_MS,
        }
    }
}

impl WaveformConfig {
    /// Parses a JSON document, filling missing fields with defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let mut config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and validates a JSON configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    /// Rejects values that cannot produce a frame and clamps the sensibility.
    pub fn validate(&mut self) -> Result<()> {
        if !self.move_speed.is_finite() || self.move_speed <= 0.0 {
            return Err(WaveLineError::InvalidConfig(format!(
                "move_speed must be a positive number, got {}",
                self.move_speed
            )));
        }
        if self.sampling_size == 0 {
            return Err(WaveLineError::InvalidConfig(
                "sampling_size must be at least 1".to_string(),
            ));
        }
        for (name, width) in [
            ("thick_line_width", self.thick_line_width),
            ("fine_line_width", self.fine_line_width),
        ] {
            if !width.is_finite() || width < 0.0 {
                return Err(WaveLineError::InvalidConfig(format!(
                    "{name} must be a non-negative number, got {width}"
                )));
            }
        }
        if self.frame_interval_ms == 0 {
            return Err(WaveLineError::InvalidConfig(
                "frame_interval_ms must be at least 1".to_string(),
            ));
        }

        self.sensibility = clamp_sensibility(self.sensibility);
        Ok(())
    }

    /// Background is cleared instead of painted when fully transparent.
    pub fn transparent(&self) -> bool {
        self.background_color.is_transparent()
    }

    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.frame_interval_ms)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

pub fn clamp_sensibility(sensibility: i32) -> i32 {
    sensibility.clamp(MIN_SENSIBILITY, MAX_SENSIBILITY)
}

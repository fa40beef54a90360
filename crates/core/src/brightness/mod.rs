use std::{f64::consts::PI, fmt};

use serde::{Deserialize, Serialize};

use crate::{timecode::ClockPosition, DaycycleError, Result};

const MINUTES_PER_DAY: f64 = 24.0 * 60.0;
const CHANNEL_MAX: f64 = 255.0;

/// Warm daylight tint reached at noon.
pub const DAYLIGHT_TINT: Color = Color::new(255, 200, 150);

/// An 8-bit RGB triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn channels(self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }

    /// Channels scaled into `[0, 1]`, the form GPU clear colors expect.
    pub fn to_normalized(self) -> [f32; 3] {
        self.channels().map(|channel| f32::from(channel) / 255.0)
    }

    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// True when no channel of `self` exceeds the matching channel of `other`.
    pub fn is_dimmer_or_equal(self, other: Color) -> bool {
        self.r <= other.r && self.g <= other.g && self.b <= other.b
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Single-hump sinusoidal day curve applied to a base tint.
///
/// Brightness is `floor + amplitude * sin(time_of_day * PI)` where
/// `time_of_day` is the minute of the day divided by 1440. With the defaults
/// the curve bottoms out at 100 around midnight (never fully black) and peaks
/// at 255 at noon, where the output equals the tint.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrightnessModel {
    pub tint: Color,
    pub floor: f64,
    pub amplitude: f64,
}

impl Default for BrightnessModel {
    fn default() -> Self {
        Self {
            tint: DAYLIGHT_TINT,
            floor: 100.0,
            amplitude: 155.0,
        }
    }
}

impl BrightnessModel {
    /// Raw brightness on the 0-255 scale before it is applied to the tint.
    pub fn brightness_at(&self, position: ClockPosition) -> f64 {
        let time = position.clock_time();
        let time_of_day = f64::from(time.minutes_since_midnight()) / MINUTES_PER_DAY;
        self.floor + self.amplitude * (time_of_day * PI).sin()
    }

    pub fn color_at(&self, position: ClockPosition) -> Color {
        let brightness = self.brightness_at(position);
        let scale = |channel: u8| {
            (f64::from(channel) * brightness / CHANNEL_MAX)
                .round()
                .clamp(0.0, CHANNEL_MAX) as u8
        };

        Color::new(scale(self.tint.r), scale(self.tint.g), scale(self.tint.b))
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if !self.floor.is_finite() || self.floor < 0.0 {
            return Err(DaycycleError::invalid_config(
                "brightness floor must be a non-negative number",
            ));
        }
        if !self.amplitude.is_finite() {
            return Err(DaycycleError::invalid_config(
                "brightness amplitude must be finite",
            ));
        }
        Ok(())
    }
}

/// Background color for `position` under the default daylight model.
pub fn color_at(position: impl Into<ClockPosition>) -> Color {
    BrightnessModel::default().color_at(position.into())
}

//! Core library for the Day Cycle Viewer application.
//!
//! A virtual clock position in `[0, 24]` hours drives the background color of
//! a 3D scene. The crate owns the parts with real logic: the time codec, the
//! sinusoidal brightness model and the playback transport. Rendering stays on
//! the far side of the [`SceneAdapter`] trait and only ever receives events.

pub mod brightness;
pub mod config;
pub mod error;
pub mod playback;
pub mod render;
pub mod scene;
pub mod timecode;
pub mod timeline;

pub use brightness::{color_at, BrightnessModel, Color, DAYLIGHT_TINT};
pub use config::{AppConfig, PlaybackConfig};
pub use error::{DaycycleError, Result};
pub use playback::{
    DaylightSample, PlaybackController, PlaybackEvent, PlaybackPhase, PlaybackState,
};
pub use render::{RenderGraph, RenderedFrame};
pub use scene::{pump_events, SceneAdapter, SceneDescriptor};
pub use timecode::{ClockPosition, ClockTime, DisplayTime};
pub use timeline::{PlaybackClock, ScheduledTask, Scheduler, TaskId};

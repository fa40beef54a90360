//! Transport state machine over the synthetic 24 hour timeline.
//!
//! The controller is `Idle` until [`PlaybackController::play`] installs a
//! recurring tick. Each tick moves the clock position forward and publishes a
//! [`PlaybackEvent::PositionChanged`] to every subscriber. The tick that would
//! carry the position past the end of the day is an overrun: it clamps to the
//! end of the day, publishes that last sample, cancels the tick and drops back
//! to `Idle`.
//!
//! Every change of phase goes through a single transition function, which
//! cancels the current tick handle before anything else happens. Two timers
//! can never be live at once, no matter how often `play` is pressed.

use std::{
    sync::mpsc::{self, Receiver, Sender},
    time::Duration,
};

use serde::{Deserialize, Serialize};

use crate::{
    timecode::HOURS_PER_DAY, AppConfig, BrightnessModel, ClockPosition, Color, DisplayTime,
    PlaybackClock, PlaybackConfig, ScheduledTask, Scheduler,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlaybackPhase {
    Idle,
    Playing,
}

/// Everything derived from one clock position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DaylightSample {
    pub position: ClockPosition,
    pub display: DisplayTime,
    pub label: String,
    pub color: Color,
}

impl DaylightSample {
    pub fn compute(position: ClockPosition, model: &BrightnessModel) -> Self {
        Self {
            position,
            display: position.display(),
            label: position.label(),
            color: model.color_at(position),
        }
    }
}

/// Notifications published by the controller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PlaybackEvent {
    /// A tick or a scrub moved the clock.
    PositionChanged(DaylightSample),
    /// Playback started or stopped.
    StateChanged { active: bool },
}

/// Mutable transport state. Only [`PlaybackController`] writes to it.
///
/// Activity is derived from the tick handle, so "a handle exists exactly
/// while playing" holds by construction.
#[derive(Debug, Default)]
pub struct PlaybackState {
    position: ClockPosition,
    tick_handle: Option<ScheduledTask>,
    overrun: bool,
}

impl PlaybackState {
    pub fn position(&self) -> ClockPosition {
        self.position
    }

    pub fn is_active(&self) -> bool {
        self.tick_handle.is_some()
    }

    pub fn phase(&self) -> PlaybackPhase {
        if self.is_active() {
            PlaybackPhase::Playing
        } else {
            PlaybackPhase::Idle
        }
    }

    pub fn tick_handle(&self) -> Option<&ScheduledTask> {
        self.tick_handle.as_ref()
    }

    /// True after playback ran off the end of the timeline and before the
    /// position was moved again.
    pub fn has_overrun(&self) -> bool {
        self.overrun
    }
}

#[derive(Debug)]
pub struct PlaybackController {
    state: PlaybackState,
    clock: PlaybackClock,
    scheduler: Scheduler,
    config: PlaybackConfig,
    model: BrightnessModel,
    subscribers: Vec<Sender<PlaybackEvent>>,
}

impl Default for PlaybackController {
    fn default() -> Self {
        Self::new()
    }
}

impl PlaybackController {
    /// Creates an idle controller at midnight with the default cadence.
    pub fn new() -> Self {
        Self::with_config(&AppConfig::default())
    }

    pub fn with_config(config: &AppConfig) -> Self {
        Self {
            state: PlaybackState::default(),
            clock: PlaybackClock::new(),
            scheduler: Scheduler::new(),
            config: config.playback.clone(),
            model: config.brightness,
            subscribers: Vec::new(),
        }
    }

    /// Registers a new listener. Listeners whose receiver has been dropped
    /// are forgotten on the next publish.
    pub fn subscribe(&mut self) -> Receiver<PlaybackEvent> {
        let (tx, rx) = mpsc::channel();
        self.subscribers.push(tx);
        rx
    }

    pub fn state(&self) -> &PlaybackState {
        &self.state
    }

    pub fn position(&self) -> ClockPosition {
        self.state.position
    }

    pub fn is_active(&self) -> bool {
        self.state.is_active()
    }

    /// Time on the controller's virtual clock.
    pub fn now(&self) -> Duration {
        self.clock.now()
    }

    pub fn sample(&self) -> DaylightSample {
        DaylightSample::compute(self.state.position, &self.model)
    }

    pub fn play(&mut self) {
        self.transport(Self::start);
    }

    pub fn pause(&mut self) {
        self.transport(|controller| controller.transition(PlaybackPhase::Idle));
    }

    /// Jumps forward by the configured step. Landing within one step of the
    /// end snaps to the end.
    pub fn next(&mut self) {
        let step = self.config.step_hours;
        self.step_by(|hours| {
            let advanced = hours + step;
            if advanced + step > HOURS_PER_DAY {
                HOURS_PER_DAY
            } else {
                advanced
            }
        });
    }

    /// Jumps back by the configured step. Landing within one step of
    /// midnight snaps to midnight.
    pub fn previous(&mut self) {
        let step = self.config.step_hours;
        self.step_by(|hours| {
            let retreated = hours - step;
            if retreated - step <= 0.0 {
                0.0
            } else {
                retreated
            }
        });
    }

    /// Scrubs to `hours`. The timer, if any, keeps running.
    pub fn seek(&mut self, hours: f64) {
        self.state.position = ClockPosition::new(hours);
        self.state.overrun = false;
        tracing::trace!(position = self.state.position.hours(), "seek");
        self.publish_position();
    }

    /// Moves the virtual clock forward and runs every tick that fell due.
    /// Returns the number of ticks that fired.
    pub fn advance(&mut self, elapsed: Duration) -> usize {
        let was_active = self.is_active();
        self.clock.advance(elapsed);
        let now = self.clock.now();

        let mut fired = 0;
        while let Some(task) = self.state.tick_handle.as_mut() {
            if !task.poll(now) {
                break;
            }
            fired += 1;
            self.on_tick();
        }

        self.publish_state_change(was_active);
        fired
    }

    /// Time until the next tick, if playing.
    pub fn until_next_tick(&self) -> Option<Duration> {
        self.state
            .tick_handle
            .as_ref()
            .map(|task| task.next_due().saturating_sub(self.clock.now()))
    }

    fn step_by(&mut self, step: impl FnOnce(f64) -> f64) {
        self.transport(|controller| {
            let was_active = controller.is_active();
            controller.transition(PlaybackPhase::Idle);
            controller.state.position = ClockPosition::new(step(controller.state.position.hours()));
            controller.state.overrun = false;
            if was_active {
                controller.start();
            }
        });
    }

    fn start(&mut self) {
        if self.state.overrun {
            self.state.overrun = false;
            self.state.position = ClockPosition::MIDNIGHT;
            self.transition(PlaybackPhase::Idle);
        }
        self.transition(PlaybackPhase::Playing);
    }

    fn on_tick(&mut self) {
        let advanced = self.state.position.hours() + self.config.tick_hours;
        if advanced > HOURS_PER_DAY {
            self.state.position = ClockPosition::END_OF_DAY;
            self.state.overrun = true;
            tracing::debug!("timeline overrun, stopping playback");
            self.publish_position();
            self.transition(PlaybackPhase::Idle);
            return;
        }

        self.state.position = ClockPosition::new(advanced);
        tracing::trace!(position = advanced, "tick");
        self.publish_position();
    }

    /// The only place the tick handle is created or destroyed.
    fn transition(&mut self, phase: PlaybackPhase) {
        if let Some(task) = self.state.tick_handle.take() {
            task.cancel();
        }
        if phase == PlaybackPhase::Playing {
            let task = self
                .scheduler
                .schedule_repeating(self.clock.now(), self.config.tick_interval());
            self.state.tick_handle = Some(task);
        }
        tracing::debug!(
            ?phase,
            position = self.state.position.hours(),
            "playback transition"
        );
    }

    /// Runs a transport operation and reports the net change of activity
    /// once, however many transitions the operation went through.
    fn transport(&mut self, operation: impl FnOnce(&mut Self)) {
        let was_active = self.is_active();
        operation(self);
        self.publish_state_change(was_active);
    }

    fn publish_position(&mut self) {
        let sample = self.sample();
        self.publish(PlaybackEvent::PositionChanged(sample));
    }

    fn publish_state_change(&mut self, was_active: bool) {
        let active = self.is_active();
        if active != was_active {
            self.publish(PlaybackEvent::StateChanged { active });
        }
    }

    fn publish(&mut self, event: PlaybackEvent) {
        self.subscribers.retain(|tx| tx.send(event.clone()).is_ok());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECOND: Duration = Duration::from_secs(1);

    fn controller_at(hours: f64) -> (PlaybackController, Receiver<PlaybackEvent>) {
        let mut controller = PlaybackController::new();
        controller.seek(hours);
        let events = controller.subscribe();
        (controller, events)
    }

    fn positions(events: &Receiver<PlaybackEvent>) -> Vec<f64> {
        events
            .try_iter()
            .filter_map(|event| match event {
                PlaybackEvent::PositionChanged(sample) => Some(sample.position.hours()),
                PlaybackEvent::StateChanged { .. } => None,
            })
            .collect()
    }

    fn state_changes(events: &Receiver<PlaybackEvent>) -> Vec<bool> {
        events
            .try_iter()
            .filter_map(|event| match event {
                PlaybackEvent::StateChanged { active } => Some(active),
                PlaybackEvent::PositionChanged(_) => None,
            })
            .collect()
    }

    #[test]
    fn starts_idle_at_midnight() {
        let controller = PlaybackController::new();
        assert_eq!(controller.position(), ClockPosition::MIDNIGHT);
        assert_eq!(controller.state().phase(), PlaybackPhase::Idle);
        assert!(controller.state().tick_handle().is_none());
        assert!(controller.until_next_tick().is_none());
    }

    #[test]
    fn ticks_once_per_second_while_playing() {
        let (mut controller, events) = controller_at(0.0);
        controller.play();
        assert!(controller.is_active());

        assert_eq!(controller.advance(SECOND / 2), 0);
        assert_eq!(controller.advance(SECOND / 2), 1);
        assert_eq!(controller.advance(2 * SECOND), 2);

        assert_eq!(controller.position().hours(), 3.0);
        assert_eq!(positions(&events), vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn repeated_play_never_stacks_timers() {
        let (mut controller, events) = controller_at(5.0);
        controller.play();
        controller.advance(SECOND / 2);
        controller.play();
        controller.play();

        assert!(controller.state().tick_handle().is_some());
        assert_eq!(controller.advance(SECOND), 1);
        assert_eq!(controller.position().hours(), 6.0);
        assert_eq!(positions(&events), vec![6.0]);
    }

    #[test]
    fn auto_stops_after_running_off_the_timeline() {
        let (mut controller, events) = controller_at(22.0);
        controller.play();

        assert_eq!(controller.advance(5 * SECOND), 3);
        assert!(!controller.is_active());
        assert!(controller.state().tick_handle().is_none());
        assert!(controller.state().has_overrun());
        assert_eq!(controller.position(), ClockPosition::END_OF_DAY);

        let pushed: Vec<_> = events.try_iter().collect();
        let colors = pushed
            .iter()
            .filter(|event| matches!(event, PlaybackEvent::PositionChanged(_)))
            .count();
        assert_eq!(colors, 3, "every tick publishes, the overrun one included");
        let last_sample = pushed.iter().rev().find_map(|event| match event {
            PlaybackEvent::PositionChanged(sample) => Some(sample),
            PlaybackEvent::StateChanged { .. } => None,
        });
        let last_sample = last_sample.unwrap();
        assert_eq!(last_sample.position, ClockPosition::END_OF_DAY);
        assert_eq!(last_sample.display.as_str(), "23:59");
        assert_eq!(last_sample.color, crate::color_at(24.0));
        assert_eq!(
            pushed.last(),
            Some(&PlaybackEvent::StateChanged { active: false })
        );

        assert_eq!(controller.advance(10 * SECOND), 0);
        assert_eq!(events.try_iter().count(), 0);
    }

    #[test]
    fn play_after_overrun_restarts_from_midnight() {
        let (mut controller, events) = controller_at(23.0);
        controller.play();
        controller.advance(2 * SECOND);
        assert!(!controller.is_active());
        events.try_iter().for_each(drop);

        controller.play();
        assert!(controller.is_active());
        assert_eq!(controller.position(), ClockPosition::MIDNIGHT);
        controller.advance(SECOND);
        assert_eq!(positions(&events), vec![1.0]);
    }

    #[test]
    fn play_at_exactly_the_end_needs_one_overrun_tick() {
        let (mut controller, events) = controller_at(24.0);
        controller.play();
        assert_eq!(controller.position(), ClockPosition::END_OF_DAY);
        assert!(controller.is_active());

        controller.advance(SECOND);
        assert!(!controller.is_active());
        assert_eq!(positions(&events), vec![24.0]);

        controller.play();
        assert_eq!(controller.position(), ClockPosition::MIDNIGHT);
    }

    #[test]
    fn every_fired_tick_publishes_one_sample() {
        let (mut controller, events) = controller_at(22.0);
        controller.play();

        let fired = controller.advance(3 * SECOND);
        let published = positions(&events);
        assert_eq!(published.len(), fired);
        assert_eq!(published, vec![23.0, 24.0, 24.0]);
        assert!(published.iter().all(|hours| *hours <= HOURS_PER_DAY));
    }

    #[test]
    fn pause_keeps_the_position() {
        let (mut controller, events) = controller_at(8.0);
        controller.play();
        controller.advance(SECOND);
        controller.pause();

        assert!(!controller.is_active());
        assert!(controller.state().tick_handle().is_none());
        assert_eq!(controller.position().hours(), 9.0);
        assert_eq!(controller.advance(5 * SECOND), 0);
        assert_eq!(state_changes(&events), vec![true, false]);
    }

    #[test]
    fn next_clamps_to_the_end_of_the_day() {
        let (mut controller, _events) = controller_at(23.0);
        controller.next();
        assert_eq!(controller.position().hours(), 24.0);

        controller.seek(10.0);
        controller.next();
        assert_eq!(controller.position().hours(), 12.0);

        // Landing within one step of the end snaps to it.
        controller.seek(21.0);
        controller.next();
        assert_eq!(controller.position().hours(), 24.0);
    }

    #[test]
    fn previous_clamps_to_midnight() {
        let (mut controller, _events) = controller_at(1.0);
        controller.previous();
        assert_eq!(controller.position().hours(), 0.0);

        controller.seek(10.0);
        controller.previous();
        assert_eq!(controller.position().hours(), 8.0);

        controller.seek(4.0);
        controller.previous();
        assert_eq!(controller.position().hours(), 0.0);
    }

    #[test]
    fn stepping_while_paused_does_not_resume() {
        let (mut controller, events) = controller_at(6.0);
        controller.play();
        controller.pause();
        controller.next();
        controller.previous();

        assert!(!controller.is_active());
        assert_eq!(controller.advance(3 * SECOND), 0);
        assert_eq!(state_changes(&events), vec![true, false]);
    }

    #[test]
    fn stepping_while_playing_restarts_the_tick() {
        let (mut controller, events) = controller_at(6.0);
        controller.play();
        controller.advance(SECOND / 2);
        controller.next();

        assert!(controller.is_active());
        assert_eq!(controller.position().hours(), 8.0);
        assert_eq!(controller.until_next_tick(), Some(SECOND));

        controller.advance(SECOND);
        assert_eq!(controller.position().hours(), 9.0);
        assert_eq!(state_changes(&events), vec![true]);
    }

    #[test]
    fn previous_while_playing_resumes() {
        let (mut controller, _events) = controller_at(12.0);
        controller.play();
        controller.previous();
        assert!(controller.is_active());
        assert_eq!(controller.position().hours(), 10.0);
    }

    #[test]
    fn scrubbing_leaves_the_timer_alone() {
        let (mut controller, events) = controller_at(0.0);
        controller.play();
        controller.advance(SECOND / 2);
        controller.seek(6.0);

        assert!(controller.is_active());
        controller.advance(SECOND / 2);
        assert_eq!(controller.position().hours(), 7.0);
        assert_eq!(positions(&events), vec![6.0, 7.0]);
    }

    #[test]
    fn seek_publishes_a_clamped_sample() {
        let (mut controller, events) = controller_at(0.0);
        controller.seek(30.0);

        let event = events.try_recv().unwrap();
        let PlaybackEvent::PositionChanged(sample) = event else {
            panic!("expected a position change");
        };
        assert_eq!(sample.position, ClockPosition::END_OF_DAY);
        assert_eq!(sample.display.as_str(), "23:59");
        assert_eq!(sample.label, "11:59 PM");
        assert!(!controller.is_active());
    }

    #[test]
    fn seek_clears_a_pending_overrun() {
        let (mut controller, _events) = controller_at(24.0);
        controller.play();
        controller.advance(SECOND);
        assert!(controller.state().has_overrun());

        controller.seek(20.0);
        controller.play();
        assert_eq!(controller.position().hours(), 20.0);
    }

    #[test]
    fn dropped_subscribers_are_forgotten() {
        let mut controller = PlaybackController::new();
        let dropped = controller.subscribe();
        let kept = controller.subscribe();
        drop(dropped);

        controller.seek(3.0);
        controller.seek(4.0);
        assert_eq!(positions(&kept), vec![3.0, 4.0]);
        assert_eq!(controller.subscribers.len(), 1);
    }

    #[test]
    fn colors_peak_at_noon_while_playing_through_it() {
        let (mut controller, events) = controller_at(10.0);
        controller.play();
        assert_eq!(controller.advance(3 * SECOND), 3);
        assert_eq!(controller.position().hours(), 13.0);

        let colors: Vec<Color> = events
            .try_iter()
            .filter_map(|event| match event {
                PlaybackEvent::PositionChanged(sample) => Some(sample.color),
                PlaybackEvent::StateChanged { .. } => None,
            })
            .collect();
        assert_eq!(colors.len(), 3);
        assert!(colors[0].is_dimmer_or_equal(colors[1]) && colors[0] != colors[1]);
        assert!(colors[2].is_dimmer_or_equal(colors[1]) && colors[2] != colors[1]);
    }

    #[test]
    fn custom_cadence_and_steps_apply() {
        let config = AppConfig::from_json_str(
            r#"{ "playback": { "tick_interval_ms": 100, "tick_hours": 0.5, "step_hours": 1.0 } }"#,
        )
        .unwrap();
        let mut controller = PlaybackController::with_config(&config);
        controller.play();
        controller.advance(Duration::from_millis(300));
        assert_eq!(controller.position().hours(), 1.5);

        controller.next();
        assert_eq!(controller.position().hours(), 2.5);
    }
}

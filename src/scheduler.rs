//! This module provides the `Scheduler`, which paces automatic stepping against ticks
//! delivered by the host.
//!
//! The scheduler never reads a clock itself. The host calls [`Scheduler::tick`] with a
//! monotonically increasing timestamp at its own cadence, and the scheduler decides whether
//! the tick is honored under the configured rate limit. Subscribers are notified through
//! [`Event`]s.

use crate::types::TuringMachineError;
use std::fmt;
use std::time::Duration;

/// Notifications emitted by the [`Scheduler`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// The first honored tick established the time baseline. Emitted once.
    Initialize,
    /// A tick was honored while launched.
    Render,
    /// `launch` was called.
    Launch,
    /// The launched flag flipped.
    Change,
}

type Listener<'a> = Box<dyn FnMut(Event) + 'a>;

pub struct Scheduler<'a> {
    launched: bool,
    rate_limit: f64,
    measured_rate: f64,
    elapsed: Duration,
    previous: Option<Duration>,
    listeners: Vec<Listener<'a>>,
}

impl Default for Scheduler<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> Scheduler<'a> {
    /// Creates a paused scheduler with no rate limit.
    pub fn new() -> Self {
        Self {
            launched: false,
            rate_limit: f64::INFINITY,
            measured_rate: 0.0,
            elapsed: Duration::ZERO,
            previous: None,
            listeners: Vec::new(),
        }
    }

    /// Creates a paused scheduler honoring at most `rate_limit` ticks per second.
    pub fn with_rate_limit(rate_limit: f64) -> Result<Self, TuringMachineError> {
        let mut scheduler = Self::new();
        scheduler.set_rate_limit(rate_limit)?;
        Ok(scheduler)
    }

    /// Registers a listener for every subsequent [`Event`].
    pub fn subscribe(&mut self, listener: impl FnMut(Event) + 'a) {
        self.listeners.push(Box::new(listener));
    }

    pub fn launch(&mut self) {
        self.set_launched(true);
    }

    pub fn pause(&mut self) {
        self.set_launched(false);
    }

    pub fn toggle(&mut self) {
        self.set_launched(!self.launched);
    }

    /// Sets the launched flag.
    ///
    /// Emits `Change` only when the flag flips, then `Launch` whenever the scheduler ends up
    /// launched.
    pub fn set_launched(&mut self, launched: bool) {
        if self.launched != launched {
            self.launched = launched;
            self.emit(Event::Change);
        }
        if self.launched {
            self.emit(Event::Launch);
        }
    }

    /// Handles one tick from the host clock.
    ///
    /// Paused ticks only move the baseline, so time spent paused never counts as elapsed.
    /// The first honored tick sets the baseline and emits `Initialize` instead of `Render`.
    /// Ticks closer than `1 / rate_limit` seconds to the last honored tick are dropped.
    pub fn tick(&mut self, timestamp: Duration) {
        let Some(previous) = self.previous else {
            if self.launched {
                self.previous = Some(timestamp);
                log::debug!("Scheduler initialized at {timestamp:?}");
                self.emit(Event::Initialize);
            }
            return;
        };

        if timestamp <= previous {
            log::warn!("Dropping stale tick {timestamp:?} (last tick at {previous:?})");
            return;
        }

        if !self.launched {
            self.previous = Some(timestamp);
            return;
        }

        let gap = timestamp - previous;
        if gap.as_secs_f64() < self.interval() {
            log::trace!("Deferring tick after {gap:?}");
            return;
        }

        self.elapsed += gap;
        self.measured_rate = 1.0 / gap.as_secs_f64();
        self.previous = Some(timestamp);
        self.emit(Event::Render);
    }

    /// Sets the maximum number of honored ticks per second.
    ///
    /// # Returns
    ///
    /// * `Err(TuringMachineError::InvalidRateLimit)` if `rate_limit` is not strictly positive.
    pub fn set_rate_limit(&mut self, rate_limit: f64) -> Result<(), TuringMachineError> {
        // Rejects NaN as well.
        if !(rate_limit > 0.0) {
            return Err(TuringMachineError::InvalidRateLimit(rate_limit));
        }
        log::debug!("Rate limit set to {rate_limit} ticks per second");
        self.rate_limit = rate_limit;
        Ok(())
    }

    pub fn rate_limit(&self) -> f64 {
        self.rate_limit
    }

    /// The rate implied by the gap between the last two honored ticks.
    pub fn measured_rate(&self) -> f64 {
        self.measured_rate
    }

    /// Seconds between the last two honored ticks, or infinity before the second one.
    pub fn delta(&self) -> f64 {
        1.0 / self.measured_rate
    }

    /// Time accumulated across honored ticks while launched.
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    pub fn is_launched(&self) -> bool {
        self.launched
    }

    pub fn is_initialized(&self) -> bool {
        self.previous.is_some()
    }

    fn interval(&self) -> f64 {
        1.0 / self.rate_limit
    }

    fn emit(&mut self, event: Event) {
        for listener in self.listeners.iter_mut() {
            listener(event);
        }
    }
}

impl fmt::Debug for Scheduler<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scheduler")
            .field("launched", &self.launched)
            .field("rate_limit", &self.rate_limit)
            .field("measured_rate", &self.measured_rate)
            .field("elapsed", &self.elapsed)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ErrorKind;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn recorded(scheduler: &mut Scheduler<'_>) -> Rc<RefCell<Vec<Event>>> {
        let events = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&events);
        scheduler.subscribe(move |event| sink.borrow_mut().push(event));
        events
    }

    fn millis(ms: u64) -> Duration {
        Duration::from_millis(ms)
    }

    #[test]
    fn test_launch_and_pause_notifications() {
        let mut scheduler = Scheduler::new();
        let events = recorded(&mut scheduler);

        scheduler.launch();
        scheduler.launch();
        scheduler.pause();
        scheduler.pause();

        assert_eq!(
            *events.borrow(),
            vec![Event::Change, Event::Launch, Event::Launch, Event::Change]
        );
    }

    #[test]
    fn test_paused_ticks_are_ignored() {
        let mut scheduler = Scheduler::new();
        let events = recorded(&mut scheduler);

        scheduler.tick(millis(0));
        scheduler.tick(millis(100));

        assert!(events.borrow().is_empty());
        assert!(!scheduler.is_initialized());
        assert_eq!(scheduler.elapsed(), Duration::ZERO);
    }

    #[test]
    fn test_first_tick_initializes_instead_of_rendering() {
        let mut scheduler = Scheduler::new();
        scheduler.launch();
        let events = recorded(&mut scheduler);

        scheduler.tick(millis(10));
        scheduler.tick(millis(20));
        scheduler.tick(millis(30));

        assert_eq!(
            *events.borrow(),
            vec![Event::Initialize, Event::Render, Event::Render]
        );
        assert_eq!(scheduler.elapsed(), millis(20));
    }

    #[test]
    fn test_rate_limit_drops_every_other_tick() {
        let mut scheduler = Scheduler::with_rate_limit(2.0).unwrap();
        scheduler.launch();
        let events = recorded(&mut scheduler);

        // Ticks every 250ms against an allowed interval of 500ms.
        for i in 0..=8 {
            scheduler.tick(millis(250 * i));
        }

        let renders = events
            .borrow()
            .iter()
            .filter(|e| **e == Event::Render)
            .count();
        assert_eq!(renders, 4);
        assert_eq!(scheduler.measured_rate(), 2.0);
        assert_eq!(scheduler.elapsed(), millis(2000));
    }

    #[test]
    fn test_measured_rate_follows_honored_gap() {
        let mut scheduler = Scheduler::with_rate_limit(4.0).unwrap();
        scheduler.launch();

        scheduler.tick(millis(0));
        scheduler.tick(millis(100));
        scheduler.tick(millis(500));

        assert_eq!(scheduler.measured_rate(), 2.0);
        assert_eq!(scheduler.delta(), 0.5);
    }

    #[test]
    fn test_pause_freezes_elapsed() {
        let mut scheduler = Scheduler::new();
        scheduler.launch();

        scheduler.tick(millis(0));
        scheduler.tick(millis(100));
        scheduler.pause();
        scheduler.tick(millis(200));
        scheduler.tick(millis(5000));
        assert_eq!(scheduler.elapsed(), millis(100));
        assert_eq!(scheduler.measured_rate(), 10.0);

        scheduler.launch();
        scheduler.tick(millis(5250));
        assert_eq!(scheduler.elapsed(), millis(350));
        assert_eq!(scheduler.measured_rate(), 4.0);
    }

    #[test]
    fn test_stale_ticks_are_dropped() {
        let mut scheduler = Scheduler::new();
        scheduler.launch();
        let events = recorded(&mut scheduler);

        scheduler.tick(millis(100));
        scheduler.tick(millis(100));
        scheduler.tick(millis(50));

        assert_eq!(*events.borrow(), vec![Event::Initialize]);
    }

    #[test]
    fn test_invalid_rate_limit() {
        let mut scheduler = Scheduler::new();

        for limit in [0.0, -1.0, f64::NAN] {
            let error = scheduler.set_rate_limit(limit).unwrap_err();
            assert_eq!(error.kind(), ErrorKind::Range);
        }
        assert_eq!(scheduler.rate_limit(), f64::INFINITY);

        scheduler.set_rate_limit(f64::INFINITY).unwrap();
        assert!(Scheduler::with_rate_limit(0.0).is_err());
    }

    #[test]
    fn test_toggle() {
        let mut scheduler = Scheduler::new();
        scheduler.toggle();
        assert!(scheduler.is_launched());
        scheduler.toggle();
        assert!(!scheduler.is_launched());
    }
}

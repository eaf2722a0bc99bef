// Copyright 2026 the Surface View Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Simulated display refresh.
//!
//! [`SimulatedDisplay`] owns a virtual clock and produces [`VsyncTick`]s on
//! demand. The [`SimulatedDriver`] handles it gives out implement
//! [`RefreshDriver`]: ticks are only produced while a driver has started the
//! display, the way a real display link only calls back once scheduled.

use alloc::rc::Rc;
use core::cell::Cell;
use core::fmt;

use surface_view_core::backend::RefreshDriver;
use surface_view_core::time::{Duration, HostTime, Timebase};
use surface_view_core::timing::{DisplayId, TimingConfidence, VsyncTick};

/// Errors from [`SimulatedDriver`] operations.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DisplayError {
    /// The display was disconnected when the driver tried to start it.
    Disconnected(DisplayId),
}

impl fmt::Display for DisplayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Disconnected(id) => write!(f, "display {} is disconnected", id.0),
        }
    }
}

impl core::error::Error for DisplayError {}

#[derive(Debug)]
struct DisplayState {
    id: DisplayId,
    refresh_interval: Duration,
    now: Cell<HostTime>,
    running: Cell<bool>,
    connected: Cell<bool>,
    next_tick_index: Cell<u64>,
    last_target: Cell<Option<HostTime>>,
}

/// A virtual display with a fixed refresh interval.
///
/// The clock counts nanoseconds from zero and only moves when
/// [`advance`](Self::advance) or [`advance_by`](Self::advance_by) is called.
///
/// # Example
///
/// ```ignore
/// let display = SimulatedDisplay::sixty_hz(DisplayId(0));
/// let mut view = RenderSurfaceView::new(host, layer, display.driver(), config);
/// view.dispatch_game_loop()?;
/// while let Some(tick) = display.advance() {
///     view.on_vsync(&tick, &mut delegate);
/// }
/// ```
#[derive(Debug)]
pub struct SimulatedDisplay {
    state: Rc<DisplayState>,
}

impl SimulatedDisplay {
    /// Nanoseconds per refresh at 60 Hz.
    pub const SIXTY_HZ: Duration = Duration(16_666_667);

    /// Creates a connected, stopped display.
    #[must_use]
    pub fn new(id: DisplayId, refresh_interval: Duration) -> Self {
        Self {
            state: Rc::new(DisplayState {
                id,
                refresh_interval,
                now: Cell::new(HostTime(0)),
                running: Cell::new(false),
                connected: Cell::new(true),
                next_tick_index: Cell::new(0),
                last_target: Cell::new(None),
            }),
        }
    }

    /// Creates a 60 Hz display.
    #[must_use]
    pub fn sixty_hz(id: DisplayId) -> Self {
        Self::new(id, Self::SIXTY_HZ)
    }

    /// Returns a driver that starts and stops this display.
    #[must_use]
    pub fn driver(&self) -> SimulatedDriver {
        SimulatedDriver {
            state: Rc::clone(&self.state),
        }
    }

    /// Returns the display identifier.
    #[must_use]
    pub fn id(&self) -> DisplayId {
        self.state.id
    }

    /// Returns the refresh interval.
    #[must_use]
    pub fn refresh_interval(&self) -> Duration {
        self.state.refresh_interval
    }

    /// Returns the current virtual time.
    #[must_use]
    pub fn now(&self) -> HostTime {
        self.state.now.get()
    }

    /// Returns `true` while a driver has the display started.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.state.running.get()
    }

    /// Disconnects the display. Subsequent starts fail; a running display
    /// stops producing ticks.
    pub fn disconnect(&self) {
        self.state.connected.set(false);
        self.state.running.set(false);
    }

    /// Reconnects the display.
    pub fn reconnect(&self) {
        self.state.connected.set(true);
    }

    /// Moves the clock forward without producing a tick (simulated work).
    pub fn advance_by(&self, duration: Duration) {
        let state = &self.state;
        state.now.set(state.now.get() + duration);
    }

    /// Moves the clock forward one refresh and returns the tick for it, or
    /// `None` if the display is not running.
    pub fn advance(&self) -> Option<VsyncTick> {
        let state = &self.state;
        let now = state.now.get() + state.refresh_interval;
        state.now.set(now);

        if !state.running.get() {
            return None;
        }

        let tick_index = state.next_tick_index.get();
        state.next_tick_index.set(tick_index + 1);

        // The previous refresh is assumed to have hit its target.
        let prev_actual_present = state.last_target.get();
        let target_present = now.checked_add(state.refresh_interval);
        state.last_target.set(target_present);

        Some(VsyncTick {
            now,
            target_present,
            refresh_interval: Some(state.refresh_interval),
            confidence: TimingConfidence::Predictive,
            tick_index,
            display: state.id,
            prev_actual_present,
        })
    }
}

/// Starts and stops a [`SimulatedDisplay`].
#[derive(Debug, Clone)]
pub struct SimulatedDriver {
    state: Rc<DisplayState>,
}

impl RefreshDriver for SimulatedDriver {
    type Error = DisplayError;

    fn start(&mut self) -> Result<(), DisplayError> {
        if !self.state.connected.get() {
            return Err(DisplayError::Disconnected(self.state.id));
        }
        self.state.running.set(true);
        self.state.last_target.set(None);
        Ok(())
    }

    fn stop(&mut self) -> Result<(), DisplayError> {
        self.state.running.set(false);
        Ok(())
    }

    fn now(&self) -> HostTime {
        self.state.now.get()
    }

    fn timebase(&self) -> Timebase {
        Timebase::NANOS
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stopped_display_produces_no_ticks() {
        let display = SimulatedDisplay::sixty_hz(DisplayId(0));
        assert!(display.advance().is_none());
        assert_eq!(
            display.now(),
            HostTime(16_666_667),
            "clock moves even when stopped"
        );
    }

    #[test]
    fn started_display_ticks_at_refresh_rate() {
        let display = SimulatedDisplay::sixty_hz(DisplayId(2));
        let mut driver = display.driver();
        driver.start().unwrap();

        let first = display.advance().unwrap();
        let second = display.advance().unwrap();
        assert_eq!(first.tick_index, 0);
        assert_eq!(second.tick_index, 1);
        assert_eq!(second.now - first.now, SimulatedDisplay::SIXTY_HZ);
        assert_eq!(first.display, DisplayId(2));
        assert_eq!(first.prev_actual_present, None);
        assert_eq!(second.prev_actual_present, first.target_present);
    }

    #[test]
    fn stop_halts_ticks() {
        let display = SimulatedDisplay::sixty_hz(DisplayId(0));
        let mut driver = display.driver();
        driver.start().unwrap();
        assert!(display.advance().is_some());
        driver.stop().unwrap();
        assert!(!display.is_running());
        assert!(display.advance().is_none());
    }

    #[test]
    fn disconnected_display_refuses_to_start() {
        let display = SimulatedDisplay::sixty_hz(DisplayId(1));
        display.disconnect();
        let mut driver = display.driver();
        assert_eq!(driver.start(), Err(DisplayError::Disconnected(DisplayId(1))));

        display.reconnect();
        assert_eq!(driver.start(), Ok(()));
    }

    #[test]
    fn driver_clock_follows_display() {
        let display = SimulatedDisplay::new(DisplayId(0), Duration(1_000));
        let driver = display.driver();
        display.advance_by(Duration(250));
        assert_eq!(driver.now(), HostTime(250));
        assert_eq!(driver.timebase(), Timebase::NANOS);
    }

    #[test]
    fn error_message_names_display() {
        let msg = alloc::format!("{}", DisplayError::Disconnected(DisplayId(3)));
        assert_eq!(msg, "display 3 is disconnected");
    }
}

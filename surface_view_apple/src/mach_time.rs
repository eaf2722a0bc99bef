// Copyright 2026 the Surface View Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Mach absolute time, the host clock behind `CADisplayLink` timestamps.

use surface_view_core::time::{Duration, HostTime, Timebase};

#[repr(C)]
struct MachTimebaseInfo {
    numer: u32,
    denom: u32,
}

// SAFETY: stable Darwin kernel ABI.
unsafe extern "C" {
    fn mach_absolute_time() -> u64;
    fn mach_timebase_info(info: *mut MachTimebaseInfo) -> i32;
}

/// Returns the tick-to-nanosecond ratio of the Mach clock.
pub(crate) fn timebase() -> Timebase {
    let mut info = MachTimebaseInfo { numer: 1, denom: 1 };
    // SAFETY: `info` is a valid, writable local.
    let status = unsafe { mach_timebase_info(&mut info) };
    if status != 0 || info.numer == 0 || info.denom == 0 {
        return Timebase::NANOS;
    }
    Timebase::new(info.numer, info.denom)
}

/// Returns the current Mach absolute time.
pub(crate) fn now() -> HostTime {
    // SAFETY: no preconditions.
    HostTime(unsafe { mach_absolute_time() })
}

/// Converts a `CFTimeInterval` (seconds on the Mach clock, as reported by
/// `CADisplayLink`) to Mach ticks.
///
/// Negative and non-finite inputs map to zero.
pub(crate) fn seconds_to_ticks(seconds: f64, tb: Timebase) -> u64 {
    if !seconds.is_finite() || seconds <= 0.0 {
        return 0;
    }
    let ticks = seconds * 1e9 * f64::from(tb.denom) / f64::from(tb.numer);
    #[expect(
        clippy::cast_possible_truncation,
        reason = "positive and far below u64::MAX for any realistic uptime"
    )]
    {
        ticks as u64
    }
}

/// [`seconds_to_ticks`] as a [`HostTime`].
pub(crate) fn host_time(seconds: f64, tb: Timebase) -> HostTime {
    HostTime(seconds_to_ticks(seconds, tb))
}

/// [`seconds_to_ticks`] as a [`Duration`].
pub(crate) fn duration(seconds: f64, tb: Timebase) -> Duration {
    Duration(seconds_to_ticks(seconds, tb))
}

// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

/// Length of the update rate window in milliseconds.
pub const RATE_WINDOW_MS: u64 = 1000;

/// Remembers the last published value of a channel.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Latest<T> {
    last: Option<T>,
}

impl<T: PartialEq + Copy> Latest<T> {
    /// Records `value` and returns true when it differs from the previously
    /// published value.  The first value always counts as a change.
    pub fn changed(&mut self, value: T) -> bool {
        if self.last == Some(value) {
            return false;
        }
        self.last = Some(value);
        true
    }

    /// Last published value.
    pub fn get(&self) -> Option<T> {
        self.last
    }
}

/// Last published values for an exclusion zone's change detected channels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ZoneLatest {
    /// Target count
    pub count: Latest<u8>,
    /// Presence flag
    pub present: Latest<bool>,
}

/// Timing, statistics and change detection state for published updates.
#[derive(Debug, Clone, Default)]
pub struct UpdateGate {
    last_update: u64,
    update_counter: u32,
    last_rate_calc: u64,
    packet_errors: u32,
    ready: bool,

    /// Aggregate target count
    pub target_count: Latest<u8>,
    /// Aggregate presence
    pub target_present: Latest<bool>,
    /// Inclusion zone counts, presence is republished with every count
    pub zones: Vec<Latest<u8>>,
    /// Exclusion zones
    pub exclusion_zones: Vec<ZoneLatest>,
}

impl UpdateGate {
    /// Creates a gate which has not accepted any update yet.
    pub fn new() -> UpdateGate {
        UpdateGate::default()
    }

    /// Accepts the update when strictly more than `interval_ms` elapsed since
    /// the previously accepted one.
    pub fn accept(&mut self, now_ms: u64, interval_ms: u64) -> bool {
        if now_ms.saturating_sub(self.last_update) <= interval_ms {
            return false;
        }
        self.last_update = now_ms;
        true
    }

    /// Counts an accepted update and returns the update rate once per rate
    /// window.
    pub fn tick(&mut self, now_ms: u64) -> Option<f32> {
        self.update_counter += 1;

        let elapsed = now_ms.saturating_sub(self.last_rate_calc);
        if elapsed < RATE_WINDOW_MS {
            return None;
        }

        let rate = self.update_counter as f32 * 1000.0 / elapsed as f32;
        self.update_counter = 0;
        self.last_rate_calc = now_ms;
        Some(rate)
    }

    /// Counts an undersized frame and returns the new total.
    pub fn packet_error(&mut self) -> u32 {
        self.packet_errors += 1;
        self.packet_errors
    }

    /// Undersized frames seen so far.
    pub fn packet_errors(&self) -> u32 {
        self.packet_errors
    }

    /// Latches the ready state, returns true only the first time.
    pub fn mark_ready(&mut self) -> bool {
        !std::mem::replace(&mut self.ready, true)
    }

    /// Whether a frame has been fully processed.
    pub fn is_ready(&self) -> bool {
        self.ready
    }

    /// Sizes the per-zone caches to the configured zone counts.  Caches of
    /// removed zones are dropped and new zones start unpublished.
    pub fn resize(&mut self, zones: usize, exclusion_zones: usize) {
        self.zones.resize(zones, Latest::default());
        self.exclusion_zones
            .resize(exclusion_zones, ZoneLatest::default());
    }
}

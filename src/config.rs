// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

use crate::zone::Zone;

/// Default number of inclusion zones.
pub const DEFAULT_ZONES: usize = 3;
/// Default number of exclusion zones.
pub const DEFAULT_EXCLUSION_ZONES: usize = 1;

/// A zone together with its enable switch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ZoneSlot {
    /// Zone takes part in classification
    pub enabled: bool,
    /// Zone rectangle
    pub zone: Zone,
}

impl ZoneSlot {
    /// An enabled slot for the given zone.
    pub fn new(zone: Zone) -> ZoneSlot {
        ZoneSlot {
            enabled: true,
            zone,
        }
    }

    /// Enabled and configured, the zone rectangle itself may still be
    /// invalid in which case it never contains anything.
    pub fn is_active(&self) -> bool {
        self.enabled && self.zone.is_configured()
    }
}

impl Default for ZoneSlot {
    fn default() -> Self {
        ZoneSlot::new(Zone::default())
    }
}

/// Settings read by the pipeline on every frame.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    /// Minimum time between accepted frames in milliseconds
    pub update_interval_ms: u64,

    /// Position change threshold in millimeters.  Accepted for compatibility
    /// with existing device configurations, it does not affect classification.
    pub position_threshold: f32,

    /// Speed threshold in m/s separating static from moving targets
    pub speed_threshold: f32,

    /// Lateral threshold in millimeters separating left/right from center
    pub direction_threshold: i16,

    /// Rotation applied to every zone, in degrees
    pub rotation_angle: f32,

    /// Inclusion zone counting switch
    pub zones_enabled: bool,

    /// Per-target publishing switch
    pub targets_enabled: bool,

    /// Dump targets and zones to the debug log on every frame
    pub debug: bool,

    /// Inclusion zones
    pub zones: Vec<ZoneSlot>,

    /// Exclusion zones
    pub exclusion_zones: Vec<ZoneSlot>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        PipelineConfig {
            update_interval_ms: 100,
            position_threshold: 0.0,
            speed_threshold: 0.05,
            direction_threshold: 100,
            rotation_angle: 0.0,
            zones_enabled: true,
            targets_enabled: true,
            debug: false,
            zones: vec![ZoneSlot::default(); DEFAULT_ZONES],
            exclusion_zones: vec![ZoneSlot::default(); DEFAULT_EXCLUSION_ZONES],
        }
    }
}

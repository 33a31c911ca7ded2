// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

use crate::{
    config::{PipelineConfig, ZoneSlot},
    frame::{TargetRecord, NUM_TARGETS},
    target::Target,
};
use tracing::instrument;

/// Per-zone target tally for one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ZoneTally {
    /// Targets inside the zone
    pub target_count: u8,
    /// Tested targets outside the zone
    pub outside_count: u8,
}

impl ZoneTally {
    /// At least one target inside.
    pub fn has_target(&self) -> bool {
        self.target_count > 0
    }

    /// At least one tested target outside.
    pub fn has_target_outside(&self) -> bool {
        self.outside_count > 0
    }
}

/// Result of classifying one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    /// Targets in slot order with derived attributes
    pub targets: [Target; NUM_TARGETS],
    /// Tallies for the inclusion zones, in configuration order
    pub zones: Vec<ZoneTally>,
    /// Tallies for the exclusion zones, in configuration order
    pub exclusion_zones: Vec<ZoneTally>,
    /// Valid targets not vetoed by any exclusion zone
    pub target_count: u8,
}

impl Classification {
    /// Any counted target present.
    pub fn has_target(&self) -> bool {
        self.target_count > 0
    }

    /// Number of valid slots, excluded or not.
    pub fn valid_targets(&self) -> usize {
        self.targets.iter().filter(|t| t.valid).count()
    }
}

/// Tests each target accepted by `filter` against the zone, tallying inside
/// and outside hits.  Inactive slots keep an empty tally.
fn tally<F>(
    slot: &ZoneSlot,
    targets: &[Target],
    angle: f32,
    filter: F,
) -> (ZoneTally, [bool; NUM_TARGETS])
where
    F: Fn(&Target) -> bool,
{
    let mut tally = ZoneTally::default();
    let mut inside = [false; NUM_TARGETS];

    if !slot.is_active() {
        return (tally, inside);
    }

    for (i, target) in targets.iter().enumerate().filter(|(_, t)| filter(*t)) {
        if slot.zone.contains(target.point(), angle) {
            tally.target_count += 1;
            inside[i] = true;
        } else {
            tally.outside_count += 1;
        }
    }

    (tally, inside)
}

/// Classifies decoded target slots against the configured zones.
///
/// Exclusion zones are evaluated first, each independently, and veto the
/// targets they contain from the aggregate count and from every inclusion
/// zone.  Derived attributes are computed for every valid target, excluded
/// or not.
#[instrument(skip_all, level = "trace")]
pub fn classify(
    records: &[TargetRecord; NUM_TARGETS],
    config: &PipelineConfig,
) -> Classification {
    let mut targets = (*records).map(Target::from);
    let angle = config.rotation_angle;

    let exclusion_zones = config
        .exclusion_zones
        .iter()
        .map(|slot| {
            let (tally, inside) = tally(slot, &targets, angle, |t| t.valid);
            for (target, inside) in targets.iter_mut().zip(inside) {
                target.excluded |= inside;
            }
            tally
        })
        .collect();

    let target_count = targets.iter().filter(|t| t.is_counted()).count() as u8;

    let zones = config
        .zones
        .iter()
        .map(|slot| match config.zones_enabled {
            true => tally(slot, &targets, angle, Target::is_counted).0,
            false => ZoneTally::default(),
        })
        .collect();

    for target in targets.iter_mut().filter(|t| t.valid) {
        target.update_attributes(config.speed_threshold, config.direction_threshold);
    }

    Classification {
        targets,
        zones,
        exclusion_zones,
        target_count,
    }
}

// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

use clap::Parser;
use ld2450::{
    config::{PipelineConfig, ZoneSlot, DEFAULT_EXCLUSION_ZONES, DEFAULT_ZONES},
    zone::Zone,
};
use serde_json::json;
use tracing::level_filters::LevelFilter;
use zenoh::config::{Config, WhatAmI};

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// uart device connected to the radar
    #[arg(long, env, default_value = "/dev/ttyS1")]
    pub device: String,

    /// Minimum time between processed frames in milliseconds.
    #[arg(long, env, default_value = "100")]
    pub update_interval: u64,

    /// Position change threshold in millimeters.  Accepted for compatibility
    /// with existing configurations, it does not affect zone detection.
    #[arg(long, env, default_value = "0")]
    pub position_threshold: f32,

    /// Speed in m/s above which a target is reported as moving.
    #[arg(long, env, default_value = "0.05")]
    pub speed_threshold: f32,

    /// Lateral offset in millimeters beyond which a target is reported as
    /// left or right of center.
    #[arg(long, env, default_value = "100")]
    pub direction_threshold: i16,

    /// Rotation applied to all zones in degrees.
    #[arg(long, env, default_value = "0", allow_negative_numbers = true)]
    pub rotation_angle: f32,

    /// Inclusion zone as X Y WIDTH HEIGHT in millimeters, repeat for each
    /// zone.
    #[arg(
        long = "zone",
        num_args = 4,
        value_names = ["X", "Y", "WIDTH", "HEIGHT"],
        allow_negative_numbers = true
    )]
    pub zones: Vec<i16>,

    /// Minimum number of inclusion zones, unspecified zones are published
    /// as unconfigured.
    #[arg(long, env, default_value_t = DEFAULT_ZONES)]
    pub zone_count: usize,

    /// Exclusion zone as X Y WIDTH HEIGHT in millimeters, repeat for each
    /// zone.
    #[arg(
        long = "exclusion",
        num_args = 4,
        value_names = ["X", "Y", "WIDTH", "HEIGHT"],
        allow_negative_numbers = true
    )]
    pub exclusions: Vec<i16>,

    /// Minimum number of exclusion zones.
    #[arg(long, env, default_value_t = DEFAULT_EXCLUSION_ZONES)]
    pub exclusion_count: usize,

    /// Disable all exclusion zones.
    #[arg(long, env)]
    pub no_exclusions: bool,

    /// Disable inclusion zone counting.
    #[arg(long, env)]
    pub no_zones: bool,

    /// Disable per-target publishing.
    #[arg(long, env)]
    pub no_targets: bool,

    /// Log every valid target and configured zone at debug level.
    #[arg(long, env)]
    pub debug_zones: bool,

    /// key expression prefix for published state
    #[arg(long, env, default_value = "rt/ld2450")]
    pub topic: String,

    /// Application log level
    #[arg(long, env, default_value = "info")]
    pub rust_log: LevelFilter,

    /// Enable Tracy profiler broadcast
    #[arg(long, env)]
    pub tracy: bool,

    /// zenoh connection mode
    #[arg(long, env, default_value = "peer")]
    mode: WhatAmI,

    /// connect to zenoh endpoints
    #[arg(long, env)]
    connect: Vec<String>,

    /// listen to zenoh endpoints
    #[arg(long, env)]
    listen: Vec<String>,

    /// disable zenoh multicast scouting
    #[arg(long, env)]
    no_multicast_scouting: bool,
}

impl Args {
    /// Builds the pipeline configuration from the command line.
    pub fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig {
            update_interval_ms: self.update_interval,
            position_threshold: self.position_threshold,
            speed_threshold: self.speed_threshold,
            direction_threshold: self.direction_threshold,
            rotation_angle: self.rotation_angle,
            zones_enabled: !self.no_zones,
            targets_enabled: !self.no_targets,
            debug: self.debug_zones,
            zones: zone_slots(&self.zones, self.zone_count, true),
            exclusion_zones: zone_slots(&self.exclusions, self.exclusion_count, !self.no_exclusions),
        }
    }
}

fn zone_slots(values: &[i16], count: usize, enabled: bool) -> Vec<ZoneSlot> {
    let mut slots: Vec<_> = values
        .chunks_exact(4)
        .map(|v| ZoneSlot {
            enabled,
            zone: Zone::new(v[0], v[1], v[2], v[3]),
        })
        .collect();

    if slots.len() < count {
        slots.resize(
            count,
            ZoneSlot {
                enabled,
                zone: Zone::default(),
            },
        );
    }

    slots
}

impl From<Args> for Config {
    fn from(args: Args) -> Self {
        let mut config = Config::default();

        config
            .insert_json5("mode", &json!(args.mode).to_string())
            .unwrap();

        if !args.connect.is_empty() {
            config
                .insert_json5("connect/endpoints", &json!(args.connect).to_string())
                .unwrap();
        }

        if !args.listen.is_empty() {
            config
                .insert_json5("listen/endpoints", &json!(args.listen).to_string())
                .unwrap();
        }

        if args.no_multicast_scouting {
            config
                .insert_json5("scouting/multicast/enabled", &json!(false).to_string())
                .unwrap();
        }

        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = Args::try_parse_from(["ld2450pub"]).unwrap();
        let config = args.pipeline_config();
        assert_eq!(config, PipelineConfig::default());
    }

    #[test]
    fn test_zones() {
        let args = Args::try_parse_from([
            "ld2450pub",
            "--zone",
            "1000",
            "0",
            "2000",
            "3000",
            "--zone",
            "-200",
            "500",
            "800",
            "800",
            "--exclusion",
            "-1500",
            "0",
            "500",
            "4000",
            "--rotation-angle",
            "-15",
            "--no-exclusions",
        ])
        .unwrap();
        let config = args.pipeline_config();

        assert_eq!(config.zones.len(), 3);
        assert_eq!(config.zones[0].zone, Zone::new(1000, 0, 2000, 3000));
        assert_eq!(config.zones[1].zone, Zone::new(-200, 500, 800, 800));
        assert!(!config.zones[2].zone.is_configured());
        assert_eq!(config.exclusion_zones.len(), 1);
        assert_eq!(config.exclusion_zones[0].zone, Zone::new(-1500, 0, 500, 4000));
        assert!(!config.exclusion_zones[0].enabled);
        assert_eq!(config.rotation_angle, -15.0);
    }
}

// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

use crate::{
    classify::{classify, Classification},
    config::PipelineConfig,
    frame::FrameAssembler,
    gate::UpdateGate,
    publish::{Channel, StatePublisher, STATUS_PACKET_ERROR, STATUS_READY},
    target::Target,
};
use tracing::{debug, info, instrument, warn};

/// Chunks shorter than this are treated as corrupt reports.
pub const MIN_PACKET_SIZE: usize = 30;

/// What a single call to [`Pipeline::process`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// No complete frame buffered yet
    Pending,
    /// A frame was consumed but arrived within the update interval
    Dropped,
    /// A frame was consumed from an undersized chunk and counted as an error
    PacketError,
    /// A frame was classified and published
    Processed {
        /// Valid target slots in the frame
        targets: usize,
    },
}

/// All state carried between invocations.
#[derive(Debug, Default)]
pub struct PipelineState {
    /// Incoming byte buffer
    pub assembler: FrameAssembler,
    /// Timers, statistics and last published values
    pub gate: UpdateGate,
}

/// Decodes LD2450 frames, classifies targets against the configured zones
/// and publishes state changes.
///
/// The pipeline performs no I/O and never blocks, callers serialize access
/// and feed it bytes as they arrive together with a monotonic timestamp.
pub struct Pipeline<P: StatePublisher> {
    config: PipelineConfig,
    state: PipelineState,
    publisher: P,
}

impl<P: StatePublisher> Pipeline<P> {
    /// Creates a pipeline publishing through `publisher`.
    pub fn new(config: PipelineConfig, publisher: P) -> Pipeline<P> {
        Pipeline::with_state(config, PipelineState::default(), publisher)
    }

    /// Creates a pipeline resuming from existing state.
    pub fn with_state(config: PipelineConfig, state: PipelineState, publisher: P) -> Pipeline<P> {
        Pipeline {
            config,
            state,
            publisher,
        }
    }

    /// Current configuration.
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Mutable access to the configuration, changes apply from the next
    /// frame on.
    pub fn config_mut(&mut self) -> &mut PipelineConfig {
        &mut self.config
    }

    /// Replaces the configuration.
    pub fn set_config(&mut self, config: PipelineConfig) {
        self.config = config;
    }

    /// Carried state.
    pub fn state(&self) -> &PipelineState {
        &self.state
    }

    /// The publisher sink.
    pub fn publisher(&self) -> &P {
        &self.publisher
    }

    /// Mutable access to the publisher sink.
    pub fn publisher_mut(&mut self) -> &mut P {
        &mut self.publisher
    }

    /// Consumes the pipeline returning the publisher.
    pub fn into_publisher(self) -> P {
        self.publisher
    }

    /// Publishes the configuration status of every zone.  Hosts call this
    /// at startup and whenever a zone setting changes.
    pub fn publish_zone_status(&mut self) {
        for (i, slot) in self.config.zones.iter().enumerate() {
            let status = slot.zone.status().to_string();
            self.publisher.publish_text(Channel::ZoneStatus(i), &status);
        }

        for i in 0..self.config.exclusion_zones.len() {
            let status = format!("Exclusion Zone {}", i + 1);
            self.publisher.publish_text(Channel::ExclusionStatus(i), &status);
        }
    }

    /// Feeds one chunk of sensor bytes received at `now_ms`.
    ///
    /// At most one frame is processed per call, any further buffered frames
    /// are processed by subsequent calls.
    #[instrument(skip_all, level = "trace")]
    pub fn process(&mut self, bytes: &[u8], now_ms: u64) -> Outcome {
        let frame = match self.state.assembler.feed(bytes) {
            Some(frame) => frame,
            None => return Outcome::Pending,
        };

        let gate = &mut self.state.gate;
        if !gate.accept(now_ms, self.config.update_interval_ms) {
            return Outcome::Dropped;
        }

        if let Some(rate) = gate.tick(now_ms) {
            self.publisher.publish_numeric(Channel::UpdateRate, rate);
        }

        if bytes.len() < MIN_PACKET_SIZE {
            let errors = gate.packet_error();
            self.publisher.publish_numeric(Channel::PacketErrors, errors as f32);
            self.publisher.publish_text(Channel::Status, STATUS_PACKET_ERROR);
            warn!("invalid packet size: {}", bytes.len());
            return Outcome::PacketError;
        }

        let result = classify(&frame.targets(), &self.config);

        if self.config.targets_enabled {
            self.publish_targets(&result.targets);
        }

        for (i, target) in result.targets.iter().enumerate() {
            debug!(
                "T{}: valid={} x={} y={} speed={}",
                i + 1,
                target.valid,
                target.x,
                target.y,
                target.speed
            );
        }

        self.publish_counts(&result);

        if self.state.gate.mark_ready() {
            self.publisher.publish_text(Channel::Status, STATUS_READY);
            info!("radar initialized and publishing");
        }

        if self.config.debug {
            self.debug_dump(&result);
        }

        Outcome::Processed {
            targets: result.valid_targets(),
        }
    }

    /// Per-target channels are published every frame.  Invalid slots have
    /// their numeric channels zeroed.
    fn publish_targets(&mut self, targets: &[Target]) {
        let publisher = &mut self.publisher;
        for (i, target) in targets.iter().enumerate() {
            if target.valid {
                publisher.publish_numeric(Channel::TargetX(i), target.x as f32);
                publisher.publish_numeric(Channel::TargetY(i), target.y as f32);
                publisher.publish_numeric(Channel::TargetSpeed(i), target.speed_ms());
                publisher.publish_numeric(Channel::TargetResolution(i), target.resolution as f32);
                publisher.publish_numeric(Channel::TargetAngle(i), target.angle);
                publisher.publish_text(Channel::TargetMovement(i), &target.movement.to_string());
                publisher.publish_text(Channel::TargetDirection(i), &target.direction.to_string());
            } else {
                publisher.publish_numeric(Channel::TargetX(i), 0.0);
                publisher.publish_numeric(Channel::TargetY(i), 0.0);
                publisher.publish_numeric(Channel::TargetSpeed(i), 0.0);
                publisher.publish_numeric(Channel::TargetAngle(i), 0.0);
            }
        }
    }

    /// Aggregate and per-zone channels are only published on change.
    fn publish_counts(&mut self, result: &Classification) {
        let gate = &mut self.state.gate;
        let publisher = &mut self.publisher;
        gate.resize(result.zones.len(), result.exclusion_zones.len());

        let count_changed = gate.target_count.changed(result.target_count);
        let present_changed = gate.target_present.changed(result.has_target());
        if count_changed {
            publisher.publish_numeric(Channel::TargetCount, result.target_count as f32);
        }
        if count_changed || present_changed {
            publisher.publish_bool(Channel::TargetPresent, result.has_target());
        }

        for (i, (tally, latest)) in result.zones.iter().zip(gate.zones.iter_mut()).enumerate() {
            if latest.changed(tally.target_count) {
                publisher.publish_numeric(Channel::ZoneCount(i), tally.target_count as f32);
                publisher.publish_bool(Channel::ZonePresent(i), tally.has_target());
            }
        }

        let exclusions = result
            .exclusion_zones
            .iter()
            .zip(gate.exclusion_zones.iter_mut());
        for (i, (tally, latest)) in exclusions.enumerate() {
            if latest.count.changed(tally.target_count) {
                publisher.publish_numeric(Channel::ExclusionCount(i), tally.target_count as f32);
            }
            if latest.present.changed(tally.has_target()) {
                publisher.publish_bool(Channel::ExclusionPresent(i), tally.has_target());
            }
        }
    }

    fn debug_dump(&self, result: &Classification) {
        for (i, target) in result.targets.iter().enumerate().filter(|(_, t)| t.valid) {
            debug!(
                "Target {}: x={}, y={}, speed={}, angle={:.1}°, pos={}, dir={}, valid={}",
                i + 1,
                target.x,
                target.y,
                target.speed,
                target.angle,
                target.movement,
                target.direction,
                target.valid
            );
        }

        let zones = self.config.zones.iter().zip(&result.zones).enumerate();
        for (i, (slot, tally)) in zones.filter(|(_, (slot, _))| slot.zone.is_configured()) {
            debug!(
                "Zone {}: x={}, y={}, w={}, h={}, targets={}, valid={}",
                i + 1,
                slot.zone.x,
                slot.zone.y,
                slot.zone.width,
                slot.zone.height,
                tally.target_count,
                slot.zone.is_valid()
            );
        }
    }
}

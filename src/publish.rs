// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

use std::fmt;

/// Status text published when an undersized frame is received.
pub const STATUS_PACKET_ERROR: &str = "Packet Error";
/// Status text published once the first frame has been classified.
pub const STATUS_READY: &str = "Ready";

/// Externally observable state channels.  Indices are zero based and refer
/// to target slots or zones in configuration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    /// Radar status text
    Status,
    /// Accepted frames per second
    UpdateRate,
    /// Undersized frames received since start
    PacketErrors,
    /// Targets outside every exclusion zone
    TargetCount,
    /// Any target outside every exclusion zone
    TargetPresent,
    /// Target X in millimeters
    TargetX(usize),
    /// Target Y in millimeters
    TargetY(usize),
    /// Target speed in m/s
    TargetSpeed(usize),
    /// Target distance resolution
    TargetResolution(usize),
    /// Target bearing in degrees
    TargetAngle(usize),
    /// Target movement state text
    TargetMovement(usize),
    /// Target direction text
    TargetDirection(usize),
    /// Targets inside an inclusion zone
    ZoneCount(usize),
    /// Presence inside an inclusion zone
    ZonePresent(usize),
    /// Inclusion zone configuration status text
    ZoneStatus(usize),
    /// Targets inside an exclusion zone
    ExclusionCount(usize),
    /// Presence inside an exclusion zone
    ExclusionPresent(usize),
    /// Exclusion zone description text
    ExclusionStatus(usize),
}

impl Channel {
    /// Key expression suffix for the channel, with one based indices.
    pub fn key(&self) -> String {
        match self {
            Channel::Status => "status".to_string(),
            Channel::UpdateRate => "update_rate".to_string(),
            Channel::PacketErrors => "packet_errors".to_string(),
            Channel::TargetCount => "targets/count".to_string(),
            Channel::TargetPresent => "targets/present".to_string(),
            Channel::TargetX(i) => format!("targets/{}/x", i + 1),
            Channel::TargetY(i) => format!("targets/{}/y", i + 1),
            Channel::TargetSpeed(i) => format!("targets/{}/speed", i + 1),
            Channel::TargetResolution(i) => format!("targets/{}/resolution", i + 1),
            Channel::TargetAngle(i) => format!("targets/{}/angle", i + 1),
            Channel::TargetMovement(i) => format!("targets/{}/movement", i + 1),
            Channel::TargetDirection(i) => format!("targets/{}/direction", i + 1),
            Channel::ZoneCount(i) => format!("zones/{}/count", i + 1),
            Channel::ZonePresent(i) => format!("zones/{}/present", i + 1),
            Channel::ZoneStatus(i) => format!("zones/{}/status", i + 1),
            Channel::ExclusionCount(i) => format!("exclusions/{}/count", i + 1),
            Channel::ExclusionPresent(i) => format!("exclusions/{}/present", i + 1),
            Channel::ExclusionStatus(i) => format!("exclusions/{}/status", i + 1),
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}

/// Value carried by a state update.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Numeric sensor value
    Numeric(f32),
    /// Text sensor value
    Text(String),
    /// Binary sensor value
    Bool(bool),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Value::Numeric(value) => write!(f, "{}", value),
            Value::Text(value) => write!(f, "{}", value),
            Value::Bool(value) => write!(f, "{}", value),
        }
    }
}

/// A single published state change.
#[derive(Debug, Clone, PartialEq)]
pub struct Update {
    /// Channel being updated
    pub channel: Channel,
    /// New value
    pub value: Value,
}

/// Sink for state updates.  The pipeline decides when values are published,
/// implementations only decide how they are surfaced.
pub trait StatePublisher {
    /// Publishes a numeric value.
    fn publish_numeric(&mut self, channel: Channel, value: f32);

    /// Publishes a text value.
    fn publish_text(&mut self, channel: Channel, value: &str);

    /// Publishes a binary value.
    fn publish_bool(&mut self, channel: Channel, value: bool);
}

/// Collects updates in memory, used for batching and tests.
impl StatePublisher for Vec<Update> {
    fn publish_numeric(&mut self, channel: Channel, value: f32) {
        self.push(Update {
            channel,
            value: Value::Numeric(value),
        });
    }

    fn publish_text(&mut self, channel: Channel, value: &str) {
        self.push(Update {
            channel,
            value: Value::Text(value.to_string()),
        });
    }

    fn publish_bool(&mut self, channel: Channel, value: bool) {
        self.push(Update {
            channel,
            value: Value::Bool(value),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keys() {
        assert_eq!(Channel::Status.key(), "status");
        assert_eq!(Channel::TargetX(0).key(), "targets/1/x");
        assert_eq!(Channel::ZonePresent(2).to_string(), "zones/3/present");
        assert_eq!(Channel::ExclusionCount(0).key(), "exclusions/1/count");
    }

    #[test]
    fn test_vec_publisher() {
        let mut updates = Vec::new();
        updates.publish_numeric(Channel::UpdateRate, 9.5);
        updates.publish_text(Channel::Status, STATUS_READY);
        updates.publish_bool(Channel::TargetPresent, true);

        assert_eq!(updates.len(), 3);
        assert_eq!(updates[0].value, Value::Numeric(9.5));
        assert_eq!(updates[1].value.to_string(), "Ready");
        assert_eq!(updates[2].channel, Channel::TargetPresent);
    }
}

// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

use std::fmt;
use tracing::trace;

/// Fixed size of an LD2450 report frame in bytes.
pub const FRAME_SIZE: usize = 48;

/// Number of target slots carried by every frame.
pub const NUM_TARGETS: usize = 3;

/// Offset of the first target block, past the frame header.
pub const TARGET_OFFSET: usize = 4;

/// Size of a single target block.
pub const TARGET_BLOCK_SIZE: usize = 8;

/// Frame decoding errors.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// Slice length does not match the fixed frame size
    InvalidLength(usize),
}

impl std::error::Error for Error {}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> std::fmt::Result {
        match self {
            Error::InvalidLength(len) => {
                write!(f, "invalid frame length: {} (expected {})", len, FRAME_SIZE)
            }
        }
    }
}

/// One complete report frame as delivered by the sensor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frame {
    /// Raw frame bytes including header and trailer
    pub data: [u8; FRAME_SIZE],
}

impl Frame {
    /// Copies a frame out of a slice which must be exactly [`FRAME_SIZE`]
    /// bytes long.
    pub fn from_slice(slice: &[u8]) -> Result<Frame, Error> {
        let data = slice
            .try_into()
            .map_err(|_| Error::InvalidLength(slice.len()))?;
        Ok(Frame { data })
    }

    /// Decodes all target slots of the frame.
    pub fn targets(&self) -> [TargetRecord; NUM_TARGETS] {
        decode(self)
    }
}

/// Raw target slot decoded from a frame, before classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TargetRecord {
    /// Horizontal offset in millimeters, positive to the right
    pub x: i16,
    /// Forward distance in millimeters
    pub y: i16,
    /// Radial speed in cm/s, positive when moving away
    pub speed: i16,
    /// Distance resolution code, never sign adjusted
    pub resolution: u16,
}

impl TargetRecord {
    /// The sensor reports empty slots as all zero, so a slot is occupied when
    /// it has any lateral offset or lies in front of the sensor.
    pub fn is_valid(&self) -> bool {
        self.x != 0 || self.y > 0
    }
}

/// Decodes the sensor's sign-magnitude style 16-bit field.
///
/// When the high bit is set the value is the non-negative magnitude
/// `raw - 32768`, otherwise the value is `-raw`.
pub fn decode_signed16(low: u8, high: u8) -> i16 {
    let raw = u16::from_le_bytes([low, high]);
    if high & 0x80 != 0 {
        (raw - 0x8000) as i16
    } else {
        -(raw as i16)
    }
}

/// Inverse of [`decode_signed16`], used to build frames for replay and tests.
/// Zero always encodes with the high bit set.
pub fn encode_signed16(value: i16) -> [u8; 2] {
    let raw = if value >= 0 {
        value as u16 | 0x8000
    } else {
        value.unsigned_abs()
    };
    raw.to_le_bytes()
}

fn read_block(block: &[u8]) -> TargetRecord {
    // The sensor X axis is mirrored relative to the published convention.
    let x = -decode_signed16(block[0], block[1]);
    let y = decode_signed16(block[2], block[3]);
    let speed = decode_signed16(block[4], block[5]);
    let resolution = u16::from_le_bytes([block[6], block[7]]);

    TargetRecord {
        x,
        y,
        speed,
        resolution,
    }
}

/// Decodes every target block of a frame.  Decoding cannot fail, corrupt
/// bytes simply produce implausible coordinates.
pub fn decode(frame: &Frame) -> [TargetRecord; NUM_TARGETS] {
    let mut targets = [TargetRecord::default(); NUM_TARGETS];
    for (i, target) in targets.iter_mut().enumerate() {
        let begin = TARGET_OFFSET + i * TARGET_BLOCK_SIZE;
        *target = read_block(&frame.data[begin..begin + TARGET_BLOCK_SIZE]);
    }
    trace!("decoded targets: {:?}", targets);
    targets
}

/// Accumulates UART bytes and hands out one complete frame per call.
#[derive(Debug, Default)]
pub struct FrameAssembler {
    buffer: Vec<u8>,
}

impl FrameAssembler {
    /// Creates an empty assembler.
    pub fn new() -> FrameAssembler {
        FrameAssembler::default()
    }

    /// Appends `bytes` and returns the oldest complete frame if one is
    /// buffered.  Only a single frame is extracted per call, any remainder
    /// stays buffered for the next call.
    pub fn feed(&mut self, bytes: &[u8]) -> Option<Frame> {
        self.buffer.extend_from_slice(bytes);
        if self.buffer.len() < FRAME_SIZE {
            return None;
        }

        let mut data = [0u8; FRAME_SIZE];
        data.copy_from_slice(&self.buffer[..FRAME_SIZE]);
        self.buffer.drain(..FRAME_SIZE);

        Some(Frame { data })
    }

    /// Number of bytes waiting for the next frame.
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Returns true when nothing is buffered.
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Builds a frame with the given (x, y, speed, resolution) per slot, in
    /// published coordinates.
    pub(crate) fn build_frame(targets: &[(i16, i16, i16, u16)]) -> [u8; FRAME_SIZE] {
        let mut data = [0u8; FRAME_SIZE];
        data[..4].copy_from_slice(&[0xAA, 0xFF, 0x03, 0x00]);
        data[FRAME_SIZE - 2..].copy_from_slice(&[0x55, 0xCC]);
        for (i, (x, y, speed, resolution)) in targets.iter().enumerate() {
            let begin = TARGET_OFFSET + i * TARGET_BLOCK_SIZE;
            data[begin..begin + 2].copy_from_slice(&encode_signed16(-x));
            data[begin + 2..begin + 4].copy_from_slice(&encode_signed16(*y));
            data[begin + 4..begin + 6].copy_from_slice(&encode_signed16(*speed));
            data[begin + 6..begin + 8].copy_from_slice(&resolution.to_le_bytes());
        }
        data
    }

    #[test]
    fn test_sign_rule() {
        // High bit set: magnitude above 0x8000 is non-negative.
        assert_eq!(decode_signed16(0x0E, 0x83), 782);
        assert_eq!(decode_signed16(0x00, 0x80), 0);
        assert_eq!(decode_signed16(0xFF, 0xFF), 32767);
        // High bit clear: value is negated.
        assert_eq!(decode_signed16(0x0E, 0x03), -782);
        assert_eq!(decode_signed16(0x00, 0x00), 0);
        assert_eq!(decode_signed16(0xFF, 0x7F), -32767);
    }

    #[test]
    fn test_sign_rule_inverse() {
        // Raw zero and 0x8000 both decode to zero, only 0x8000 re-encodes.
        for raw in 1..=u16::MAX {
            let [low, high] = raw.to_le_bytes();
            let value = decode_signed16(low, high);
            assert_eq!(u16::from_le_bytes(encode_signed16(value)), raw);
        }
    }

    #[test]
    fn test_axis_correction() {
        // Example report from the LD2450 datasheet.
        let mut data = [0u8; FRAME_SIZE];
        data[4..12].copy_from_slice(&[0x0E, 0x03, 0xB1, 0x86, 0x10, 0x00, 0x40, 0x01]);
        let frame = Frame::from_slice(&data).unwrap();
        let targets = frame.targets();

        assert_eq!(
            targets[0],
            TargetRecord {
                x: 782,
                y: 1713,
                speed: -16,
                resolution: 320,
            }
        );
        assert!(targets[0].is_valid());
        assert!(!targets[1].is_valid());
        assert!(!targets[2].is_valid());
    }

    #[test]
    fn test_resolution_unsigned() {
        let mut data = [0u8; FRAME_SIZE];
        data[10..12].copy_from_slice(&[0x00, 0x90]);
        let targets = Frame::from_slice(&data).unwrap().targets();
        assert_eq!(targets[0].resolution, 0x9000);
    }

    #[test]
    fn test_validity() {
        let record = |x, y| TargetRecord {
            x,
            y,
            speed: 0,
            resolution: 0,
        };
        assert!(!record(0, 0).is_valid());
        assert!(!record(0, -10).is_valid());
        assert!(record(0, 10).is_valid());
        assert!(record(-5, -10).is_valid());
    }

    #[test]
    fn test_decode_slots() {
        let data = build_frame(&[(-250, 1200, 35, 360), (0, 0, 0, 0), (1800, 400, -120, 0)]);
        let targets = Frame::from_slice(&data).unwrap().targets();
        assert_eq!((targets[0].x, targets[0].y, targets[0].speed), (-250, 1200, 35));
        assert_eq!(targets[0].resolution, 360);
        assert!(!targets[1].is_valid());
        assert_eq!((targets[2].x, targets[2].y, targets[2].speed), (1800, 400, -120));
    }

    #[test]
    fn test_from_slice_length() {
        assert_eq!(Frame::from_slice(&[0u8; 30]), Err(Error::InvalidLength(30)));
        assert!(Frame::from_slice(&[0u8; FRAME_SIZE]).is_ok());
    }

    #[test]
    fn test_assembler_chunks() {
        let data = build_frame(&[(100, 900, 0, 0)]);
        let mut assembler = FrameAssembler::new();

        assert_eq!(assembler.feed(&data[..5]), None);
        assert_eq!(assembler.feed(&data[5..31]), None);
        assert_eq!(assembler.feed(&data[31..47]), None);
        let frame = assembler.feed(&data[47..]).unwrap();
        assert_eq!(frame.data, data);
        assert!(assembler.is_empty());
    }

    #[test]
    fn test_assembler_one_frame_per_call() {
        let first = build_frame(&[(100, 900, 0, 0)]);
        let second = build_frame(&[(-300, 2500, 10, 0)]);
        let mut bytes = first.to_vec();
        bytes.extend_from_slice(&second);
        bytes.extend_from_slice(&[0xAA, 0xFF]);

        let mut assembler = FrameAssembler::new();
        assert_eq!(assembler.feed(&bytes).unwrap().data, first);
        assert_eq!(assembler.len(), FRAME_SIZE + 2);
        assert_eq!(assembler.feed(&[]).unwrap().data, second);
        assert_eq!(assembler.len(), 2);
        assert_eq!(assembler.feed(&[]), None);
    }
}

// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

//! LD2450 Library
//!
//! This library decodes the report stream of an HLK-LD2450 24 GHz presence
//! radar and turns it into presence state suitable for home automation.
//!
//! # Features
//!
//! - **Frame Decoding** - Reassemble 48 byte reports from an arbitrarily
//!   chunked UART stream and decode the three target slots
//! - **Zones** - Rotated rectangular inclusion and exclusion zones with
//!   angle-sum point containment
//! - **Classification** - Per-zone target counts, movement state and
//!   direction for every valid target
//! - **Publishing** - Rate limited, change detected state updates through
//!   the [`publish::StatePublisher`] trait
//!
//! # Example
//!
//! ```
//! use ld2450::{config::PipelineConfig, pipeline::Pipeline, publish::Update};
//!
//! let mut pipeline = Pipeline::new(PipelineConfig::default(), Vec::<Update>::new());
//! let outcome = pipeline.process(&[0xAA, 0xFF, 0x03, 0x00], 1000);
//! assert_eq!(outcome, ld2450::pipeline::Outcome::Pending);
//! ```

#![warn(missing_docs)]

/// Target classification against inclusion and exclusion zones
pub mod classify;

/// Platform clock and scheduling helpers
pub mod common;

/// Pipeline configuration
pub mod config;

/// Report frame assembly and decoding
pub mod frame;

/// Update rate limiting and change detection
pub mod gate;

/// End to end frame processing
pub mod pipeline;

/// Published state channels
pub mod publish;

/// Decoded targets and their derived attributes
pub mod target;

/// Rotated rectangular zones
pub mod zone;

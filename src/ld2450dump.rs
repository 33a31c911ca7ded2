// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

use clap::Parser;
use ld2450::{
    config::{PipelineConfig, ZoneSlot},
    frame::{decode, FrameAssembler, FRAME_SIZE},
    pipeline::Pipeline,
    publish::Update,
    zone::Zone,
};
use log::debug;
use std::{
    fs::File,
    io::{self, Read},
    path::PathBuf,
};

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Raw capture of the radar uart, stdin when omitted
    #[arg()]
    input: Option<PathBuf>,

    /// Bytes handed to the decoder per read, mimics uart read sizes.
    #[arg(short, long, default_value = "48")]
    chunk: usize,

    /// Print decoded frames only, without zone classification.
    #[arg(short, long)]
    frames: bool,

    /// Simulated time between reads in milliseconds.
    #[arg(short, long, default_value = "110")]
    period: u64,

    /// Minimum time between processed frames in milliseconds.
    #[arg(short, long, default_value = "100")]
    interval: u64,

    /// Rotation applied to all zones in degrees.
    #[arg(short, long, default_value = "0", allow_negative_numbers = true)]
    angle: f32,

    /// Inclusion zone as X Y WIDTH HEIGHT in millimeters.
    #[arg(
        short,
        long = "zone",
        num_args = 4,
        value_names = ["X", "Y", "WIDTH", "HEIGHT"],
        allow_negative_numbers = true
    )]
    zones: Vec<i16>,

    /// Exclusion zone as X Y WIDTH HEIGHT in millimeters.
    #[arg(
        short,
        long = "exclusion",
        num_args = 4,
        value_names = ["X", "Y", "WIDTH", "HEIGHT"],
        allow_negative_numbers = true
    )]
    exclusions: Vec<i16>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args = Args::parse();
    check_chunk(args.chunk, args.frames)?;

    let mut data = Vec::new();
    match &args.input {
        Some(path) => {
            debug!("reading capture {}", path.display());
            File::open(path)?.read_to_end(&mut data)?;
        }
        None => {
            debug!("reading capture from stdin");
            io::stdin().read_to_end(&mut data)?;
        }
    }
    debug!("{} bytes captured", data.len());

    if args.frames {
        dump_frames(&data, args.chunk);
    } else {
        dump_updates(&data, &args);
    }

    Ok(())
}

fn dump_frames(data: &[u8], chunk: usize) {
    let mut assembler = FrameAssembler::new();
    let mut index = 0;

    for bytes in data.chunks(chunk) {
        let mut frame = assembler.feed(bytes);
        while let Some(complete) = frame {
            index += 1;
            for (slot, target) in decode(&complete).iter().enumerate() {
                println!(
                    "frame {} target {}: x={} y={} speed={} resolution={} valid={}",
                    index,
                    slot + 1,
                    target.x,
                    target.y,
                    target.speed,
                    target.resolution,
                    target.is_valid()
                );
            }
            frame = assembler.feed(&[]);
        }
    }

    if !assembler.is_empty() {
        debug!("{} trailing bytes ignored", assembler.len());
    }
}

fn dump_updates(data: &[u8], args: &Args) {
    let config = PipelineConfig {
        update_interval_ms: args.interval,
        rotation_angle: args.angle,
        zones: slots(&args.zones),
        exclusion_zones: slots(&args.exclusions),
        ..Default::default()
    };

    let mut pipeline = Pipeline::new(config, Vec::<Update>::new());
    pipeline.publish_zone_status();

    let mut now = 0;
    for bytes in data.chunks(args.chunk) {
        now += args.period;
        let outcome = pipeline.process(bytes, now);
        debug!("{} ms: {:?}", now, outcome);

        for update in pipeline.publisher_mut().drain(..) {
            println!("{:>8} {} = {}", now, update.channel, update.value);
        }
    }

    let assembler = &pipeline.state().assembler;
    if !assembler.is_empty() {
        debug!("{} trailing bytes ignored", assembler.len());
    }
}

/// The pipeline consumes at most one frame per read, larger reads would
/// leave frames buffered and never replayed.
fn check_chunk(chunk: usize, frames: bool) -> Result<(), String> {
    if chunk == 0 {
        return Err("chunk size must be greater than zero".to_string());
    }
    if !frames && chunk > FRAME_SIZE {
        return Err(format!(
            "chunk size {} exceeds the {} byte frame, use --frames to decode larger reads",
            chunk, FRAME_SIZE
        ));
    }
    Ok(())
}

fn slots(values: &[i16]) -> Vec<ZoneSlot> {
    values
        .chunks_exact(4)
        .map(|v| ZoneSlot::new(Zone::new(v[0], v[1], v[2], v[3])))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_chunk() {
        assert!(check_chunk(0, true).is_err());
        assert!(check_chunk(0, false).is_err());
        assert!(check_chunk(FRAME_SIZE, false).is_ok());
        assert!(check_chunk(2 * FRAME_SIZE, false).is_err());
        assert!(check_chunk(2 * FRAME_SIZE, true).is_ok());
    }
}

// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

mod args;

use args::Args;
use clap::Parser;
use kanal::{AsyncReceiver, Sender};
use ld2450::{
    common::{monotonic_ms, set_process_priority},
    pipeline::{Outcome, Pipeline},
    publish::{Channel, StatePublisher, Update, Value},
};
use serde_json::json;
use std::{
    fs::File,
    io::{self, Read},
    thread,
};
use tracing::{error, info, info_span, warn, Instrument};
use tracing_subscriber::{layer::SubscriberExt as _, Layer as _, Registry};
use tracy_client::{frame_mark, plot};
use zenoh::{bytes::Encoding, Session};

#[cfg(feature = "profiling")]
#[global_allocator]
static GLOBAL: tracy_client::ProfiledAllocator<std::alloc::System> =
    tracy_client::ProfiledAllocator::new(std::alloc::System, 100);

/// Largest read from the uart in a single call.
const READ_SIZE: usize = 256;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    args.tracy.then(tracy_client::Client::start);

    let stdout_log = tracing_subscriber::fmt::layer()
        .pretty()
        .with_filter(args.rust_log);

    let journald = match tracing_journald::layer() {
        Ok(journald) => Some(journald.with_filter(args.rust_log)),
        Err(_) => None,
    };

    let tracy = match args.tracy {
        true => Some(tracing_tracy::TracyLayer::default().with_filter(args.rust_log)),
        false => None,
    };

    let subscriber = Registry::default()
        .with(stdout_log)
        .with(journald)
        .with(tracy);
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");
    tracing_log::LogTracer::init()?;

    let session = zenoh::open(args.clone())
        .await
        .map_err(|e| e as Box<dyn std::error::Error>)?;
    let (tx, rx) = kanal::bounded(64);

    let uart_args = args.clone();
    thread::Builder::new()
        .name("uart".to_string())
        .spawn(move || {
            if let Err(err) = uart_loop(uart_args, tx) {
                error!("uart error: {}", err);
            }
        })?;

    publish_loop(session, args.topic, rx.to_async()).await
}

/// Forwards pipeline updates to the publish task.
struct ChannelPublisher {
    tx: Sender<Update>,
}

impl ChannelPublisher {
    fn send(&self, channel: Channel, value: Value) {
        if let Err(err) = self.tx.send(Update { channel, value }) {
            error!("{} update dropped: {:?}", channel, err);
        }
    }
}

impl StatePublisher for ChannelPublisher {
    fn publish_numeric(&mut self, channel: Channel, value: f32) {
        self.send(channel, Value::Numeric(value));
    }

    fn publish_text(&mut self, channel: Channel, value: &str) {
        self.send(channel, Value::Text(value.to_string()));
    }

    fn publish_bool(&mut self, channel: Channel, value: bool) {
        self.send(channel, Value::Bool(value));
    }
}

/// Reads the radar until the device closes.  The device is expected to be
/// configured for 256000 baud 8N1 before the publisher starts.
fn uart_loop(args: Args, tx: Sender<Update>) -> Result<(), Box<dyn std::error::Error>> {
    set_process_priority();

    let mut device = File::open(&args.device)?;
    info!("reading radar reports from {}", args.device);

    let config = args.pipeline_config();
    for (i, slot) in config.zones.iter().enumerate() {
        info!("zone {}: {}", i + 1, slot.zone.status());
    }

    let mut pipeline = Pipeline::new(config, ChannelPublisher { tx });
    pipeline.publish_zone_status();

    let mut buf = [0u8; READ_SIZE];
    loop {
        let n = read_chunk(&mut device, &mut buf)?;
        if n == 0 {
            warn!("{} closed", args.device);
            return Ok(());
        }

        match pipeline.process(&buf[..n], monotonic_ms()?) {
            Outcome::Processed { targets } => {
                args.tracy.then(|| plot!("targets", targets as f64));
                args.tracy.then(frame_mark);
            }
            Outcome::PacketError => {
                let errors = pipeline.state().gate.packet_errors();
                args.tracy.then(|| plot!("packet errors", errors as f64));
            }
            Outcome::Pending | Outcome::Dropped => {}
        }
    }
}

/// Reads the next chunk, retrying interrupted reads.  Any other error is
/// returned so a failed device ends the uart thread.
fn read_chunk<R: Read>(device: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    loop {
        match device.read(buf) {
            Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
            result => return result,
        }
    }
}

async fn publish_loop(
    session: Session,
    topic: String,
    rx: AsyncReceiver<Update>,
) -> Result<(), Box<dyn std::error::Error>> {
    while let Ok(update) = rx.recv().await {
        let key = format!("{}/{}", topic, update.channel.key());
        let payload = match update.value {
            Value::Numeric(value) => json!(value),
            Value::Text(value) => json!(value),
            Value::Bool(value) => json!(value),
        };

        let span = info_span!("state_publish");
        async {
            match session
                .put(&key, payload.to_string())
                .encoding(Encoding::APPLICATION_JSON)
                .await
            {
                Ok(_) => {}
                Err(e) => error!("{} publish error: {:?}", key, e),
            }
        }
        .instrument(span)
        .await;
    }

    info!("uart closed, publisher exiting");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Replays a fixed sequence of read results.
    struct Device(Vec<io::Result<Vec<u8>>>);

    impl Read for Device {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            match self.0.remove(0) {
                Ok(bytes) => {
                    buf[..bytes.len()].copy_from_slice(&bytes);
                    Ok(bytes.len())
                }
                Err(err) => Err(err),
            }
        }
    }

    #[test]
    fn test_read_chunk_retries_interrupted() {
        let mut device = Device(vec![
            Err(io::ErrorKind::Interrupted.into()),
            Ok(vec![0xAA, 0xFF]),
        ]);
        let mut buf = [0u8; READ_SIZE];
        assert_eq!(read_chunk(&mut device, &mut buf).unwrap(), 2);
        assert_eq!(buf[..2], [0xAA, 0xFF]);
    }

    #[test]
    fn test_read_chunk_returns_device_error() {
        let mut device = Device(vec![
            Err(io::Error::from_raw_os_error(libc::EIO)),
            Ok(vec![0xAA]),
        ]);
        let mut buf = [0u8; READ_SIZE];
        let err = read_chunk(&mut device, &mut buf).unwrap_err();
        assert_eq!(err.raw_os_error(), Some(libc::EIO));
        assert_eq!(device.0.len(), 1);
    }
}

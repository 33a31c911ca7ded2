// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

#[cfg(target_os = "linux")]
use tracing::warn;

/// Raises the calling thread to the real-time FIFO scheduler so UART reads
/// keep up with the sensor.  Failure is logged and otherwise ignored.
#[cfg(target_os = "linux")]
pub fn set_process_priority() {
    let mut param = libc::sched_param { sched_priority: 10 };
    let pid = unsafe { libc::pthread_self() };
    let err = unsafe {
        libc::pthread_setschedparam(pid, libc::SCHED_FIFO, &mut param as *mut libc::sched_param)
    };
    if err != 0 {
        let err = std::io::Error::last_os_error();
        warn!("unable to set uart real-time fifo scheduler: {}", err);
    }
}

/// Raises the calling thread priority, a no-op on this platform.
#[cfg(not(target_os = "linux"))]
pub fn set_process_priority() {}

/// Milliseconds from the raw monotonic clock, unaffected by wall clock
/// adjustments.
#[cfg(target_os = "linux")]
pub fn monotonic_ms() -> Result<u64, std::io::Error> {
    let mut tp = libc::timespec {
        tv_sec: 0,
        tv_nsec: 0,
    };
    let err = unsafe { libc::clock_gettime(libc::CLOCK_MONOTONIC_RAW, &mut tp) };
    if err != 0 {
        return Err(std::io::Error::last_os_error());
    }

    Ok(tp.tv_sec as u64 * 1000 + tp.tv_nsec as u64 / 1_000_000)
}

/// Milliseconds from the monotonic clock.
#[cfg(not(target_os = "linux"))]
pub fn monotonic_ms() -> Result<u64, std::io::Error> {
    use std::{sync::OnceLock, time::Instant};

    static START: OnceLock<Instant> = OnceLock::new();
    Ok(START.get_or_init(Instant::now).elapsed().as_millis() as u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_monotonic() {
        let first = monotonic_ms().unwrap();
        let second = monotonic_ms().unwrap();
        assert!(second >= first);
    }
}

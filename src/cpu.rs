#![allow(unsafe_code)]

//! CPU time measurement for operations that may move between threads.
//!
//! The thread CPU clock only measures the calling thread, so a timer is made
//! of segments: each segment belongs to the thread that opened it. An
//! operation handed to another thread detaches on the old thread and attaches
//! on the new one. A segment closed on a thread other than its owner cannot
//! be read from the CPU clock and is charged its wall-clock duration instead.

use std::thread::{self, ThreadId};
use std::time::{Duration, Instant};

/// Accumulates CPU time consumed by one operation across threads.
///
/// Uses `CLOCK_THREAD_CPUTIME_ID` on unix and wall-clock time elsewhere or
/// when the clock is unavailable.
#[derive(Debug, Clone)]
pub struct CpuTimer {
    accumulated: Duration,
    segment: Option<Segment>,
}

#[derive(Debug, Clone)]
struct Segment {
    thread: ThreadId,
    cpu_start: Option<Duration>,
    wall_start: Instant,
}

impl Segment {
    fn open() -> Self {
        Self {
            thread: thread::current().id(),
            cpu_start: thread_cpu_time(),
            wall_start: Instant::now(),
        }
    }

    fn elapsed(&self) -> Duration {
        if thread::current().id() == self.thread {
            if let (Some(start), Some(now)) = (self.cpu_start, thread_cpu_time()) {
                return now.saturating_sub(start);
            }
        }
        self.wall_start.elapsed()
    }
}

impl CpuTimer {
    /// Starts measuring on the current thread.
    pub fn start() -> Self {
        Self {
            accumulated: Duration::ZERO,
            segment: Some(Segment::open()),
        }
    }

    /// Starts a segment on the current thread, closing any open one first.
    pub fn attach(&mut self) {
        self.detach();
        self.segment = Some(Segment::open());
    }

    /// Closes the open segment. Time spent detached is not charged.
    pub fn detach(&mut self) {
        if let Some(segment) = self.segment.take() {
            self.accumulated = self.accumulated.saturating_add(segment.elapsed());
        }
    }

    /// Whether a segment is open.
    pub fn is_attached(&self) -> bool {
        self.segment.is_some()
    }

    /// CPU time charged so far, including the open segment.
    pub fn elapsed(&self) -> Duration {
        let open = self
            .segment
            .as_ref()
            .map_or(Duration::ZERO, Segment::elapsed);
        self.accumulated.saturating_add(open)
    }
}

#[cfg(unix)]
fn thread_cpu_time() -> Option<Duration> {
    let mut ts = libc::timespec {
        tv_sec: 0,
        tv_nsec: 0,
    };
    // SAFETY: `ts` is a valid, writable timespec for the duration of the call.
    let rc = unsafe { libc::clock_gettime(libc::CLOCK_THREAD_CPUTIME_ID, &mut ts) };
    if rc != 0 || ts.tv_sec < 0 || ts.tv_nsec < 0 {
        return None;
    }
    Some(Duration::new(ts.tv_sec as u64, ts.tv_nsec as u32))
}

#[cfg(not(unix))]
fn thread_cpu_time() -> Option<Duration> {
    None
}

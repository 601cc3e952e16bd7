use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering, fence};

// Reader gives up after this many torn reads; the caller then treats audio as unavailable.
const MAX_SNAPSHOT_ATTEMPTS: u32 = 64;

/// Playback position reported by the audio subsystem.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize)]
pub struct AudioPosition {
    /// Samples played since the start of the active stream's sound.
    pub sample: u64,
    /// Output sample rate in Hz.
    pub sample_rate: u32,
    /// Whether a stream is currently playing.
    pub stream_active: bool,
}

impl AudioPosition {
    /// Seconds elapsed between `start_sample` and this position.
    ///
    /// Returns `None` when the rate is zero or the position is behind `start_sample`.
    pub fn secs_since(&self, start_sample: u64) -> Option<f64> {
        if self.sample_rate == 0 {
            return None;
        }
        let delta = self.sample.checked_sub(start_sample)?;
        Some((delta as f64) / f64::from(self.sample_rate))
    }
}

/// Lock-free cell publishing an [`AudioPosition`] from the audio thread.
///
/// One writer (the audio callback) calls [`AudioClockCell::publish`]; any number of readers call
/// [`AudioClockCell::snapshot`] and always observe a position written by a single `publish`,
/// never a mix of two.
#[derive(Debug, Default)]
pub struct AudioClockCell {
    seq: AtomicU64,
    sample: AtomicU64,
    sample_rate: AtomicU32,
    stream_active: AtomicBool,
}

impl AudioClockCell {
    /// Create a cell holding an inactive zero position.
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish a new position. Must only be called from one thread at a time.
    pub fn publish(&self, pos: AudioPosition) {
        let s = self.seq.load(Ordering::Relaxed);
        self.seq.store(s.wrapping_add(1), Ordering::Relaxed);
        fence(Ordering::Release);
        self.sample.store(pos.sample, Ordering::Relaxed);
        self.sample_rate.store(pos.sample_rate, Ordering::Relaxed);
        self.stream_active.store(pos.stream_active, Ordering::Relaxed);
        self.seq.store(s.wrapping_add(2), Ordering::Release);
    }

    /// Read a consistent position, or `None` if the writer kept the cell busy.
    pub fn snapshot(&self) -> Option<AudioPosition> {
        for _ in 0..MAX_SNAPSHOT_ATTEMPTS {
            let before = self.seq.load(Ordering::Acquire);
            if before % 2 == 1 {
                std::hint::spin_loop();
                continue;
            }
            let pos = AudioPosition {
                sample: self.sample.load(Ordering::Relaxed),
                sample_rate: self.sample_rate.load(Ordering::Relaxed),
                stream_active: self.stream_active.load(Ordering::Relaxed),
            };
            fence(Ordering::Acquire);
            if self.seq.load(Ordering::Relaxed) == before {
                return Some(pos);
            }
        }
        None
    }
}

#[cfg(test)]
#[path = "../../tests/unit/audio/clock.rs"]
mod tests;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use crate::{
    audio::clock::{AudioClockCell, AudioPosition},
    foundation::error::{SyncError, SyncResult},
    movie::def::{SoundDefinition, SoundEvent, SoundEventKind},
};

// Keeps `secs * rate` products such as 0.35 * 1000 from flooring one sample short.
const SAMPLE_EPSILON: f64 = 1e-9;

/// The audio collaborator, as seen by the playback driver.
///
/// Implementations own decoding and output. The driver only issues stream start/stop commands,
/// forwards discrete sound events, and reads the stream position. None of these calls may block.
pub trait AudioOutput {
    /// Start streaming `sound` (asset key `key`) from `start_sample`, replacing any active stream.
    fn start_stream(
        &mut self,
        key: &str,
        sound: &SoundDefinition,
        start_sample: u64,
    ) -> SyncResult<()>;

    /// Stop the active stream, if any.
    fn stop_stream(&mut self);

    /// Consistent snapshot of the stream position.
    ///
    /// Errors (device failure, underrun) make the driver fall back to wall-clock timing.
    fn position(&self) -> SyncResult<AudioPosition>;

    /// Fire a discrete sound event. `sound` is `None` only for [`SoundEventKind::StopAll`].
    fn trigger(&mut self, event: &SoundEvent, sound: Option<&SoundDefinition>);
}

/// Audio output for silent playback; positions are always unavailable.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullAudio;

impl AudioOutput for NullAudio {
    fn start_stream(&mut self, key: &str, _: &SoundDefinition, _: u64) -> SyncResult<()> {
        Err(SyncError::audio_unavailable(format!(
            "no audio output for stream '{key}'"
        )))
    }

    fn stop_stream(&mut self) {}

    fn position(&self) -> SyncResult<AudioPosition> {
        Err(SyncError::audio_unavailable("no audio output"))
    }

    fn trigger(&mut self, _: &SoundEvent, _: Option<&SoundDefinition>) {}
}

/// A command received by [`SimulatedAudio`].
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum AudioCommand {
    /// `start_stream` was called.
    StartStream {
        /// Sound asset key.
        sound: String,
        /// First sample of the stream.
        start_sample: u64,
    },
    /// `stop_stream` was called while a stream was active.
    StopStream,
    /// A discrete sound event fired.
    Trigger {
        /// Event kind.
        kind: SoundEventKind,
        /// Sound asset key, if any.
        sound: Option<String>,
        /// Offset within the frame.
        offset: f64,
    },
}

#[derive(Debug, Default)]
struct SimShared {
    clock: AudioClockCell,
    failing: AtomicBool,
    speed: f64,
    carry: Mutex<f64>,
    log: Mutex<Vec<AudioCommand>>,
}

/// In-process audio output driven by an explicit clock, for previews, tests, and the CLI.
///
/// Clones share state: keep one handle to advance the clock and inspect commands, and hand another
/// to the driver.
#[derive(Clone, Debug)]
pub struct SimulatedAudio {
    shared: Arc<SimShared>,
}

impl Default for SimulatedAudio {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulatedAudio {
    /// A simulated device playing at real-time speed.
    pub fn new() -> Self {
        Self::with_speed(1.0)
    }

    /// A simulated device whose samples advance `speed` times faster than the time fed to it.
    pub fn with_speed(speed: f64) -> Self {
        let shared = SimShared {
            speed,
            ..SimShared::default()
        };
        Self {
            shared: Arc::new(shared),
        }
    }

    /// Shared position cell, as an audio callback would publish into it.
    pub fn clock(&self) -> &AudioClockCell {
        &self.shared.clock
    }

    /// Advance the active stream by `secs` of device time (scaled by the speed factor).
    pub fn advance_secs(&self, secs: f64) {
        let Some(pos) = self.shared.clock.snapshot() else {
            return;
        };
        if !pos.stream_active || secs <= 0.0 {
            return;
        }
        let speed = self.shared.speed;
        let mut carry = lock(&self.shared.carry);
        let exact = secs * speed * f64::from(pos.sample_rate) + *carry;
        let whole = (exact + SAMPLE_EPSILON).floor();
        *carry = (exact - whole).max(0.0);
        self.shared.clock.publish(AudioPosition {
            sample: pos.sample + whole as u64,
            ..pos
        });
    }

    /// Make `position` report an underrun until cleared.
    pub fn set_failing(&self, failing: bool) {
        self.shared.failing.store(failing, Ordering::Relaxed);
    }

    /// Commands received so far.
    pub fn commands(&self) -> Vec<AudioCommand> {
        lock(&self.shared.log).clone()
    }

    /// Take and clear the received commands.
    pub fn drain_commands(&self) -> Vec<AudioCommand> {
        std::mem::take(&mut *lock(&self.shared.log))
    }

    fn record(&self, cmd: AudioCommand) {
        lock(&self.shared.log).push(cmd);
    }
}

impl AudioOutput for SimulatedAudio {
    fn start_stream(
        &mut self,
        key: &str,
        sound: &SoundDefinition,
        start_sample: u64,
    ) -> SyncResult<()> {
        if self.shared.failing.load(Ordering::Relaxed) {
            return Err(SyncError::audio_unavailable("simulated device failure"));
        }
        *lock(&self.shared.carry) = 0.0;
        self.shared.clock.publish(AudioPosition {
            sample: start_sample,
            sample_rate: sound.sample_rate,
            stream_active: true,
        });
        self.record(AudioCommand::StartStream {
            sound: key.to_string(),
            start_sample,
        });
        Ok(())
    }

    fn stop_stream(&mut self) {
        let Some(pos) = self.shared.clock.snapshot() else {
            return;
        };
        if !pos.stream_active {
            return;
        }
        self.shared.clock.publish(AudioPosition {
            stream_active: false,
            ..pos
        });
        self.record(AudioCommand::StopStream);
    }

    fn position(&self) -> SyncResult<AudioPosition> {
        if self.shared.failing.load(Ordering::Relaxed) {
            return Err(SyncError::audio_unavailable("simulated underrun"));
        }
        self.shared
            .clock
            .snapshot()
            .ok_or_else(|| SyncError::audio_unavailable("position cell contended"))
    }

    fn trigger(&mut self, event: &SoundEvent, _: Option<&SoundDefinition>) {
        self.record(AudioCommand::Trigger {
            kind: event.kind,
            sound: event.sound.clone(),
            offset: event.offset,
        });
    }
}

fn lock<T>(m: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[cfg(test)]
#[path = "../../tests/unit/audio/output.rs"]
mod tests;

use crate::{
    audio::output::AudioOutput,
    foundation::error::{SyncError, SyncResult},
    movie::def::StreamBlock,
    movie::model::Movie,
};

#[derive(Clone, Debug, PartialEq, Eq)]
struct ActiveStream {
    sound: String,
    start_sample: u64,
}

/// Turns a streaming sound's playback position into elapsed movie time.
///
/// While active, elapsed time is `(position - start_sample) / sample_rate`, read from the audio
/// output. Any failure surfaces as [`SyncError::AudioSyncUnavailable`] so the driver can fall back
/// to wall-clock timing.
#[derive(Clone, Debug, Default)]
pub struct AudioSyncAdapter {
    active: Option<ActiveStream>,
    // Sound whose last start attempt failed; not retried until cleared.
    failed: Option<String>,
}

impl AudioSyncAdapter {
    /// An inactive adapter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Return `true` while a stream drives the clock.
    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    /// Key of the sound currently driving the clock.
    pub fn active_sound(&self) -> Option<&str> {
        self.active.as_ref().map(|a| a.sound.as_str())
    }

    /// Sample at which the active stream was started.
    pub fn start_sample(&self) -> Option<u64> {
        self.active.as_ref().map(|a| a.start_sample)
    }

    /// Return `true` when the last attempt to start `sound` failed and was not cleared since.
    pub fn has_failed(&self, sound: &str) -> bool {
        self.failed.as_deref() == Some(sound)
    }

    /// Allow a previously failed sound to be started again.
    pub fn clear_failure(&mut self) {
        self.failed = None;
    }

    /// Start `stream` on `out` at its block position plus `extra_samples`, and track it.
    ///
    /// On failure the adapter is left inactive, any previous stream is stopped, and the sound is
    /// remembered as failed.
    pub fn activate(
        &mut self,
        out: &mut dyn AudioOutput,
        movie: &Movie,
        stream: &StreamBlock,
        extra_samples: u64,
    ) -> SyncResult<u64> {
        self.deactivate(out);
        match start(out, movie, stream, extra_samples) {
            Ok(start_sample) => {
                tracing::debug!(sound = %stream.sound, start_sample, "audio sync activated");
                self.failed = None;
                self.active = Some(ActiveStream {
                    sound: stream.sound.clone(),
                    start_sample,
                });
                Ok(start_sample)
            }
            Err(err) => {
                self.failed = Some(stream.sound.clone());
                Err(err)
            }
        }
    }

    /// Stop the tracked stream, if any.
    pub fn deactivate(&mut self, out: &mut dyn AudioOutput) {
        if let Some(active) = self.active.take() {
            out.stop_stream();
            tracing::debug!(sound = %active.sound, "audio sync deactivated");
        }
    }

    /// Seconds of stream played since activation.
    pub fn elapsed_secs(&self, out: &dyn AudioOutput) -> SyncResult<f64> {
        let active = self
            .active
            .as_ref()
            .ok_or_else(|| SyncError::audio_unavailable("no active stream"))?;
        let pos = out.position()?;
        if !pos.stream_active {
            return Err(SyncError::audio_unavailable(format!(
                "stream '{}' is no longer playing",
                active.sound
            )));
        }
        pos.secs_since(active.start_sample).ok_or_else(|| {
            SyncError::audio_unavailable(format!(
                "stream '{}' reported position {} before start {} at {} Hz",
                active.sound, pos.sample, active.start_sample, pos.sample_rate
            ))
        })
    }
}

fn start(
    out: &mut dyn AudioOutput,
    movie: &Movie,
    stream: &StreamBlock,
    extra_samples: u64,
) -> SyncResult<u64> {
    let sound = movie.sound(&stream.sound).ok_or_else(|| {
        SyncError::audio_unavailable(format!("unknown stream sound '{}'", stream.sound))
    })?;
    let start_sample = sound
        .block_to_sample(stream.block_index)
        .saturating_add(extra_samples);
    out.start_stream(&stream.sound, sound, start_sample)?;
    Ok(start_sample)
}

#[cfg(test)]
#[path = "../../tests/unit/audio/sync.rs"]
mod tests;

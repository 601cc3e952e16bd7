use std::sync::Arc;

use crate::{
    audio::output::{AudioOutput, NullAudio},
    audio::sync::AudioSyncAdapter,
    foundation::core::Position,
    foundation::error::{SyncError, SyncResult},
    movie::def::StreamBlock,
    movie::model::{Frame, Movie},
    playback::clock::{ClockSource, MonotonicClock, TimeSource},
    playback::observer::{
        FrameNotice, FrameObserver, Interpolation, Observers, RenderRequest, Renderer,
    },
    playback::opts::PlaybackOpts,
    playback::playhead::{Playhead, Step},
};

/// Lifecycle state of a [`PlaybackDriver`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaybackState {
    /// Not playing; ticks are ignored.
    Stopped,
    /// Ticks advance the playhead.
    Playing,
    /// Position retained; ticks are ignored until `play` resumes.
    Paused,
}

/// What one [`PlaybackDriver::on_tick`] did.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct TickReport {
    /// Every position crossed, in order, displayed or not.
    pub crossed: Vec<Position>,
    /// Positions crossed in catch-up mode without display notifications.
    pub skipped: Vec<Position>,
    /// Sound events fired during the tick.
    pub sound_events: usize,
    /// Playback reached the final frame of a non-looping movie and stopped.
    pub finished: bool,
    /// Audio sync failed during the tick and timing fell back to the wall clock.
    pub audio_fallback: bool,
    /// Clock driving playback after the tick.
    pub clock: ClockSource,
    /// Interpolation state after the tick.
    pub interpolation: Option<Interpolation>,
}

impl TickReport {
    fn idle(clock: ClockSource) -> Self {
        Self {
            crossed: Vec::new(),
            skipped: Vec::new(),
            sound_events: 0,
            finished: false,
            audio_fallback: false,
            clock,
            interpolation: None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum BaselineClock {
    Wall { start: f64 },
    Audio,
}

// Timeline anchor: `lead_secs` of movie time had already passed frame `ordinal` when the clock
// read zero.
#[derive(Clone, Copy, Debug, PartialEq)]
struct Baseline {
    ordinal: u64,
    lead_secs: f64,
    clock: BaselineClock,
}

/// Drives a [`Playhead`] over a [`Movie`] from externally pumped ticks.
///
/// Elapsed time comes from the [`TimeSource`], or from the active streaming sound when the audio
/// output can report one. Each crossed frame is announced as will-display, render, did-display,
/// then its sound events in offset order.
pub struct PlaybackDriver {
    movie: Arc<Movie>,
    opts: PlaybackOpts,
    playhead: Playhead,
    state: PlaybackState,
    time: Box<dyn TimeSource>,
    audio: Box<dyn AudioOutput>,
    sync: AudioSyncAdapter,
    observers: Observers,
    baseline: Baseline,
    // Frames advanced since play started from Stopped; keeps counting across loop wraps.
    run_ordinal: u64,
    // Movie time already past `run_ordinal` at the last clock reading.
    lead_secs: f64,
    interpolation: Option<Interpolation>,
    finished: bool,
}

impl std::fmt::Debug for PlaybackDriver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlaybackDriver")
            .field("movie", &self.movie.id())
            .field("opts", &self.opts)
            .field("playhead", &self.playhead)
            .field("state", &self.state)
            .field("sync", &self.sync)
            .field("observers", &self.observers)
            .field("run_ordinal", &self.run_ordinal)
            .finish_non_exhaustive()
    }
}

impl PlaybackDriver {
    /// A stopped driver at scene 1, frame 1, timed by a [`MonotonicClock`] with silent audio.
    pub fn new(movie: Arc<Movie>, opts: PlaybackOpts) -> Self {
        let playhead = Playhead::new(opts.looping);
        Self {
            movie,
            opts,
            playhead,
            state: PlaybackState::Stopped,
            time: Box::new(MonotonicClock::new()),
            audio: Box::new(NullAudio),
            sync: AudioSyncAdapter::new(),
            observers: Observers::default(),
            baseline: Baseline {
                ordinal: 0,
                lead_secs: 0.0,
                clock: BaselineClock::Wall { start: 0.0 },
            },
            run_ordinal: 0,
            lead_secs: 0.0,
            interpolation: None,
            finished: false,
        }
    }

    /// Replace the wall-clock source used by [`Self::play`], [`Self::pause`] and [`Self::tick`].
    pub fn with_time_source(mut self, time: Box<dyn TimeSource>) -> Self {
        self.time = time;
        self
    }

    /// Replace the audio output.
    pub fn with_audio_output(mut self, audio: Box<dyn AudioOutput>) -> Self {
        self.audio = audio;
        self
    }

    /// Set the will-display observer.
    pub fn on_will_display(&mut self, cb: impl FnMut(&FrameNotice<'_>) + 'static) {
        self.observers.will_display = Some(Box::new(cb) as FrameObserver);
    }

    /// Set the did-display observer.
    pub fn on_did_display(&mut self, cb: impl FnMut(&FrameNotice<'_>) + 'static) {
        self.observers.did_display = Some(Box::new(cb) as FrameObserver);
    }

    /// Set the renderer.
    pub fn on_render(&mut self, cb: impl FnMut(&RenderRequest<'_>) + 'static) {
        self.observers.render = Some(Box::new(cb) as Renderer);
    }

    /// Remove every observer and the renderer.
    pub fn clear_observers(&mut self) {
        self.observers = Observers::default();
    }

    /// The movie being played.
    pub fn movie(&self) -> &Arc<Movie> {
        &self.movie
    }

    /// Active options.
    pub fn opts(&self) -> &PlaybackOpts {
        &self.opts
    }

    /// Lifecycle state.
    pub fn state(&self) -> PlaybackState {
        self.state
    }

    /// Current playhead position.
    pub fn position(&self) -> Position {
        self.playhead.position()
    }

    /// Read-only view of the playhead.
    pub fn playhead(&self) -> &Playhead {
        &self.playhead
    }

    /// Frame under the playhead.
    pub fn current_frame(&self) -> Option<&Frame> {
        self.movie.frame(self.playhead.position())
    }

    /// Frame that would be displayed next, honoring looping.
    pub fn next_frame(&self) -> Option<&Frame> {
        let next = self
            .movie
            .next_position(self.playhead.position(), self.opts.looping)?;
        self.movie.frame(next)
    }

    /// Interpolation state from the last tick.
    pub fn interpolation(&self) -> Option<Interpolation> {
        self.interpolation
    }

    /// Clock currently driving elapsed time.
    pub fn clock_source(&self) -> ClockSource {
        match self.baseline.clock {
            BaselineClock::Audio if self.sync.is_active() => ClockSource::Audio,
            _ => ClockSource::Wall,
        }
    }

    /// Return `true` after a non-looping movie played through its final frame.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Enable or disable wrapping at the final frame.
    pub fn set_looping(&mut self, looping: bool) {
        self.opts.looping = looping;
        self.playhead.set_looping(looping);
    }

    /// Start or resume playback at the time source's current time.
    pub fn play(&mut self) {
        let now = self.time.now();
        self.play_at(now);
    }

    /// Start or resume playback at `now`.
    ///
    /// From Stopped this displays the starting frame, rewinding first when the previous run
    /// finished. From Paused it resumes without notifications.
    #[tracing::instrument(level = "debug", skip(self))]
    pub fn play_at(&mut self, now: f64) {
        match self.state {
            PlaybackState::Playing => {}
            PlaybackState::Paused => {
                self.state = PlaybackState::Playing;
                self.playhead.set_playing(true);
                self.rebaseline_at_position(now, self.lead_secs);
                tracing::info!(position = %self.playhead.position(), "playback resumed");
            }
            PlaybackState::Stopped => {
                if self.finished {
                    self.playhead.reset();
                    self.finished = false;
                }
                self.state = PlaybackState::Playing;
                self.playhead.set_playing(true);
                self.sync.clear_failure();
                self.run_ordinal = 0;
                self.lead_secs = 0.0;
                self.interpolation = None;
                self.rebaseline_at_position(now, 0.0);
                tracing::info!(position = %self.playhead.position(), "playback started");

                let movie = Arc::clone(&self.movie);
                let position = self.playhead.position();
                let interpolation = self.interpolation_for(&movie, position, 0.0);
                self.interpolation = interpolation;
                self.display(&movie, position, interpolation);
                self.fire_sound_events(&movie, position);
            }
        }
    }

    /// Pause at the time source's current time.
    pub fn pause(&mut self) {
        let now = self.time.now();
        self.pause_at(now);
    }

    /// Pause at `now`, keeping the position and stopping the audio stream.
    pub fn pause_at(&mut self, now: f64) {
        if self.state != PlaybackState::Playing {
            return;
        }
        if let Ok(total) = self.timeline_secs(now) {
            self.lead_secs = self.lead_past_run(total);
        }
        self.sync.deactivate(self.audio.as_mut());
        self.state = PlaybackState::Paused;
        self.playhead.set_playing(false);
        tracing::info!(position = %self.playhead.position(), "playback paused");
    }

    /// Stop playback and rewind to scene 1, frame 1.
    pub fn stop(&mut self) {
        self.sync.deactivate(self.audio.as_mut());
        self.sync.clear_failure();
        self.playhead.reset();
        self.state = PlaybackState::Stopped;
        self.run_ordinal = 0;
        self.lead_secs = 0.0;
        self.interpolation = None;
        self.finished = false;
        tracing::info!("playback stopped");
    }

    /// Jump to `pos` without notifications, rebaselining the clock.
    pub fn seek(&mut self, pos: Position) -> SyncResult<()> {
        let movie = Arc::clone(&self.movie);
        self.playhead.seek(&movie, pos)?;
        self.sync.clear_failure();
        self.finished = false;
        self.lead_secs = 0.0;
        self.interpolation = None;
        if self.state == PlaybackState::Playing {
            let now = self.time.now();
            self.rebaseline_at_position(now, 0.0);
        }
        tracing::debug!(position = %pos, "seek");
        Ok(())
    }

    /// Jump to the first frame carrying `label`.
    pub fn seek_to_label(&mut self, label: &str) -> SyncResult<()> {
        let pos = self.movie.position_of_label(label).ok_or_else(|| {
            SyncError::out_of_range(format!("no frame labeled '{label}'"))
        })?;
        self.seek(pos)
    }

    /// Advance playback to the time source's current time.
    pub fn tick(&mut self) -> TickReport {
        let now = self.time.now();
        self.on_tick(now)
    }

    /// Advance playback to `now`, crossing and announcing every due frame.
    #[tracing::instrument(level = "trace", skip(self))]
    pub fn on_tick(&mut self, now: f64) -> TickReport {
        if self.state != PlaybackState::Playing {
            return TickReport::idle(self.clock_source());
        }
        let movie = Arc::clone(&self.movie);
        let fps = movie.fps();
        let mut report = TickReport::idle(self.clock_source());

        let total = match self.timeline_secs(now) {
            Ok(total) => total,
            Err(err) => {
                tracing::warn!(error = %err, "audio sync unavailable, falling back to wall clock");
                report.audio_fallback = true;
                self.sync.deactivate(self.audio.as_mut());
                self.baseline = Baseline {
                    ordinal: self.run_ordinal,
                    lead_secs: self.lead_secs,
                    clock: BaselineClock::Wall { start: now },
                };
                self.lead_secs
            }
        };
        let origin = self.baseline.ordinal;
        let played_before = fps.frames_to_secs(self.run_ordinal) + self.lead_secs;
        let (whole, frac) = fps.split_secs(total);
        let target = origin + whole;
        let pending = target.saturating_sub(self.run_ordinal);
        let to_cross = match self.opts.max_frames_per_tick {
            Some(cap) => pending.min(u64::from(cap)),
            None => pending,
        };

        for i in 0..to_cross {
            let (position, entered_scene) = match self.playhead.step(&movie) {
                Step::Advanced {
                    position,
                    entered_scene,
                    wrapped,
                } => {
                    if wrapped {
                        tracing::debug!("looped to start");
                    }
                    (position, entered_scene)
                }
                Step::End => {
                    self.finish();
                    report.finished = true;
                    break;
                }
            };
            self.run_ordinal += 1;
            report.crossed.push(position);

            let lead = (total - fps.frames_to_secs(self.run_ordinal - origin)).max(0.0);
            if self.follow_stream(&movie, position, entered_scene, now, lead) {
                report.audio_fallback = true;
            }

            let last = i + 1 == to_cross;
            if !self.opts.catch_up_on_dropped_ticks || entered_scene || last {
                let weight = if last && self.run_ordinal == target {
                    frac
                } else {
                    0.0
                };
                let interpolation = self.interpolation_for(&movie, position, weight);
                self.interpolation = interpolation;
                self.display(&movie, position, interpolation);
            } else {
                report.skipped.push(position);
            }
            report.sound_events += self.fire_sound_events(&movie, position);
        }

        if self.state == PlaybackState::Playing {
            self.lead_secs = (total - fps.frames_to_secs(self.run_ordinal - origin)).max(0.0);
            let weight = if self.run_ordinal == target { frac } else { 0.0 };
            let position = self.playhead.position();
            self.interpolation = self.interpolation_for(&movie, position, weight);
            if report.crossed.is_empty() && self.interpolation.is_some() {
                self.render(&movie, position, self.interpolation);
            }
            let played = fps.frames_to_secs(self.run_ordinal) + self.lead_secs;
            self.playhead.advance_elapsed(played - played_before);
        } else {
            self.interpolation = None;
        }
        report.clock = self.clock_source();
        report.interpolation = self.interpolation;
        report
    }

    // Seconds of movie time since the baseline ordinal.
    fn timeline_secs(&self, now: f64) -> SyncResult<f64> {
        let elapsed = match self.baseline.clock {
            BaselineClock::Wall { start } => (now - start).max(0.0),
            BaselineClock::Audio => self.sync.elapsed_secs(&*self.audio)?,
        };
        Ok(self.baseline.lead_secs + elapsed)
    }

    fn lead_past_run(&self, total: f64) -> f64 {
        let done = self.run_ordinal.saturating_sub(self.baseline.ordinal);
        (total - self.movie.fps().frames_to_secs(done)).max(0.0)
    }

    // Start, switch or drop the stream after crossing onto `position`. Returns `true` when a
    // failed start moved timing from audio to the wall clock.
    fn follow_stream(
        &mut self,
        movie: &Movie,
        position: Position,
        entered_scene: bool,
        now: f64,
        lead: f64,
    ) -> bool {
        let stream = movie.frame(position).and_then(Frame::stream);
        let was_audio = self.clock_source() == ClockSource::Audio;
        if entered_scene {
            self.sync.clear_failure();
            if self.sync.is_active() || stream.is_some() {
                tracing::debug!(scene = position.scene, "scene changed");
                let ok = self.rebaseline(movie, now, lead, stream.map(|s| (s, lead)));
                return was_audio && !ok;
            }
            return false;
        }
        match stream {
            Some(s)
                if self.sync.active_sound() != Some(s.sound.as_str())
                    && !self.sync.has_failed(&s.sound) =>
            {
                let ok = self.rebaseline(movie, now, lead, Some((s, lead)));
                was_audio && !ok
            }
            _ => false,
        }
    }

    fn rebaseline_at_position(&mut self, now: f64, lead_secs: f64) {
        let movie = Arc::clone(&self.movie);
        let position = self.playhead.position();
        let origin = movie
            .scene(position.scene)
            .and_then(|scene| scene.stream_origin(position.frame));
        let stream = origin
            .filter(|(_, block)| !self.sync.has_failed(&block.sound))
            .map(|(at, block)| {
                let since = movie.fps().frames_to_secs((position.frame - at) as u64);
                (block, since + lead_secs)
            });
        self.rebaseline(&movie, now, lead_secs, stream);
    }

    // Re-anchor the timeline at the current run ordinal. Returns `false` when a requested stream
    // failed to start.
    fn rebaseline(
        &mut self,
        movie: &Movie,
        now: f64,
        lead_secs: f64,
        stream: Option<(&StreamBlock, f64)>,
    ) -> bool {
        self.sync.deactivate(self.audio.as_mut());
        let mut clock = BaselineClock::Wall { start: now };
        let mut ok = true;
        if let Some((block, offset_secs)) = stream {
            let extra = movie
                .sound(&block.sound)
                .map(|sound| secs_to_samples(offset_secs, sound.sample_rate))
                .unwrap_or(0);
            match self.sync.activate(self.audio.as_mut(), movie, block, extra) {
                Ok(_) => clock = BaselineClock::Audio,
                Err(err) => {
                    tracing::warn!(
                        error = %err,
                        sound = %block.sound,
                        "audio sync unavailable, using wall clock"
                    );
                    ok = false;
                }
            }
        }
        self.baseline = Baseline {
            ordinal: self.run_ordinal,
            lead_secs,
            clock,
        };
        self.lead_secs = lead_secs;
        tracing::debug!(
            ordinal = self.run_ordinal,
            lead_secs,
            audio = ok && stream.is_some(),
            "clock rebaselined"
        );
        ok
    }

    fn finish(&mut self) {
        self.sync.deactivate(self.audio.as_mut());
        self.state = PlaybackState::Stopped;
        self.playhead.set_playing(false);
        self.finished = true;
        self.lead_secs = 0.0;
        tracing::info!(position = %self.playhead.position(), "playback finished");
    }

    fn interpolation_for(
        &self,
        movie: &Movie,
        position: Position,
        weight: f64,
    ) -> Option<Interpolation> {
        if !self.opts.interpolates_frames {
            return None;
        }
        let next = movie.next_position(position, self.opts.looping)?;
        Some(Interpolation { weight, next })
    }

    fn display(&mut self, movie: &Movie, position: Position, interpolation: Option<Interpolation>) {
        let (Some(scene), Some(frame)) = (movie.scene(position.scene), movie.frame(position)) else {
            return;
        };
        let notice = FrameNotice {
            position,
            scene,
            frame,
        };
        self.observers.will_display(&notice);
        self.render(movie, position, interpolation);
        self.observers.did_display(&notice);
    }

    fn render(&mut self, movie: &Movie, position: Position, interpolation: Option<Interpolation>) {
        let Some(frame) = movie.frame(position) else {
            return;
        };
        self.observers.render(&RenderRequest {
            position,
            frame,
            interpolation,
            uses_multiple_layers: self.opts.uses_multiple_layers,
            shows_background_color: self.opts.shows_background_color,
        });
    }

    fn fire_sound_events(&mut self, movie: &Movie, position: Position) -> usize {
        let Some(frame) = movie.frame(position) else {
            return 0;
        };
        for ev in frame.sound_events() {
            let sound = ev.sound.as_deref().and_then(|key| movie.sound(key));
            self.audio.trigger(ev, sound);
        }
        frame.sound_events().len()
    }
}

fn secs_to_samples(secs: f64, sample_rate: u32) -> u64 {
    (secs.max(0.0) * f64::from(sample_rate)).round() as u64
}

#[cfg(test)]
#[path = "../../tests/unit/playback/driver.rs"]
mod tests;

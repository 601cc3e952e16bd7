//! framesync keeps the visual timeline of a frame-based vector movie in step with time.
//!
//! A [`Movie`] is an ordered list of [`Scene`]s, each an ordered list of [`Frame`]s. A
//! [`PlaybackDriver`] owns a [`Playhead`] over that movie and is pumped by an external tick. Every
//! tick converts elapsed time into a target frame and crosses each frame up to it, announcing
//! will-display, render, and did-display for each one before firing its sound events.
//!
//! # Clocks
//!
//! Elapsed time normally comes from a [`TimeSource`]. While a scene carries a streaming sound and
//! the [`AudioOutput`] can report its position, the [`AudioSyncAdapter`] derives elapsed time from
//! samples played instead, so visuals follow the audio. Any audio failure falls back to the wall
//! clock without a visible jump.
//!
//! # Getting started
//!
//! - Build a movie with [`MovieBuilder`] or load one from JSON with [`Movie::from_path`].
//! - Wrap it in an `Arc`, create a [`PlaybackDriver`], install observers, call
//!   [`PlaybackDriver::play`] and pump [`PlaybackDriver::tick`] from your frame loop.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod audio;
mod foundation;
mod movie;
mod playback;

pub use audio::clock::{AudioClockCell, AudioPosition};
pub use audio::output::{AudioCommand, AudioOutput, NullAudio, SimulatedAudio};
pub use audio::sync::AudioSyncAdapter;
pub use foundation::core::{Affine, Canvas, Fps, Position, Rgba8, Vec2};
pub use foundation::error::{SyncError, SyncResult};
pub use movie::def::{
    FrameDef, MovieDef, PlacedObject, SceneDef, SoundDefinition, SoundEvent, SoundEventKind,
    StreamBlock,
};
pub use movie::dsl::{
    FrameBuilder, MovieBuilder, SceneBuilder, sound_definition, start_sound, stop_sound,
};
pub use movie::model::{Frame, Movie, MovieId, Scene, SceneLink};
pub use playback::clock::{ClockSource, ManualClock, MonotonicClock, TimeSource};
pub use playback::driver::{PlaybackDriver, PlaybackState, TickReport};
pub use playback::observer::{FrameNotice, FrameObserver, Interpolation, RenderRequest, Renderer};
pub use playback::opts::PlaybackOpts;
pub use playback::playhead::{Playhead, Step};

use super::*;
use crate::audio::output::{NullAudio, SimulatedAudio};
use crate::foundation::core::{Canvas, Fps};
use crate::movie::dsl::{FrameBuilder, MovieBuilder, SceneBuilder};
use crate::movie::def::SoundDefinition;

fn movie() -> Movie {
    MovieBuilder::new(
        Fps::new(10, 1).unwrap(),
        Canvas {
            width: 1,
            height: 1,
        },
    )
    .sound(
        "music",
        SoundDefinition {
            source: "music.wav".to_string(),
            sample_rate: 1_000,
            channels: 2,
            samples_per_block: 100,
            sample_count: None,
        },
    )
    .unwrap()
    .scene(
        SceneBuilder::new()
            .frame(FrameBuilder::new().stream("music", 3).build())
            .build(),
    )
    .build()
    .unwrap()
}

fn block(sound: &str, index: u64) -> StreamBlock {
    StreamBlock {
        sound: sound.to_string(),
        block_index: index,
    }
}

#[test]
fn activation_starts_stream_at_block_sample() {
    let movie = movie();
    let handle = SimulatedAudio::new();
    let mut out = handle.clone();
    let mut sync = AudioSyncAdapter::new();

    let start = sync.activate(&mut out, &movie, &block("music", 3), 0).unwrap();
    assert_eq!(start, 300);
    assert!(sync.is_active());
    assert_eq!(sync.active_sound(), Some("music"));
    assert_eq!(sync.elapsed_secs(&out).unwrap(), 0.0);

    handle.advance_secs(0.5);
    assert!((sync.elapsed_secs(&out).unwrap() - 0.5).abs() < 1e-9);
}

#[test]
fn extra_samples_offset_the_start() {
    let movie = movie();
    let mut out = SimulatedAudio::new();
    let mut sync = AudioSyncAdapter::new();
    let start = sync
        .activate(&mut out, &movie, &block("music", 3), 250)
        .unwrap();
    assert_eq!(start, 550);
    assert_eq!(sync.start_sample(), Some(550));
}

#[test]
fn failed_activation_leaves_adapter_inactive() {
    let movie = movie();
    let mut sync = AudioSyncAdapter::new();
    let err = sync
        .activate(&mut NullAudio, &movie, &block("music", 0), 0)
        .unwrap_err();
    assert!(err.is_recoverable());
    assert!(!sync.is_active());

    let mut out = SimulatedAudio::new();
    assert!(sync.activate(&mut out, &movie, &block("ghost", 0), 0).is_err());
    assert!(!sync.is_active());
}

#[test]
fn elapsed_fails_when_stream_stops_or_underruns() {
    let movie = movie();
    let handle = SimulatedAudio::new();
    let mut out = handle.clone();
    let mut sync = AudioSyncAdapter::new();
    assert!(sync.elapsed_secs(&out).is_err());

    sync.activate(&mut out, &movie, &block("music", 0), 0).unwrap();
    handle.set_failing(true);
    assert!(sync.elapsed_secs(&out).is_err());
    handle.set_failing(false);

    out.stop_stream();
    assert!(sync.elapsed_secs(&out).is_err());
}

#[test]
fn deactivate_stops_the_stream_once() {
    let movie = movie();
    let handle = SimulatedAudio::new();
    let mut out = handle.clone();
    let mut sync = AudioSyncAdapter::new();
    sync.activate(&mut out, &movie, &block("music", 0), 0).unwrap();
    sync.deactivate(&mut out);
    sync.deactivate(&mut out);
    assert!(!sync.is_active());
    let stops = handle
        .commands()
        .into_iter()
        .filter(|c| *c == crate::audio::output::AudioCommand::StopStream)
        .count();
    assert_eq!(stops, 1);
}

#[test]
fn failed_sounds_are_remembered_until_cleared() {
    let movie = movie();
    let mut sync = AudioSyncAdapter::new();
    assert!(!sync.has_failed("music"));

    let _ = sync.activate(&mut NullAudio, &movie, &block("music", 0), 0);
    assert!(sync.has_failed("music"));
    sync.clear_failure();
    assert!(!sync.has_failed("music"));

    let _ = sync.activate(&mut NullAudio, &movie, &block("music", 0), 0);
    let mut out = SimulatedAudio::new();
    sync.activate(&mut out, &movie, &block("music", 1), 0).unwrap();
    assert!(!sync.has_failed("music"));
}

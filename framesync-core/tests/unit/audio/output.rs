use super::*;

fn sound(rate: u32) -> SoundDefinition {
    SoundDefinition {
        source: "s.wav".to_string(),
        sample_rate: rate,
        channels: 1,
        samples_per_block: 1,
        sample_count: None,
    }
}

#[test]
fn null_audio_never_provides_a_clock() {
    let mut out = NullAudio;
    assert!(out.start_stream("s", &sound(8_000), 0).is_err());
    assert!(matches!(
        out.position(),
        Err(SyncError::AudioSyncUnavailable(_))
    ));
}

#[test]
fn simulated_audio_advances_with_speed() {
    let handle = SimulatedAudio::with_speed(2.0);
    let mut out = handle.clone();
    out.start_stream("s", &sound(1_000), 500).unwrap();
    handle.advance_secs(0.25);

    let pos = out.position().unwrap();
    assert!(pos.stream_active);
    assert_eq!(pos.sample, 1_000);
    assert_eq!(pos.sample_rate, 1_000);
}

#[test]
fn simulated_audio_carries_fractional_samples() {
    let handle = SimulatedAudio::new();
    let mut out = handle.clone();
    out.start_stream("s", &sound(10), 0).unwrap();
    for _ in 0..4 {
        handle.advance_secs(0.025);
    }
    assert_eq!(out.position().unwrap().sample, 1);
}

#[test]
fn stopped_stream_does_not_advance() {
    let handle = SimulatedAudio::new();
    let mut out = handle.clone();
    out.start_stream("s", &sound(1_000), 0).unwrap();
    out.stop_stream();
    out.stop_stream();
    handle.advance_secs(1.0);

    let pos = out.position().unwrap();
    assert!(!pos.stream_active);
    assert_eq!(pos.sample, 0);
    assert_eq!(
        handle.commands(),
        vec![
            AudioCommand::StartStream {
                sound: "s".to_string(),
                start_sample: 0,
            },
            AudioCommand::StopStream,
        ]
    );
}

#[test]
fn failing_device_reports_unavailable() {
    let handle = SimulatedAudio::new();
    let mut out = handle.clone();
    handle.set_failing(true);
    assert!(out.start_stream("s", &sound(1_000), 0).is_err());
    assert!(out.position().unwrap_err().is_recoverable());
    handle.set_failing(false);
    assert!(out.position().is_ok());
}

#[test]
fn triggers_are_recorded_and_drained() {
    let handle = SimulatedAudio::new();
    let mut out = handle.clone();
    let ev = SoundEvent {
        offset: 0.2,
        kind: SoundEventKind::Start,
        sound: Some("s".to_string()),
        loop_count: 2,
    };
    out.trigger(&ev, Some(&sound(1_000)));
    assert_eq!(handle.drain_commands().len(), 1);
    assert!(handle.commands().is_empty());
}

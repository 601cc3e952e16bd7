use super::*;
use crate::foundation::core::Position;

fn fps10() -> Fps {
    Fps::new(10, 1).unwrap()
}

fn stage() -> Canvas {
    Canvas {
        width: 64,
        height: 64,
    }
}

#[test]
fn builder_assembles_scenes_in_order() {
    let movie = MovieBuilder::new(fps10(), stage())
        .background(Rgba8::new(0, 0, 0, 255))
        .sound("theme", sound_definition("theme.wav", 22_050))
        .unwrap()
        .scene(SceneBuilder::new().name("a").blank_frames(3).build())
        .scene(
            SceneBuilder::new()
                .frame(
                    FrameBuilder::new()
                        .label("hit")
                        .place(2, 7, Affine::translate((4.0, 0.0)))
                        .stream("theme", 0)
                        .event(start_sound(0.5, "theme"))
                        .event(stop_sound(0.0, "theme"))
                        .build(),
                )
                .build(),
        )
        .build()
        .unwrap();

    assert_eq!(movie.scenes().len(), 2);
    assert_eq!(movie.scene(1).unwrap().name(), Some("a"));
    assert_eq!(movie.background(), Rgba8::new(0, 0, 0, 255));

    let hit = movie.position_of_label("hit").unwrap();
    assert_eq!(hit, Position::new(2, 1));
    let frame = movie.frame(hit).unwrap();
    assert_eq!(frame.stream().unwrap().sound, "theme");
    assert_eq!(frame.sound_events()[0].kind, SoundEventKind::Stop);
    assert_eq!(frame.placed_objects()[0].character_id, 7);
}

#[test]
fn duplicate_sound_keys_are_rejected() {
    let res = MovieBuilder::new(fps10(), stage())
        .sound("a", sound_definition("a.wav", 8_000))
        .unwrap()
        .sound("a", sound_definition("b.wav", 8_000));
    assert!(res.is_err());
}

#[test]
fn builder_with_no_scenes_fails_validation() {
    let err = MovieBuilder::new(fps10(), stage()).build().unwrap_err();
    assert!(matches!(err, SyncError::EmptyMovie));
}

#[test]
fn sound_definition_maps_blocks_one_to_one() {
    let sound = sound_definition("x.wav", 48_000);
    assert_eq!(sound.block_to_sample(1234), 1234);
    assert_eq!(sound.duration_secs(), None);
}

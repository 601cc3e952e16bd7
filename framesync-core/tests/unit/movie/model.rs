use super::*;
use crate::foundation::core::Affine;

fn frames(n: usize) -> Vec<FrameDef> {
    (0..n).map(|_| FrameDef::default()).collect()
}

fn def_with(scenes: Vec<SceneDef>) -> MovieDef {
    let mut sounds = BTreeMap::new();
    sounds.insert(
        "music".to_string(),
        SoundDefinition {
            source: "music.mp3".to_string(),
            sample_rate: 44_100,
            channels: 2,
            samples_per_block: 4_410,
            sample_count: Some(441_000),
        },
    );
    MovieDef {
        fps: Fps::new(10, 1).unwrap(),
        canvas: Canvas {
            width: 320,
            height: 240,
        },
        background: Rgba8::WHITE,
        sounds,
        scenes,
    }
}

fn two_scenes() -> Movie {
    Movie::from_def(def_with(vec![
        SceneDef {
            name: Some("intro".to_string()),
            frames: frames(10),
        },
        SceneDef {
            name: None,
            frames: frames(5),
        },
    ]))
    .unwrap()
}

fn object(depth: u16) -> PlacedObject {
    PlacedObject {
        depth,
        character_id: depth * 10,
        transform: Affine::IDENTITY,
        name: None,
    }
}

#[test]
fn empty_movie_is_rejected() {
    let err = Movie::from_def(def_with(vec![])).unwrap_err();
    assert!(matches!(err, SyncError::EmptyMovie));
}

#[test]
fn empty_scene_reports_its_index() {
    let err = Movie::from_def(def_with(vec![
        SceneDef {
            name: None,
            frames: frames(2),
        },
        SceneDef::default(),
    ]))
    .unwrap_err();
    assert!(matches!(err, SyncError::EmptyScene { scene: 2 }));
}

#[test]
fn placed_objects_are_sorted_by_depth() {
    let frame = FrameDef {
        placed_objects: vec![object(7), object(1), object(4)],
        ..FrameDef::default()
    };
    let movie = Movie::from_def(def_with(vec![SceneDef {
        name: None,
        frames: vec![frame],
    }]))
    .unwrap();

    let f = movie.frame(Position::START).unwrap();
    let depths: Vec<u16> = f.placed_objects().iter().map(|o| o.depth).collect();
    assert_eq!(depths, vec![1, 4, 7]);
    assert_eq!(f.placed_object_at_depth(4).unwrap().character_id, 40);
    assert!(f.placed_object_at_depth(5).is_none());
}

#[test]
fn duplicate_depths_are_rejected() {
    let frame = FrameDef {
        placed_objects: vec![object(3), object(3)],
        ..FrameDef::default()
    };
    let err = Movie::from_def(def_with(vec![SceneDef {
        name: None,
        frames: vec![frame],
    }]))
    .unwrap_err();
    assert!(err.to_string().contains("depth 3"));
}

#[test]
fn sound_events_are_sorted_by_offset() {
    let ev = |offset: f64| SoundEvent {
        offset,
        kind: SoundEventKind::Start,
        sound: Some("music".to_string()),
        loop_count: 0,
    };
    let frame = FrameDef {
        sound_events: vec![ev(0.5), ev(0.0), ev(0.2)],
        ..FrameDef::default()
    };
    let movie = Movie::from_def(def_with(vec![SceneDef {
        name: None,
        frames: vec![frame],
    }]))
    .unwrap();
    let offsets: Vec<f64> = movie
        .frame(Position::START)
        .unwrap()
        .sound_events()
        .iter()
        .map(|e| e.offset)
        .collect();
    assert_eq!(offsets, vec![0.0, 0.2, 0.5]);
}

#[test]
fn unknown_sound_references_are_rejected() {
    let streamed = FrameDef {
        stream: Some(StreamBlock {
            sound: "nope".to_string(),
            block_index: 0,
        }),
        ..FrameDef::default()
    };
    assert!(
        Movie::from_def(def_with(vec![SceneDef {
            name: None,
            frames: vec![streamed],
        }]))
        .is_err()
    );

    let triggered = FrameDef {
        sound_events: vec![SoundEvent {
            offset: 0.0,
            kind: SoundEventKind::Stop,
            sound: None,
            loop_count: 0,
        }],
        ..FrameDef::default()
    };
    assert!(
        Movie::from_def(def_with(vec![SceneDef {
            name: None,
            frames: vec![triggered],
        }]))
        .is_err()
    );
}

#[test]
fn event_offsets_must_be_within_frame() {
    let frame = FrameDef {
        sound_events: vec![SoundEvent {
            offset: 1.0,
            kind: SoundEventKind::StopAll,
            sound: None,
            loop_count: 0,
        }],
        ..FrameDef::default()
    };
    let err = Movie::from_def(def_with(vec![SceneDef {
        name: None,
        frames: vec![frame],
    }]))
    .unwrap_err();
    assert!(err.to_string().contains("[0, 1)"));
}

#[test]
fn zero_sample_rate_is_rejected() {
    let mut def = def_with(vec![SceneDef {
        name: None,
        frames: frames(1),
    }]);
    def.sounds.get_mut("music").unwrap().sample_rate = 0;
    assert!(Movie::from_def(def).is_err());
}

#[test]
fn ordinals_cross_scene_boundaries() {
    let movie = two_scenes();
    assert_eq!(movie.total_frames(), 15);
    assert_eq!(movie.ordinal_of(Position::new(2, 3)), Some(12));
    assert_eq!(movie.position_at_ordinal(12), Some(Position::new(2, 3)));
    assert_eq!(movie.position_at_ordinal(15), None);
    assert_eq!(movie.ordinal_of(Position::new(2, 6)), None);
    assert_eq!(movie.last_position(), Position::new(2, 5));
}

#[test]
fn next_position_wraps_only_when_looping() {
    let movie = two_scenes();
    assert_eq!(
        movie.next_position(Position::new(1, 10), false),
        Some(Position::new(2, 1))
    );
    assert_eq!(movie.next_position(Position::new(2, 5), false), None);
    assert_eq!(
        movie.next_position(Position::new(2, 5), true),
        Some(Position::START)
    );
}

#[test]
fn labels_resolve_to_first_match() {
    let mut scene_b = frames(5);
    scene_b[2].label = Some("chorus".to_string());
    scene_b[4].label = Some("chorus".to_string());
    let movie = Movie::from_def(def_with(vec![
        SceneDef {
            name: None,
            frames: frames(3),
        },
        SceneDef {
            name: None,
            frames: scene_b,
        },
    ]))
    .unwrap();
    assert_eq!(movie.position_of_label("chorus"), Some(Position::new(2, 3)));
    assert_eq!(movie.position_of_label("verse"), None);
}

#[test]
fn back_references_resolve_and_clear() {
    let movie = two_scenes();
    let frame = movie.frame(Position::new(2, 4)).unwrap();
    assert_eq!(frame.index1_in_scene(), 4);
    assert_eq!(movie.scene_of(frame).unwrap().index1(), 2);
    assert_eq!(movie.scene(1).unwrap().movie_id(), Some(movie.id()));

    let other = two_scenes();
    assert!(other.scene_of(frame).is_none());

    let scenes = movie.into_scenes();
    assert_eq!(scenes.len(), 2);
    for scene in &scenes {
        assert!(scene.movie_id().is_none());
        assert!(scene.frames().iter().all(|f| f.scene_link().is_none()));
    }
}

#[test]
fn stream_origin_finds_latest_earlier_block() {
    let mut fs = frames(6);
    fs[1].stream = Some(StreamBlock {
        sound: "music".to_string(),
        block_index: 0,
    });
    fs[3].stream = Some(StreamBlock {
        sound: "music".to_string(),
        block_index: 2,
    });
    let movie = Movie::from_def(def_with(vec![SceneDef {
        name: None,
        frames: fs,
    }]))
    .unwrap();
    let scene = movie.scene(1).unwrap();
    assert!(scene.has_stream_sound());
    assert!(scene.stream_origin(1).is_none());
    assert_eq!(scene.stream_origin(3).unwrap().0, 2);
    let (at, block) = scene.stream_origin(6).unwrap();
    assert_eq!(at, 4);
    assert_eq!(block.block_index, 2);
}

#[test]
fn clones_get_their_own_identity() {
    let movie = two_scenes();
    let copy = movie.clone();
    assert_ne!(copy.id(), movie.id());
    assert_eq!(copy.scene(2).unwrap().movie_id(), Some(copy.id()));

    let original_frame = movie.frame(Position::new(2, 4)).unwrap();
    let copied_frame = copy.frame(Position::new(2, 4)).unwrap();
    assert!(copy.scene_of(original_frame).is_none());
    assert!(movie.scene_of(copied_frame).is_none());
    assert_eq!(copy.scene_of(copied_frame).unwrap().index1(), 2);
}

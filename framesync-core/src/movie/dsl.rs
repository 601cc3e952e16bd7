use std::collections::BTreeMap;

use crate::{
    foundation::core::{Affine, Canvas, Fps, Rgba8},
    foundation::error::{SyncError, SyncResult},
    movie::def::{
        FrameDef, MovieDef, PlacedObject, SceneDef, SoundDefinition, SoundEvent, SoundEventKind,
        StreamBlock,
    },
    movie::model::Movie,
};

/// Programmatic movie construction, validated on [`MovieBuilder::build`].
pub struct MovieBuilder {
    fps: Fps,
    canvas: Canvas,
    background: Rgba8,
    sounds: BTreeMap<String, SoundDefinition>,
    scenes: Vec<SceneDef>,
}

impl MovieBuilder {
    /// Start a movie with the given frame rate and stage size.
    pub fn new(fps: Fps, canvas: Canvas) -> Self {
        Self {
            fps,
            canvas,
            background: Rgba8::WHITE,
            sounds: BTreeMap::new(),
            scenes: Vec::new(),
        }
    }

    /// Set the stage background color.
    pub fn background(mut self, color: Rgba8) -> Self {
        self.background = color;
        self
    }

    /// Register a sound asset under `key`.
    pub fn sound(mut self, key: impl Into<String>, sound: SoundDefinition) -> SyncResult<Self> {
        let key = key.into();
        if self.sounds.contains_key(&key) {
            return Err(SyncError::validation(format!("duplicate sound key '{key}'")));
        }
        self.sounds.insert(key, sound);
        Ok(self)
    }

    /// Append a scene.
    pub fn scene(mut self, scene: SceneDef) -> Self {
        self.scenes.push(scene);
        self
    }

    /// Validate and build the movie.
    pub fn build(self) -> SyncResult<Movie> {
        Movie::from_def(MovieDef {
            fps: self.fps,
            canvas: self.canvas,
            background: self.background,
            sounds: self.sounds,
            scenes: self.scenes,
        })
    }
}

/// Scene construction helper.
#[derive(Default)]
pub struct SceneBuilder {
    name: Option<String>,
    frames: Vec<FrameDef>,
}

impl SceneBuilder {
    /// Start an empty scene.
    pub fn new() -> Self {
        Self::default()
    }

    /// Name the scene.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Append one frame.
    pub fn frame(mut self, frame: FrameDef) -> Self {
        self.frames.push(frame);
        self
    }

    /// Append `count` frames with no content.
    pub fn blank_frames(mut self, count: usize) -> Self {
        self.frames.extend(std::iter::repeat_with(FrameDef::default).take(count));
        self
    }

    /// Finish the scene definition.
    pub fn build(self) -> SceneDef {
        SceneDef {
            name: self.name,
            frames: self.frames,
        }
    }
}

/// Frame construction helper.
#[derive(Default)]
pub struct FrameBuilder {
    def: FrameDef,
}

impl FrameBuilder {
    /// Start an empty frame.
    pub fn new() -> Self {
        Self::default()
    }

    /// Label the frame.
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.def.label = Some(label.into());
        self
    }

    /// Place `character_id` at `depth` with `transform`.
    pub fn place(mut self, depth: u16, character_id: u16, transform: Affine) -> Self {
        self.def.placed_objects.push(PlacedObject {
            depth,
            character_id,
            transform,
            name: None,
        });
        self
    }

    /// Attach a stream-sound block.
    pub fn stream(mut self, sound: impl Into<String>, block_index: u64) -> Self {
        self.def.stream = Some(StreamBlock {
            sound: sound.into(),
            block_index,
        });
        self
    }

    /// Add a discrete sound event.
    pub fn event(mut self, event: SoundEvent) -> Self {
        self.def.sound_events.push(event);
        self
    }

    /// Finish the frame definition.
    pub fn build(self) -> FrameDef {
        self.def
    }
}

/// A sound definition with one sample per stream block.
pub fn sound_definition(source: impl Into<String>, sample_rate: u32) -> SoundDefinition {
    SoundDefinition {
        source: source.into(),
        sample_rate,
        channels: 2,
        samples_per_block: 1,
        sample_count: None,
    }
}

/// A [`SoundEventKind::Start`] event for `sound` at `offset`.
pub fn start_sound(offset: f64, sound: impl Into<String>) -> SoundEvent {
    SoundEvent {
        offset,
        kind: SoundEventKind::Start,
        sound: Some(sound.into()),
        loop_count: 0,
    }
}

/// A [`SoundEventKind::Stop`] event for `sound` at `offset`.
pub fn stop_sound(offset: f64, sound: impl Into<String>) -> SoundEvent {
    SoundEvent {
        offset,
        kind: SoundEventKind::Stop,
        sound: Some(sound.into()),
        loop_count: 0,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/movie/dsl.rs"]
mod tests;

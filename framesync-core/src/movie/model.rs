use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::{
    foundation::core::{Canvas, Fps, Position, Rgba8},
    foundation::error::{SyncError, SyncResult},
    movie::def::{
        FrameDef, MovieDef, PlacedObject, SceneDef, SoundDefinition, SoundEvent, SoundEventKind,
        StreamBlock,
    },
};

static NEXT_MOVIE_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of a built [`Movie`].
///
/// Scenes and frames refer back to their owner through this id instead of a pointer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MovieId(u64);

impl MovieId {
    fn next() -> Self {
        Self(NEXT_MOVIE_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// Non-owning link from a frame to its scene.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SceneLink {
    /// Owning movie.
    pub movie: MovieId,
    /// 1-based index of the owning scene within the movie.
    pub scene: usize,
}

/// One displayable instant of a scene.
#[derive(Clone, Debug)]
pub struct Frame {
    scene: Option<SceneLink>,
    index1_in_scene: usize,
    label: Option<String>,
    placed_objects: Vec<PlacedObject>,
    stream: Option<StreamBlock>,
    sound_events: Vec<SoundEvent>,
}

impl Frame {
    /// Frame label, if the author gave one.
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// Owning scene link; `None` once back-references were cleared.
    pub fn scene_link(&self) -> Option<SceneLink> {
        self.scene
    }

    /// 1-based index of this frame within its scene.
    pub fn index1_in_scene(&self) -> usize {
        self.index1_in_scene
    }

    /// Placed objects sorted by ascending depth.
    pub fn placed_objects(&self) -> &[PlacedObject] {
        &self.placed_objects
    }

    /// Look up the object placed at `depth`.
    pub fn placed_object_at_depth(&self, depth: u16) -> Option<&PlacedObject> {
        self.placed_objects
            .binary_search_by_key(&depth, |o| o.depth)
            .ok()
            .map(|i| &self.placed_objects[i])
    }

    /// Stream-sound attachment starting at this frame.
    pub fn stream(&self) -> Option<&StreamBlock> {
        self.stream.as_ref()
    }

    /// Sound events sorted by ascending offset.
    pub fn sound_events(&self) -> &[SoundEvent] {
        &self.sound_events
    }

    /// Drop the link to the owning scene.
    pub fn clear_back_references(&mut self) {
        self.scene = None;
    }
}

/// An ordered run of frames; the unit of looping and scene bookkeeping.
#[derive(Clone, Debug)]
pub struct Scene {
    movie: Option<MovieId>,
    index1: usize,
    name: Option<String>,
    frames: Vec<Frame>,
}

impl Scene {
    /// Owning movie; `None` once back-references were cleared.
    pub fn movie_id(&self) -> Option<MovieId> {
        self.movie
    }

    /// 1-based index of this scene within its movie.
    pub fn index1(&self) -> usize {
        self.index1
    }

    /// Scene name, if any.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Frames in display order.
    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    /// Number of frames; always at least one.
    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    /// Frame at a 1-based index.
    pub fn frame(&self, index1: usize) -> Option<&Frame> {
        index1.checked_sub(1).and_then(|i| self.frames.get(i))
    }

    /// Return `true` when any frame of this scene carries a stream sound.
    pub fn has_stream_sound(&self) -> bool {
        self.frames.iter().any(|f| f.stream.is_some())
    }

    /// Latest frame at or before `index1` that carries a stream block, with its 1-based index.
    pub fn stream_origin(&self, index1: usize) -> Option<(usize, &StreamBlock)> {
        let upto = index1.min(self.frames.len());
        self.frames[..upto]
            .iter()
            .enumerate()
            .rev()
            .find_map(|(i, f)| f.stream.as_ref().map(|s| (i + 1, s)))
    }

    // Point still-linked back-references at `movie`; cleared links stay cleared.
    fn relink(&mut self, movie: MovieId) {
        if self.movie.is_some() {
            self.movie = Some(movie);
        }
        for link in self.frames.iter_mut().filter_map(|f| f.scene.as_mut()) {
            link.movie = movie;
        }
    }

    /// Drop the link to the owning movie and every frame's link to this scene.
    pub fn clear_back_references(&mut self) {
        self.movie = None;
        for frame in &mut self.frames {
            frame.clear_back_references();
        }
    }
}

/// The top-level playable asset: ordered scenes plus the sound asset table.
///
/// A movie is immutable once built; share it across the driver and renderers with `Arc<Movie>`.
/// A clone is a distinct movie with its own [`MovieId`].
#[derive(Debug)]
pub struct Movie {
    id: MovieId,
    fps: Fps,
    canvas: Canvas,
    background: Rgba8,
    sounds: BTreeMap<String, SoundDefinition>,
    scenes: Vec<Scene>,
    total_frames: u64,
}

impl Clone for Movie {
    fn clone(&self) -> Self {
        let id = MovieId::next();
        let mut scenes = self.scenes.clone();
        for scene in &mut scenes {
            scene.relink(id);
        }
        Self {
            id,
            fps: self.fps,
            canvas: self.canvas,
            background: self.background,
            sounds: self.sounds.clone(),
            scenes,
            total_frames: self.total_frames,
        }
    }
}

impl Movie {
    /// Validate a definition and build the runtime graph.
    #[tracing::instrument(level = "debug", skip(def), fields(scenes = def.scenes.len()))]
    pub fn from_def(def: MovieDef) -> SyncResult<Self> {
        let fps = Fps::new(def.fps.num, def.fps.den)?;
        if def.scenes.is_empty() {
            return Err(SyncError::EmptyMovie);
        }
        for (key, sound) in &def.sounds {
            validate_sound(key, sound)?;
        }

        let id = MovieId::next();
        let mut scenes = Vec::with_capacity(def.scenes.len());
        let mut total_frames = 0u64;
        for (i, scene_def) in def.scenes.into_iter().enumerate() {
            let scene = build_scene(id, i + 1, scene_def, &def.sounds)?;
            total_frames += scene.frames.len() as u64;
            scenes.push(scene);
        }

        Ok(Self {
            id,
            fps,
            canvas: def.canvas,
            background: def.background,
            sounds: def.sounds,
            scenes,
            total_frames,
        })
    }

    /// Parse and build a movie from a JSON reader.
    pub fn from_reader<R: std::io::Read>(r: R) -> SyncResult<Self> {
        let def: MovieDef = serde_json::from_reader(r)
            .map_err(|e| SyncError::serde(format!("parse movie JSON: {e}")))?;
        Self::from_def(def)
    }

    /// Parse and build a movie from a JSON file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> SyncResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            SyncError::Other(anyhow::anyhow!("open movie JSON '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    /// Identity used by scene and frame back-references.
    pub fn id(&self) -> MovieId {
        self.id
    }

    /// Author-specified frame rate.
    pub fn fps(&self) -> Fps {
        self.fps
    }

    /// Stage dimensions.
    pub fn canvas(&self) -> Canvas {
        self.canvas
    }

    /// Stage background color.
    pub fn background(&self) -> Rgba8 {
        self.background
    }

    /// Scenes in playback order.
    pub fn scenes(&self) -> &[Scene] {
        &self.scenes
    }

    /// Scene at a 1-based index.
    pub fn scene(&self, index1: usize) -> Option<&Scene> {
        index1.checked_sub(1).and_then(|i| self.scenes.get(i))
    }

    /// Frame at `pos`.
    pub fn frame(&self, pos: Position) -> Option<&Frame> {
        self.scene(pos.scene)?.frame(pos.frame)
    }

    /// Sound definition by key.
    pub fn sound(&self, key: &str) -> Option<&SoundDefinition> {
        self.sounds.get(key)
    }

    /// The whole sound asset table.
    pub fn sounds(&self) -> &BTreeMap<String, SoundDefinition> {
        &self.sounds
    }

    /// Return `true` when `pos` names an existing frame.
    pub fn contains(&self, pos: Position) -> bool {
        self.frame(pos).is_some()
    }

    /// Frame count summed over all scenes.
    pub fn total_frames(&self) -> u64 {
        self.total_frames
    }

    /// Final frame of the final scene.
    pub fn last_position(&self) -> Position {
        let scene = self.scenes.len();
        Position::new(scene, self.scenes[scene - 1].frames.len())
    }

    /// 0-based linear index of `pos` across all scenes.
    pub fn ordinal_of(&self, pos: Position) -> Option<u64> {
        if !self.contains(pos) {
            return None;
        }
        let before: u64 = self.scenes[..pos.scene - 1]
            .iter()
            .map(|s| s.frames.len() as u64)
            .sum();
        Some(before + (pos.frame as u64 - 1))
    }

    /// Position at a 0-based linear index across all scenes.
    pub fn position_at_ordinal(&self, ordinal: u64) -> Option<Position> {
        let mut rest = ordinal;
        for scene in &self.scenes {
            let len = scene.frames.len() as u64;
            if rest < len {
                return Some(Position::new(scene.index1, rest as usize + 1));
            }
            rest -= len;
        }
        None
    }

    /// Position following `pos`, crossing into the next scene when needed.
    ///
    /// At the final frame this wraps to [`Position::START`] when `looping`, otherwise returns `None`.
    pub fn next_position(&self, pos: Position, looping: bool) -> Option<Position> {
        let scene = self.scene(pos.scene)?;
        if pos.frame < scene.frames.len() {
            return Some(Position::new(pos.scene, pos.frame + 1));
        }
        if pos.scene < self.scenes.len() {
            return Some(Position::new(pos.scene + 1, 1));
        }
        looping.then_some(Position::START)
    }

    /// First frame carrying `label`, in playback order.
    pub fn position_of_label(&self, label: &str) -> Option<Position> {
        self.scenes.iter().find_map(|scene| {
            scene
                .frames
                .iter()
                .position(|f| f.label.as_deref() == Some(label))
                .map(|i| Position::new(scene.index1, i + 1))
        })
    }

    /// Resolve a frame's owning scene, if the frame still links into this movie.
    pub fn scene_of(&self, frame: &Frame) -> Option<&Scene> {
        let link = frame.scene?;
        if link.movie != self.id {
            return None;
        }
        self.scene(link.scene)
    }

    /// Clear every scene and frame back-reference.
    pub fn clear_back_references(&mut self) {
        for scene in &mut self.scenes {
            scene.clear_back_references();
        }
    }

    /// Tear the movie down into its scenes, clearing back-references first.
    pub fn into_scenes(mut self) -> Vec<Scene> {
        self.clear_back_references();
        std::mem::take(&mut self.scenes)
    }
}

fn validate_sound(key: &str, sound: &SoundDefinition) -> SyncResult<()> {
    if key.trim().is_empty() {
        return Err(SyncError::validation("sound key must be non-empty"));
    }
    if sound.sample_rate == 0 {
        return Err(SyncError::validation(format!(
            "sound '{key}' sample_rate must be > 0"
        )));
    }
    if sound.samples_per_block == 0 {
        return Err(SyncError::validation(format!(
            "sound '{key}' samples_per_block must be > 0"
        )));
    }
    if sound.channels == 0 {
        return Err(SyncError::validation(format!(
            "sound '{key}' channels must be > 0"
        )));
    }
    Ok(())
}

fn build_scene(
    movie: MovieId,
    index1: usize,
    def: SceneDef,
    sounds: &BTreeMap<String, SoundDefinition>,
) -> SyncResult<Scene> {
    if def.frames.is_empty() {
        return Err(SyncError::EmptyScene { scene: index1 });
    }
    let link = SceneLink {
        movie,
        scene: index1,
    };
    let frames = def
        .frames
        .into_iter()
        .enumerate()
        .map(|(i, f)| build_frame(link, i + 1, f, sounds))
        .collect::<SyncResult<Vec<_>>>()?;

    Ok(Scene {
        movie: Some(movie),
        index1,
        name: def.name,
        frames,
    })
}

fn build_frame(
    link: SceneLink,
    index1: usize,
    def: FrameDef,
    sounds: &BTreeMap<String, SoundDefinition>,
) -> SyncResult<Frame> {
    let at = Position::new(link.scene, index1);

    let mut placed_objects = def.placed_objects;
    placed_objects.sort_by_key(|o| o.depth);
    if let Some(w) = placed_objects.windows(2).find(|w| w[0].depth == w[1].depth) {
        return Err(SyncError::validation(format!(
            "frame {at} places two objects at depth {}",
            w[0].depth
        )));
    }

    if let Some(stream) = &def.stream
        && !sounds.contains_key(&stream.sound)
    {
        return Err(SyncError::validation(format!(
            "frame {at} streams missing sound '{}'",
            stream.sound
        )));
    }

    let mut sound_events = def.sound_events;
    for ev in &sound_events {
        if !ev.offset.is_finite() || !(0.0..1.0).contains(&ev.offset) {
            return Err(SyncError::validation(format!(
                "frame {at} sound event offset must be in [0, 1)"
            )));
        }
        match (&ev.sound, ev.kind) {
            (None, SoundEventKind::StopAll) => {}
            (None, _) => {
                return Err(SyncError::validation(format!(
                    "frame {at} sound event of kind {:?} needs a sound",
                    ev.kind
                )));
            }
            (Some(key), _) if !sounds.contains_key(key) => {
                return Err(SyncError::validation(format!(
                    "frame {at} triggers missing sound '{key}'"
                )));
            }
            (Some(_), _) => {}
        }
    }
    sound_events.sort_by(|a, b| a.offset.total_cmp(&b.offset));

    Ok(Frame {
        scene: Some(link),
        index1_in_scene: index1,
        label: def.label,
        placed_objects,
        stream: def.stream,
        sound_events,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/movie/model.rs"]
mod tests;

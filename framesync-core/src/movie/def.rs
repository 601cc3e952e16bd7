use std::collections::BTreeMap;

use crate::foundation::core::{Affine, Canvas, Fps, Rgba8};

/// JSON-facing movie description, as handed over by a movie-loading collaborator.
///
/// A `MovieDef` is not trusted: [`crate::Movie::from_def`] validates it and builds the immutable
/// runtime graph.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct MovieDef {
    /// Author-specified frame rate.
    pub fps: Fps,
    /// Stage dimensions.
    pub canvas: Canvas,
    /// Stage background color.
    #[serde(default)]
    pub background: Rgba8,
    /// Sound asset table keyed by stable user-facing keys.
    #[serde(default)]
    pub sounds: BTreeMap<String, SoundDefinition>,
    /// Ordered scenes.
    pub scenes: Vec<SceneDef>,
}

/// One scene of a [`MovieDef`].
#[derive(Clone, Debug, Default, serde::Serialize, serde::Deserialize)]
pub struct SceneDef {
    /// Optional scene name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Ordered frames.
    pub frames: Vec<FrameDef>,
}

/// One frame of a [`SceneDef`].
#[derive(Clone, Debug, Default, serde::Serialize, serde::Deserialize)]
pub struct FrameDef {
    /// Optional frame label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Placed objects; sorted by depth at build time, depths must be unique.
    #[serde(default)]
    pub placed_objects: Vec<PlacedObject>,
    /// Stream-sound attachment beginning at this frame.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stream: Option<StreamBlock>,
    /// Discrete sound triggers; sorted by offset at build time.
    #[serde(default)]
    pub sound_events: Vec<SoundEvent>,
}

/// A renderable item positioned at a depth within a frame.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PlacedObject {
    /// Stacking depth; higher depths draw on top.
    pub depth: u16,
    /// Identifier of the character (shape, sprite, text) placed at this depth.
    pub character_id: u16,
    /// Placement transform.
    #[serde(default = "identity")]
    pub transform: Affine,
    /// Optional instance name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

fn identity() -> Affine {
    Affine::IDENTITY
}

/// Decodable audio asset, opaque to the engine apart from its timing parameters.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SoundDefinition {
    /// Opaque source key the audio collaborator resolves.
    pub source: String,
    /// Playback sample rate in Hz.
    pub sample_rate: u32,
    /// Channel count.
    #[serde(default = "default_channels")]
    pub channels: u16,
    /// Samples per stream block; stream block indices are multiplied by this.
    #[serde(default = "default_samples_per_block")]
    pub samples_per_block: u32,
    /// Total sample count, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sample_count: Option<u64>,
}

fn default_channels() -> u16 {
    2
}

fn default_samples_per_block() -> u32 {
    1
}

impl SoundDefinition {
    /// Sample offset at which stream block `block_index` begins.
    pub fn block_to_sample(&self, block_index: u64) -> u64 {
        block_index.saturating_mul(u64::from(self.samples_per_block))
    }

    /// Duration in seconds, when the sample count is known.
    pub fn duration_secs(&self) -> Option<f64> {
        let count = self.sample_count?;
        Some((count as f64) / f64::from(self.sample_rate.max(1)))
    }
}

/// Stream-sound attachment of a frame.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct StreamBlock {
    /// Key into [`MovieDef::sounds`].
    pub sound: String,
    /// Stream block index at which this frame begins.
    pub block_index: u64,
}

/// Kind of a discrete sound trigger.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SoundEventKind {
    /// Start playing the referenced sound.
    Start,
    /// Stop every instance of the referenced sound.
    Stop,
    /// Stop all event sounds.
    StopAll,
}

/// A discrete audio trigger scheduled within a frame.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SoundEvent {
    /// Trigger offset within the frame, as a fraction of one frame in `[0, 1)`.
    #[serde(default)]
    pub offset: f64,
    /// Event type.
    pub kind: SoundEventKind,
    /// Key into [`MovieDef::sounds`]; required except for [`SoundEventKind::StopAll`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sound: Option<String>,
    /// How many times a started sound repeats (`0` and `1` both play once).
    #[serde(default)]
    pub loop_count: u16,
}

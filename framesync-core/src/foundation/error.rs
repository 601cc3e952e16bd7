/// Convenience result type used across framesync.
pub type SyncResult<T> = Result<T, SyncError>;

/// Top-level error taxonomy used by engine APIs.
///
/// Structural problems (`OutOfRange`, `EmptyMovie`, `EmptyScene`, `Validation`) are caller contract
/// violations and fail fast. `AudioSyncUnavailable` is recoverable: the driver absorbs it and falls
/// back to wall-clock timing.
#[derive(thiserror::Error, Debug)]
pub enum SyncError {
    /// A seek or advance target does not exist in the movie, or cannot be reached.
    #[error("out of range: {0}")]
    OutOfRange(String),

    /// The audio subsystem cannot currently act as the playback clock.
    #[error("audio sync unavailable: {0}")]
    AudioSyncUnavailable(String),

    /// A movie definition contained zero scenes.
    #[error("movie must contain at least one scene")]
    EmptyMovie,

    /// A scene definition contained zero frames.
    #[error("scene {scene} must contain at least one frame")]
    EmptyScene {
        /// 1-based index of the offending scene.
        scene: usize,
    },

    /// Invalid user-provided or movie data.
    #[error("validation error: {0}")]
    Validation(String),

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl SyncError {
    /// Build a [`SyncError::OutOfRange`] value.
    pub fn out_of_range(msg: impl Into<String>) -> Self {
        Self::OutOfRange(msg.into())
    }

    /// Build a [`SyncError::AudioSyncUnavailable`] value.
    pub fn audio_unavailable(msg: impl Into<String>) -> Self {
        Self::AudioSyncUnavailable(msg.into())
    }

    /// Build a [`SyncError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`SyncError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }

    /// Return `true` for errors the driver recovers from without surfacing them.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::AudioSyncUnavailable(_))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;

use crate::{
    foundation::core::Position,
    foundation::error::{SyncError, SyncResult},
    movie::model::Movie,
};

/// Outcome of a single-frame [`Playhead::step`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Step {
    /// The playhead moved to `position`.
    Advanced {
        /// New position.
        position: Position,
        /// The move entered a different scene, or re-entered the only scene by wrapping.
        entered_scene: bool,
        /// The move wrapped from the final frame back to [`Position::START`].
        wrapped: bool,
    },
    /// The playhead sits on the final frame of a non-looping movie.
    End,
}

/// Current position within a movie plus playback bookkeeping.
///
/// A playhead does not own the movie; every movement takes the movie it walks over.
#[derive(Clone, Debug, PartialEq)]
pub struct Playhead {
    position: Position,
    elapsed: f64,
    playing: bool,
    looping: bool,
}

impl Playhead {
    /// A stopped playhead at scene 1, frame 1.
    pub fn new(looping: bool) -> Self {
        Self {
            position: Position::START,
            elapsed: 0.0,
            playing: false,
            looping,
        }
    }

    /// Current position.
    pub fn position(&self) -> Position {
        self.position
    }

    /// 1-based scene index.
    pub fn scene_index(&self) -> usize {
        self.position.scene
    }

    /// 1-based frame index within the current scene.
    pub fn frame_index(&self) -> usize {
        self.position.frame
    }

    /// Movie time in seconds played since the last seek or reset.
    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    /// Return `true` while the owning driver is playing.
    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// Return `true` when crossing the final frame wraps to the start.
    pub fn is_looping(&self) -> bool {
        self.looping
    }

    /// Enable or disable wrapping at the final frame.
    pub fn set_looping(&mut self, looping: bool) {
        self.looping = looping;
    }

    pub(crate) fn set_playing(&mut self, playing: bool) {
        self.playing = playing;
    }

    pub(crate) fn advance_elapsed(&mut self, secs: f64) {
        if secs.is_finite() && secs > 0.0 {
            self.elapsed += secs;
        }
    }

    /// Jump to `pos` without crossing intermediate frames; resets elapsed time.
    pub fn seek(&mut self, movie: &Movie, pos: Position) -> SyncResult<()> {
        if !movie.contains(pos) {
            return Err(SyncError::out_of_range(format!(
                "no frame at {pos} (movie has {} scenes)",
                movie.scenes().len()
            )));
        }
        self.position = pos;
        self.elapsed = 0.0;
        Ok(())
    }

    /// Return to scene 1, frame 1 with zero elapsed time, not playing.
    pub fn reset(&mut self) {
        self.position = Position::START;
        self.elapsed = 0.0;
        self.playing = false;
    }

    /// Move forward by exactly one frame.
    pub fn step(&mut self, movie: &Movie) -> Step {
        let Some(next) = movie.next_position(self.position, self.looping) else {
            return Step::End;
        };
        let wrapped = next < self.position;
        let entered_scene = wrapped || next.scene != self.position.scene;
        self.position = next;
        Step::Advanced {
            position: next,
            entered_scene,
            wrapped,
        }
    }

    /// Step forward until reaching `target`, returning every position crossed.
    ///
    /// The list excludes the starting position and includes `target`; it is empty when already
    /// there. Fails with [`SyncError::OutOfRange`] when `target` does not exist or cannot be
    /// reached moving forward, leaving the position unchanged.
    pub fn advance_to_frame(&mut self, movie: &Movie, target: Position) -> SyncResult<Vec<Position>> {
        if !movie.contains(target) {
            return Err(SyncError::out_of_range(format!("no frame at {target}")));
        }
        if target == self.position {
            return Ok(Vec::new());
        }
        if target < self.position && !self.looping {
            return Err(SyncError::out_of_range(format!(
                "{target} is behind {} and looping is disabled",
                self.position
            )));
        }

        let mut probe = self.clone();
        let mut crossed = Vec::new();
        while probe.position != target {
            match probe.step(movie) {
                Step::Advanced { position, .. } => crossed.push(position),
                Step::End => {
                    return Err(SyncError::out_of_range(format!(
                        "{target} is past the end of the movie"
                    )));
                }
            }
        }
        self.position = probe.position;
        Ok(crossed)
    }
}

impl Default for Playhead {
    fn default() -> Self {
        Self::new(false)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/playback/playhead.rs"]
mod tests;

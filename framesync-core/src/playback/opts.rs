/// Options controlling [`crate::PlaybackDriver`] behavior.
///
/// The frame rate is a property of the movie and is not configured here.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct PlaybackOpts {
    /// Wrap from the last frame of the last scene back to scene 1, frame 1.
    pub looping: bool,
    /// Supply renderers with a sub-frame weight toward the next frame.
    pub interpolates_frames: bool,
    /// When a tick lands several frames ahead, skip display notifications for intermediate frames.
    ///
    /// Sound events of skipped frames still fire, and scene-entry frames are still displayed.
    pub catch_up_on_dropped_ticks: bool,
    /// Rendering hint passed through to renderers untouched.
    pub uses_multiple_layers: bool,
    /// Rendering hint passed through to renderers untouched.
    pub shows_background_color: bool,
    /// Upper bound on frames crossed by one tick; any backlog carries over to later ticks.
    ///
    /// `None` crosses every due frame in the same tick.
    pub max_frames_per_tick: Option<u32>,
}

impl Default for PlaybackOpts {
    fn default() -> Self {
        Self {
            looping: false,
            interpolates_frames: false,
            catch_up_on_dropped_ticks: false,
            uses_multiple_layers: false,
            shows_background_color: true,
            max_frames_per_tick: None,
        }
    }
}

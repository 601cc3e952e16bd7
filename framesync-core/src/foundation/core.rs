use crate::foundation::error::{SyncError, SyncResult};

pub use kurbo::{Affine, Vec2};

// Absorbs float error when `secs * fps` lands a hair below an exact frame boundary
// (e.g. 0.7 * 10.0).
const FRAME_BOUNDARY_EPSILON: f64 = 1e-9;

/// A frame position inside a movie: 1-based scene index and 1-based frame index within that scene.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct Position {
    /// 1-based scene index within the movie.
    pub scene: usize,
    /// 1-based frame index within the scene.
    pub frame: usize,
}

impl Position {
    /// Scene 1, frame 1.
    pub const START: Position = Position { scene: 1, frame: 1 };

    /// Create a position from 1-based scene and frame indices.
    pub const fn new(scene: usize, frame: usize) -> Self {
        Self { scene, frame }
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.scene, self.frame)
    }
}

/// Frames-per-second represented as a rational `num/den`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Fps {
    /// Numerator (frames).
    pub num: u32,
    /// Denominator (seconds), must be non-zero.
    pub den: u32, // must be > 0
}

impl Fps {
    /// Create a validated FPS value.
    pub fn new(num: u32, den: u32) -> SyncResult<Self> {
        if den == 0 {
            return Err(SyncError::validation("Fps den must be > 0"));
        }
        if num == 0 {
            return Err(SyncError::validation("Fps num must be > 0"));
        }
        Ok(Self { num, den })
    }

    /// Convert to floating-point FPS.
    pub fn as_f64(self) -> f64 {
        f64::from(self.num) / f64::from(self.den)
    }

    /// Duration of one frame in seconds.
    pub fn frame_duration_secs(self) -> f64 {
        f64::from(self.den) / f64::from(self.num)
    }

    /// Convert frame count to seconds.
    pub fn frames_to_secs(self, frames: u64) -> f64 {
        (frames as f64) * self.frame_duration_secs()
    }

    /// Convert seconds to a whole frame count using floor semantics.
    ///
    /// Negative and non-finite inputs map to zero.
    pub fn secs_to_frames_floor(self, secs: f64) -> u64 {
        self.split_secs(secs).0
    }

    /// Split elapsed seconds into whole frames and the fractional progress toward the next one.
    ///
    /// The fraction is always in `[0, 1)`.
    pub fn split_secs(self, secs: f64) -> (u64, f64) {
        if !secs.is_finite() || secs <= 0.0 {
            return (0, 0.0);
        }
        let exact = secs * self.as_f64();
        let whole = (exact + FRAME_BOUNDARY_EPSILON).floor();
        let frac = (exact - whole).max(0.0);
        (whole as u64, if frac < 1.0 { frac } else { 0.0 })
    }
}

/// Stage dimensions in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Canvas {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

/// Straight-alpha RGBA8 color.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Rgba8 {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha channel.
    pub a: u8,
}

impl Rgba8 {
    /// Opaque white, the stage default.
    pub const WHITE: Rgba8 = Rgba8 {
        r: 255,
        g: 255,
        b: 255,
        a: 255,
    };

    /// Build a color from straight-alpha components.
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }
}

impl Default for Rgba8 {
    fn default() -> Self {
        Self::WHITE
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;

use crate::{
    foundation::core::Position,
    movie::model::{Frame, Scene},
};

/// Payload of the will-display and did-display notifications.
#[derive(Clone, Copy, Debug)]
pub struct FrameNotice<'a> {
    /// Position of the frame being displayed.
    pub position: Position,
    /// Owning scene.
    pub scene: &'a Scene,
    /// The frame itself.
    pub frame: &'a Frame,
}

/// Sub-frame progress toward the following frame.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct Interpolation {
    /// Fractional progress in `[0, 1)`.
    pub weight: f64,
    /// Frame the weight blends toward.
    pub next: Position,
}

/// Everything a renderer needs to draw one frame.
#[derive(Clone, Copy, Debug)]
pub struct RenderRequest<'a> {
    /// Position of the frame to draw.
    pub position: Position,
    /// The frame to draw.
    pub frame: &'a Frame,
    /// Blend toward the next frame; `None` unless interpolation is enabled and a next frame exists.
    pub interpolation: Option<Interpolation>,
    /// Pass-through rendering hint.
    pub uses_multiple_layers: bool,
    /// Pass-through rendering hint.
    pub shows_background_color: bool,
}

/// Observer slot for frame display notifications.
pub type FrameObserver = Box<dyn FnMut(&FrameNotice<'_>)>;

/// Renderer slot.
pub type Renderer = Box<dyn FnMut(&RenderRequest<'_>)>;

#[derive(Default)]
pub(crate) struct Observers {
    pub(crate) will_display: Option<FrameObserver>,
    pub(crate) render: Option<Renderer>,
    pub(crate) did_display: Option<FrameObserver>,
}

impl Observers {
    pub(crate) fn will_display(&mut self, notice: &FrameNotice<'_>) {
        if let Some(cb) = self.will_display.as_mut() {
            cb(notice);
        }
    }

    pub(crate) fn render(&mut self, req: &RenderRequest<'_>) {
        if let Some(cb) = self.render.as_mut() {
            cb(req);
        }
    }

    pub(crate) fn did_display(&mut self, notice: &FrameNotice<'_>) {
        if let Some(cb) = self.did_display.as_mut() {
            cb(notice);
        }
    }
}

impl std::fmt::Debug for Observers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Observers")
            .field("will_display", &self.will_display.is_some())
            .field("render", &self.render.is_some())
            .field("did_display", &self.did_display.is_some())
            .finish()
    }
}

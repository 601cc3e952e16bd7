pub(crate) mod clock;
pub(crate) mod driver;
pub(crate) mod observer;
pub(crate) mod opts;
pub(crate) mod playhead;

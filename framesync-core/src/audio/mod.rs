pub(crate) mod clock;
pub(crate) mod output;
pub(crate) mod sync;

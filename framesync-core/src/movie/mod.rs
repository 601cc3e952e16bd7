pub(crate) mod def;
pub(crate) mod dsl;
pub(crate) mod model;

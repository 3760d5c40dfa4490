// Domain layer: core models and ports (interfaces). No storage or runtime dependencies.

pub mod model;
pub mod ports;

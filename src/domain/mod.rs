// Domain layer: wire models and ports. No server or runtime dependencies here.

pub mod model;
pub mod ports;

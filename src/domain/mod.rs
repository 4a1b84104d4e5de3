// Domain layer: core models and ports. External APIs live behind the traits in `ports`.

pub mod model;
pub mod ports;

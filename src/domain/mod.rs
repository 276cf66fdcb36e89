// Domain layer: the format value type and the ports the adapters implement.

pub mod model;
pub mod ports;

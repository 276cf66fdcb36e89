// Adapters layer: the external schema records and the concrete servlet containers.

pub mod container;
pub mod schema;

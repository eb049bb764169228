// Domain layer: core models, the record schema and ports (interfaces).

pub mod model;
pub mod ports;
pub mod schema;

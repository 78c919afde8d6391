// Domain layer: unit model and the ports the selection engine talks through.

pub mod model;
pub mod ports;

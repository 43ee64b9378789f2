// Domain layer: entity models and the registry port. No transport concerns here.

pub mod model;
pub mod ports;

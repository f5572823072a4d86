// Domain layer: marketplace records, outbound events and the ports the core talks through.

pub mod events;
pub mod model;
pub mod ports;

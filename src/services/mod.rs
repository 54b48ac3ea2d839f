pub mod broadcast;
pub mod lifecycle;
pub mod relay;
pub mod transport;

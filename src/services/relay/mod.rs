pub mod admin_relay;

pub use admin_relay::{AdminRelay, RelayReport};

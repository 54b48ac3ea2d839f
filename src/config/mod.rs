pub mod settings;

pub use settings::{RelayConfirmation, Settings};

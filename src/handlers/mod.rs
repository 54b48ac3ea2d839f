pub mod direct_message;
pub mod event_handler;
pub mod interaction;

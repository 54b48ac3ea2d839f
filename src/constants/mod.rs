pub mod embeds;
pub mod messages;
pub mod timeouts;

pub mod scheduler;

pub use scheduler::{BroadcastScheduler, DeletionHandle, PendingDeletion, Published};

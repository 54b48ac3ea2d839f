pub mod memory;
pub mod models;
pub mod pool;
pub mod queries;
pub mod store;

pub use memory::MemoryConfigStore;
pub use store::{ConfigStore, PgConfigStore, StoreError};

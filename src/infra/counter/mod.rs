//! Rate-limit counter stores.

pub mod memory;
#[cfg(feature = "redis")]
pub mod redis;

pub use memory::InMemoryCounterStore;
#[cfg(feature = "redis")]
pub use self::redis::RedisCounterStore;

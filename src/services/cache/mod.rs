pub mod client;
#[cfg(test)]
pub mod memory;
pub mod valkey;

pub use client::{CacheClient, CacheError, CacheResult, ttl_seconds};
pub use valkey::ValkeyClient;

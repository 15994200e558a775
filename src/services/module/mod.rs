//! Module data access: cache-only getter and Postgres-backed setter.
mod cached;
pub mod getter;
pub mod setter;
pub mod types;

pub use getter::ModuleGetterLib;
pub use setter::ModuleSetterLib;
pub use types::{CacheKeys, ModuleError, ModuleGetter, ModuleRecord, ModuleResult, ModuleSetter};

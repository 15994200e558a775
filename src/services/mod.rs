pub mod cache;
pub mod module;

pub mod error;
pub mod module_repo;

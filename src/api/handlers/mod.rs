pub mod health;
pub mod modules;
pub mod root;

/*
 * Responsibility
 * - HTTP 層の公開インターフェース (routes() の re-export)
 * - envelope (response.rs) / DTO / extractor / handler を束ねる
 */
pub mod dto;
pub mod extractors;
pub mod handlers;
pub mod response;
mod routes;

pub use routes::routes;

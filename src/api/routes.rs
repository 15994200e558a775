/*
 * Responsibility
 * - URL 構造を定義 (全て GET, body は JSON)
 * - /, /health, /seed-one-byrandid, /seed-one-byuuid, /seed-many, /delete-many-byparticipant
 */
use axum::{Router, routing::get};

use crate::state::AppState;

use crate::api::handlers::{
    health::health,
    modules::{delete_many_by_participant, seed_many, seed_one_by_rand_id, seed_one_by_uuid},
    root::root,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/seed-one-byrandid", get(seed_one_by_rand_id))
        .route("/seed-one-byuuid", get(seed_one_by_uuid))
        .route("/seed-many", get(seed_many))
        .route("/delete-many-byparticipant", get(delete_many_by_participant))
}

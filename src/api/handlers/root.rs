/*
 * Responsibility
 * - GET / : development のときだけ診断用の文字列を返す
 * - production では "Not Found" を 200 のまま返す (既存クライアントの挙動を維持)
 */
use axum::extract::State;

use crate::state::AppState;

pub async fn root(State(state): State<AppState>) -> String {
    if state.app_env.is_production() {
        "Not Found".to_string()
    } else {
        format!("/submission: {}", state.app_env.as_str())
    }
}

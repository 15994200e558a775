/*
 * Responsibility
 * - 全エンドポイント共通の envelope {"status": bool, "message": string}
 * - status は HTTP ステータスが成功系 (200/201/202/204) のときだけ true
 * - entity 本体は返さない (存在確認のみ)
 */
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope {
    pub status: bool,
    pub message: String,
}

/// True exactly for the success family the envelope reports as `status: true`.
pub fn is_success_code(code: u16) -> bool {
    matches!(code, 200 | 201 | 202 | 204)
}

impl Envelope {
    pub fn new(code: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status: is_success_code(code.as_u16()),
            message: message.into(),
        }
    }
}

/// Write `code` and the envelope as a JSON body.
pub fn respond(code: StatusCode, message: impl Into<String>) -> Response {
    (code, Json(Envelope::new(code, message))).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use axum::http::header::CONTENT_TYPE;

    #[test]
    fn success_family_is_exactly_four_codes() {
        let successes: Vec<u16> = (0..=u16::MAX).filter(|c| is_success_code(*c)).collect();
        assert_eq!(successes, [200, 201, 202, 204]);
    }

    #[test]
    fn envelope_status_follows_http_code() {
        assert!(Envelope::new(StatusCode::NO_CONTENT, "x").status);
        assert!(!Envelope::new(StatusCode::PARTIAL_CONTENT, "x").status);
        assert!(!Envelope::new(StatusCode::NOT_FOUND, "x").status);
        assert!(!Envelope::new(StatusCode::INTERNAL_SERVER_ERROR, "x").status);
    }

    #[tokio::test]
    async fn respond_writes_status_and_json_body() {
        let res = respond(StatusCode::NOT_FOUND, "Module not found");

        assert_eq!(res.status(), StatusCode::NOT_FOUND);
        assert_eq!(res.headers()[CONTENT_TYPE], "application/json");

        let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(
            body,
            serde_json::json!({"status": false, "message": "Module not found"})
        );
    }
}

/*
 * Responsibility
 * - request body (JSON) を DTO として受け、必須フィールドを検証する
 * - 失敗時は DTO ごとの固定メッセージで 400 (ApiError::BadRequest)
 * - GET + body で呼ばれるため Content-Type は見ない
 */
use axum::{
    body::Bytes,
    extract::{FromRequest, Request},
};
use serde::de::DeserializeOwned;

use crate::api::dto::modules::{RequiredFields, first_missing};
use crate::error::ApiError;

#[derive(Debug)]
pub struct ValidBody<T>(pub T);

impl<S, T> FromRequest<S> for ValidBody<T>
where
    S: Send + Sync,
    T: DeserializeOwned + RequiredFields,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state).await.map_err(|rejection| {
            tracing::debug!(%rejection, "request body unreadable");
            ApiError::bad_request(T::MISSING_MESSAGE)
        })?;

        let body: T = serde_json::from_slice(&bytes).map_err(|e| {
            tracing::debug!(error = %e, "request body is not valid JSON");
            ApiError::bad_request(T::MISSING_MESSAGE)
        })?;

        if let Some(field) = first_missing(&body) {
            tracing::debug!(field, "required field missing");
            return Err(ApiError::bad_request(T::MISSING_MESSAGE));
        }

        Ok(Self(body))
    }
}

/*
 * Responsibility
 * - module 系 handler (seed-one-byrandid / seed-one-byuuid / seed-many / delete-many-byparticipant)
 * - ValidBody で DTO 検証 → getter/setter を 1 回だけ呼ぶ → envelope で返す
 * - 依存のエラーはここで HTTP に変換し、上には伝播させない
 */
use axum::{extract::State, http::StatusCode, response::Response};

use crate::{
    api::{
        dto::modules::{
            DeleteManyByParticipantRequest, SeedManyRequest, SeedOneByRandIdRequest,
            SeedOneByUuidRequest,
        },
        extractors::ValidBody,
        response::respond,
    },
    config::ErrorMessagePolicy,
    error::ApiError,
    services::module::ModuleError,
    state::AppState,
};

const FETCHED: &str = "Module fetched successfully";
const DELETED: &str = "Module deleted successfully";
const NOT_FOUND: &str = "Module not found";
const SEED_FAILED: &str = "Failed to seed modules";
const DELETE_FAILED: &str = "Failed to delete submissions";

fn failure_message(policy: ErrorMessagePolicy, err: &ModuleError, generic: &str) -> String {
    match policy {
        ErrorMessagePolicy::Raw => err.to_string(),
        ErrorMessagePolicy::Generic => generic.to_string(),
    }
}

fn log_lookup_failure(key: &str, err: &ModuleError) {
    if err.is_not_found() {
        tracing::debug!(key, "module not found");
    } else {
        tracing::warn!(key, error = %err, "module lookup failed");
    }
}

pub async fn seed_one_by_rand_id(
    State(state): State<AppState>,
    ValidBody(req): ValidBody<SeedOneByRandIdRequest>,
) -> Result<Response, ApiError> {
    // Existence check only; the record is not returned.
    state
        .getter
        .get_by_rand_id(&req.randid)
        .await
        .map_err(|e| {
            log_lookup_failure(&req.randid, &e);
            ApiError::not_found(NOT_FOUND)
        })?;

    Ok(respond(StatusCode::OK, FETCHED))
}

pub async fn seed_one_by_uuid(
    State(state): State<AppState>,
    ValidBody(req): ValidBody<SeedOneByUuidRequest>,
) -> Result<Response, ApiError> {
    state
        .setter
        .find_by_uuid(&req.uuid, true)
        .await
        .map_err(|e| {
            log_lookup_failure(&req.uuid, &e);
            ApiError::not_found(NOT_FOUND)
        })?;

    Ok(respond(StatusCode::OK, FETCHED))
}

pub async fn seed_many(
    State(state): State<AppState>,
    ValidBody(req): ValidBody<SeedManyRequest>,
) -> Result<Response, ApiError> {
    if !state.app_env.is_production() {
        tracing::debug!(body = ?req, "seed-many request");
    }

    let retrieved_length = req
        .retrieved_length()
        .ok_or_else(|| ApiError::bad_request("Invalid retrievedLength value"))?;

    state
        .setter
        .seed_linked(
            retrieved_length,
            &req.lastobjectidhex,
            &req.validlastuuid,
            &req.campaignuuid,
        )
        .await
        .map_err(|e| {
            tracing::error!(error = %e, campaign = %req.campaignuuid, "seed_linked failed");
            ApiError::internal(failure_message(state.seed_error_message, &e, SEED_FAILED))
        })?;

    // Same text as the single fetch endpoints; existing clients match on it.
    Ok(respond(StatusCode::OK, FETCHED))
}

pub async fn delete_many_by_participant(
    State(state): State<AppState>,
    ValidBody(req): ValidBody<DeleteManyByParticipantRequest>,
) -> Result<Response, ApiError> {
    let deleted = state
        .setter
        .delete_many_by_any_uuid(&req.uuid)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, uuid = %req.uuid, "delete_many_by_any_uuid failed");
            ApiError::internal(failure_message(
                state.delete_error_message,
                &e,
                DELETE_FAILED,
            ))
        })?;

    tracing::info!(uuid = %req.uuid, deleted, "modules deleted");

    Ok(respond(StatusCode::OK, DELETED))
}

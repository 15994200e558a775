/*
 * Responsibility
 * - modules テーブル向け SQLx 操作
 * - PgPool を受け取り lookup / campaign ページング / 一括削除を提供
 * - cache の整合は services::module 側の責務 (ここでは触らない)
 */
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::repos::error::RepoResult;

#[derive(Debug, Clone, FromRow)]
pub struct ModuleRow {
    #[sqlx(rename = "objectId")]
    pub object_id: i64,

    pub uuid: Uuid,

    #[sqlx(rename = "randId")]
    pub rand_id: String,

    #[sqlx(rename = "campaignUuid")]
    pub campaign_uuid: Uuid,

    #[sqlx(rename = "participantUuid")]
    pub participant_uuid: Uuid,

    pub payload: serde_json::Value,

    #[sqlx(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

/// Keys of a deleted row, enough to evict it from the cache.
#[derive(Debug, Clone, FromRow)]
pub struct DeletedModule {
    pub uuid: Uuid,

    #[sqlx(rename = "randId")]
    pub rand_id: String,

    #[sqlx(rename = "campaignUuid")]
    pub campaign_uuid: Uuid,
}

pub async fn find_by_uuid(db: &PgPool, uuid: Uuid) -> RepoResult<Option<ModuleRow>> {
    let row = sqlx::query_as::<_, ModuleRow>(
        r#"
        SELECT
            "objectId", uuid, "randId", "campaignUuid", "participantUuid", payload, "createdAt"
        FROM modules
        WHERE uuid = $1
        "#,
    )
    .bind(uuid)
    .fetch_optional(db)
    .await?;

    Ok(row)
}

pub async fn find_by_object_id(db: &PgPool, object_id: i64) -> RepoResult<Option<ModuleRow>> {
    let row = sqlx::query_as::<_, ModuleRow>(
        r#"
        SELECT
            "objectId", uuid, "randId", "campaignUuid", "participantUuid", payload, "createdAt"
        FROM modules
        WHERE "objectId" = $1
        "#,
    )
    .bind(object_id)
    .fetch_optional(db)
    .await?;

    Ok(row)
}

/// Next page of a campaign in insertion order.
///
/// `after = None` starts from the head of the campaign.
pub async fn list_campaign_after(
    db: &PgPool,
    campaign_uuid: Uuid,
    after: Option<i64>,
    limit: i64,
) -> RepoResult<Vec<ModuleRow>> {
    let rows = sqlx::query_as::<_, ModuleRow>(
        r#"
        SELECT
            "objectId", uuid, "randId", "campaignUuid", "participantUuid", payload, "createdAt"
        FROM modules
        WHERE "campaignUuid" = $1
          AND ($2::BIGINT IS NULL OR "objectId" > $2)
        ORDER BY "objectId" ASC
        LIMIT $3
        "#,
    )
    .bind(campaign_uuid)
    .bind(after)
    .bind(limit)
    .fetch_all(db)
    .await?;

    Ok(rows)
}

/// Delete every row where any of the uuid columns matches.
pub async fn delete_by_any_uuid(db: &PgPool, uuid: Uuid) -> RepoResult<Vec<DeletedModule>> {
    let rows = sqlx::query_as::<_, DeletedModule>(
        r#"
        DELETE FROM modules
        WHERE uuid = $1
           OR "participantUuid" = $1
           OR "campaignUuid" = $1
        RETURNING uuid, "randId", "campaignUuid"
        "#,
    )
    .bind(uuid)
    .fetch_all(db)
    .await?;

    Ok(rows)
}

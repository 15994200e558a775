use async_trait::async_trait;
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

use crate::repos::module_repo::{self, ModuleRow};
use crate::services::cache::CacheClient;
use crate::services::module::cached;
use crate::services::module::types::{
    CacheKeys, ModuleError, ModuleRecord, ModuleResult, ModuleSetter, parse_object_id_hex,
    parse_uuid,
};

/// Store-backed writer: owns consistency between Postgres and the cache.
#[derive(Clone)]
pub struct ModuleSetterLib<C: CacheClient> {
    db: PgPool,
    cache: Arc<C>,
    keys: CacheKeys,
    ttl: Duration,
    page_size: i64,
}

impl<C: CacheClient> ModuleSetterLib<C> {
    pub fn new(db: PgPool, cache: Arc<C>, keys: CacheKeys, ttl: Duration, page_size: i64) -> Self {
        Self {
            db,
            cache,
            keys,
            ttl,
            page_size,
        }
    }
}

/// Validated form of the `seed_linked` arguments.
#[derive(Debug, PartialEq, Eq)]
pub(crate) struct SeedCursor {
    pub retained: u64,
    // None => seed from the head of the campaign
    pub after: Option<(i64, Uuid)>,
    pub campaign_uuid: Uuid,
}

impl SeedCursor {
    pub(crate) fn parse(
        retrieved_length: i64,
        last_object_id_hex: &str,
        valid_last_uuid: &str,
        campaign_uuid: &str,
    ) -> ModuleResult<Self> {
        let retained = u64::try_from(retrieved_length)
            .map_err(|_| ModuleError::invalid("retrievedLength", retrieved_length.to_string()))?;
        let campaign_uuid = parse_uuid("campaignUUID", campaign_uuid)?;

        // A client with nothing retrieved has no meaningful cursor yet.
        let after = if retained == 0 {
            None
        } else {
            let object_id = parse_object_id_hex(last_object_id_hex)?;
            let last_uuid = parse_uuid("validLastUUID", valid_last_uuid)?;
            Some((object_id, last_uuid))
        };

        Ok(Self {
            retained,
            after,
            campaign_uuid,
        })
    }
}

/// Accept the cursor row only if it is the client's last record of the
/// campaign. Returns the object id to page after.
pub(crate) fn check_cursor(
    row: Option<&ModuleRow>,
    object_id: i64,
    valid_last_uuid: Uuid,
    campaign_uuid: Uuid,
) -> ModuleResult<i64> {
    match row {
        Some(last)
            if last.object_id == object_id
                && last.uuid == valid_last_uuid
                && last.campaign_uuid == campaign_uuid =>
        {
            Ok(object_id)
        }
        _ => Err(ModuleError::CursorMismatch {
            object_id_hex: format!("{object_id:x}"),
            valid_last_uuid,
        }),
    }
}

#[async_trait]
impl<C: CacheClient> ModuleSetter for ModuleSetterLib<C> {
    async fn find_by_uuid(&self, uuid: &str, seed_cache: bool) -> ModuleResult<ModuleRecord> {
        let uuid = parse_uuid("uuid", uuid)?;

        let record: ModuleRecord = module_repo::find_by_uuid(&self.db, uuid)
            .await?
            .ok_or(ModuleError::NotFound)?
            .into();

        if seed_cache {
            cached::store_record(self.cache.as_ref(), &self.keys, &record, self.ttl).await?;
        }

        Ok(record)
    }

    async fn seed_linked(
        &self,
        retrieved_length: i64,
        last_object_id_hex: &str,
        valid_last_uuid: &str,
        campaign_uuid: &str,
    ) -> ModuleResult<()> {
        let cursor = SeedCursor::parse(
            retrieved_length,
            last_object_id_hex,
            valid_last_uuid,
            campaign_uuid,
        )?;

        let after = match cursor.after {
            None => None,
            Some((object_id, valid_last_uuid)) => {
                let last = module_repo::find_by_object_id(&self.db, object_id).await?;
                Some(check_cursor(
                    last.as_ref(),
                    object_id,
                    valid_last_uuid,
                    cursor.campaign_uuid,
                )?)
            }
        };

        let page: Vec<ModuleRecord> =
            module_repo::list_campaign_after(&self.db, cursor.campaign_uuid, after, self.page_size)
                .await?
                .into_iter()
                .map(ModuleRecord::from)
                .collect();

        let len = cached::append_campaign_page(
            self.cache.as_ref(),
            &self.keys,
            &cursor.campaign_uuid,
            cursor.retained,
            &page,
            self.ttl,
        )
        .await?;

        tracing::debug!(
            campaign = %cursor.campaign_uuid,
            seeded = page.len(),
            cached_len = len,
            next_cursor = ?page.last().map(ModuleRecord::object_id_hex),
            "seeded campaign page"
        );

        Ok(())
    }

    async fn delete_many_by_any_uuid(&self, uuid: &str) -> ModuleResult<u64> {
        // Every uuid column is typed; anything else references no record.
        let Ok(uuid) = Uuid::parse_str(uuid.trim()) else {
            tracing::debug!(uuid, "not a uuid; nothing to delete");
            return Ok(0);
        };

        let deleted = module_repo::delete_by_any_uuid(&self.db, uuid).await?;
        let evicted = cached::evict(self.cache.as_ref(), &self.keys, &deleted).await?;

        tracing::debug!(%uuid, deleted = deleted.len(), evicted, "deleted modules");

        Ok(deleted.len() as u64)
    }
}

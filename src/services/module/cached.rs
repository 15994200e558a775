//! Cache writes shared by the setter operations.
use std::collections::BTreeSet;
use std::time::Duration;

use uuid::Uuid;

use crate::repos::module_repo::DeletedModule;
use crate::services::cache::CacheClient;
use crate::services::module::types::{CacheKeys, ModuleRecord, ModuleResult};

/// Write a record under its randid key plus the uuid -> randid index.
pub async fn store_record<C: CacheClient>(
    cache: &C,
    keys: &CacheKeys,
    record: &ModuleRecord,
    ttl: Duration,
) -> ModuleResult<()> {
    let json = serde_json::to_string(record)?;
    cache
        .set_with_ttl(&keys.rand_id(&record.rand_id), &json, ttl)
        .await?;
    cache
        .set_with_ttl(&keys.uuid(&record.uuid), &record.rand_id, ttl)
        .await?;
    Ok(())
}

/// Reset a campaign list to the `retained` entries the client already has,
/// then append `page` behind them. The list update is a single atomic cache
/// operation, so concurrent seeds of one campaign never interleave.
///
/// Returns the list length after the append.
pub async fn append_campaign_page<C: CacheClient>(
    cache: &C,
    keys: &CacheKeys,
    campaign_uuid: &Uuid,
    retained: u64,
    page: &[ModuleRecord],
    ttl: Duration,
) -> ModuleResult<u64> {
    for record in page {
        store_record(cache, keys, record, ttl).await?;
    }

    let rand_ids: Vec<String> = page.iter().map(|r| r.rand_id.clone()).collect();
    let len = cache
        .list_replace_tail(&keys.campaign(campaign_uuid), retained, &rand_ids, ttl)
        .await?;

    Ok(len)
}

/// Drop deleted records and every campaign list they appeared in.
pub async fn evict<C: CacheClient>(
    cache: &C,
    keys: &CacheKeys,
    deleted: &[DeletedModule],
) -> ModuleResult<u64> {
    if deleted.is_empty() {
        return Ok(0);
    }

    let campaigns: BTreeSet<Uuid> = deleted.iter().map(|d| d.campaign_uuid).collect();

    let mut to_delete = Vec::with_capacity(deleted.len() * 2 + campaigns.len());
    for d in deleted {
        to_delete.push(keys.rand_id(&d.rand_id));
        to_delete.push(keys.uuid(&d.uuid));
    }
    to_delete.extend(campaigns.iter().map(|c| keys.campaign(c)));

    Ok(cache.del_many(&to_delete).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::cache::memory::MemoryCache;
    use chrono::Utc;

    fn record(object_id: i64, rand_id: &str, campaign: Uuid) -> ModuleRecord {
        ModuleRecord {
            object_id,
            uuid: Uuid::new_v4(),
            rand_id: rand_id.to_string(),
            campaign_uuid: campaign,
            participant_uuid: Uuid::new_v4(),
            payload: serde_json::json!({ "n": object_id }),
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn store_record_writes_record_and_uuid_index() {
        let cache = MemoryCache::new();
        let keys = CacheKeys::new("mb");
        let r = record(7, "r7", Uuid::new_v4());

        store_record(&cache, &keys, &r, Duration::from_secs(60))
            .await
            .unwrap();

        let cached: ModuleRecord =
            serde_json::from_str(&cache.string("mb:randid:r7").unwrap()).unwrap();
        assert_eq!(cached, r);
        assert_eq!(cache.string(&keys.uuid(&r.uuid)).as_deref(), Some("r7"));
        assert_eq!(cache.ttl("mb:randid:r7"), Some(Duration::from_secs(60)));
    }

    #[tokio::test]
    async fn append_truncates_to_retained_prefix_before_pushing() {
        let cache = MemoryCache::new();
        let keys = CacheKeys::new("mb");
        let campaign = Uuid::new_v4();
        cache.insert_list(&keys.campaign(&campaign), &["a", "b", "stale1", "stale2"]);

        let page = vec![record(3, "c", campaign), record(4, "d", campaign)];
        let ttl = Duration::from_secs(5);
        let len = append_campaign_page(&cache, &keys, &campaign, 2, &page, ttl)
            .await
            .unwrap();

        assert_eq!(len, 4);
        assert_eq!(cache.list(&keys.campaign(&campaign)), ["a", "b", "c", "d"]);
        assert!(cache.string("mb:randid:c").is_some());
    }

    #[tokio::test]
    async fn append_with_zero_retained_restarts_the_list() {
        let cache = MemoryCache::new();
        let keys = CacheKeys::new("mb");
        let campaign = Uuid::new_v4();
        cache.insert_list(&keys.campaign(&campaign), &["old"]);

        let page = vec![record(1, "first", campaign)];
        append_campaign_page(&cache, &keys, &campaign, 0, &page, Duration::from_secs(5))
            .await
            .unwrap();

        assert_eq!(cache.list(&keys.campaign(&campaign)), ["first"]);
    }

    #[tokio::test]
    async fn concurrent_seeds_of_one_campaign_do_not_duplicate_entries() {
        let cache = MemoryCache::new();
        let keys = CacheKeys::new("mb");
        let campaign = Uuid::new_v4();
        cache.insert_list(&keys.campaign(&campaign), &["a", "b"]);
        let page = vec![record(3, "c", campaign), record(4, "d", campaign)];
        let ttl = Duration::from_secs(5);

        let (first, second) = tokio::join!(
            append_campaign_page(&cache, &keys, &campaign, 2, &page, ttl),
            append_campaign_page(&cache, &keys, &campaign, 2, &page, ttl),
        );

        assert_eq!(first.unwrap(), 4);
        assert_eq!(second.unwrap(), 4);
        assert_eq!(cache.list(&keys.campaign(&campaign)), ["a", "b", "c", "d"]);
    }

    #[tokio::test]
    async fn evict_removes_records_and_campaign_lists() {
        let cache = MemoryCache::new();
        let keys = CacheKeys::new("mb");
        let campaign = Uuid::new_v4();
        let r = record(1, "gone", campaign);
        store_record(&cache, &keys, &r, Duration::from_secs(5))
            .await
            .unwrap();
        cache.insert_list(&keys.campaign(&campaign), &["gone"]);

        let deleted = vec![DeletedModule {
            uuid: r.uuid,
            rand_id: r.rand_id.clone(),
            campaign_uuid: campaign,
        }];
        let removed = evict(&cache, &keys, &deleted).await.unwrap();

        assert_eq!(removed, 3);
        assert!(cache.string("mb:randid:gone").is_none());
        assert!(cache.list(&keys.campaign(&campaign)).is_empty());
    }
}

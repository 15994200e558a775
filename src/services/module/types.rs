use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::repos::{error::RepoError, module_repo::ModuleRow};
use crate::services::cache::CacheError;

pub type ModuleResult<T> = Result<T, ModuleError>;

/// A module record as stored in the cache (JSON).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModuleRecord {
    pub object_id: i64,
    pub uuid: Uuid,
    pub rand_id: String,
    pub campaign_uuid: Uuid,
    pub participant_uuid: Uuid,
    pub payload: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

impl From<ModuleRow> for ModuleRecord {
    fn from(row: ModuleRow) -> Self {
        Self {
            object_id: row.object_id,
            uuid: row.uuid,
            rand_id: row.rand_id,
            campaign_uuid: row.campaign_uuid,
            participant_uuid: row.participant_uuid,
            payload: row.payload,
            created_at: row.created_at,
        }
    }
}

impl ModuleRecord {
    pub fn object_id_hex(&self) -> String {
        format!("{:x}", self.object_id)
    }
}

#[derive(Debug, Error)]
pub enum ModuleError {
    #[error("module not found")]
    NotFound,

    #[error("invalid {field}: {value:?}")]
    InvalidArgument { field: &'static str, value: String },

    #[error("last object {object_id_hex} does not match validLastUUID {valid_last_uuid}")]
    CursorMismatch {
        object_id_hex: String,
        valid_last_uuid: Uuid,
    },

    #[error(transparent)]
    Repo(#[from] RepoError),

    #[error(transparent)]
    Cache(#[from] CacheError),

    #[error("cached module is malformed: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ModuleError {
    pub fn invalid(field: &'static str, value: impl Into<String>) -> Self {
        Self::InvalidArgument {
            field,
            value: value.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound)
    }
}

/// Parse a uuid argument, naming the field on failure.
pub fn parse_uuid(field: &'static str, raw: &str) -> ModuleResult<Uuid> {
    Uuid::parse_str(raw.trim()).map_err(|_| ModuleError::invalid(field, raw))
}

/// Parse the hex cursor handed out to clients (`objectId` in lowercase hex).
pub fn parse_object_id_hex(raw: &str) -> ModuleResult<i64> {
    let s = raw.trim();
    if s.is_empty() || s.len() > 16 || !s.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(ModuleError::invalid("lastObjectIdHex", raw));
    }
    // 16 hex digits can overflow i64; objectId is a BIGSERIAL so it never does.
    i64::from_str_radix(s, 16).map_err(|_| ModuleError::invalid("lastObjectIdHex", raw))
}

/// Cache key layout shared by getter and setter.
#[derive(Debug, Clone)]
pub struct CacheKeys {
    prefix: String,
}

impl CacheKeys {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    pub fn rand_id(&self, rand_id: &str) -> String {
        format!("{}:randid:{}", self.prefix, rand_id)
    }

    pub fn uuid(&self, uuid: &Uuid) -> String {
        format!("{}:uuid:{}", self.prefix, uuid)
    }

    pub fn campaign(&self, campaign_uuid: &Uuid) -> String {
        format!("{}:campaign:{}", self.prefix, campaign_uuid)
    }
}

/// Read side: lookups served from the cache only.
#[async_trait]
pub trait ModuleGetter: Send + Sync {
    async fn get_by_rand_id(&self, rand_id: &str) -> ModuleResult<ModuleRecord>;
}

/// Write side: store lookups, cache seeding and bulk deletion.
#[async_trait]
pub trait ModuleSetter: Send + Sync {
    /// Look a record up in the store. With `seed_cache` a hit is also
    /// written to the cache.
    async fn find_by_uuid(&self, uuid: &str, seed_cache: bool) -> ModuleResult<ModuleRecord>;

    /// Extend the cached page list of a campaign after the client's cursor.
    async fn seed_linked(
        &self,
        retrieved_length: i64,
        last_object_id_hex: &str,
        valid_last_uuid: &str,
        campaign_uuid: &str,
    ) -> ModuleResult<()>;

    /// Delete every record referencing `uuid` (as record, participant or
    /// campaign). Returns how many were removed.
    async fn delete_many_by_any_uuid(&self, uuid: &str) -> ModuleResult<u64>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn object_id_hex_is_lowercase_and_parses_back() {
        let record = ModuleRecord {
            object_id: 0xabc,
            uuid: Uuid::nil(),
            rand_id: "r".into(),
            campaign_uuid: Uuid::nil(),
            participant_uuid: Uuid::nil(),
            payload: serde_json::json!({}),
            created_at: Utc::now(),
        };
        assert_eq!(record.object_id_hex(), "abc");
        assert_eq!(parse_object_id_hex("ABC").unwrap(), 0xabc);
    }

    #[test]
    fn object_id_hex_rejects_signs_and_garbage() {
        for raw in ["", "-1", "+1", "xyz", "0x10", "11111111111111111"] {
            assert!(
                matches!(
                    parse_object_id_hex(raw),
                    Err(ModuleError::InvalidArgument { field: "lastObjectIdHex", .. })
                ),
                "{raw:?} should be rejected"
            );
        }
    }

    #[test]
    fn invalid_argument_message_names_the_field() {
        let err = parse_uuid("campaignUUID", "nope").unwrap_err();
        assert_eq!(err.to_string(), "invalid campaignUUID: \"nope\"");
    }

    #[test]
    fn keys_are_namespaced() {
        let keys = CacheKeys::new("mb");
        let id = Uuid::nil();
        assert_eq!(keys.rand_id("x1"), "mb:randid:x1");
        assert_eq!(keys.uuid(&id), format!("mb:uuid:{id}"));
        assert_eq!(keys.campaign(&id), format!("mb:campaign:{id}"));
    }
}

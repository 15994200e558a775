use async_trait::async_trait;
use redis::{Cmd, FromRedisValue, Pipeline};
use std::time::Duration;
use url::Url;

use crate::services::cache::client::{CacheClient, CacheError, CacheResult};

#[derive(Clone)]
enum Connection {
    Single(redis::aio::ConnectionManager),
    Cluster(redis::cluster_async::ClusterConnection),
}

/// Valkey/Redis-backend cache client.
///
/// Development talks to a single node (DB 0); production talks to a cluster,
/// so every command here touches exactly one key.
#[derive(Clone)]
pub struct ValkeyClient {
    conn: Connection,
}

impl std::fmt::Debug for ValkeyClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mode = match self.conn {
            Connection::Single(_) => "single",
            Connection::Cluster(_) => "cluster",
        };
        f.debug_struct("ValkeyClient").field("mode", &mode).finish()
    }
}

/// Build a `redis://` URL from a bare `host:port` plus optional password.
///
/// A host that already carries a scheme (`rediss://...`) is kept as-is.
pub fn build_url(host: &str, password: &str, database: Option<u8>) -> CacheResult<Url> {
    let host = host.trim();
    let raw = if host.contains("://") {
        host.to_string()
    } else {
        format!("redis://{host}")
    };

    let mut url = Url::parse(&raw).map_err(|e| CacheError::BackendConnection(e.to_string()))?;

    if !password.is_empty() {
        url.set_password(Some(password))
            .map_err(|_| CacheError::BackendConnection("cannot set password".into()))?;
    }
    if let Some(db) = database {
        url.set_path(&format!("/{db}"));
    }

    Ok(url)
}

impl ValkeyClient {
    // Connect to a single node, e.g. `localhost:6379`.
    pub async fn single(host: &str, password: &str) -> Result<Self, CacheError> {
        let url = build_url(host, password, Some(0))?;
        let client = redis::Client::open(url.as_str())
            .map_err(|e| CacheError::BackendConnection(e.to_string()))?;

        let manager = client
            .get_connection_manager()
            .await
            .map_err(|e| CacheError::BackendConnection(e.to_string()))?;

        Ok(Self {
            conn: Connection::Single(manager),
        })
    }

    // Connect to a cluster through one seed node.
    pub async fn cluster(host: &str, password: &str) -> Result<Self, CacheError> {
        let url = build_url(host, password, None)?;
        let client = redis::cluster::ClusterClient::new(vec![url.as_str()])
            .map_err(|e| CacheError::BackendConnection(e.to_string()))?;

        let conn = client
            .get_async_connection()
            .await
            .map_err(|e| CacheError::BackendConnection(e.to_string()))?;

        Ok(Self {
            conn: Connection::Cluster(conn),
        })
    }

    async fn query<T: FromRedisValue>(&self, cmd: &Cmd) -> CacheResult<T> {
        // Connections are multiplexed; clones share the underlying socket.
        let res = match &self.conn {
            Connection::Single(manager) => {
                let mut conn = manager.clone();
                cmd.query_async(&mut conn).await
            }
            Connection::Cluster(cluster) => {
                let mut conn = cluster.clone();
                cmd.query_async(&mut conn).await
            }
        };

        res.map_err(|e| CacheError::BackendCommand(e.to_string()))
    }

    async fn query_pipe<T: FromRedisValue>(&self, pipe: &Pipeline) -> CacheResult<T> {
        let res = match &self.conn {
            Connection::Single(manager) => {
                let mut conn = manager.clone();
                pipe.query_async(&mut conn).await
            }
            Connection::Cluster(cluster) => {
                let mut conn = cluster.clone();
                pipe.query_async(&mut conn).await
            }
        };

        res.map_err(|e| CacheError::BackendCommand(e.to_string()))
    }
}

#[async_trait]
impl CacheClient for ValkeyClient {
    fn backend_name(&self) -> &'static str {
        "valkey"
    }

    async fn ping(&self) -> CacheResult<()> {
        let pong: String = self.query(&redis::cmd("PING")).await?;
        if pong.eq_ignore_ascii_case("PONG") {
            Ok(())
        } else {
            Err(CacheError::InvalidValue(format!("unexpected PING reply: {pong}")))
        }
    }

    async fn get_string(&self, key: &str) -> CacheResult<Option<String>> {
        let mut cmd = redis::cmd("GET");
        cmd.arg(key);
        self.query(&cmd).await
    }

    async fn set_with_ttl(&self, key: &str, value: &str, ttl: Duration) -> CacheResult<()> {
        // EX expects integer seconds. We clamp to at least 1 sec.
        let ttl_seconds: u64 = ttl.as_secs().max(1);

        let mut cmd = redis::cmd("SET");
        cmd.arg(key).arg(value).arg("EX").arg(ttl_seconds);
        let _: String = self.query(&cmd).await?;

        Ok(())
    }

    async fn del_many(&self, keys: &[String]) -> CacheResult<u64> {
        // One DEL per key: a multi-key DEL fails with CROSSSLOT on a cluster.
        let mut removed = 0;
        for key in keys {
            let mut cmd = redis::cmd("DEL");
            cmd.arg(key);
            let n: u64 = self.query(&cmd).await?;
            removed += n;
        }
        Ok(removed)
    }

    async fn list_replace_tail(
        &self,
        key: &str,
        retained: u64,
        values: &[String],
        ttl: Duration,
    ) -> CacheResult<u64> {
        // MULTI/EXEC on a single key, so it also stays in one cluster slot.
        let mut pipe = redis::pipe();
        pipe.atomic();

        if retained == 0 {
            pipe.cmd("DEL").arg(key).ignore();
        } else {
            let stop = i64::try_from(retained - 1).map_err(|_| {
                CacheError::InvalidValue(format!("list length out of range: {retained}"))
            })?;
            pipe.cmd("LTRIM").arg(key).arg(0).arg(stop).ignore();
        }

        if !values.is_empty() {
            pipe.cmd("RPUSH").arg(key).arg(values).ignore();
            pipe.cmd("EXPIRE").arg(key).arg(ttl.as_secs().max(1)).ignore();
        }
        pipe.cmd("LLEN").arg(key);

        let (len,): (u64,) = self.query_pipe(&pipe).await?;
        Ok(len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_for_single_node_selects_db_zero() {
        let url = build_url("cache.local:6379", "", Some(0)).unwrap();
        assert_eq!(url.as_str(), "redis://cache.local:6379/0");
    }

    #[test]
    fn url_carries_password() {
        let url = build_url("cache.local:6379", "s3cret", None).unwrap();
        assert_eq!(url.password(), Some("s3cret"));
        assert_eq!(url.host_str(), Some("cache.local"));
        assert_eq!(url.port(), Some(6379));
    }

    #[test]
    fn url_keeps_explicit_scheme() {
        let url = build_url("rediss://cache.local:6380", "", None).unwrap();
        assert_eq!(url.scheme(), "rediss");
    }
}

/*
 * Responsibility
 * - 環境変数の読み込み (DATABASE_URL, REDIS_HOST, REDIS_PASS, APP_ENV など)
 * - 設定値のバリデーション (不足なら起動失敗)
 * - lookup 関数経由で読むので、テストでは HashMap を渡せる
 */
use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    pub fn parse(raw: Option<&str>) -> Self {
        match raw
            .unwrap_or("development")
            .trim()
            .to_ascii_lowercase()
            .as_str()
        {
            "production" | "prod" => Self::Production,
            _ => Self::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Production => "production",
        }
    }
}

/// Which text a failing dependency call puts into the response envelope.
///
/// The seed and delete endpoints historically differ (raw error text vs. a
/// fixed message), so each one gets its own policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorMessagePolicy {
    Raw,
    Generic,
}

impl FromStr for ErrorMessagePolicy {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "raw" => Ok(Self::Raw),
            "generic" => Ok(Self::Generic),
            _ => Err(()),
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "missing configuration: {}", key),
            ConfigError::Invalid(key) => write!(f, "invalid configuration: {}", key),
        }
    }
}

impl std::error::Error for ConfigError {}

#[derive(Clone, Debug)]
pub struct Config {
    pub addr: SocketAddr,
    pub app_env: AppEnv,

    pub database_url: String,
    pub run_migrations: bool,

    pub redis_host: String,
    pub redis_pass: String,

    pub cache_prefix: String,
    pub cache_ttl_seconds: u64,
    pub seed_page_size: i64,

    pub seed_error_message: ErrorMessagePolicy,
    pub delete_error_message: ErrorMessagePolicy,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &'static str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or(ConfigError::Missing(key))
        };

        let port: u16 = match lookup("PORT") {
            Some(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid("PORT"))?,
            None => 3000,
        };
        let addr: SocketAddr = SocketAddr::from_str(&format!("0.0.0.0:{}", port))
            .map_err(|_| ConfigError::Invalid("PORT"))?;

        let app_env = AppEnv::parse(lookup("APP_ENV").as_deref());

        let database_url = required("DATABASE_URL")?;
        let run_migrations = match lookup("RUN_MIGRATIONS") {
            Some(raw) => parse_bool(&raw).ok_or(ConfigError::Invalid("RUN_MIGRATIONS"))?,
            None => false,
        };

        let redis_host = required("REDIS_HOST")?;
        let redis_pass = lookup("REDIS_PASS").unwrap_or_default();

        let cache_prefix = lookup("MODULE_CACHE_PREFIX")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| "moduleboilerplate".to_string());

        let cache_ttl_seconds = match lookup("MODULE_CACHE_TTL_SECONDS") {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|v| *v > 0)
                .ok_or(ConfigError::Invalid("MODULE_CACHE_TTL_SECONDS"))?,
            None => 86_400, // 1 day
        };

        let seed_page_size = match lookup("SEED_PAGE_SIZE") {
            Some(raw) => raw
                .trim()
                .parse::<i64>()
                .ok()
                .filter(|v| *v > 0)
                .ok_or(ConfigError::Invalid("SEED_PAGE_SIZE"))?,
            None => 50,
        };

        let seed_error_message = match lookup("SEED_MANY_ERROR_MESSAGE") {
            Some(raw) => raw
                .parse()
                .map_err(|_| ConfigError::Invalid("SEED_MANY_ERROR_MESSAGE"))?,
            None => ErrorMessagePolicy::Raw,
        };
        let delete_error_message = match lookup("DELETE_MANY_ERROR_MESSAGE") {
            Some(raw) => raw
                .parse()
                .map_err(|_| ConfigError::Invalid("DELETE_MANY_ERROR_MESSAGE"))?,
            None => ErrorMessagePolicy::Generic,
        };

        Ok(Self {
            addr,
            app_env,
            database_url,
            run_migrations,
            redis_host,
            redis_pass,
            cache_prefix,
            cache_ttl_seconds,
            seed_page_size,
            seed_error_message,
            delete_error_message,
        })
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}

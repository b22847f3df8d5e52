use std::{env, fs, ops::Deref, sync::Arc, time::Duration};

use anyhow::Context;
use tracing::info;
use url::Url;

use crate::{
    cache::FileCache,
    dao::get_path,
    error::Error,
    provider::{DatabasePool, HTTP},
};

#[derive(Debug)]
pub struct AppState<T>(Arc<T>);

impl<T> AppState<T> {
    pub fn new(state: T) -> AppState<T> {
        AppState(Arc::new(state))
    }
}

impl<T> Clone for AppState<T> {
    fn clone(&self) -> AppState<T> {
        AppState(Arc::clone(&self.0))
    }
}

impl<T> Deref for AppState<T> {
    type Target = Arc<T>;

    fn deref(&self) -> &Arc<T> {
        &self.0
    }
}

#[derive(Debug)]
pub struct State {
    pub config: Config,
    pub database: DatabasePool,
    pub http: HTTP,
    pub cache: FileCache,
}

impl State {
    pub async fn new(
        config: Config,
        database: DatabasePool,
        http: HTTP,
    ) -> Result<State, Error> {
        Self::init_migrations(&database).await?;
        let cache = FileCache::new(config.cache_dir.as_str())?;
        Ok(Self {
            config,
            database,
            http,
            cache,
        })
    }

    async fn init_migrations(database: &DatabasePool) -> Result<(), Error> {
        let files = vec!["user_stats.sql"];

        let dir = env!("CARGO_MANIFEST_DIR");

        for file in files {
            let data = fs::read_to_string(get_path(dir, file))
                .with_context(|| format!("could not read migration {}", file))?;
            sqlx::raw_sql(data.as_str())
                .execute(&database.pool)
                .await?;
        }

        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub server_host: String,
    pub port: u16,
    pub allowed_origins: Vec<String>,
    pub static_dir: String,
    pub database_url: String,
    pub bridge_api_host: Url,
    pub cache_dir: String,
    pub cache_ttl: Duration,
    pub price_cache_ttl: Duration,
    pub request_timeout: Duration,
    pub max_retries: u32,
    pub max_pages: u32,
    pub page_limit: u32,
    pub page_delay: Duration,
    pub price_delay: Duration,
    pub nft_eligibility_threshold: i64,
}

pub fn get_configuration() -> Result<Config, Error> {
    let server_host = env_or("SERVER_HOST", "0.0.0.0");
    let port: u16 = env_or("PORT", "3000").parse()?;

    let allowed_origins = env_or("ALLOWED_ORIGINS", "*")
        .split(',')
        .map(|item| item.to_owned())
        .collect::<Vec<String>>();

    let static_dir = format!(
        "{}/{}",
        env!("CARGO_MANIFEST_DIR"),
        env_or("STATIC_DIRECTORY", "public")
    );

    let database_url =
        env_or("DATABASE_URL", "sqlite://leaderboard.db");

    let bridge_api_host =
        Url::parse(&env_or("BRIDGE_API_HOST", "https://api.relay.link"))?;

    let cache_dir = env::var("CACHE_DIR").unwrap_or_else(|_| {
        format!("{}/cache", env!("CARGO_MANIFEST_DIR"))
    });

    let cache_ttl_hours: u64 = env_or("CACHE_TTL_IN_HOURS", "24").parse()?;
    let price_ttl_minutes: u64 =
        env_or("PRICE_CACHE_TTL_IN_MINUTES", "60").parse()?;
    let request_timeout_sec: u64 =
        env_or("REQUEST_TIMEOUT_IN_SEC", "10").parse()?;

    let max_retries: u32 = env_or("MAX_RETRIES", "3").parse()?;
    let max_pages: u32 = env_or("MAX_PAGES", "10").parse()?;
    let page_limit: u32 = env_or("PAGE_LIMIT", "20").parse()?;
    let page_delay_ms: u64 = env_or("PAGE_DELAY_IN_MS", "1000").parse()?;
    let price_delay_ms: u64 = env_or("PRICE_DELAY_IN_MS", "300").parse()?;

    let nft_eligibility_threshold: i64 =
        env_or("NFT_ELIGIBILITY_THRESHOLD", "4").parse()?;

    let config = Config {
        server_host,
        port,
        allowed_origins,
        static_dir,
        database_url,
        bridge_api_host,
        cache_dir,
        cache_ttl: Duration::from_secs(cache_ttl_hours * 60 * 60),
        price_cache_ttl: Duration::from_secs(price_ttl_minutes * 60),
        request_timeout: Duration::from_secs(request_timeout_sec),
        max_retries,
        max_pages,
        page_limit,
        page_delay: Duration::from_millis(page_delay_ms),
        price_delay: Duration::from_millis(price_delay_ms),
        nft_eligibility_threshold,
    };

    Ok(config)
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_owned())
}

/// Loads `.env` from the manifest dir into the process environment.
/// A missing file is fine; every variable has a default.
pub fn set_configuration() -> Result<(), Error> {
    let config_file: &str = ".env";

    let directory = env!("CARGO_MANIFEST_DIR");
    let path = format!("{}/{}", directory, config_file);

    match fs::read_to_string(path) {
        Ok(config_string) => parse_config_string(config_string),
        Err(_) => {
            info!("no .env file found, using defaults");
            Ok(())
        }
    }
}

fn parse_config_string(config: String) -> Result<(), Error> {
    let params: Vec<Option<(&str, &str)>> = config
        .split('\n')
        .map(|s| {
            let element = s.find('=');
            if let Some(e) = element {
                return Some(s.split_at(e));
            }
            None
        })
        .map(|value| {
            if let Some((k, v)) = value {
                return Some((k, &v[1..]));
            }
            None
        })
        .collect();

    for (key, value) in params.into_iter().flatten() {
        env::set_var(key, value);
    }

    Ok(())
}

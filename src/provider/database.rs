use std::str::FromStr;

use crate::{
    configuration::Config,
    dao::{ConnectOptions, PoolOption, PoolType},
    error::Error,
    model::{Table, UserStats},
};

#[derive(Debug)]
pub struct DatabasePool {
    pub user_stats: Table<UserStats>,
    pub pool: PoolType,
}

impl DatabasePool {
    pub async fn new(config: &Config) -> Result<DatabasePool, Error> {
        let options = ConnectOptions::from_str(config.database_url.as_str())?
            .create_if_missing(true)
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal);

        let pool = PoolOption::new()
            .max_connections(20)
            .connect_with(options)
            .await?;

        Ok(DatabasePool {
            user_stats: Table::new(pool.clone()),
            pool,
        })
    }
}

use futures::future::join_all;
use sqlx::Error;

use crate::helpers::LeaderboardType;
use crate::model::{RankedUserStats, Table, UserStats};

impl Table<UserStats> {
    /// Inserts or refreshes a user's stats. An existing row keeps its
    /// opt-in flag; only a brand new row takes the provided one.
    pub async fn upsert(&self, data: &UserStats) -> Result<(), Error> {
        const SQL: &str = r#"
        INSERT INTO "user_stats" (
            "address",
            "transaction_count",
            "total_usd_value",
            "unique_chains",
            "unique_tokens",
            "first_transaction_date",
            "last_updated",
            "opt_in_leaderboard"
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        ON CONFLICT ("address") DO UPDATE SET
            "transaction_count" = excluded."transaction_count",
            "total_usd_value" = excluded."total_usd_value",
            "unique_chains" = excluded."unique_chains",
            "unique_tokens" = excluded."unique_tokens",
            "first_transaction_date" = excluded."first_transaction_date",
            "last_updated" = excluded."last_updated"
        "#;

        sqlx::query(SQL)
            .bind(&data.address)
            .bind(data.transaction_count)
            .bind(data.total_usd_value)
            .bind(data.unique_chains)
            .bind(data.unique_tokens)
            .bind(&data.first_transaction_date)
            .bind(data.last_updated)
            .bind(data.opt_in_leaderboard)
            .execute(&self.pool)
            .await
            .map(drop)
    }

    pub async fn get_one(
        &self,
        address: String,
    ) -> Result<Option<UserStats>, Error> {
        const SQL: &str = r#"
        SELECT *
        FROM "user_stats"
        WHERE "address" = $1
        "#;

        sqlx::query_as(SQL)
            .bind(address)
            .fetch_optional(&self.pool)
            .await
    }

    pub async fn leaderboard_page(
        &self,
        metric: LeaderboardType,
        limit: i64,
        offset: i64,
        search: Option<&str>,
    ) -> Result<Vec<RankedUserStats>, Error> {
        let column = metric.column();

        if let Some(term) = search {
            let sql = format!(
                r#"
                SELECT *, ROW_NUMBER() OVER (ORDER BY "{column}" DESC) AS "rank"
                FROM "user_stats"
                WHERE "opt_in_leaderboard" = 1 AND "{column}" > 0
                    AND "address" LIKE $1
                ORDER BY "{column}" DESC
                LIMIT $2 OFFSET $3
                "#
            );

            return sqlx::query_as(&sql)
                .bind(format!("%{}%", term))
                .bind(limit)
                .bind(offset)
                .fetch_all(&self.pool)
                .await;
        }

        let sql = format!(
            r#"
            SELECT *, ROW_NUMBER() OVER (ORDER BY "{column}" DESC) AS "rank"
            FROM "user_stats"
            WHERE "opt_in_leaderboard" = 1 AND "{column}" > 0
            ORDER BY "{column}" DESC
            LIMIT $1 OFFSET $2
            "#
        );

        sqlx::query_as(&sql)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await
    }

    pub async fn count_for_page(
        &self,
        metric: LeaderboardType,
        search: Option<&str>,
    ) -> Result<i64, Error> {
        let column = metric.column();

        if let Some(term) = search {
            let sql = format!(
                r#"
                SELECT COUNT(*)
                FROM "user_stats"
                WHERE "opt_in_leaderboard" = 1 AND "{column}" > 0
                    AND "address" LIKE $1
                "#
            );

            return sqlx::query_scalar(&sql)
                .bind(format!("%{}%", term))
                .fetch_one(&self.pool)
                .await;
        }

        let sql = format!(
            r#"
            SELECT COUNT(*)
            FROM "user_stats"
            WHERE "opt_in_leaderboard" = 1 AND "{column}" > 0
            "#
        );

        sqlx::query_scalar(&sql).fetch_one(&self.pool).await
    }

    /// Position of the user for each metric among opted-in rows,
    /// in the order transactions, volume, chains, tokens.
    pub async fn ranks(&self, stats: &UserStats) -> Result<Vec<i64>, Error> {
        let metrics = [
            LeaderboardType::Transactions,
            LeaderboardType::Volume,
            LeaderboardType::Chains,
            LeaderboardType::Tokens,
        ];

        let results =
            join_all(metrics.iter().map(|m| self.rank_above(*m, stats))).await;

        results.into_iter().collect()
    }

    async fn rank_above(
        &self,
        metric: LeaderboardType,
        stats: &UserStats,
    ) -> Result<i64, Error> {
        let sql = format!(
            r#"
            SELECT COUNT(*) + 1
            FROM "user_stats"
            WHERE "{column}" > $1 AND "opt_in_leaderboard" = 1
            "#,
            column = metric.column()
        );

        let query = sqlx::query_scalar(&sql);

        match metric {
            LeaderboardType::Transactions => {
                query.bind(stats.transaction_count).fetch_one(&self.pool).await
            }
            LeaderboardType::Volume => {
                query.bind(stats.total_usd_value).fetch_one(&self.pool).await
            }
            LeaderboardType::Chains => {
                query.bind(stats.unique_chains).fetch_one(&self.pool).await
            }
            LeaderboardType::Tokens => {
                query.bind(stats.unique_tokens).fetch_one(&self.pool).await
            }
        }
    }

    /// Returns the number of rows updated; zero means the address was
    /// never analyzed.
    pub async fn set_opt_in(
        &self,
        address: String,
        opt_in: bool,
        last_updated: chrono::DateTime<chrono::Utc>,
    ) -> Result<u64, Error> {
        const SQL: &str = r#"
        UPDATE "user_stats"
        SET "opt_in_leaderboard" = $1, "last_updated" = $2
        WHERE "address" = $3
        "#;

        sqlx::query(SQL)
            .bind(opt_in)
            .bind(last_updated)
            .bind(address)
            .execute(&self.pool)
            .await
            .map(|result| result.rows_affected())
    }
}

use std::future::Future;
use std::str::FromStr;
use std::time::Duration;

use tokio::time;
use tracing::warn;

use crate::error::Error;

/// Runs `op` up to `max_attempts` times, sleeping `base_delay * 2^(n-1)`
/// after the n-th failure. The closure receives the 1-based attempt number.
pub async fn retry_with_backoff<T, F, Fut>(
    max_attempts: u32,
    base_delay: Duration,
    mut op: F,
) -> Result<T, Error>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, Error>>,
{
    let mut attempt = 0;

    loop {
        attempt += 1;
        match op(attempt).await {
            Ok(value) => return Ok(value),
            Err(err) => {
                warn!("attempt {}/{} failed: {}", attempt, max_attempts, err);
                if attempt >= max_attempts {
                    return Err(err);
                }
                let backoff = base_delay * 2u32.pow(attempt - 1);
                time::sleep(backoff).await;
            }
        }
    }
}

/// Metric a leaderboard can be ranked by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeaderboardType {
    Transactions,
    Volume,
    Chains,
    Tokens,
}

impl LeaderboardType {
    pub fn column(&self) -> &'static str {
        match self {
            LeaderboardType::Transactions => "transaction_count",
            LeaderboardType::Volume => "total_usd_value",
            LeaderboardType::Chains => "unique_chains",
            LeaderboardType::Tokens => "unique_tokens",
        }
    }
}

impl FromStr for LeaderboardType {
    type Err = Error;

    fn from_str(value: &str) -> Result<LeaderboardType, Self::Err> {
        match value {
            "transactions" => Ok(LeaderboardType::Transactions),
            "volume" => Ok(LeaderboardType::Volume),
            "chains" => Ok(LeaderboardType::Chains),
            "tokens" => Ok(LeaderboardType::Tokens),
            _ => Err(Error::LeaderboardTypeError(value.to_owned())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test(start_paused = true)]
    async fn backoff_doubles_between_attempts() {
        let calls = AtomicU32::new(0);
        let started = time::Instant::now();

        let result = retry_with_backoff(3, Duration::from_secs(1), |_| {
            let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
            async move {
                if n < 3 {
                    Err(Error::ServerError(String::from("transient")))
                } else {
                    Ok(n)
                }
            }
        })
        .await
        .unwrap();

        // two failures: slept 1s after the first, 2s after the second
        assert_eq!(result, 3);
        assert_eq!(started.elapsed(), Duration::from_secs(3));
    }

    #[tokio::test(start_paused = true)]
    async fn gives_up_after_max_attempts() {
        let calls = AtomicU32::new(0);

        let result: Result<(), Error> =
            retry_with_backoff(3, Duration::from_secs(1), |_| {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(Error::ServerError(String::from("down"))) }
            })
            .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn leaderboard_types_parse() {
        assert_eq!(
            "volume".parse::<LeaderboardType>().unwrap(),
            LeaderboardType::Volume
        );
        assert!("bogus".parse::<LeaderboardType>().is_err());
    }
}

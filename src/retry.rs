use std::future::Future;
use std::time::Duration;

use log::warn;
use thiserror::Error;

/// 成功した値と、成功までに要した試行回数。
#[derive(Debug, PartialEq, Eq)]
pub struct Retried<T> {
    pub value: T,
    pub attempts: u32,
}

impl<T> Retried<T> {
    /// 1回目の試行で成功したかどうかを返す。
    pub fn first_attempt(&self) -> bool {
        self.attempts == 1
    }
}

/// すべての試行が失敗した。
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RetryError<E> {
    #[error("gave up after {attempts} attempts")]
    Exhausted {
        attempts: u32,
        #[source]
        source: E,
    },
}

/// 失敗した試行の後に待つ時間を、試行ごとに倍にする。
///
/// 待ち時間は`max`を超えない。
pub fn exponential(base: Duration, max: Duration) -> impl Fn(u32) -> Duration {
    move |attempt| {
        let factor = 1u32.checked_shl(attempt.saturating_sub(1)).unwrap_or(u32::MAX);
        base.saturating_mul(factor).min(max)
    }
}

/// 処理が成功するまで、最大`max_attempts`回試行する。
///
/// # Arguments
///
/// * `operation` - 試行する処理
/// * `max_attempts` - 最大の試行回数。0の場合は1回とする。
/// * `backoff` - 失敗した試行の回数(1始まり)から、次の試行までの待ち時間を返す関数
///
/// # Examples
///
/// ```
/// let backoff = exponential(Duration::from_millis(100), Duration::from_secs(2));
/// let retried = with_retry(|| async { Ok::<_, String>(1) }, 3, backoff).await?;
/// assert!(retried.first_attempt());
/// ```
pub async fn with_retry<F, Fut, T, E, B>(
    mut operation: F,
    max_attempts: u32,
    backoff: B,
) -> Result<Retried<T>, RetryError<E>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
    B: Fn(u32) -> Duration,
{
    let max_attempts = max_attempts.max(1);
    let mut attempt = 0u32;
    loop {
        attempt += 1;
        match operation().await {
            Ok(value) => {
                return Ok(Retried {
                    value,
                    attempts: attempt,
                })
            }
            Err(e) if attempt >= max_attempts => {
                return Err(RetryError::Exhausted {
                    attempts: attempt,
                    source: e,
                })
            }
            Err(e) => {
                let delay = backoff(attempt);
                warn!(
                    "Attempt {}/{} failed: {}. Retrying in {:?}",
                    attempt, max_attempts, e, delay
                );
                tokio::time::sleep(delay).await;
            }
        }
    }
}

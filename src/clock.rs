use chrono::{DateTime, Local};
#[cfg(test)]
use mockall::automock;

/// 現在時刻を提供するtrait。
///
/// 正規化の処理は時計を直接読まず、呼び出し側がこのtraitで時刻を渡す。
#[cfg_attr(test, automock)]
pub trait Clock {
    /// 現在のLocal時間を取得する。
    fn now(&self) -> DateTime<Local>;
}

/// システムの時計を利用する`Clock`。
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}

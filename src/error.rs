use chrono::NaiveDateTime;
use thiserror::Error;

/// 時刻の正規化で発生するエラー。
#[derive(Debug, Error, PartialEq, Eq)]
pub enum NormalizeError {
    /// 時刻が`HH:mm`形式として解釈できない。
    ///
    /// ユーザー入力の誤りであり、再入力を促す。
    #[error("invalid time format for {field}: {value:?} (expected HH:mm)")]
    InvalidTimeFormat { field: &'static str, value: String },

    /// 丸め後の終了時刻が開始時刻より前になった。
    ///
    /// 正規化のロジックに不具合がある場合にのみ発生する。
    #[error("end {end} is earlier than start {start} after rounding")]
    InvalidDuration {
        start: NaiveDateTime,
        end: NaiveDateTime,
    },
}

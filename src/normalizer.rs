use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use log::debug;

use crate::clock::Clock;
use crate::error::NormalizeError;
use crate::rounding::{floor_minutes, round_minutes, RoundingPolicy};
use crate::time_entry::{EntryType, NormalizedEntry, NormalizedTimeSpan, TimeSpan};

/// 新規作成か既存エントリーの編集か。
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EntryOrigin {
    New,
    Existing { created_at: NaiveDate },
}

impl EntryOrigin {
    /// エントリーが属する日付を返す。
    ///
    /// 新規作成時は現在の日付、編集時は作成された日付とする。
    /// 時計は新規作成時に1度だけ読む。
    pub fn date(&self, clock: &impl Clock) -> NaiveDate {
        match self {
            Self::New => clock.now().date_naive(),
            Self::Existing { created_at } => *created_at,
        }
    }

    /// 方針に従って15分単位の丸めを適用するかどうかを返す。
    fn rounds(&self, policy: RoundingPolicy) -> bool {
        match (policy, self) {
            (RoundingPolicy::AlwaysRound, _) => true,
            (RoundingPolicy::RoundOnCreateOnly, Self::New) => true,
            (RoundingPolicy::RoundOnCreateOnly, Self::Existing { .. }) => false,
        }
    }
}

/// `HH:mm`形式の時刻をパースする。
///
/// 0埋めされた24時間表記のみを受け付ける。
pub fn parse_time_of_day(field: &'static str, value: &str) -> Result<NaiveTime, NormalizeError> {
    let invalid = || NormalizeError::InvalidTimeFormat {
        field,
        value: value.to_string(),
    };

    let (hour, minute) = value.split_once(':').ok_or_else(invalid)?;
    if hour.len() != 2 || minute.len() != 2 {
        return Err(invalid());
    }
    if !hour.bytes().chain(minute.bytes()).all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }
    let hour = hour.parse::<u32>().map_err(|_| invalid())?;
    let minute = minute.parse::<u32>().map_err(|_| invalid())?;

    NaiveTime::from_hms_opt(hour, minute, 0).ok_or_else(invalid)
}

/// 入力された時刻を正規化する。
///
/// activityでは開始時刻と終了時刻から経過時間を求め、15分単位に丸めた終了時刻を返す。
/// 終了時刻が開始時刻より前の場合は、日付をまたいだものとして終了日を1日進める。
/// itemでは時刻を扱わない。
///
/// # Arguments
///
/// * `span` - 入力された時刻
/// * `policy` - 丸めの方針
/// * `origin` - 新規作成か編集か
pub fn normalize(
    span: &TimeSpan,
    policy: RoundingPolicy,
    origin: EntryOrigin,
) -> Result<NormalizedEntry, NormalizeError> {
    if span.entry_type == EntryType::Item {
        return Ok(NormalizedEntry::Item);
    }

    let raw_start = required("start", span.raw_start.as_deref())?;
    let raw_end = required("end", span.raw_end.as_deref())?;
    let start_time = parse_time_of_day("start", raw_start)?;
    let end_time = parse_time_of_day("end", raw_end)?;

    let original_start = span.date.and_time(start_time);
    let mut original_end = span.date.and_time(end_time);
    if original_end < original_start {
        original_end += Duration::days(1);
    }

    let minutes = (original_end - original_start).num_minutes();
    let end = if origin.rounds(policy) {
        let billable = round_minutes(minutes);
        debug!("Rounded {} minutes to {} minutes", minutes, billable);
        original_start + Duration::minutes(billable)
    } else {
        // 入力された終了時刻を保ち、最短時間だけを適用する
        original_end.max(original_start + Duration::minutes(floor_minutes(minutes)))
    };

    checked(original_start, end, original_start, original_end)
}

fn required<'a>(field: &'static str, value: Option<&'a str>) -> Result<&'a str, NormalizeError> {
    value.ok_or(NormalizeError::InvalidTimeFormat {
        field,
        value: String::new(),
    })
}

fn checked(
    start: NaiveDateTime,
    end: NaiveDateTime,
    original_start: NaiveDateTime,
    original_end: NaiveDateTime,
) -> Result<NormalizedEntry, NormalizeError> {
    if end < start {
        return Err(NormalizeError::InvalidDuration { start, end });
    }

    Ok(NormalizedEntry::Activity(NormalizedTimeSpan {
        start,
        end,
        original_start,
        original_end,
    }))
}

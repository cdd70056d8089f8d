use std::fmt;
use std::str::FromStr;

use anyhow::bail;
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// タイムエントリーの種類。
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryType {
    /// 開始時刻と終了時刻の経過時間で請求する。
    Activity,
    /// 数量で請求する。
    Item,
}

impl FromStr for EntryType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "activity" => Ok(Self::Activity),
            "item" => Ok(Self::Item),
            _ => bail!("Unknown entry type: {}", s),
        }
    }
}

impl fmt::Display for EntryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Activity => write!(f, "activity"),
            Self::Item => write!(f, "item"),
        }
    }
}

/// フォーム送信時に入力された時刻。
#[derive(Clone, Debug)]
pub struct TimeSpan {
    pub date: NaiveDate,
    pub raw_start: Option<String>,
    pub raw_end: Option<String>,
    pub entry_type: EntryType,
}

/// 丸め済みの開始・終了時刻と、入力されたままの開始・終了時刻。
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NormalizedTimeSpan {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub original_start: NaiveDateTime,
    pub original_end: NaiveDateTime,
}

/// 正規化の結果。
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NormalizedEntry {
    Activity(NormalizedTimeSpan),
    /// 時刻は扱わない。数量は呼び出し側がそのまま使う。
    Item,
}

/// 永続化先に渡すレコード。
///
/// activityでは`quantity`が、itemでは4つの時刻がすべて`null`になる。
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct EntryRecord {
    pub entry_type: EntryType,
    pub start_time: Option<NaiveDateTime>,
    pub end_time: Option<NaiveDateTime>,
    pub original_start_time: Option<NaiveDateTime>,
    pub original_end_time: Option<NaiveDateTime>,
    pub quantity: Option<f64>,
}

impl EntryRecord {
    /// 正規化の結果と数量からレコードを作成する。
    pub fn new(entry: NormalizedEntry, quantity: Option<f64>) -> Self {
        match entry {
            NormalizedEntry::Activity(span) => Self {
                entry_type: EntryType::Activity,
                start_time: Some(span.start),
                end_time: Some(span.end),
                original_start_time: Some(span.original_start),
                original_end_time: Some(span.original_end),
                quantity: None,
            },
            NormalizedEntry::Item => Self {
                entry_type: EntryType::Item,
                start_time: None,
                end_time: None,
                original_start_time: None,
                original_end_time: None,
                quantity,
            },
        }
    }
}

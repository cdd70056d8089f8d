use std::future;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::NaiveDate;
use log::{info, warn};

use crate::clock::Clock;
use crate::config::RetryConfig;
use crate::normalizer::{normalize, EntryOrigin};
use crate::retry::{exponential, with_retry};
use crate::rounding::RoundingPolicy;
use crate::sink::EntrySink;
use crate::time_entry::{EntryRecord, EntryType, TimeSpan};

/// タイムエントリーを正規化して書き込むためのサブコマンド。
#[derive(Debug, clap::Args)]
pub struct NormalizeArgs {
    #[clap(short = 's', long = "start", help = "Start time in the format HH:mm")]
    start: Option<String>,

    #[clap(short = 'e', long = "end", help = "End time in the format HH:mm")]
    end: Option<String>,

    #[clap(
        short = 't',
        long = "type",
        default_value = "activity",
        help = "Entry type: activity or item"
    )]
    entry_type: EntryType,

    #[clap(short = 'q', long = "quantity", help = "Quantity of an item entry")]
    quantity: Option<f64>,

    #[clap(
        short = 'c',
        long = "created-at",
        help = "Creation date of an edited entry in the format YYYY-MM-DD",
        parse(try_from_str = parse_date),
    )]
    created_at: Option<NaiveDate>,

    #[clap(
        short = 'p',
        long = "policy",
        help = "Rounding policy: always-round or round-on-create-only"
    )]
    policy: Option<RoundingPolicy>,

    #[clap(
        short = 'o',
        long = "output",
        help = "Appends the record to a file instead of stdout",
        parse(from_os_str)
    )]
    output: Option<PathBuf>,
}

impl NormalizeArgs {
    /// レコードの出力先のファイルを返す。
    pub fn output(&self) -> Option<&Path> {
        self.output.as_deref()
    }
}

pub struct NormalizeCommand<'a, C: Clock, S: EntrySink> {
    clock: &'a C,
    sink: &'a mut S,
    policy: RoundingPolicy,
    retry: &'a RetryConfig,
}

impl<'a, C: Clock, S: EntrySink> NormalizeCommand<'a, C, S> {
    /// 新しい`NormalizeCommand`を返す。
    ///
    /// # Arguments
    /// * `clock` - 新規作成時の日付を決める時計
    /// * `sink` - レコードの書き込み先
    /// * `policy` - 引数で指定されなかった場合の丸めの方針
    /// * `retry` - 書き込みを再試行する設定
    pub fn new(
        clock: &'a C,
        sink: &'a mut S,
        policy: RoundingPolicy,
        retry: &'a RetryConfig,
    ) -> Self {
        Self {
            clock,
            sink,
            policy,
            retry,
        }
    }

    /// `normalize`サブコマンドの処理を行う。
    ///
    /// 作成日が指定されていない場合は新規作成として、Localタイムゾーンの現在の日付を利用する。
    /// 指定されている場合は既存エントリーの編集として、その日付を利用する。
    /// 正規化したレコードは書き込み先に書き込み、失敗した場合は再試行する。
    ///
    /// # Arguments
    ///
    /// * `args` - `normalize`サブコマンドの引数
    pub async fn run(&mut self, args: NormalizeArgs) -> Result<EntryRecord> {
        let origin = match args.created_at {
            Some(created_at) => EntryOrigin::Existing { created_at },
            None => EntryOrigin::New,
        };
        let policy = args.policy.unwrap_or(self.policy);
        let span = TimeSpan {
            date: origin.date(self.clock),
            raw_start: args.start,
            raw_end: args.end,
            entry_type: args.entry_type,
        };
        info!(
            "Normalizing {} entry on {} with {}",
            span.entry_type, span.date, policy
        );

        let entry = normalize(&span, policy, origin).context("Failed to normalize time entry")?;
        let record = EntryRecord::new(entry, args.quantity);

        let sink = &mut *self.sink;
        let retried = with_retry(
            || future::ready(sink.write_record(&record)),
            self.retry.max_attempts,
            exponential(self.retry.base_delay(), self.retry.max_delay()),
        )
        .await
        .context("Failed to write time entry record")?;
        if retried.first_attempt() {
            info!("Record written successfully.");
        } else {
            warn!("Record written after {} attempts.", retried.attempts);
        }

        Ok(record)
    }
}

/// 日付をパースする。
fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").with_context(|| format!("Failed to parse date: {}", s))
}

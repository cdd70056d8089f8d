use std::io::{self, Write};

#[cfg(test)]
use mockall::automock;

use crate::time_entry::EntryRecord;

/// 正規化したレコードを永続化先に書き込むためのtrait。
#[cfg_attr(test, automock)]
pub trait EntrySink {
    /// レコードを書き込む。
    ///
    /// # Arguments
    ///
    /// * `record` - 書き込むレコード
    fn write_record(&mut self, record: &EntryRecord) -> io::Result<()>;
}

/// レコードを1行1つのJSONとして書き込む。
///
/// 1レコードは1度の`write_all`で書き込むため、再試行しても途中までの行が残らない。
pub struct JsonLinesSink<W: Write> {
    writer: W,
}

impl<W: Write> JsonLinesSink<W> {
    /// 新しい`JsonLinesSink`を返す。
    pub fn new(writer: W) -> Self {
        Self { writer }
    }
}

impl<W: Write> EntrySink for JsonLinesSink<W> {
    fn write_record(&mut self, record: &EntryRecord) -> io::Result<()> {
        let mut line = serde_json::to_vec(record)?;
        line.push(b'\n');
        self.writer.write_all(&line)?;
        self.writer.flush()
    }
}

use core::fmt::Write as _;
use std::io;

use bytes::{BufMut, BytesMut};
use chrono::{DateTime, FixedOffset};

use crate::{
    encoder::ColorTextEncoder,
    error::EncodeError,
    field::FieldEncoder,
    level::Level,
    palette::{put_display, put_level},
};

/// 消息段的最小显示宽度，不足时右侧补空格，超出时不截断。
pub const MESSAGE_WIDTH: usize = 25;

/// 宿主框架面向的完整编码器接口。
///
/// # 设计背景（Why）
/// - 宿主为每个子记录器克隆一份携带上下文字段的编码器，再在每条日志上调用 `write_entry`；
///   以 trait 对象形式暴露，宿主无需感知具体编码器类型。
///
/// # 契约说明（What）
/// - `clone_boxed`：返回与原实例互不共享内存的副本；
/// - `write_entry`：要么确认整行（含换行符）已写出，要么返回错误，不存在部分成功。
pub trait EntryEncoder: FieldEncoder + Send {
    fn clone_boxed(&self) -> Box<dyn EntryEncoder>;

    fn write_entry(
        &self,
        sink: Option<&mut dyn io::Write>,
        message: &str,
        level: Level,
        time: &DateTime<FixedOffset>,
    ) -> Result<(), EncodeError>;
}

impl ColorTextEncoder {
    /// 组装整行并一次性写入 `sink`。
    ///
    /// # 教案式说明
    /// - **意图 (Why)**：整行在池化缓冲中完成组装后只调用一次 `write`，
    ///   让并发写同一终端的多条日志不会交错；
    /// - **逻辑 (How)**：
    ///   1. `sink` 缺失时立即返回 [`EncodeError::InvalidSink`]，不触碰任何缓冲；
    ///   2. 租借组装缓冲，依次写入级别标签、时间戳、补齐后的消息、已累积字段与换行符；
    ///   3. 调用一次 `write`，比较返回的字节数与组装长度，不一致时返回 [`EncodeError::ShortWrite`]；
    ///   4. 组装缓冲在所有路径上都随租约析构归还到池。
    /// - **契约 (What)**：不重置、不归还字段缓冲，编码器可继续用于下一条日志。
    pub fn write_entry(
        &self,
        sink: Option<&mut dyn io::Write>,
        message: &str,
        level: Level,
        time: &DateTime<FixedOffset>,
    ) -> Result<(), EncodeError> {
        let Some(sink) = sink else {
            return Err(EncodeError::InvalidSink);
        };

        let mut line = self.pool().lease();
        self.assemble(&mut line, message, level, time)?;

        let payload: &[u8] = &line;
        let expected = payload.len();
        let written = sink.write(payload).map_err(|err| {
            tracing::debug!(error = %err, expected, "log sink write failed");
            EncodeError::Io(err)
        })?;
        if written != expected {
            tracing::warn!(written, expected, "log sink accepted a short write");
            return Err(EncodeError::ShortWrite { written, expected });
        }
        Ok(())
    }

    fn assemble(
        &self,
        line: &mut BytesMut,
        message: &str,
        level: Level,
        time: &DateTime<FixedOffset>,
    ) -> Result<(), EncodeError> {
        put_level(line, level);

        let layout = self.time_format();
        if !layout.is_empty() {
            line.put_u8(b' ');
            write!(line, "{}", time.format(layout)).map_err(|_| EncodeError::TimeFormat {
                layout: layout.to_owned(),
            })?;
        }

        if !message.is_empty() {
            line.put_u8(b' ');
            put_display(line, format_args!("{message:<MESSAGE_WIDTH$}"));
        }

        let fields = self.as_bytes();
        if !fields.is_empty() {
            line.put_u8(b' ');
            line.put_slice(fields);
        }

        line.put_u8(b'\n');
        Ok(())
    }
}

impl EntryEncoder for ColorTextEncoder {
    fn clone_boxed(&self) -> Box<dyn EntryEncoder> {
        Box::new(self.clone())
    }

    fn write_entry(
        &self,
        sink: Option<&mut dyn io::Write>,
        message: &str,
        level: Level,
        time: &DateTime<FixedOffset>,
    ) -> Result<(), EncodeError> {
        ColorTextEncoder::write_entry(self, sink, message, level, time)
    }
}

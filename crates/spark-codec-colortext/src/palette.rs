//! 键名与级别标签的 ANSI 着色表。
//!
//! # 教案式说明
//! - **意图（Why）**：字段编码与整行渲染共用同一份调色板定义，保证同一键名在任何日志行中颜色一致；
//! - **逻辑（How）**：键名颜色由字节和对调色板容量取模得到，级别标签为固定查表；
//! - **契约（What）**：所有转义序列均为 `ESC[3<n>;1m`（前景色 + 加粗）并以 `ESC[0m` 复位。

use core::fmt;

use bytes::{BufMut, BytesMut};

use crate::level::Level;

/// 键名调色板容量，对应 ANSI 前景色 31..=37。
pub const PALETTE_SIZE: u64 = 7;

/// 复位所有 SGR 属性的转义序列。
pub const RESET: &str = "\x1b[0m";

const DEBUG_TAG: &str = "\x1b[32;1m[DEBG]\x1b[0m";
const INFO_TAG: &str = "\x1b[34;1m[INFO]\x1b[0m";
const WARN_TAG: &str = "\x1b[33;1m[WARN]\x1b[0m";
const ERROR_TAG: &str = "\x1b[31;1m[ERRO]\x1b[0m";
const PANIC_TAG: &str = "\x1b[31;1m[PANC]\x1b[0m";
const FATAL_TAG: &str = "\x1b[31;1m[FATA]\x1b[0m";

/// 计算键名的调色板序号。
///
/// # 契约说明（What）
/// - 返回值恒在 `[1, 7]`，等于键名字节之和对 7 取模再加一；
/// - 纯函数，同一键名在任意调用中结果一致。
pub fn key_color(key: &str) -> u8 {
    let sum: u64 = key.bytes().map(u64::from).sum();
    // 取模结果小于 7，加一后必然落在 u8 范围内。
    (sum % PALETTE_SIZE) as u8 + 1
}

/// 返回预定义级别的彩色标签；未知级别返回 `None`。
pub fn level_tag(level: Level) -> Option<&'static str> {
    match level {
        Level::DEBUG => Some(DEBUG_TAG),
        Level::INFO => Some(INFO_TAG),
        Level::WARN => Some(WARN_TAG),
        Level::ERROR => Some(ERROR_TAG),
        Level::PANIC => Some(PANIC_TAG),
        Level::FATAL => Some(FATAL_TAG),
        _ => None,
    }
}

/// 写入着色后的键名：`ESC[3<n>;1m<key>ESC[0m`。
pub(crate) fn put_colored_key(buf: &mut BytesMut, key: &str) {
    buf.put_slice(b"\x1b[3");
    buf.put_u8(b'0' + key_color(key));
    buf.put_slice(b";1m");
    buf.put_slice(key.as_bytes());
    buf.put_slice(RESET.as_bytes());
}

/// 写入级别标签；未知级别退化为不着色、不带方括号的十进制数值。
pub(crate) fn put_level(buf: &mut BytesMut, level: Level) {
    match level_tag(level) {
        Some(tag) => buf.put_slice(tag.as_bytes()),
        None => put_display(buf, level.as_raw()),
    }
}

/// 以 `Display` 形式追加任意值。
///
/// `BytesMut` 的 `fmt::Write` 仅在长度逼近 `usize::MAX` 时失败，此处忽略该结果。
pub(crate) fn put_display(buf: &mut BytesMut, value: impl fmt::Display) {
    let _ = fmt::Write::write_fmt(buf, format_args!("{value}"));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_color_follows_byte_sum() {
        // "user" 的字节和为 447，447 % 7 = 6。
        assert_eq!(key_color("user"), 7);
        // 空键名字节和为 0。
        assert_eq!(key_color(""), 1);
        assert_eq!(key_color("a"), (97 % 7) as u8 + 1);
    }

    #[test]
    fn colored_key_wraps_in_escape_sequences() {
        let mut buf = BytesMut::new();
        put_colored_key(&mut buf, "user");
        assert_eq!(&buf[..], b"\x1b[37;1muser\x1b[0m");
    }

    #[test]
    fn unknown_level_renders_plain_number() {
        let mut buf = BytesMut::new();
        put_level(&mut buf, Level::from_raw(-7));
        assert_eq!(&buf[..], b"-7");

        buf.clear();
        put_level(&mut buf, Level::INFO);
        assert_eq!(&buf[..], INFO_TAG.as_bytes());
    }

    #[test]
    fn every_known_tag_is_six_visible_chars() {
        for level in [
            Level::DEBUG,
            Level::INFO,
            Level::WARN,
            Level::ERROR,
            Level::PANIC,
            Level::FATAL,
        ] {
            let tag = level_tag(level).expect("预定义级别必须有标签");
            let start = tag.find("m[").expect("标签应以着色序列开头") + 1;
            let visible = &tag[start..tag.len() - RESET.len()];
            assert_eq!(visible.len(), 6, "标签 {visible} 宽度不符");
        }
    }
}

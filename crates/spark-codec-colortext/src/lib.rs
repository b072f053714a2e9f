#![warn(missing_debug_implementations)]

//! `spark-codec-colortext` 将结构化日志条目渲染为一行面向终端阅读的 ANSI 彩色文本。
//!
//! # 模块定位（Why）
//! - 宿主日志框架负责收集字段与选择输出端，本 crate 只负责把“级别 + 时间 + 消息 + 字段”
//!   序列化成字节并一次性交给调用方提供的输出端；
//! - 不做路由、过滤、采样或持久化。
//!
//! # 设计概要（How）
//! - `pool`：基于自由链表的缓冲池，字段缓冲与整行组装缓冲均从此租借；
//! - `encoder` / `field`：字段累积契约及其实现，键名按字节和确定性着色，嵌套对象以 `{...}` 帧包裹；
//! - `render`：组装整行、单次写出并校验写入字节数；
//! - `options`：时间布局等构造选项，以及可从 TOML 装载的配置。
//!
//! # 输出格式（What）
//! ```text
//! <级别标签> <时间戳> <消息（左对齐补齐到 25 列）> <k1>=<v1> <k2>=<v2>\n
//! ```
//! 时间戳、消息、字段三段在为空时连同前导空格一起省略。
//!
//! ```
//! use chrono::DateTime;
//! use spark_codec_colortext::{EncoderPool, FieldEncoder, Level, no_time};
//!
//! let pool = EncoderPool::new();
//! let mut encoder = pool.encoder([no_time()]);
//! encoder.add_str("user", "alice");
//!
//! let time = DateTime::parse_from_rfc3339("2024-05-01T00:00:00Z").unwrap();
//! let mut out: Vec<u8> = Vec::new();
//! encoder.write_entry(Some(&mut out), "login", Level::from_raw(7), &time).unwrap();
//! assert!(out.starts_with(b"7 login "));
//! ```

mod encoder;
mod error;
mod field;
mod level;
mod options;
mod palette;
mod pool;
mod render;

pub use crate::encoder::ColorTextEncoder;
pub use crate::error::{ConfigError, EncodeError};
pub use crate::field::{FieldEncoder, LogMarshaler, MarshalError};
pub use crate::level::Level;
pub use crate::options::{
    ColorTextConfig, DEFAULT_TIME_FORMAT, TextOption, no_time, time_format,
};
pub use crate::palette::{PALETTE_SIZE, RESET, key_color, level_tag};
pub use crate::pool::{DEFAULT_INITIAL_CAPACITY, EncoderPool, PoolConfig, PoolStats};
pub use crate::render::{EntryEncoder, MESSAGE_WIDTH};

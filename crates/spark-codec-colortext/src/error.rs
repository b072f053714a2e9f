//! # error 模块说明
//!
//! ## 角色定位（Why）
//! - 集中定义编码器对外暴露的失败语义：写出阶段的 [`EncodeError`] 与配置解析阶段的 [`ConfigError`]；
//! - 嵌套对象上报字段时产生的错误不在此包装，而是以 [`MarshalError`](crate::MarshalError) 原样透传。
//!
//! ## 设计要求（What）
//! - 全部错误类型派生 `thiserror::Error`，可直接交给 `anyhow` 等上层框架处理；
//! - 编码器内部不做任何重试，是否重写整行由宿主日志框架决定。

use std::io;

use thiserror::Error;

/// 渲染并写出单条日志时可能出现的错误。
///
/// # 教案式说明
/// - **意图 (Why)**：写出路径只有“整行确认写入”与“返回错误”两种结局，不存在部分成功；
///   下游终端或日志查看器无法区分截断行与完整行，因此短写也必须显式报错。
/// - **契约 (What)**：
///   - `InvalidSink` 在任何缓冲操作之前返回；
///   - `ShortWrite` 表示底层 `write` 未报错但返回的字节数与期望不符；
///   - `Io` 保留底层 [`io::Error`] 作为 `source`；
///   - `TimeFormat` 表示配置的时间布局无法被 chrono 格式化。
#[derive(Debug, Error)]
pub enum EncodeError {
    /// 调用方未提供输出端。
    #[error("invalid sink: no writer supplied for log entry")]
    InvalidSink,

    /// 输出端只接受了部分字节。
    #[error("incomplete write: only wrote {written} of {expected} bytes")]
    ShortWrite { written: usize, expected: usize },

    /// 时间布局包含 chrono 无法识别的格式说明符。
    #[error("time layout `{layout}` cannot be formatted")]
    TimeFormat { layout: String },

    /// 输出端写入失败。
    #[error("sink write failed: {0}")]
    Io(#[from] io::Error),
}

/// 从 TOML 文本装载 [`ColorTextConfig`](crate::ColorTextConfig) 失败。
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid color text encoder config: {0}")]
    Parse(#[from] toml::de::Error),
}

//! 编码器构造选项与配置装载。
//!
//! # 教案式说明
//! - **意图（Why）**：时间布局是编码器唯一的可调行为，选项在构造时按顺序应用，后者覆盖前者；
//! - **逻辑（How）**：[`TextOption`] 是封闭的选项枚举，[`ColorTextConfig`] 则允许从 TOML
//!   声明式地得到同样的选项序列与池参数；
//! - **契约（What）**：时间布局使用 chrono 的 strftime 语法，空字符串表示不输出时间戳。

use serde::Deserialize;

use crate::{
    encoder::ColorTextEncoder,
    error::ConfigError,
    pool::{EncoderPool, PoolConfig},
};

/// 默认时间布局，对应 RFC 3339（日期、时间与 UTC 偏移）。
pub const DEFAULT_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%:z";

/// 构造编码器时应用的单个选项。
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TextOption {
    /// 替换时间布局；空字符串等价于 [`no_time`]。
    TimeFormat(String),
}

impl TextOption {
    pub(crate) fn apply(self, encoder: &mut ColorTextEncoder) {
        match self {
            TextOption::TimeFormat(layout) => encoder.set_time_format(layout),
        }
    }
}

/// 设置时间戳的格式布局。
pub fn time_format(layout: impl Into<String>) -> TextOption {
    TextOption::TimeFormat(layout.into())
}

/// 在输出行中省略时间戳。
pub fn no_time() -> TextOption {
    time_format("")
}

/// 可从配置文件装载的编码器参数。
///
/// # 契约说明（What）
/// - `time_format` 缺省时沿用 [`DEFAULT_TIME_FORMAT`]；
/// - `no_time = true` 的优先级高于 `time_format`；
/// - `pool` 缺省时使用进程级共享池，否则构造一个独立的私有池。
///
/// ```toml
/// time_format = "%H:%M:%S"
///
/// [pool]
/// initial_capacity = 1024
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ColorTextConfig {
    pub time_format: Option<String>,
    pub no_time: bool,
    pub pool: Option<PoolConfig>,
}

impl ColorTextConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// 按声明顺序展开为选项序列。
    pub fn options(&self) -> Vec<TextOption> {
        let mut options = Vec::with_capacity(2);
        if let Some(layout) = &self.time_format {
            options.push(time_format(layout.clone()));
        }
        if self.no_time {
            options.push(no_time());
        }
        options
    }

    pub fn pool(&self) -> EncoderPool {
        match self.pool {
            Some(config) => EncoderPool::with_config(config),
            None => EncoderPool::global().clone(),
        }
    }

    /// 按配置构造编码器。
    ///
    /// 每次调用都会按 `pool` 字段重新解析所属池；需要多次构造时，
    /// 宜先调用 [`pool`](Self::pool) 再配合 [`options`](Self::options) 复用同一个池。
    pub fn build(&self) -> ColorTextEncoder {
        self.pool().encoder(self.options())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn later_options_win() {
        let encoder = EncoderPool::new().encoder([time_format("%H:%M"), no_time()]);
        assert_eq!(encoder.time_format(), "");

        let encoder = EncoderPool::new().encoder([no_time(), time_format("%H:%M")]);
        assert_eq!(encoder.time_format(), "%H:%M");
    }

    #[test]
    fn config_parses_from_toml() {
        let config = ColorTextConfig::from_toml_str(
            r#"
            time_format = "%H:%M:%S"

            [pool]
            initial_capacity = 512
            max_idle_buffers = 4
            "#,
        )
        .expect("合法配置应当解析成功");

        assert_eq!(config.time_format.as_deref(), Some("%H:%M:%S"));
        assert!(!config.no_time);
        let pool = config.pool.expect("应当解析出池参数");
        assert_eq!(pool.initial_capacity, 512);
        assert_eq!(pool.max_idle_buffers, 4);
        assert_eq!(
            pool.max_retained_capacity,
            PoolConfig::default().max_retained_capacity
        );

        let encoder = config.build();
        assert_eq!(encoder.time_format(), "%H:%M:%S");
        assert_eq!(encoder.pool().config().initial_capacity, 512);
    }

    #[test]
    fn no_time_overrides_layout() {
        let config = ColorTextConfig {
            time_format: Some("%H".to_owned()),
            no_time: true,
            pool: None,
        };
        assert_eq!(config.options(), vec![time_format("%H"), no_time()]);
        assert_eq!(config.build().time_format(), "");
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = ColorTextConfig::from_toml_str("colour = true").expect_err("未知字段应当被拒绝");
        assert!(err.to_string().contains("invalid color text encoder config"));
    }
}

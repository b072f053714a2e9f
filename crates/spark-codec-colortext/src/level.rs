use core::fmt;

/// 日志级别，按严重程度有序。
///
/// # 设计背景（Why）
/// - 宿主框架的级别以有符号整数表示，除预定义档位外还允许任意数值穿透，
///   因此采用新类型包装 `i32` 而非封闭枚举，未知数值在渲染时原样输出十进制。
///
/// # 契约说明（What）
/// - 预定义档位满足 `DEBUG < INFO < WARN < ERROR < PANIC < FATAL`；
/// - [`Level::from_raw`] 可构造任意数值，渲染器只为预定义档位着色。
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Level(i32);

impl Level {
    pub const DEBUG: Level = Level(-1);
    pub const INFO: Level = Level(0);
    pub const WARN: Level = Level(1);
    pub const ERROR: Level = Level(2);
    pub const PANIC: Level = Level(3);
    pub const FATAL: Level = Level(4);

    /// 以原始数值构造级别，不做范围校验。
    pub const fn from_raw(raw: i32) -> Self {
        Self(raw)
    }

    /// 返回原始数值。
    pub const fn as_raw(self) -> i32 {
        self.0
    }

    /// 是否为预定义档位之一。
    pub const fn is_known(self) -> bool {
        self.0 >= Self::DEBUG.0 && self.0 <= Self::FATAL.0
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Level::DEBUG => f.write_str("debug"),
            Level::INFO => f.write_str("info"),
            Level::WARN => f.write_str("warn"),
            Level::ERROR => f.write_str("error"),
            Level::PANIC => f.write_str("panic"),
            Level::FATAL => f.write_str("fatal"),
            Level(raw) => write!(f, "Level({raw})"),
        }
    }
}

/// 将 `tracing` 的级别映射到本编码器的档位。
///
/// `TRACE` 没有对应档位，按 `DEBUG` 渲染。
impl From<tracing::Level> for Level {
    fn from(level: tracing::Level) -> Self {
        if level == tracing::Level::ERROR {
            Level::ERROR
        } else if level == tracing::Level::WARN {
            Level::WARN
        } else if level == tracing::Level::INFO {
            Level::INFO
        } else {
            Level::DEBUG
        }
    }
}

//! 字段累积契约。
//!
//! # 教案式说明
//! - **意图（Why）**：宿主日志框架只通过 [`FieldEncoder`] 向编码器逐个上报键值，
//!   嵌套对象则通过 [`LogMarshaler`] 自描述地把自身字段回报给同一个编码器；
//! - **逻辑（How）**：两个 trait 均保持对象安全，嵌套回调拿到的是 `&mut dyn FieldEncoder`，
//!   因而任意实现都可以在不知晓具体编码器类型的情况下完成上报；
//! - **契约（What）**：累积调用不会失败，只有嵌套上报会把回调自身的错误原样返回。

use core::fmt;

/// 嵌套对象上报字段失败时携带的错误。
///
/// 编码器不会包装该错误，调用方可直接 `downcast_ref` 回原始类型。
pub type MarshalError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// 能够把自身字段上报给任意 [`FieldEncoder`] 的对象。
///
/// # 契约说明（What）
/// - **前置条件**：实现只能通过传入的 `encoder` 写字段，不得假设其具体类型；
/// - **后置条件**：返回 `Err` 时已上报的字段仍保留在编码器中，外层 `{...}` 帧照常闭合。
pub trait LogMarshaler {
    fn marshal_log(&self, encoder: &mut dyn FieldEncoder) -> Result<(), MarshalError>;
}

impl<F> LogMarshaler for F
where
    F: Fn(&mut dyn FieldEncoder) -> Result<(), MarshalError>,
{
    fn marshal_log(&self, encoder: &mut dyn FieldEncoder) -> Result<(), MarshalError> {
        self(encoder)
    }
}

/// 按值类型区分的字段累积接口。
///
/// # 设计背景（Why）
/// - 每种值类型都有固定的文本形态，拆成独立方法可避免在热路径上做运行时类型判断；
/// - `add_int`/`add_uint` 只是平台宽度整数的便捷入口，默认转发到 64 位版本。
///
/// # 契约说明（What）
/// - 键名原样写出，不做转义；值按各方法文档描述的自然文本形态写出；
/// - 所有方法只追加，不会改写已累积的内容。
pub trait FieldEncoder {
    /// 字符串值原样写出。
    fn add_str(&mut self, key: &str, value: &str);

    /// 写出 `true` 或 `false`。
    fn add_bool(&mut self, key: &str, value: bool);

    /// 十进制有符号整数。
    fn add_i64(&mut self, key: &str, value: i64);

    fn add_int(&mut self, key: &str, value: isize) {
        self.add_i64(key, value as i64);
    }

    /// 十进制无符号整数。
    fn add_u64(&mut self, key: &str, value: u64);

    fn add_uint(&mut self, key: &str, value: usize) {
        self.add_u64(key, value as u64);
    }

    /// 指针宽度的数值，以 `0x` 前缀的小写十六进制写出。
    fn add_uintptr(&mut self, key: &str, value: usize);

    /// 最短可往返的十进制表示，不使用指数记法。
    fn add_f64(&mut self, key: &str, value: f64);

    /// 以 `{...}` 帧包裹嵌套对象上报的字段，并原样返回回调的错误。
    fn add_marshaler(&mut self, key: &str, value: &dyn LogMarshaler) -> Result<(), MarshalError>;

    /// 通用兜底：以 `Debug` 形式写出任意对象。
    fn add_object(&mut self, key: &str, value: &dyn fmt::Debug);
}

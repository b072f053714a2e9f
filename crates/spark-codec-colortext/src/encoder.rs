use core::{fmt, mem};

use bytes::{BufMut, BytesMut};

use crate::{
    field::{FieldEncoder, LogMarshaler, MarshalError},
    options::{DEFAULT_TIME_FORMAT, TextOption},
    palette::{put_colored_key, put_display},
    pool::EncoderPool,
};

/// 面向人类阅读的彩色单行日志编码器。
///
/// # 模块角色（Why）
/// - 宿主框架为每条日志（或每个携带上下文字段的子记录器）持有一个实例，
///   通过 [`FieldEncoder`] 累积字段，最后调用 [`write_entry`](Self::write_entry) 输出整行；
/// - 字段缓冲从 [`EncoderPool`] 租借，实例销毁时自动归还，避免每条日志重新分配。
///
/// # 核心机制（How）
/// - `bytes` 仅追加：每个字段写成 `<着色键>=<值>`，字段之间以单个空格分隔；
/// - `first_nested` 标记“下一个键是否为刚打开的 `{` 帧内的第一个键”，为真时不写分隔空格；
///   该标记在嵌套层级之间共享，而非栈结构。
///
/// # 契约说明（What）
/// - **并发**：实例可跨线程移动但不可共享，累积调用需要 `&mut self`；
/// - **生命周期**：实例恰好归还一次，[`free`](Self::free) 与 `Drop` 等价，归还后无法再访问；
/// - **克隆**：[`Clone`] 从同一个池租借新缓冲并复制内容，两者此后互不影响。
pub struct ColorTextEncoder {
    bytes: BytesMut,
    time_format: String,
    first_nested: bool,
    pool: EncoderPool,
}

impl ColorTextEncoder {
    /// 从进程级共享池租借编码器，默认使用 RFC 3339 时间布局。
    pub fn new<I>(options: I) -> Self
    where
        I: IntoIterator<Item = TextOption>,
    {
        Self::from_pool(EncoderPool::global().clone(), options)
    }

    pub(crate) fn from_pool<I>(pool: EncoderPool, options: I) -> Self
    where
        I: IntoIterator<Item = TextOption>,
    {
        let bytes = pool.acquire();
        let mut encoder = Self {
            bytes,
            time_format: DEFAULT_TIME_FORMAT.to_owned(),
            first_nested: false,
            pool,
        };
        for option in options {
            option.apply(&mut encoder);
        }
        encoder
    }

    /// 将实例归还所属池。
    pub fn free(self) {
        drop(self);
    }

    /// 已累积的字段字节。
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// 当前时间布局；空字符串表示不输出时间戳。
    pub fn time_format(&self) -> &str {
        &self.time_format
    }

    pub fn pool(&self) -> &EncoderPool {
        &self.pool
    }

    pub(crate) fn set_time_format(&mut self, layout: String) {
        self.time_format = layout;
    }

    fn add_key(&mut self, key: &str) {
        if !self.bytes.is_empty() && !self.first_nested {
            self.bytes.put_u8(b' ');
        } else {
            self.first_nested = false;
        }
        put_colored_key(&mut self.bytes, key);
        self.bytes.put_u8(b'=');
    }
}

impl Clone for ColorTextEncoder {
    fn clone(&self) -> Self {
        let mut bytes = self.pool.acquire();
        bytes.extend_from_slice(&self.bytes);
        Self {
            bytes,
            time_format: self.time_format.clone(),
            first_nested: self.first_nested,
            pool: self.pool.clone(),
        }
    }
}

impl Drop for ColorTextEncoder {
    fn drop(&mut self) {
        let bytes = mem::take(&mut self.bytes);
        self.pool.release(bytes);
    }
}

impl fmt::Debug for ColorTextEncoder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ColorTextEncoder")
            .field("fields", &String::from_utf8_lossy(&self.bytes))
            .field("time_format", &self.time_format)
            .field("first_nested", &self.first_nested)
            .finish_non_exhaustive()
    }
}

impl FieldEncoder for ColorTextEncoder {
    fn add_str(&mut self, key: &str, value: &str) {
        self.add_key(key);
        self.bytes.put_slice(value.as_bytes());
    }

    fn add_bool(&mut self, key: &str, value: bool) {
        self.add_key(key);
        self.bytes
            .put_slice(if value { b"true".as_slice() } else { b"false".as_slice() });
    }

    fn add_i64(&mut self, key: &str, value: i64) {
        self.add_key(key);
        put_display(&mut self.bytes, value);
    }

    fn add_u64(&mut self, key: &str, value: u64) {
        self.add_key(key);
        put_display(&mut self.bytes, value);
    }

    fn add_uintptr(&mut self, key: &str, value: usize) {
        self.add_key(key);
        put_display(&mut self.bytes, format_args!("{value:#x}"));
    }

    fn add_f64(&mut self, key: &str, value: f64) {
        self.add_key(key);
        // `f64` 的 `Display` 即最短可往返表示，且从不使用指数记法。
        put_display(&mut self.bytes, value);
    }

    fn add_marshaler(&mut self, key: &str, value: &dyn LogMarshaler) -> Result<(), MarshalError> {
        self.add_key(key);
        self.first_nested = true;
        self.bytes.put_u8(b'{');
        let result = value.marshal_log(self);
        self.bytes.put_u8(b'}');
        self.first_nested = false;
        result
    }

    fn add_object(&mut self, key: &str, value: &dyn fmt::Debug) {
        self.add_key(key);
        put_display(&mut self.bytes, format_args!("{value:?}"));
    }
}

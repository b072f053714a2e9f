use std::{
    ops::{Deref, DerefMut},
    sync::{
        Arc, OnceLock,
        atomic::{AtomicU64, AtomicUsize, Ordering},
    },
};

use bytes::BytesMut;
use serde::Deserialize;
use spin::Mutex;

use crate::{encoder::ColorTextEncoder, options::TextOption};

/// 新分配缓冲的默认初始容量。
pub const DEFAULT_INITIAL_CAPACITY: usize = 4096;

static GLOBAL_POOL: OnceLock<EncoderPool> = OnceLock::new();

/// 缓冲池的构造参数。
///
/// # 契约说明（What）
/// - `initial_capacity`：自由链表未命中时新缓冲的起始容量；
/// - `max_idle_buffers`：自由链表最多缓存的缓冲数量，超出的归还直接丢弃；
/// - `max_retained_capacity`：归还时容量超过该值的缓冲直接丢弃，避免偶发超长日志长期占用内存。
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PoolConfig {
    pub initial_capacity: usize,
    pub max_idle_buffers: usize,
    pub max_retained_capacity: usize,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            initial_capacity: DEFAULT_INITIAL_CAPACITY,
            max_idle_buffers: 1024,
            max_retained_capacity: 1 << 20,
        }
    }
}

/// 缓冲池统计快照。
///
/// 计数器为单调累计值，`active_leases`/`idle_*` 为快照时刻的瞬时值。
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PoolStats {
    /// 自由链表未命中、新分配缓冲的次数。
    pub allocations: u64,
    /// 自由链表命中的次数。
    pub reuses: u64,
    /// 归还次数（含被丢弃的归还）。
    pub releases: u64,
    /// 因超出缓存上限而被丢弃的归还次数。
    pub discards: u64,
    pub active_leases: usize,
    pub idle_buffers: usize,
    pub idle_bytes: usize,
}

/// `EncoderPool` 为编码器提供可复用的字节缓冲，降低每条日志的堆分配次数。
///
/// # 模块角色（Why）
/// - 每条日志至少需要两块缓冲：字段累积缓冲（随编码器租借）与整行组装缓冲（渲染期间临时租借）；
///   两者都从同一个池中获取，渲染完成后立即归还。
/// - 进程级默认池通过 [`EncoderPool::global`] 暴露；测试或需要隔离统计的宿主可自行构造私有池。
///
/// # 核心机制（How）
/// - 内部维护 `spin::Mutex<Vec<BytesMut>>` 作为自由链表，租借时弹出任意缓存块并清空；
/// - `PoolMetrics` 以原子计数跟踪分配、复用、归还与丢弃次数，支撑 [`statistics`](Self::statistics) 快照；
/// - 句柄本身是 `Arc` 包装，克隆成本极低，编码器各自持有一份以便在 `Drop` 时归还。
///
/// # 契约说明（What）
/// - **线程安全**：支持多线程并发 `acquire`/`release`，调用方无需外部加锁；
/// - **后置条件**：`acquire` 返回的缓冲长度恒为 0；
/// - **调用方责任**：池不追踪缓冲身份，重复归还或归还仍在使用的缓冲属于调用方错误，池无法检测。
///
/// # 设计权衡（Trade-offs）
/// - 自由链表不区分容量档位：日志行长度分布集中，按容量挑选收益有限；
/// - 漏归还只会造成一次额外分配，不涉及外部资源泄漏。
#[derive(Clone)]
pub struct EncoderPool {
    inner: Arc<PoolInner>,
}

impl Default for EncoderPool {
    fn default() -> Self {
        Self::with_config(PoolConfig::default())
    }
}

impl core::fmt::Debug for EncoderPool {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("EncoderPool")
            .field("config", &self.inner.config)
            .field("stats", &self.statistics())
            .finish()
    }
}

impl EncoderPool {
    /// 以默认参数创建私有池。
    pub fn new() -> Self {
        Self::default()
    }

    /// 以指定参数创建私有池。
    pub fn with_config(config: PoolConfig) -> Self {
        Self {
            inner: Arc::new(PoolInner {
                free_list: Mutex::new(Vec::new()),
                metrics: PoolMetrics::default(),
                config,
            }),
        }
    }

    /// 进程级共享池，首次访问时以默认参数惰性初始化。
    ///
    /// 测试之间如需隔离，可调用 [`reset`](Self::reset) 清空缓存与计数。
    pub fn global() -> &'static EncoderPool {
        GLOBAL_POOL.get_or_init(EncoderPool::new)
    }

    pub fn config(&self) -> PoolConfig {
        self.inner.config
    }

    /// 从本池租借一个编码器，并按顺序应用选项。
    pub fn encoder<I>(&self, options: I) -> ColorTextEncoder
    where
        I: IntoIterator<Item = TextOption>,
    {
        ColorTextEncoder::from_pool(self.clone(), options)
    }

    /// 租借一块空缓冲。
    pub fn acquire(&self) -> BytesMut {
        self.inner.acquire_buffer()
    }

    /// 归还缓冲；调用后不得再访问该缓冲。
    pub fn release(&self, buffer: BytesMut) {
        self.inner.release_buffer(buffer);
    }

    /// 租借一块在离开作用域时自动归还的缓冲。
    pub(crate) fn lease(&self) -> Lease<'_> {
        Lease {
            pool: self,
            buffer: self.acquire(),
        }
    }

    /// 清空自由链表，返回释放的总容量。
    pub fn shrink_to_fit(&self) -> usize {
        self.inner.shrink_free_list()
    }

    /// 清空自由链表并将全部计数归零。
    pub fn reset(&self) {
        self.inner.shrink_free_list();
        self.inner.metrics.clear();
    }

    pub fn statistics(&self) -> PoolStats {
        self.inner.snapshot()
    }
}

/// 渲染期间租借的组装缓冲，`Drop` 时归还到所属池。
pub(crate) struct Lease<'a> {
    pool: &'a EncoderPool,
    buffer: BytesMut,
}

impl Deref for Lease<'_> {
    type Target = BytesMut;

    fn deref(&self) -> &BytesMut {
        &self.buffer
    }
}

impl DerefMut for Lease<'_> {
    fn deref_mut(&mut self) -> &mut BytesMut {
        &mut self.buffer
    }
}

impl Drop for Lease<'_> {
    fn drop(&mut self) {
        let buffer = core::mem::take(&mut self.buffer);
        self.pool.release(buffer);
    }
}

struct PoolInner {
    free_list: Mutex<Vec<BytesMut>>,
    metrics: PoolMetrics,
    config: PoolConfig,
}

impl PoolInner {
    fn acquire_buffer(&self) -> BytesMut {
        let reused = self.free_list.lock().pop();
        self.metrics.active_leases.fetch_add(1, Ordering::Relaxed);
        match reused {
            Some(mut buf) => {
                buf.clear();
                self.metrics.reuses.fetch_add(1, Ordering::Relaxed);
                buf
            }
            None => {
                self.metrics.allocations.fetch_add(1, Ordering::Relaxed);
                tracing::trace!(
                    capacity = self.config.initial_capacity,
                    "encoder pool miss, allocating buffer"
                );
                BytesMut::with_capacity(self.config.initial_capacity)
            }
        }
    }

    fn release_buffer(&self, mut buf: BytesMut) {
        self.metrics.releases.fetch_add(1, Ordering::Relaxed);
        saturating_decrement(&self.metrics.active_leases);

        let capacity = buf.capacity();
        if capacity > self.config.max_retained_capacity {
            self.discard(capacity, "oversized");
            return;
        }

        buf.clear();
        let mut list = self.free_list.lock();
        if list.len() >= self.config.max_idle_buffers {
            drop(list);
            self.discard(capacity, "free list full");
            return;
        }
        list.push(buf);
    }

    fn discard(&self, capacity: usize, reason: &'static str) {
        self.metrics.discards.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(capacity, reason, "encoder pool discarded buffer");
    }

    fn shrink_free_list(&self) -> usize {
        let mut list = self.free_list.lock();
        let reclaimed: usize = list.iter().map(BytesMut::capacity).sum();
        list.clear();
        reclaimed
    }

    fn snapshot(&self) -> PoolStats {
        let (idle_buffers, idle_bytes) = {
            let list = self.free_list.lock();
            (list.len(), list.iter().map(BytesMut::capacity).sum())
        };
        PoolStats {
            allocations: self.metrics.allocations.load(Ordering::Relaxed),
            reuses: self.metrics.reuses.load(Ordering::Relaxed),
            releases: self.metrics.releases.load(Ordering::Relaxed),
            discards: self.metrics.discards.load(Ordering::Relaxed),
            active_leases: self.metrics.active_leases.load(Ordering::Relaxed),
            idle_buffers,
            idle_bytes,
        }
    }
}

#[derive(Default)]
struct PoolMetrics {
    allocations: AtomicU64,
    reuses: AtomicU64,
    releases: AtomicU64,
    discards: AtomicU64,
    active_leases: AtomicUsize,
}

impl PoolMetrics {
    fn clear(&self) {
        self.allocations.store(0, Ordering::Relaxed);
        self.reuses.store(0, Ordering::Relaxed);
        self.releases.store(0, Ordering::Relaxed);
        self.discards.store(0, Ordering::Relaxed);
        self.active_leases.store(0, Ordering::Relaxed);
    }
}

fn saturating_decrement(target: &AtomicUsize) {
    let _ = target.fetch_update(Ordering::Relaxed, Ordering::Relaxed, |current| {
        Some(current.saturating_sub(1))
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn released_buffer_is_reused_empty() {
        let pool = EncoderPool::new();
        let mut first = pool.acquire();
        first.extend_from_slice(b"stale");
        let capacity = first.capacity();
        pool.release(first);

        let second = pool.acquire();
        assert!(second.is_empty());
        assert_eq!(second.capacity(), capacity);

        let stats = pool.statistics();
        assert_eq!(stats.allocations, 1);
        assert_eq!(stats.reuses, 1);
        assert_eq!(stats.active_leases, 1);
    }

    #[test]
    fn lease_returns_buffer_on_drop() {
        let pool = EncoderPool::new();
        {
            let mut lease = pool.lease();
            lease.extend_from_slice(b"line");
            assert_eq!(pool.statistics().active_leases, 1);
        }
        let stats = pool.statistics();
        assert_eq!(stats.active_leases, 0);
        assert_eq!(stats.releases, 1);
        assert_eq!(stats.idle_buffers, 1);
    }

    #[test]
    fn oversized_buffers_are_not_cached() {
        let pool = EncoderPool::with_config(PoolConfig {
            initial_capacity: 16,
            max_idle_buffers: 8,
            max_retained_capacity: 64,
        });
        let mut buf = pool.acquire();
        buf.extend_from_slice(&[0u8; 256]);
        pool.release(buf);

        let stats = pool.statistics();
        assert_eq!(stats.discards, 1);
        assert_eq!(stats.idle_buffers, 0);
    }

    #[test]
    fn idle_limit_caps_free_list() {
        let pool = EncoderPool::with_config(PoolConfig {
            max_idle_buffers: 1,
            ..PoolConfig::default()
        });
        let first = pool.acquire();
        let second = pool.acquire();
        pool.release(first);
        pool.release(second);

        let stats = pool.statistics();
        assert_eq!(stats.idle_buffers, 1);
        assert_eq!(stats.discards, 1);
        assert_eq!(stats.releases, 2);
    }

    #[test]
    fn reset_clears_cache_and_counters() {
        let pool = EncoderPool::new();
        let buf = pool.acquire();
        pool.release(buf);
        assert!(pool.statistics().idle_bytes >= DEFAULT_INITIAL_CAPACITY);

        pool.reset();
        assert_eq!(pool.statistics(), PoolStats::default());
    }
}

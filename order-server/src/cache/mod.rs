//! 内存缓存模块
//!
//! 订单载荷的进程内只增缓存。缓存是数据库的派生视图：
//! 只有成功落库的载荷才会被写入 (promotion)，不做过期和淘汰。

use dashmap::DashMap;
use thiserror::Error;

/// 缓存写入错误
///
/// [`MemoryCache`] 本身不会失败，错误臂留给可能失败的实现
/// (以及测试中的故障注入)。
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache write failed: {0}")]
    Write(String),
}

/// 订单缓存能力
///
/// 所有方法都必须在多线程并发调用下安全：`get` 之间互不阻塞，
/// `set`/`delete` 与同一 key 上的其他操作互斥。
pub trait OrderCache: Send + Sync {
    /// 按订单号读取载荷，未命中返回 `None`
    fn get(&self, id: &str) -> Option<Vec<u8>>;

    /// 写入载荷，同 key 幂等覆盖
    ///
    /// 预热和摄取两条路径会互不协调地写同一 key，
    /// 所以覆盖不是错误；以最后完成的 `set` 为准。
    fn set(&self, id: &str, payload: Vec<u8>) -> Result<(), CacheError>;

    /// 删除一个缓存条目
    fn delete(&self, id: &str);
}

/// 基于 [`DashMap`] 的并发内存缓存
///
/// 值类型固定为载荷字节，不存放动态类型。
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: DashMap<String, Vec<u8>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }

    /// 当前缓存条目数
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl OrderCache for MemoryCache {
    fn get(&self, id: &str) -> Option<Vec<u8>> {
        self.entries.get(id).map(|entry| entry.value().clone())
    }

    fn set(&self, id: &str, payload: Vec<u8>) -> Result<(), CacheError> {
        self.entries.insert(id.to_string(), payload);
        Ok(())
    }

    fn delete(&self, id: &str) {
        self.entries.remove(id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn set_get_delete_roundtrip() {
        let cache = MemoryCache::new();
        assert!(cache.get("A1").is_none());

        cache.set("A1", b"p1".to_vec()).unwrap();
        assert_eq!(cache.get("A1").as_deref(), Some(b"p1".as_slice()));
        assert_eq!(cache.len(), 1);

        cache.delete("A1");
        assert!(cache.get("A1").is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn set_overwrites_existing_key() {
        let cache = MemoryCache::new();
        cache.set("A1", b"old".to_vec()).unwrap();
        cache.set("A1", b"new".to_vec()).unwrap();
        assert_eq!(cache.get("A1").as_deref(), Some(b"new".as_slice()));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn concurrent_readers_and_writers_do_not_corrupt_the_map() {
        let cache = Arc::new(MemoryCache::new());
        let mut handles = Vec::new();

        for worker in 0..8 {
            let cache = Arc::clone(&cache);
            handles.push(std::thread::spawn(move || {
                for i in 0..500 {
                    let key = format!("order-{}", i % 50);
                    cache.set(&key, vec![worker as u8; 16]).unwrap();
                    if let Some(payload) = cache.get(&key) {
                        // 任何时刻读到的都必须是某个 writer 的完整写入
                        assert_eq!(payload.len(), 16);
                        assert!(payload.iter().all(|b| *b == payload[0]));
                    }
                }
            }));
        }

        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(cache.len(), 50);
    }
}

//! Seller scan-dedup cache
//!
//! 进程内缓存，按 (卖家, 订单) 记录本进程已核销过的扫码。只是挡住
//! 同一会话内的重复扫码，不做持久化——订单状态字段才是事实来源，
//! 进程重启后由账本的 CAS 流转兜底。

use dashmap::DashMap;

/// In-process record of orders a seller has already served
#[derive(Debug, Default)]
pub struct ScanCache {
    /// (seller id, order id) → scanned-at unix micros
    served: DashMap<(String, String), i64>,
}

impl ScanCache {
    pub fn new() -> Self {
        Self {
            served: DashMap::new(),
        }
    }

    /// Record a served order for this seller
    pub fn mark(&self, seller_id: &str, order_id: &str) {
        self.served.insert(
            (seller_id.to_string(), order_id.to_string()),
            chrono::Utc::now().timestamp_micros(),
        );
    }

    /// Has this seller already served this order in the current session?
    pub fn contains(&self, seller_id: &str, order_id: &str) -> bool {
        self.served
            .contains_key(&(seller_id.to_string(), order_id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mark_and_contains() {
        let cache = ScanCache::new();
        assert!(!cache.contains("user:s1", "orders:o1"));

        cache.mark("user:s1", "orders:o1");
        assert!(cache.contains("user:s1", "orders:o1"));
        assert!(!cache.contains("user:s1", "orders:o2"));
    }

    #[test]
    fn test_cache_is_scoped_per_seller() {
        let cache = ScanCache::new();
        cache.mark("user:s1", "orders:o1");

        // Another seller's session has not seen this order
        assert!(!cache.contains("user:s2", "orders:o1"));
    }
}

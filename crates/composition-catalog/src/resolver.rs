//! 解析器上下文
//!
//! 为整个组合过程提供规范的类型引用身份，并承载注入式的
//! 目录构建计量器

use composition_common::TypeRef;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// 目录构建计量器
///
/// 记录 add_parts 调用总数与并发在途峰值，仅用于监控，
/// 不承载任何正确性契约
#[derive(Debug, Default)]
pub struct CatalogMetrics {
    /// add_parts 调用总数
    add_parts_calls: AtomicU64,
    /// 当前在途的 add_parts 调用数
    in_flight: AtomicU64,
    /// 在途调用数峰值
    max_in_flight: AtomicU64,
}

impl CatalogMetrics {
    /// 记录一次 add_parts 调用开始，返回在作用域结束时自动结算的守卫
    pub fn begin_add_parts(&self) -> AddPartsGuard<'_> {
        self.add_parts_calls.fetch_add(1, Ordering::Relaxed);
        let current = self.in_flight.fetch_add(1, Ordering::Relaxed) + 1;
        self.max_in_flight.fetch_max(current, Ordering::Relaxed);
        AddPartsGuard { metrics: self }
    }

    /// 读取计量快照
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            add_parts_calls: self.add_parts_calls.load(Ordering::Relaxed),
            max_in_flight: self.max_in_flight.load(Ordering::Relaxed),
        }
    }
}

/// 计量快照
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetricsSnapshot {
    /// add_parts 调用总数
    pub add_parts_calls: u64,
    /// 在途调用数峰值
    pub max_in_flight: u64,
}

/// add_parts 在途计数守卫
#[derive(Debug)]
pub struct AddPartsGuard<'a> {
    metrics: &'a CatalogMetrics,
}

impl Drop for AddPartsGuard<'_> {
    fn drop(&mut self) {
        self.metrics.in_flight.fetch_sub(1, Ordering::Relaxed);
    }
}

/// 解析器上下文
///
/// 在整个组合范围内为支撑类型引用提供规范身份：
/// 结构相等的类型引用经过驻留后共享同一实例，
/// 下游缓存可以放心按实例身份建键
#[derive(Debug, Clone, Default)]
pub struct Resolver {
    inner: Arc<ResolverInner>,
}

#[derive(Debug, Default)]
struct ResolverInner {
    /// 驻留表，键为模块名与完整类型名
    interned: RwLock<HashMap<String, Arc<TypeRef>>>,
    /// 注入式计量器
    metrics: CatalogMetrics,
}

impl Resolver {
    /// 创建解析器上下文
    pub fn new() -> Self {
        Self::default()
    }

    /// 驻留类型引用，返回规范实例
    pub fn intern(&self, type_ref: TypeRef) -> Arc<TypeRef> {
        let key = format!(
            "{}@{}!{}",
            type_ref.module().name,
            type_ref.module().version,
            type_ref.full_name()
        );
        if let Some(existing) = self.inner.interned.read().get(&key) {
            return Arc::clone(existing);
        }
        let mut table = self.inner.interned.write();
        Arc::clone(
            table
                .entry(key)
                .or_insert_with(|| Arc::new(type_ref)),
        )
    }

    /// 目录构建计量器
    pub fn metrics(&self) -> &CatalogMetrics {
        &self.inner.metrics
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use composition_common::ModuleRef;

    #[test]
    fn interning_returns_canonical_instance() {
        let resolver = Resolver::new();
        let module = ModuleRef::new("demo", "1.0.0");
        let a = resolver.intern(TypeRef::new(module.clone(), "Foo"));
        let b = resolver.intern(TypeRef::new(module, "Foo"));
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn metrics_track_calls_and_peak() {
        let metrics = CatalogMetrics::default();
        {
            let _a = metrics.begin_add_parts();
            let _b = metrics.begin_add_parts();
        }
        let _c = metrics.begin_add_parts();
        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.add_parts_calls, 3);
        assert_eq!(snapshot.max_in_flight, 2);
    }
}

//! # Composition Catalog
//!
//! 组合引擎的解析核心：索引部件导出、增量合并目录、
//! 解析导入请求（含开放泛型闭合）并提供延迟值供应机制。
//!
//! ## 核心类型
//!
//! - [`ComposableCatalog`] - 可组合目录，不可变快照
//! - [`ExportBinding`] - 导出绑定（导出 + 所属部件 + 可选成员）
//! - [`Resolver`] - 解析器上下文，提供规范类型身份
//! - [`NonSharingHashSet`] - 共享安全的不可变集合适配器
//! - [`DeferredValue`] - 延迟值句柄
//!
//! ## 设计原则
//!
//! - 目录是纯值对象，构造后可被任意线程无同步并发读取
//! - 所有"变更"操作产生新快照，写时复制只触及受影响的合约桶
//! - 解析是快照与导入定义的纯函数，可重入、不阻塞

pub mod binding;
pub mod catalog;
pub mod deferred;
pub mod immutable_set;
pub mod resolver;

pub use binding::*;
pub use catalog::*;
pub use deferred::*;
pub use immutable_set::*;
pub use resolver::*;
